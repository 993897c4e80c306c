pub mod similarity;
pub mod teams;

use futures_util::future::join_all;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::platforms::polymarket::{event_url, EventSearch};
use crate::platforms::{field_str, json_f64, json_id};
use similarity::{find_best_match, TITLE_MATCH_THRESHOLD};
use teams::{sport_tag, League};

/// Reference cap on in-flight Polymarket lookups for a batch.
pub const DEFAULT_MATCH_CONCURRENCY: usize = 5;

/// Sub-markets whose question contains any of these are props, not the winner market.
static EXCLUSION_KEYWORDS: &[&str] = &[
    "Spread",
    "Total",
    "Over",
    "Under",
    "Handicap",
    "Touchdown",
    "Yards",
    "Field Goal",
    "1H",
    "2H",
    "Quarter",
];

// ── Types ───────────────────────────────────────────────────────────────

/// Best Polymarket counterpart for a Kalshi event, with prices in cents (0-100).
#[derive(Debug, Clone, PartialEq)]
pub struct MarketMatch {
    pub title: String,
    pub slug: String,
    pub event_id: Option<String>,
    pub market_id: Option<String>,
    pub condition_id: Option<String>,
    pub question: String,
    pub yes_token_id: Option<String>,
    pub no_token_id: Option<String>,
    pub yes_price_cents: f64,
    pub no_price_cents: f64,
    pub outcomes: (String, String),
    pub url: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Teams {
    pub team_a: String,
    pub team_b: String,
}

#[derive(Debug, Clone)]
pub struct MatchRequest {
    pub title: String,
    pub sport: Option<String>,
}

// ── Pure functions (testable) ───────────────────────────────────────────

/// Split "A vs B" / "A at B" (case-insensitive). Without a separator the
/// whole title is `team_a`.
pub fn extract_teams(title: &str) -> Teams {
    let lowered = title.trim().to_lowercase();
    for sep in [" vs ", " at "] {
        if lowered.contains(sep) {
            let mut parts = lowered.split(sep);
            let team_a = parts.next().unwrap_or("").trim().to_string();
            let team_b = parts.next().unwrap_or("").trim().to_string();
            return Teams { team_a, team_b };
        }
    }
    Teams {
        team_a: lowered,
        team_b: String::new(),
    }
}

pub fn normalize_teams(teams: Teams, sport: Option<&str>) -> Teams {
    match sport.and_then(League::from_sport) {
        Some(league) => Teams {
            team_a: league.normalize(&teams.team_a).to_string(),
            team_b: league.normalize(&teams.team_b).to_string(),
        },
        None => teams,
    }
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// The string candidates are scored against.
pub fn match_title(original: &str, teams: &Teams) -> String {
    if teams.team_a.is_empty() || teams.team_b.is_empty() {
        original.to_string()
    } else {
        format!("{} vs {}", title_case(&teams.team_a), title_case(&teams.team_b))
    }
}

/// "los angeles r" -> "los angeles". `None` when there is nothing to strip.
pub fn strip_disambiguator(query: &str) -> Option<String> {
    let words: Vec<&str> = query.split_whitespace().collect();
    match words.split_last() {
        Some((last, rest)) if !rest.is_empty() && last.chars().count() == 1 => Some(rest.join(" ")),
        _ => None,
    }
}

/// Keep only events whose title contains the lower-cased query.
pub fn filter_candidates(events: Vec<Value>, query: &str) -> Vec<Value> {
    let needle = query.to_lowercase();
    events
        .into_iter()
        .filter(|e| {
            field_str(e, "title")
                .map(|t| t.to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
        .collect()
}

fn market_label(market: &Value) -> &str {
    field_str(market, "question")
        .or_else(|| field_str(market, "title"))
        .unwrap_or("")
}

/// Moneyline pick: exact title match, else the shortest non-prop market, else the first.
pub fn select_primary_market<'a>(markets: &'a [Value], event_title: &str) -> Option<&'a Value> {
    if let Some(exact) = markets.iter().find(|m| market_label(m) == event_title) {
        return Some(exact);
    }

    let shortest = markets
        .iter()
        .filter(|m| {
            let label = market_label(m);
            !EXCLUSION_KEYWORDS.iter().any(|k| label.contains(k))
        })
        .min_by_key(|m| market_label(m).chars().count());

    shortest.or_else(|| markets.first())
}

/// Gamma encodes several arrays as JSON strings; accept either form.
fn json_list(v: Option<&Value>) -> Vec<Value> {
    match v {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::String(s)) => serde_json::from_str::<Vec<Value>>(s).unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn to_cents(probability: f64) -> f64 {
    (probability * 100_000.0).round() / 1000.0
}

/// (yes, no) in cents: best ask first, then `outcomePrices`. (0, 0) if neither parses.
pub fn extract_prices(market: &Value) -> (f64, f64) {
    if let Some(ask) = market.get("bestAsk").and_then(json_f64) {
        let yes = to_cents(ask);
        if yes != 0.0 {
            return (yes, 100.0 - yes);
        }
    }

    let prices: Vec<f64> = json_list(market.get("outcomePrices"))
        .iter()
        .filter_map(json_f64)
        .collect();
    match prices.as_slice() {
        [yes, no, ..] => (to_cents(*yes), to_cents(*no)),
        _ => (0.0, 0.0),
    }
}

/// (yes, no) CLOB token ids from `clobTokenIds`.
pub fn extract_token_ids(market: &Value) -> (Option<String>, Option<String>) {
    let ids = json_list(market.get("clobTokenIds"));
    (
        ids.first().and_then(json_id),
        ids.get(1).and_then(json_id),
    )
}

pub fn extract_outcomes(market: &Value) -> (String, String) {
    let labels: Vec<String> = json_list(market.get("outcomes"))
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();
    match labels.as_slice() {
        [yes, no, ..] => (yes.clone(), no.clone()),
        _ => ("Yes".to_string(), "No".to_string()),
    }
}

fn build_match(event: &Value, score: f64) -> Option<MarketMatch> {
    let title = field_str(event, "title").unwrap_or("").to_string();
    let markets = event.get("markets").and_then(|v| v.as_array())?;
    let market = select_primary_market(markets, &title)?;

    let (yes_price_cents, no_price_cents) = extract_prices(market);
    let (yes_token_id, no_token_id) = extract_token_ids(market);
    let slug = field_str(event, "slug").unwrap_or("").to_string();

    Some(MarketMatch {
        url: event_url(&slug),
        event_id: event.get("id").and_then(json_id),
        market_id: market.get("id").and_then(json_id),
        condition_id: field_str(market, "conditionId").map(str::to_string),
        question: market_label(market).to_string(),
        outcomes: extract_outcomes(market),
        title,
        slug,
        yes_token_id,
        no_token_id,
        yes_price_cents,
        no_price_cents,
        score,
    })
}

// ── Matcher ─────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MarketMatcher {
    search: Arc<dyn EventSearch>,
}

impl MarketMatcher {
    pub fn new(search: Arc<dyn EventSearch>) -> Self {
        Self { search }
    }

    /// One search call, filtered. Failures count as an empty tier.
    async fn search_filtered(&self, query: &str, tag_id: Option<u32>) -> Vec<Value> {
        match self.search.search_events(query, tag_id).await {
            Ok(events) => filter_candidates(events, query),
            Err(e) => {
                warn!(query, ?tag_id, error = %e, "polymarket search failed");
                Vec::new()
            }
        }
    }

    /// Tagged, then untagged; then the same with a trailing single letter stripped.
    async fn search_tiers(&self, query: &str, tag_id: Option<u32>) -> Vec<Value> {
        let mut queries = vec![query.to_string()];
        if let Some(stripped) = strip_disambiguator(query) {
            queries.push(stripped);
        }

        for q in &queries {
            let cands = self.search_filtered(q, tag_id).await;
            if !cands.is_empty() {
                return cands;
            }
            if tag_id.is_some() {
                let cands = self.search_filtered(q, None).await;
                if !cands.is_empty() {
                    return cands;
                }
            }
        }
        Vec::new()
    }

    /// Best Polymarket event for a Kalshi title, or `None`. Never errors.
    pub async fn find_match(&self, title: &str, sport: Option<&str>) -> Option<MarketMatch> {
        let tag_id = sport.and_then(sport_tag);
        let teams = normalize_teams(extract_teams(title), sport);

        let mut candidates = Vec::new();
        if !teams.team_a.is_empty() {
            candidates = self.search_tiers(&teams.team_a, tag_id).await;
        }
        if candidates.is_empty() && !teams.team_b.is_empty() {
            candidates = self.search_tiers(&teams.team_b, tag_id).await;
        }
        if candidates.is_empty() {
            debug!(title, "no polymarket candidates");
            return None;
        }

        let target = match_title(title, &teams);
        let (idx, score) = find_best_match(
            &target,
            candidates.iter().map(|c| field_str(c, "title").unwrap_or("")),
            TITLE_MATCH_THRESHOLD,
        )?;

        let matched = build_match(&candidates[idx], score);
        if matched.is_none() {
            debug!(title, "matched event has no markets");
        }
        matched
    }

    /// `find_match` abandoned after `timeout`.
    pub async fn find_match_within(&self, title: &str, sport: Option<&str>, timeout: Duration) -> Option<MarketMatch> {
        match tokio::time::timeout(timeout, self.find_match(title, sport)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(title, ?timeout, "match lookup timed out");
                None
            }
        }
    }

    /// Resolve many titles with at most `concurrency` lookups in flight, each
    /// abandoned after `timeout`. Results line up with `requests`.
    pub async fn match_many(
        &self,
        requests: &[MatchRequest],
        concurrency: usize,
        timeout: Duration,
    ) -> Vec<Option<MarketMatch>> {
        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));

        let lookups = requests.iter().map(|req| {
            let semaphore = semaphore.clone();
            async move {
                let _permit = semaphore.acquire().await.ok()?;
                self.find_match_within(&req.title, req.sport.as_deref(), timeout).await
            }
        });

        join_all(lookups).await
    }
}
