use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use rsa::RsaPrivateKey;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use super::{field_str, json_i64};
use crate::auth::{self, SignerError};
use crate::config::Config;

pub const PROD_BASE_URL: &str = "https://api.elections.kalshi.com/trade-api/v2";
pub const DEMO_BASE_URL: &str = "https://demo-api.kalshi.co/trade-api/v2";

/// Prefix that must be prepended to an endpoint before signing it.
const SIGN_PREFIX: &str = "/trade-api/v2";

#[derive(Error, Debug)]
pub enum KalshiError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Cannot authenticate: {0}")]
    Auth(#[from] SignerError),
    #[error("API returned status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Failed to parse response: {0}")]
    ParseError(String),
    #[error("Kalshi credentials are not configured")]
    MissingCredentials,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketKind {
    Moneyline,
    Spread,
    Total,
}

impl MarketKind {
    pub const ALL: [MarketKind; 3] = [MarketKind::Moneyline, MarketKind::Spread, MarketKind::Total];

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketKind::Moneyline => "moneyline",
            MarketKind::Spread => "spread",
            MarketKind::Total => "total",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MarketKind::Moneyline => "Moneyline",
            MarketKind::Spread => "Spreads",
            MarketKind::Total => "Totals",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "moneyline" | "ml" => Some(MarketKind::Moneyline),
            "spread" | "spreads" => Some(MarketKind::Spread),
            "total" | "totals" => Some(MarketKind::Total),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub ticker: String,
    pub side: String,
    pub count: i64,
    /// Average cost per contract in cents.
    pub avg_price_cents: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub trade_id: String,
    pub ticker: String,
    pub side: String,
    pub action: String,
    pub count: i64,
    pub price_cents: i64,
    pub created_time: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketQuote {
    pub ticker: String,
    pub title: String,
    pub subtitle: String,
    pub yes_bid: Option<i64>,
    pub no_bid: Option<i64>,
}

impl MarketQuote {
    /// Event-level id: the ticker without its outcome suffix.
    pub fn base_id(&self) -> &str {
        match self.ticker.rfind('-') {
            Some(p) => &self.ticker[..p],
            None => &self.ticker,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MarketBuckets {
    pub moneyline: Vec<MarketQuote>,
    pub spread: Vec<MarketQuote>,
    pub total: Vec<MarketQuote>,
}

impl MarketBuckets {
    pub fn get(&self, kind: MarketKind) -> &[MarketQuote] {
        match kind {
            MarketKind::Moneyline => &self.moneyline,
            MarketKind::Spread => &self.spread,
            MarketKind::Total => &self.total,
        }
    }

    pub fn push(&mut self, quote: MarketQuote) {
        match classify_market(&quote.title, &quote.subtitle) {
            MarketKind::Moneyline => self.moneyline.push(quote),
            MarketKind::Spread => self.spread.push(quote),
            MarketKind::Total => self.total.push(quote),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Game {
    pub event_title: String,
    pub event_ticker: String,
    pub markets: MarketBuckets,
}

#[derive(Debug, Clone)]
pub struct EventSummary {
    pub event_ticker: String,
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct MarketInfo {
    pub ticker: String,
    pub event_ticker: String,
    pub title: String,
}

/// Bucket a market by its title/subtitle. Spread wins over total.
pub fn classify_market(title: &str, subtitle: &str) -> MarketKind {
    let title = title.to_lowercase();
    let subtitle = subtitle.to_lowercase();

    let signed_number_in_subtitle = subtitle.split_whitespace().any(|tok| {
        tok.chars().any(|c| c.is_ascii_digit()) && (tok.contains('-') || tok.contains('+'))
    });

    if title.contains("wins by")
        || title.contains("spread")
        || subtitle.contains("spread")
        || signed_number_in_subtitle
    {
        MarketKind::Spread
    } else if title.contains("over") || title.contains("under") || title.contains("total") {
        MarketKind::Total
    } else {
        MarketKind::Moneyline
    }
}

pub fn parse_positions(data: &Value) -> Vec<Position> {
    let mut out = Vec::new();
    let Some(positions) = data
        .get("market_positions")
        .or_else(|| data.get("positions"))
        .and_then(|v| v.as_array())
    else {
        return out;
    };

    for pos in positions {
        let count = pos.get("position").and_then(json_i64).unwrap_or(0);
        if count == 0 {
            continue;
        }
        let exposure = pos.get("market_exposure").and_then(json_i64).unwrap_or(0);
        let contracts = count.abs();
        out.push(Position {
            ticker: field_str(pos, "ticker").unwrap_or("?").to_string(),
            side: if count > 0 { "YES" } else { "NO" }.to_string(),
            count: contracts,
            avg_price_cents: exposure as f64 / contracts as f64,
        });
    }
    out
}

pub fn parse_fills(data: &Value) -> Vec<Fill> {
    data.get("fills")
        .and_then(|v| v.as_array())
        .map(|fills| {
            fills
                .iter()
                .map(|f| {
                    let side = field_str(f, "side").unwrap_or("").to_lowercase();
                    let price_key = if side == "no" { "no_price" } else { "yes_price" };
                    Fill {
                        trade_id: field_str(f, "trade_id").unwrap_or("").to_string(),
                        ticker: field_str(f, "ticker")
                            .or_else(|| field_str(f, "market_ticker"))
                            .unwrap_or("Unknown")
                            .to_string(),
                        side: side.to_uppercase(),
                        action: field_str(f, "action").unwrap_or("").to_uppercase(),
                        count: f.get("count").and_then(json_i64).unwrap_or(0),
                        price_cents: f
                            .get(price_key)
                            .or_else(|| f.get("price"))
                            .and_then(json_i64)
                            .unwrap_or(0),
                        created_time: field_str(f, "created_time").unwrap_or("").to_string(),
                    }
                })
                .collect()
        })
        .unwrap_or_default()
}

pub fn parse_market_quotes(data: &Value) -> Vec<MarketQuote> {
    data.get("markets")
        .and_then(|v| v.as_array())
        .map(|markets| {
            markets
                .iter()
                .filter_map(|m| {
                    let ticker = field_str(m, "ticker")?;
                    Some(MarketQuote {
                        ticker: ticker.to_string(),
                        title: field_str(m, "title").unwrap_or("").to_string(),
                        subtitle: field_str(m, "subtitle").unwrap_or("").to_string(),
                        yes_bid: m.get("yes_bid").and_then(json_i64),
                        no_bid: m.get("no_bid").and_then(json_i64),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

pub fn parse_events(data: &Value) -> Vec<EventSummary> {
    data.get("events")
        .and_then(|v| v.as_array())
        .map(|events| {
            events
                .iter()
                .filter_map(|e| {
                    Some(EventSummary {
                        event_ticker: field_str(e, "event_ticker")?.to_string(),
                        title: field_str(e, "title").unwrap_or("").to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

struct Credentials {
    key_id: String,
    private_key: RsaPrivateKey,
}

pub struct KalshiClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl KalshiClient {
    /// Unauthenticated client; only public market data endpoints will work.
    pub fn public(is_demo: bool) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: if is_demo { DEMO_BASE_URL } else { PROD_BASE_URL }.to_string(),
            credentials: None,
        }
    }

    /// The key is parsed once here and reused for every signature.
    pub fn with_credentials(key_id: &str, private_key_path: &str, is_demo: bool) -> Result<Self, KalshiError> {
        let private_key = auth::load_private_key(private_key_path)?;
        let mut client = Self::public(is_demo);
        client.credentials = Some(Credentials {
            key_id: key_id.to_string(),
            private_key,
        });
        Ok(client)
    }

    /// Authenticated when the config carries credentials, public otherwise.
    pub fn from_config(config: &Config) -> Result<Self, KalshiError> {
        match config.kalshi_credentials() {
            Some((key_id, path)) => Self::with_credentials(key_id, path, config.kalshi_is_demo),
            None => Ok(Self::public(config.kalshi_is_demo)),
        }
    }

    fn auth_headers(&self, method: &str, endpoint: &str) -> Result<HeaderMap, KalshiError> {
        let creds = self.credentials.as_ref().ok_or(KalshiError::MissingCredentials)?;
        let path = format!("{}{}", SIGN_PREFIX, endpoint);
        let signed = auth::sign_with_key(method, &path, &creds.key_id, &creds.private_key)?;
        Ok(signed.to_header_map()?)
    }

    /// GET `endpoint` (relative to the versioned base). Signs when credentials
    /// exist; `require_auth` turns their absence into an error.
    async fn get_json(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
        require_auth: bool,
    ) -> Result<Value, KalshiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut request = self
            .client
            .get(&url)
            .query(query)
            .header(ACCEPT, HeaderValue::from_static("application/json"));

        if require_auth || self.credentials.is_some() {
            request = request.headers(self.auth_headers("GET", endpoint)?);
        }

        debug!(endpoint, "kalshi GET");
        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(KalshiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| KalshiError::ParseError(e.to_string()))
    }

    /// Available balance in cents.
    pub async fn get_balance(&self) -> Result<i64, KalshiError> {
        let data = self.get_json("/portfolio/balance", &[], true).await?;
        Ok(data.get("balance").and_then(json_i64).unwrap_or(0))
    }

    pub async fn get_positions(&self) -> Result<Vec<Position>, KalshiError> {
        let data = self
            .get_json(
                "/portfolio/positions",
                &[("count_filter", "position".to_string()), ("limit", "1000".to_string())],
                true,
            )
            .await?;
        Ok(parse_positions(&data))
    }

    pub async fn get_fills(&self, limit: u32) -> Result<Vec<Fill>, KalshiError> {
        let data = self
            .get_json("/portfolio/fills", &[("limit", limit.to_string())], true)
            .await?;
        Ok(parse_fills(&data))
    }

    /// Single market lookup; `None` on 404.
    pub async fn get_market(&self, ticker: &str) -> Result<Option<MarketInfo>, KalshiError> {
        let data = match self.get_json(&format!("/markets/{}", ticker), &[], false).await {
            Ok(d) => d,
            Err(KalshiError::Api { status: 404, .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        let Some(m) = data.get("market") else {
            return Ok(None);
        };
        Ok(Some(MarketInfo {
            ticker: field_str(m, "ticker").unwrap_or(ticker).to_string(),
            event_ticker: field_str(m, "event_ticker").unwrap_or("").to_string(),
            title: field_str(m, "title").unwrap_or("").to_string(),
        }))
    }

    pub async fn get_open_events(&self, series_ticker: &str) -> Result<Vec<EventSummary>, KalshiError> {
        let data = self
            .get_json(
                "/events",
                &[
                    ("series_ticker", series_ticker.to_string()),
                    ("status", "open".to_string()),
                ],
                false,
            )
            .await?;
        Ok(parse_events(&data))
    }

    pub async fn get_event_markets(&self, event_ticker: &str) -> Result<Vec<MarketQuote>, KalshiError> {
        let data = self
            .get_json("/markets", &[("event_ticker", event_ticker.to_string())], false)
            .await?;
        Ok(parse_market_quotes(&data))
    }

    /// Open games for a series with their markets bucketed by kind.
    /// A failed market fetch leaves that game's buckets empty.
    pub async fn get_games_with_odds(&self, series_ticker: &str) -> Result<Vec<Game>, KalshiError> {
        let events = self.get_open_events(series_ticker).await?;
        let mut games = Vec::with_capacity(events.len());

        for event in events {
            let mut markets = MarketBuckets::default();
            match self.get_event_markets(&event.event_ticker).await {
                Ok(quotes) => quotes.into_iter().for_each(|q| markets.push(q)),
                Err(e) => warn!(event = %event.event_ticker, error = %e, "failed to fetch markets"),
            }
            games.push(Game {
                event_title: event.title,
                event_ticker: event.event_ticker,
                markets,
            });
        }

        Ok(games)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classify_spread_markets() {
        assert_eq!(classify_market("Seattle wins by over 7.5 points?", ""), MarketKind::Spread);
        assert_eq!(classify_market("Pro Football Spread", ""), MarketKind::Spread);
        assert_eq!(classify_market("Seattle", "SEA -3.5"), MarketKind::Spread);
        assert_eq!(classify_market("Seattle", "+7"), MarketKind::Spread);
    }

    #[test]
    fn classify_total_markets() {
        assert_eq!(classify_market("Over 45.5 points scored?", ""), MarketKind::Total);
        assert_eq!(classify_market("Total points", "45.5"), MarketKind::Total);
    }

    #[test]
    fn classify_defaults_to_moneyline() {
        assert_eq!(classify_market("Seattle at Los Angeles R Winner?", "Seattle"), MarketKind::Moneyline);
    }

    #[test]
    fn market_kind_round_trips_through_names() {
        for kind in MarketKind::ALL {
            assert_eq!(MarketKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(MarketKind::parse("Spreads"), Some(MarketKind::Spread));
        assert_eq!(MarketKind::parse("props"), None);
    }

    #[test]
    fn base_id_strips_outcome_suffix() {
        let q = MarketQuote {
            ticker: "KXNFLGAME-25DEC15SEALAR-SEA".into(),
            title: String::new(),
            subtitle: String::new(),
            yes_bid: None,
            no_bid: None,
        };
        assert_eq!(q.base_id(), "KXNFLGAME-25DEC15SEALAR");
    }

    #[test]
    fn positions_skip_flat_and_compute_average() {
        let data = json!({
            "market_positions": [
                {"ticker": "A", "position": 10, "market_exposure": 450},
                {"ticker": "B", "position": 0, "market_exposure": 0},
                {"ticker": "C", "position": -4, "market_exposure": 200},
            ]
        });
        let positions = parse_positions(&data);
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0].side, "YES");
        assert!((positions[0].avg_price_cents - 45.0).abs() < 1e-9);
        assert_eq!(positions[1].side, "NO");
        assert_eq!(positions[1].count, 4);
        assert!((positions[1].avg_price_cents - 50.0).abs() < 1e-9);
    }

    #[test]
    fn positions_missing_array_is_empty() {
        assert!(parse_positions(&json!({"cursor": ""})).is_empty());
    }

    #[test]
    fn fills_pick_price_by_side() {
        let data = json!({
            "fills": [
                {"trade_id": "t1", "ticker": "KX-A", "side": "yes", "action": "buy", "count": 3, "yes_price": 41, "no_price": 59},
                {"trade_id": "t2", "market_ticker": "KX-B", "side": "no", "count": 2, "yes_price": 30, "no_price": 70},
            ]
        });
        let fills = parse_fills(&data);
        assert_eq!(fills.len(), 2);
        assert_eq!(fills[0].price_cents, 41);
        assert_eq!(fills[0].action, "BUY");
        assert_eq!(fills[1].ticker, "KX-B");
        assert_eq!(fills[1].side, "NO");
        assert_eq!(fills[1].price_cents, 70);
    }

    #[test]
    fn buckets_sort_quotes_by_kind() {
        let data = json!({
            "markets": [
                {"ticker": "KXNBAGAME-25DEC15MEMLAC-MEM", "title": "Memphis at Los Angeles C Winner?", "yes_bid": 40, "no_bid": 58},
                {"ticker": "KXNBASPREAD-25DEC15MEMLAC-LAC5", "title": "Los Angeles C wins by over 5.5 Points?"},
                {"ticker": "KXNBATOTAL-25DEC15MEMLAC-220", "title": "Over 220.5 points scored?"},
                {"title": "no ticker, dropped"},
            ]
        });
        let mut buckets = MarketBuckets::default();
        for q in parse_market_quotes(&data) {
            buckets.push(q);
        }
        assert_eq!(buckets.get(MarketKind::Moneyline).len(), 1);
        assert_eq!(buckets.get(MarketKind::Spread).len(), 1);
        assert_eq!(buckets.get(MarketKind::Total).len(), 1);
        assert_eq!(buckets.moneyline[0].yes_bid, Some(40));
        assert_eq!(buckets.spread[0].yes_bid, None);
    }

    #[test]
    fn events_require_ticker() {
        let data = json!({"events": [
            {"event_ticker": "KXNFLGAME-25DEC15SEALAR", "title": "Seattle at Los Angeles R"},
            {"title": "missing ticker"}
        ]});
        let events = parse_events(&data);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Seattle at Los Angeles R");
    }

    #[test]
    fn unauthenticated_client_cannot_sign() {
        let client = KalshiClient::public(false);
        assert!(client.credentials.is_none());
        assert!(matches!(
            client.auth_headers("GET", "/portfolio/balance"),
            Err(KalshiError::MissingCredentials)
        ));
    }

    #[test]
    fn authenticated_client_signs_versioned_path() {
        let dir = tempfile::tempdir().unwrap();
        let key = crate::auth::tests::test_key();
        let path = dir.path().join("k.pem");
        {
            use rsa::pkcs8::{EncodePrivateKey, LineEnding};
            std::fs::write(&path, key.to_pkcs8_pem(LineEnding::LF).unwrap().as_bytes()).unwrap();
        }
        let client = KalshiClient::with_credentials("kid", path.to_str().unwrap(), true).unwrap();
        let headers = client.auth_headers("GET", "/portfolio/balance").unwrap();
        assert_eq!(headers.get(crate::auth::ACCESS_KEY_HEADER).unwrap(), "kid");
        assert_eq!(headers.len(), 3);

        let value = |name: &str| headers.get(name).unwrap().to_str().unwrap().to_string();
        let signed = crate::auth::SignedRequestHeaders {
            key_id: value(crate::auth::ACCESS_KEY_HEADER),
            signature: value(crate::auth::ACCESS_SIGNATURE_HEADER),
            timestamp: value(crate::auth::ACCESS_TIMESTAMP_HEADER),
        };
        assert!(crate::auth::tests::verify(&signed, "GET", "/trade-api/v2/portfolio/balance", &key));
        assert!(!crate::auth::tests::verify(&signed, "GET", "/portfolio/balance", &key));
    }

    #[test]
    fn missing_key_file_fails_client_construction() {
        let err = KalshiClient::with_credentials("kid", "/nonexistent/key.pem", false).err().unwrap();
        assert!(matches!(err, KalshiError::Auth(SignerError::KeyLoad { .. })));
    }
}
