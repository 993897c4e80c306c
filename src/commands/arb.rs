use colored::*;
use std::sync::Arc;
use std::time::Duration;

use super::relay_target;
use crate::alerts::{display, webhook};
use crate::config::Config;
use crate::hierarchy;
use crate::mapping::{self, parse_kalshi_ticker};
use crate::matching::{MarketMatcher, MatchRequest};
use crate::platforms::kalshi::{classify_market, KalshiClient, MarketKind};
use crate::platforms::polymarket::GammaClient;

fn matcher() -> MarketMatcher {
    MarketMatcher::new(Arc::new(GammaClient::new()))
}

/// Find the Polymarket counterpart of a single Kalshi event title.
pub async fn match_title(
    config: &Config,
    title: &str,
    sport: Option<&str>,
    post: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let timeout = Duration::from_secs(config.interaction_timeout_secs);
    let found = matcher().find_match_within(title, sport, timeout).await;

    display::print_match(title, found.as_ref());
    if let (Some(m), Some(hook)) = (&found, relay_target(config, post)) {
        hook.send(webhook::match_embed(title, m)).await;
    }
    Ok(())
}

/// Match every open event of a series, a bounded number at a time.
pub async fn match_series(
    config: &Config,
    series_ticker: &str,
    sport: Option<&str>,
    post: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let series_ticker = series_ticker.trim().to_uppercase();
    let sport = sport
        .map(str::to_string)
        .or_else(|| hierarchy::find_series(&series_ticker).and_then(|(league, _)| league.sport_hint.map(str::to_string)));

    let client = KalshiClient::from_config(config)?;
    let events = client.get_open_events(&series_ticker).await?;
    if events.is_empty() {
        println!("{}", format!("No open events for {}.", series_ticker).dimmed());
        return Ok(());
    }

    println!(
        "Matching {} events from {} (sport hint: {}, {} at a time)...",
        events.len(),
        series_ticker.bright_white(),
        sport.as_deref().unwrap_or("none"),
        config.match_concurrency
    );
    println!();

    let requests: Vec<MatchRequest> = events
        .iter()
        .map(|e| MatchRequest {
            title: e.title.clone(),
            sport: sport.clone(),
        })
        .collect();

    let timeout = Duration::from_secs(config.interaction_timeout_secs);
    let results = matcher()
        .match_many(&requests, config.match_concurrency, timeout)
        .await;

    let hook = relay_target(config, post);
    let mut matched = 0;
    for (req, found) in requests.iter().zip(&results) {
        display::print_match(&req.title, found.as_ref());
        println!();
        if let Some(m) = found {
            matched += 1;
            if let Some(hook) = &hook {
                hook.send(webhook::match_embed(&req.title, m)).await;
            }
        }
    }

    println!("{} {}/{} events matched", "Done:".bold(), matched, requests.len());
    Ok(())
}

/// Print the Kalshi -> Polymarket hedge mapping for one game as TOML.
pub async fn map_event(
    config: &Config,
    kalshi_event_ticker: &str,
    poly_slug: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut event_ticker = kalshi_event_ticker.trim().to_uppercase();
    let client = KalshiClient::from_config(config)?;
    let mut quotes = client.get_event_markets(&event_ticker).await?;

    // A market ticker resolves to its parent event.
    if quotes.is_empty() {
        if let Some(info) = client.get_market(&event_ticker).await? {
            println!("{} {} ({}) -> event {}", "Resolved:".bold(), info.ticker, info.title, info.event_ticker);
            event_ticker = info.event_ticker;
            quotes = client.get_event_markets(&event_ticker).await?;
        }
    }

    if let Some(parts) = parse_kalshi_ticker(&event_ticker) {
        println!(
            "{} series {} | date {} | matchup {}",
            "Kalshi:".bold(),
            parts.series,
            parts.date,
            parts.matchup
        );
    }

    let moneyline: Vec<&str> = quotes
        .iter()
        .filter(|q| classify_market(&q.title, &q.subtitle) == MarketKind::Moneyline)
        .map(|q| q.ticker.as_str())
        .collect();
    let tickers: Vec<&str> = if moneyline.is_empty() {
        quotes.iter().map(|q| q.ticker.as_str()).collect()
    } else {
        moneyline
    };

    if tickers.is_empty() {
        println!("{} No Kalshi markets for {}", "[ERROR]".red(), event_ticker);
        return Ok(());
    }

    let Some(poly_event) = GammaClient::new().get_event_by_slug(poly_slug).await? else {
        println!("{} No Polymarket event with slug {}", "[ERROR]".red(), poly_slug);
        return Ok(());
    };

    match mapping::generate_arbitrage_mapping(&tickers, &poly_event) {
        Ok(m) if m.entries.is_empty() => {
            println!("{}", "No Kalshi team code matched a Polymarket team.".yellow());
        }
        Ok(m) => {
            println!();
            print!("{}", m.to_toml(&event_ticker));
        }
        Err(e) => println!("{} {}", "[ERROR]".red(), e),
    }
    Ok(())
}
