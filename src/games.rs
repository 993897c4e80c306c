use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashSet;

use crate::platforms::kalshi::{Game, MarketKind, MarketQuote};

const LOOKAHEAD_DAYS: i64 = 3;
const MAX_GAMES: usize = 4;
const MAX_MONEYLINE_LINES: usize = 2;
const MAX_OTHER_LINES: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct QuoteLine {
    pub header: String,
    /// Base id for moneyline, full ticker otherwise.
    pub id: String,
    pub yes_bid: Option<i64>,
    pub no_bid: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameView {
    pub title: String,
    pub date: NaiveDate,
    pub lines: Vec<QuoteLine>,
}

impl GameView {
    /// "Seattle at Los Angeles R | Dec 15"
    pub fn heading(&self) -> String {
        format!("{} | {}", self.title, self.date.format("%b %d"))
    }
}

/// Find a `YYMMMDD` date (e.g. `25DEC15`) anywhere in a ticker.
pub fn ticker_date(ticker: &str) -> Option<NaiveDate> {
    let bytes = ticker.as_bytes();
    bytes.windows(7).find_map(|w| {
        let shape = w[..2].iter().all(u8::is_ascii_digit)
            && w[2..5].iter().all(u8::is_ascii_uppercase)
            && w[5..].iter().all(u8::is_ascii_digit);
        if !shape {
            return None;
        }
        let s = std::str::from_utf8(w).ok()?;
        NaiveDate::parse_from_str(s, "%y%b%d").ok()
    })
}

fn quote_lines(markets: &[MarketQuote], kind: MarketKind) -> Vec<QuoteLine> {
    let cap = if kind == MarketKind::Moneyline {
        MAX_MONEYLINE_LINES
    } else {
        MAX_OTHER_LINES
    };
    let mut seen = HashSet::new();
    let mut lines = Vec::new();

    for m in markets.iter().take(cap) {
        let base = m.base_id();
        if kind == MarketKind::Moneyline && !seen.insert(base.to_string()) {
            continue;
        }
        let header = if m.subtitle.is_empty() {
            m.title.clone()
        } else {
            format!("{} ({})", m.title, m.subtitle)
        };
        lines.push(QuoteLine {
            header,
            id: if kind == MarketKind::Moneyline { base } else { m.ticker.as_str() }.to_string(),
            yes_bid: m.yes_bid,
            no_bid: m.no_bid,
        });
    }
    lines
}

/// Upcoming games for one market kind: dated within the lookahead window,
/// soonest first, capped.
pub fn upcoming_games(games: &[Game], kind: MarketKind, now: NaiveDateTime) -> Vec<GameView> {
    let cutoff = now + Duration::days(LOOKAHEAD_DAYS);

    let mut dated: Vec<(NaiveDate, &Game, &[MarketQuote])> = games
        .iter()
        .filter_map(|g| {
            let markets = g.markets.get(kind);
            let date = ticker_date(&markets.first()?.ticker)?;
            let starts = date.and_hms_opt(0, 0, 0)?;
            (starts <= cutoff).then_some((date, g, markets))
        })
        .collect();
    dated.sort_by_key(|(date, _, _)| *date);

    dated
        .into_iter()
        .filter_map(|(date, game, markets)| {
            let lines = quote_lines(markets, kind);
            (!lines.is_empty()).then(|| GameView {
                title: game.event_title.clone(),
                date,
                lines,
            })
        })
        .take(MAX_GAMES)
        .collect()
}
