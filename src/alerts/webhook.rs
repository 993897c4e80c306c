use colored::*;
use serde_json::{json, Value};

use super::{format_bid, format_cents, format_price, format_usd};
use crate::games::GameView;
use crate::matching::MarketMatch;
use crate::platforms::kalshi::{Fill, MarketKind, Position};
use crate::ws::kalshi::FillEvent;

const COLOR_GOLD: u32 = 0xf1c40f;
const COLOR_GREEN: u32 = 0x2ecc71;
const COLOR_BRAND_GREEN: u32 = 0x57f287;
const COLOR_BLUE: u32 = 0x3498db;
const COLOR_PURPLE: u32 = 0x9b59b6;

/// Discord caps an embed at 25 fields.
const MAX_FIELDS: usize = 25;

/// Posts embeds to one Discord incoming webhook.
pub struct DiscordWebhook {
    client: reqwest::Client,
    url: String,
}

impl DiscordWebhook {
    pub fn new(url: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Best effort: failures are reported on stderr and swallowed.
    pub async fn send(&self, embed: Value) -> bool {
        let payload = json!({ "embeds": [embed] });
        match self.client.post(&self.url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                eprintln!("{} Webhook failed ({}): {}", "[WEBHOOK ERROR]".red(), status, body);
                false
            }
            Err(e) => {
                eprintln!("{} Failed to send webhook: {}", "[WEBHOOK ERROR]".red(), e);
                false
            }
        }
    }
}

pub fn fill_alert_embed(fill: &FillEvent) -> Value {
    json!({
        "title": "Order Filled",
        "description": format!("**{}** {}x `{}` @ {}", fill.side, fill.count, fill.ticker, format_price(fill.price_cents)),
        "color": COLOR_GOLD,
        "footer": { "text": "Real-time execution alert" },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })
}

pub fn balance_embed(balance_cents: i64) -> Value {
    json!({
        "title": "Kalshi Balance",
        "description": format!("**{}**", format_usd(balance_cents)),
        "color": COLOR_GREEN,
    })
}

pub fn positions_embed(positions: &[Position]) -> Value {
    let fields: Vec<Value> = positions
        .iter()
        .take(MAX_FIELDS)
        .map(|p| {
            json!({
                "name": p.ticker,
                "value": format!("{} {}x @ {}", p.side, p.count, format_cents(p.avg_price_cents)),
                "inline": false,
            })
        })
        .collect();

    let description = if positions.is_empty() {
        "No open positions."
    } else {
        ""
    };

    json!({
        "title": "Kalshi Positions",
        "description": description,
        "color": COLOR_BLUE,
        "fields": fields,
    })
}

pub fn fills_embed(fills: &[Fill]) -> Value {
    let lines: Vec<String> = fills
        .iter()
        .map(|f| {
            format!(
                "**{} {}** {}x `{}` @ {}",
                f.action,
                f.side,
                f.count,
                f.ticker,
                format_price(f.price_cents)
            )
        })
        .collect();
    let description = if lines.is_empty() {
        "No fills.".to_string()
    } else {
        lines.join("\n")
    };

    json!({
        "title": "Recent Fills",
        "description": description,
        "color": COLOR_GOLD,
    })
}

pub fn match_embed(kalshi_title: &str, m: &MarketMatch) -> Value {
    let token = |id: &Option<String>| id.clone().unwrap_or_else(|| "-".to_string());
    json!({
        "title": format!("Polymarket: {}", m.title),
        "url": m.url,
        "description": format!("Matched from Kalshi: *{}*", kalshi_title),
        "color": COLOR_PURPLE,
        "fields": [
            { "name": m.outcomes.0.clone(), "value": format_cents(m.yes_price_cents), "inline": true },
            { "name": m.outcomes.1.clone(), "value": format_cents(m.no_price_cents), "inline": true },
            { "name": "Match", "value": format!("{:.0}%", m.score * 100.0), "inline": true },
            { "name": "Yes token", "value": format!("`{}`", token(&m.yes_token_id)), "inline": false },
            { "name": "No token", "value": format!("`{}`", token(&m.no_token_id)), "inline": false },
        ],
    })
}

pub fn games_embed(league: &str, kind: MarketKind, games: &[GameView]) -> Value {
    let fields: Vec<Value> = games
        .iter()
        .map(|g| {
            let value = g
                .lines
                .iter()
                .map(|l| {
                    format!(
                        "**{}**\n**ID:** `{}`\n**Yes:** {} | **No:** {}",
                        l.header,
                        l.id,
                        format_bid(l.yes_bid),
                        format_bid(l.no_bid)
                    )
                })
                .collect::<Vec<_>>()
                .join("\n\n");
            json!({ "name": g.heading(), "value": value, "inline": false })
        })
        .collect();

    json!({
        "title": format!("{} - {} (Next 48h)", league, kind.label()),
        "color": COLOR_BRAND_GREEN,
        "fields": fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::QuoteLine;
    use chrono::NaiveDate;

    #[test]
    fn fill_embed_shape() {
        let fill = FillEvent {
            trade_id: "t".into(),
            ticker: "KXNFLGAME-25DEC15KCBAL-KC".into(),
            side: "YES".into(),
            action: "BUY".into(),
            count: 3,
            price_cents: 41,
        };
        let embed = fill_alert_embed(&fill);
        assert_eq!(embed["title"], "Order Filled");
        assert_eq!(embed["description"], "**YES** 3x `KXNFLGAME-25DEC15KCBAL-KC` @ 41¢");
        assert_eq!(embed["footer"]["text"], "Real-time execution alert");
        assert_eq!(embed["color"], COLOR_GOLD);
    }

    #[test]
    fn balance_embed_formats_dollars() {
        assert_eq!(balance_embed(123456)["description"], "**$1,234.56**");
    }

    #[test]
    fn positions_embed_lists_each_position() {
        let positions = vec![Position {
            ticker: "KX-A".into(),
            side: "YES".into(),
            count: 10,
            avg_price_cents: 45.0,
        }];
        let embed = positions_embed(&positions);
        assert_eq!(embed["fields"][0]["name"], "KX-A");
        assert_eq!(embed["fields"][0]["value"], "YES 10x @ 45¢");
        assert_eq!(positions_embed(&[])["description"], "No open positions.");
    }

    #[test]
    fn positions_embed_keeps_fractional_average_cost() {
        let positions = vec![Position {
            ticker: "KX-B".into(),
            side: "NO".into(),
            count: 3,
            avg_price_cents: 136.0 / 3.0,
        }];
        let embed = positions_embed(&positions);
        assert_eq!(embed["fields"][0]["value"], "NO 3x @ 45.3¢");
    }

    #[test]
    fn match_embed_uses_outcome_labels() {
        let m = MarketMatch {
            title: "Chiefs vs Ravens".into(),
            slug: "nfl-kc-bal".into(),
            event_id: None,
            market_id: Some("5002".into()),
            condition_id: None,
            question: "Chiefs vs Ravens".into(),
            yes_token_id: Some("111".into()),
            no_token_id: None,
            yes_price_cents: 52.0,
            no_price_cents: 48.0,
            outcomes: ("Chiefs".into(), "Ravens".into()),
            url: "https://polymarket.com/event/nfl-kc-bal".into(),
            score: 1.0,
        };
        let embed = match_embed("Kansas City at Baltimore", &m);
        assert_eq!(embed["fields"][0]["name"], "Chiefs");
        assert_eq!(embed["fields"][0]["value"], "52¢");
        assert_eq!(embed["fields"][4]["value"], "`-`");
        assert_eq!(embed["url"], "https://polymarket.com/event/nfl-kc-bal");
    }

    #[test]
    fn games_embed_field_per_game() {
        let games = vec![GameView {
            title: "Seattle at Los Angeles R".into(),
            date: NaiveDate::from_ymd_opt(2025, 12, 15).unwrap(),
            lines: vec![QuoteLine {
                header: "Seattle".into(),
                id: "KXNFLGAME-25DEC15SEALAR".into(),
                yes_bid: Some(40),
                no_bid: Some(58),
            }],
        }];
        let embed = games_embed("NFL", MarketKind::Moneyline, &games);
        assert_eq!(embed["title"], "NFL - Moneyline (Next 48h)");
        assert_eq!(embed["fields"][0]["name"], "Seattle at Los Angeles R | Dec 15");
        assert!(embed["fields"][0]["value"]
            .as_str()
            .unwrap()
            .ends_with("**Yes:** 40¢ | **No:** 58¢"));
    }
}
