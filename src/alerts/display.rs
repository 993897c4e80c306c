use colored::*;

use super::{format_bid, format_cents, format_price, format_usd};
use crate::games::GameView;
use crate::hierarchy::{MenuNode, NodeKind};
use crate::matching::MarketMatch;
use crate::platforms::kalshi::{Fill, MarketKind, Position};
use crate::ws::kalshi::FillEvent;

pub fn print_balance(balance_cents: i64) {
    println!("{} {}", "Balance:".bold(), format_usd(balance_cents).bright_green().bold());
}

pub fn print_positions(positions: &[Position]) {
    if positions.is_empty() {
        println!("{}", "No open positions.".dimmed());
        return;
    }
    println!("Open positions ({}):", positions.len());
    for p in positions {
        let side = if p.side == "YES" { p.side.green() } else { p.side.red() };
        println!(
            "  • {} {} {}x @ {}",
            p.ticker.bright_white(),
            side,
            p.count,
            format_cents(p.avg_price_cents)
        );
    }
}

pub fn print_fills(fills: &[Fill]) {
    if fills.is_empty() {
        println!("{}", "No fills.".dimmed());
        return;
    }
    for f in fills {
        println!(
            "  {} {} {} {} {}x {} @ {}",
            f.created_time.dimmed(),
            f.trade_id.dimmed(),
            f.action,
            f.side.bold(),
            f.count,
            f.ticker.bright_white(),
            format_price(f.price_cents)
        );
    }
}

pub fn print_fill_alert(fill: &FillEvent) {
    println!();
    println!("{}", "[ORDER FILLED]".yellow().bold());
    println!(
        "{} {}x {} @ {}",
        fill.side.bold(),
        fill.count,
        fill.ticker.bright_white(),
        format_price(fill.price_cents)
    );
    println!("{} {}", "Real-time execution alert".dimmed(), fill.trade_id.dimmed());
}

pub fn print_match(kalshi_title: &str, found: Option<&MarketMatch>) {
    println!("{} {}", "Kalshi:".bold(), kalshi_title);
    let Some(m) = found else {
        println!("  {}", "No Polymarket match found.".dimmed());
        return;
    };
    println!("{} {} ({:.0}% match)", "Polymarket:".bold(), m.title.bright_magenta(), m.score * 100.0);
    if m.question != m.title {
        println!("  Market:    {}", m.question);
    }
    println!(
        "  Odds:      {} {} | {} {}",
        m.outcomes.0,
        format_cents(m.yes_price_cents).green(),
        m.outcomes.1,
        format_cents(m.no_price_cents).red()
    );
    println!(
        "  Tokens:    yes {} | no {}",
        m.yes_token_id.as_deref().unwrap_or("-"),
        m.no_token_id.as_deref().unwrap_or("-")
    );
    if let Some(id) = &m.market_id {
        println!(
            "  Market id: {} (condition {})",
            id,
            m.condition_id.as_deref().unwrap_or("-")
        );
    }
    println!("  URL:       {}", m.url.bright_blue());
}

pub fn print_games(league: &str, kind: MarketKind, games: &[GameView]) {
    println!("{}", format!("{} - {} (Next 48h)", league, kind.label()).bright_cyan().bold());
    if games.is_empty() {
        println!(
            "{}",
            format!("No active {} markets found in the next 48h.", kind.as_str()).dimmed()
        );
        return;
    }
    for g in games {
        println!();
        println!("{}", g.heading().bold());
        for l in &g.lines {
            println!("  {}", l.header);
            println!("    ID: {}", l.id.bright_white());
            println!("    Yes: {} | No: {}", format_bid(l.yes_bid).green(), format_bid(l.no_bid).red());
        }
    }
}

/// List the choices under a menu node. `trail` is the labels walked to reach it.
pub fn print_menu(node: &MenuNode, trail: &[&str]) {
    println!("{}", trail.join(" > ").bright_cyan().bold());
    match &node.kind {
        NodeKind::Branch(children) => {
            for child in children {
                let marker = if matches!(child.kind, NodeKind::Leaf(_)) { "•" } else { "▸" };
                println!("  {} {}", marker, child.label);
            }
        }
        NodeKind::Leaf(_) => println!("  {}", "(no further choices)".dimmed()),
    }
}
