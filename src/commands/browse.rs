use colored::*;

use super::relay_target;
use crate::alerts::{display, webhook};
use crate::config::Config;
use crate::games;
use crate::hierarchy::{self, MenuAction, MenuNode};
use crate::platforms::kalshi::{KalshiClient, MarketKind};

/// Walk the sports menu along `path`; list choices at a branch, show games at a leaf.
pub async fn browse(config: &Config, path: &[String], post: bool) -> Result<(), Box<dyn std::error::Error>> {
    let menu = hierarchy::build_menu();

    let visited = match menu.walk(path) {
        Ok(visited) => visited,
        Err(e) => {
            println!("{} {}", "[ERROR]".red(), e);
            return Ok(());
        }
    };
    let node: &MenuNode = visited.last().copied().unwrap_or(&menu);
    let trail: Vec<&str> = visited.iter().map(|n| n.label.as_str()).collect();

    match node.action() {
        None => {
            display::print_menu(node, &trail);
            println!();
            println!(
                "{}",
                "Append a choice to the path, e.g. 'kalshi-relay browse Football NFL Moneyline'.".dimmed()
            );
        }
        Some(MenuAction::ShowGames {
            league,
            series_ticker,
            kind,
        }) => {
            let client = KalshiClient::from_config(config)?;
            let all = client.get_games_with_odds(series_ticker).await?;
            let views = games::upcoming_games(&all, *kind, chrono::Local::now().naive_local());

            display::print_games(league, *kind, &views);
            if !views.is_empty() {
                if let Some(hook) = relay_target(config, post) {
                    hook.send(webhook::games_embed(league, *kind, &views)).await;
                }
            }
        }
    }

    Ok(())
}

/// Print the open games of any series, resolved by title or ticker.
/// With a market kind, show the upcoming games view for that kind instead.
pub async fn lookup_series(
    config: &Config,
    query: &str,
    kind: Option<MarketKind>,
    post: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(ticker) = hierarchy::ticker_by_name(query) else {
        println!("{} No series matches '{}'", "[ERROR]".red(), query);
        return Ok(());
    };

    println!("{} {}", "Series:".bold(), ticker.bright_white());
    let client = KalshiClient::from_config(config)?;
    let all = client.get_games_with_odds(&ticker).await?;

    if let Some(kind) = kind {
        let views = games::upcoming_games(&all, kind, chrono::Local::now().naive_local());
        display::print_games(&ticker, kind, &views);
        if !views.is_empty() {
            if let Some(hook) = relay_target(config, post) {
                hook.send(webhook::games_embed(&ticker, kind, &views)).await;
            }
        }
        return Ok(());
    }

    if all.is_empty() {
        println!("{}", "No open events.".dimmed());
    }
    for game in &all {
        let counts: Vec<String> = MarketKind::ALL
            .iter()
            .map(|k| format!("{} {}", game.markets.get(*k).len(), k.as_str()))
            .collect();
        println!(
            "  {} {} ({})",
            game.event_ticker.bright_white(),
            game.event_title,
            counts.join(", ").dimmed()
        );
    }
    Ok(())
}
