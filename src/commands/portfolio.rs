use colored::*;

use super::{authenticated_client, relay_target};
use crate::alerts::{display, webhook};
use crate::config::Config;

const MAX_POSITIONS: usize = 10;

pub async fn show_balance(config: &Config, post: bool) -> Result<(), Box<dyn std::error::Error>> {
    let Some(client) = authenticated_client(config) else {
        return Ok(());
    };

    match client.get_balance().await {
        Ok(cents) => {
            display::print_balance(cents);
            if let Some(hook) = relay_target(config, post) {
                hook.send(webhook::balance_embed(cents)).await;
            }
        }
        Err(e) => println!("{} Failed to fetch balance: {}", "[ERROR]".red(), e),
    }
    Ok(())
}

pub async fn show_positions(config: &Config, post: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "KALSHI POSITIONS".bright_cyan().bold());
    println!();

    let Some(client) = authenticated_client(config) else {
        return Ok(());
    };

    match client.get_positions().await {
        Ok(mut positions) => {
            positions.truncate(MAX_POSITIONS);
            display::print_positions(&positions);
            if let Some(hook) = relay_target(config, post) {
                hook.send(webhook::positions_embed(&positions)).await;
            }
        }
        Err(e) => println!("{} Failed to fetch positions: {}", "[ERROR]".red(), e),
    }
    Ok(())
}

pub async fn show_fills(config: &Config, limit: u32, post: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "RECENT FILLS".bright_cyan().bold());
    println!();

    let Some(client) = authenticated_client(config) else {
        return Ok(());
    };

    match client.get_fills(limit).await {
        Ok(fills) => {
            display::print_fills(&fills);
            if let Some(hook) = relay_target(config, post) {
                hook.send(webhook::fills_embed(&fills)).await;
            }
        }
        Err(e) => println!("{} Failed to fetch fills: {}", "[ERROR]".red(), e),
    }
    Ok(())
}
