use colored::*;
use std::sync::Arc;

use super::relay_target;
use crate::alerts::{display, webhook};
use crate::auth;
use crate::config::Config;
use crate::ws::kalshi::{spawn_fill_stream, StreamCredentials, DEMO_WS_URL, PROD_WS_URL};

/// Relay fills from the Kalshi WebSocket until interrupted.
pub async fn stream_fills(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let Some((key_id, key_path)) = config.kalshi_credentials() else {
        println!(
            "{}",
            "Kalshi API not configured. The fill stream needs credentials; run 'kalshi-relay setup'.".red()
        );
        return Ok(());
    };

    let private_key = match auth::load_private_key(key_path) {
        Ok(key) => Arc::new(key),
        Err(e) => {
            println!("{} Cannot authenticate: {}", "[ERROR]".red(), e);
            return Ok(());
        }
    };

    let hook = relay_target(config, config.discord_webhook_url.is_some());
    let ws_url = if config.kalshi_is_demo { DEMO_WS_URL } else { PROD_WS_URL };

    println!("{}", "KALSHI FILL STREAM".bright_cyan().bold());
    println!(
        "Relaying to: {}",
        if hook.is_some() {
            "Discord webhook".green()
        } else {
            "terminal only".yellow()
        }
    );
    println!("{}", "Press Ctrl+C to stop.".dimmed());

    let mut fills = spawn_fill_stream(
        ws_url,
        StreamCredentials {
            key_id: key_id.to_string(),
            private_key,
        },
    );

    loop {
        tokio::select! {
            fill = fills.recv() => {
                let Some(fill) = fill else { break };
                display::print_fill_alert(&fill);
                if let Some(hook) = &hook {
                    hook.send(webhook::fill_alert_embed(&fill)).await;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                println!("{}", "Stopping fill stream.".dimmed());
                break;
            }
        }
    }

    Ok(())
}
