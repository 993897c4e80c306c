pub mod arb;
pub mod browse;
pub mod portfolio;
pub mod setup;
pub mod status;
pub mod stream;

use colored::*;

use crate::alerts::webhook::DiscordWebhook;
use crate::config::Config;
use crate::platforms::kalshi::KalshiClient;

/// Authenticated Kalshi client, or a printed explanation of why there isn't one.
pub(crate) fn authenticated_client(config: &Config) -> Option<KalshiClient> {
    if config.kalshi_credentials().is_none() {
        println!(
            "{}",
            "Kalshi API not configured. Run 'kalshi-relay setup' or set KALSHI_KEY_ID / KALSHI_PRIVATE_KEY_PATH.".red()
        );
        return None;
    }
    match KalshiClient::from_config(config) {
        Ok(client) => Some(client),
        Err(e) => {
            println!("{} Cannot authenticate: {}", "[ERROR]".red(), e);
            None
        }
    }
}

/// Webhook to relay to when `--post` was given.
pub(crate) fn relay_target(config: &Config, post: bool) -> Option<DiscordWebhook> {
    if !post {
        return None;
    }
    let Some(url) = config.discord_webhook_url.as_deref() else {
        println!(
            "{}",
            "No Discord webhook configured; printing only.".yellow()
        );
        return None;
    };
    match DiscordWebhook::new(url) {
        Ok(hook) => Some(hook),
        Err(e) => {
            eprintln!("{} Failed to create webhook client: {}", "[WEBHOOK ERROR]".red(), e);
            None
        }
    }
}
