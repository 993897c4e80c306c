use colored::*;
use std::io::Write;

use crate::auth;
use crate::config::{self, Config};

fn prompt(label: &str) -> Result<String, std::io::Error> {
    print!("{}", label);
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Empty input keeps the saved value.
fn or_existing(input: String, existing: Option<String>) -> Option<String> {
    if input.is_empty() {
        existing
    } else {
        Some(input)
    }
}

fn yes_no(input: &str, existing: bool) -> bool {
    match input.to_lowercase().as_str() {
        "" => existing,
        "y" | "yes" => true,
        _ => false,
    }
}

fn keep_hint(existing: &Option<String>) -> &'static str {
    if existing.is_some() {
        "press Enter to keep the saved value"
    } else {
        "or press Enter to skip"
    }
}

pub async fn setup_config() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "KALSHI RELAY SETUP".bright_cyan().bold());
    println!();

    let existing = config::load_config().unwrap_or_default();

    println!("{}", "Kalshi Configuration:".bright_yellow());
    println!("Generate API keys at: https://kalshi.com/profile/api-keys");
    let kalshi_key_id = or_existing(
        prompt(&format!("Enter Kalshi API Key ID ({}): ", keep_hint(&existing.kalshi_key_id)))?,
        existing.kalshi_key_id.clone(),
    );

    let kalshi_private_key_path = if kalshi_key_id.is_some() {
        let path = or_existing(
            prompt(&format!(
                "Path to Kalshi private key (.pem) ({}): ",
                keep_hint(&existing.kalshi_private_key_path)
            ))?,
            existing.kalshi_private_key_path.clone(),
        );
        if let Some(p) = &path {
            let key_id = kalshi_key_id.as_deref().unwrap_or_default();
            match auth::sign_request("GET", "/trade-api/v2/portfolio/balance", key_id, p) {
                Ok(_) => println!("{}", "Private key loaded and signs requests.".green()),
                Err(e) => println!("{} {}", "[WARNING]".yellow(), e),
            }
        }
        path
    } else {
        None
    };

    let demo_default = if existing.kalshi_is_demo { "[Y/n]" } else { "[y/N]" };
    let demo = prompt(&format!("Use the Kalshi demo environment? {}: ", demo_default))?;
    let kalshi_is_demo = yes_no(&demo, existing.kalshi_is_demo);

    println!();
    println!("{}", "Discord Configuration (optional):".bright_yellow());
    println!("Create an incoming webhook under Channel Settings > Integrations.");
    let discord_webhook_url = or_existing(
        prompt(&format!("Discord webhook URL ({}): ", keep_hint(&existing.discord_webhook_url)))?,
        existing.discord_webhook_url.clone(),
    );

    let config = Config {
        kalshi_key_id,
        kalshi_private_key_path,
        kalshi_is_demo,
        discord_webhook_url,
        ..existing
    };

    config::save_config(&config)?;

    println!();
    println!("{}", "Configuration saved successfully.".bright_green());
    println!("Run {} to check it.", "kalshi-relay status".bright_cyan());

    Ok(())
}
