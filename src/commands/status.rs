use colored::*;

use crate::config;

pub async fn show_status() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "KALSHI RELAY STATUS".bright_cyan().bold());
    println!();

    let cfg = match config::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            println!("Could not load configuration ({}). Run 'kalshi-relay setup' to configure.", e);
            return Ok(());
        }
    };

    println!("Configuration ({}):", config::config_path()?.display());
    println!(
        "  Kalshi API:     {}",
        match cfg.kalshi_credentials() {
            Some((key_id, path)) => format!("Configured (key {}, {})", key_id, path).green(),
            None => "Not configured (public market data only)".yellow(),
        }
    );
    println!(
        "  Environment:    {}",
        if cfg.kalshi_is_demo {
            "Demo".yellow()
        } else {
            "Production".green()
        }
    );
    println!("  Polymarket:     {}", "Public access (no key needed)".green());
    println!(
        "  Discord:        {}",
        if cfg.discord_webhook_url.is_some() {
            "Webhook configured".green()
        } else {
            "Not configured".yellow()
        }
    );
    println!("  Match workers:  {}", cfg.match_concurrency);
    println!("  Lookup timeout: {}s", cfg.interaction_timeout_secs);

    Ok(())
}
