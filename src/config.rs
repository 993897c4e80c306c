use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub kalshi_key_id: Option<String>,
    /// Path to the unencrypted PEM private key registered with Kalshi.
    pub kalshi_private_key_path: Option<String>,
    #[serde(default)]
    pub kalshi_is_demo: bool,
    /// Discord incoming webhook that receives relayed embeds.
    pub discord_webhook_url: Option<String>,
    /// Maximum in-flight Polymarket lookups when matching a batch of events.
    #[serde(default = "default_match_concurrency")]
    pub match_concurrency: usize,
    /// How long a lookup may run before the interaction is abandoned.
    #[serde(default = "default_interaction_timeout_secs")]
    pub interaction_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kalshi_key_id: None,
            kalshi_private_key_path: None,
            kalshi_is_demo: false,
            discord_webhook_url: None,
            match_concurrency: default_match_concurrency(),
            interaction_timeout_secs: default_interaction_timeout_secs(),
        }
    }
}

fn default_match_concurrency() -> usize {
    crate::matching::DEFAULT_MATCH_CONCURRENCY
}

fn default_interaction_timeout_secs() -> u64 {
    60
}

impl Config {
    /// Key id and key path, when both are present.
    pub fn kalshi_credentials(&self) -> Option<(&str, &str)> {
        match (&self.kalshi_key_id, &self.kalshi_private_key_path) {
            (Some(id), Some(path)) if !id.is_empty() && !path.is_empty() => Some((id, path)),
            _ => None,
        }
    }

    /// Environment (and `.env`) values take precedence over the file.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("KALSHI_KEY_ID").filter(|v| !v.is_empty()) {
            self.kalshi_key_id = Some(v);
        }
        if let Some(v) = lookup("KALSHI_PRIVATE_KEY_PATH").filter(|v| !v.is_empty()) {
            self.kalshi_private_key_path = Some(v);
        }
        if let Some(v) = lookup("KALSHI_IS_DEMO") {
            self.kalshi_is_demo = matches!(v.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(v) = lookup("DISCORD_WEBHOOK_URL").filter(|v| !v.is_empty()) {
            self.discord_webhook_url = Some(v);
        }
    }
}

pub fn config_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let config_dir = dirs::config_dir().ok_or("Could not determine config directory")?;

    let app_config_dir = config_dir.join("kalshi-relay");
    fs::create_dir_all(&app_config_dir)?;

    Ok(app_config_dir.join("config.json"))
}

pub fn save_config(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path()?;
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)?;
    Ok(())
}

/// Load the file config (defaults when absent), then layer the environment on top.
pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    let path = config_path()?;
    let mut config = if path.exists() {
        let json = fs::read_to_string(path)?;
        serde_json::from_str::<Config>(&json)?
    } else {
        Config::default()
    };

    config.apply_env_overrides();
    Ok(config)
}
