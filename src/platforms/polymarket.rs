use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const GAMMA_API_BASE: &str = "https://gamma-api.polymarket.com";
pub const WEB_BASE_URL: &str = "https://polymarket.com";

/// Page size requested from the events search.
const SEARCH_LIMIT: u32 = 1000;

#[derive(Error, Debug)]
pub enum PolymarketError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Open-event search on Polymarket. Results are raw event objects; callers
/// pick fields out tolerantly.
#[async_trait]
pub trait EventSearch: Send + Sync {
    async fn search_events(&self, query: &str, tag_id: Option<u32>) -> Result<Vec<Value>, PolymarketError>;
}

pub fn event_url(slug: &str) -> String {
    format!("{}/event/{}", WEB_BASE_URL, slug)
}

#[derive(Clone)]
pub struct GammaClient {
    client: reqwest::Client,
    base_url: String,
}

impl GammaClient {
    pub fn new() -> Self {
        Self::with_base_url(GAMMA_API_BASE)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_events(&self, query: &[(&str, String)]) -> Result<Vec<Value>, PolymarketError> {
        let url = format!("{}/events", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(query)
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?;

        let text = response.text().await?;
        let parsed: Value = serde_json::from_str(&text).map_err(|e| PolymarketError::ParseError(e.to_string()))?;
        match parsed {
            Value::Array(events) => Ok(events),
            other => Err(PolymarketError::ParseError(format!(
                "expected an array of events, got {}",
                type_name(&other)
            ))),
        }
    }

    /// Fetch a single event (with its markets) by URL slug.
    pub async fn get_event_by_slug(&self, slug: &str) -> Result<Option<Value>, PolymarketError> {
        let events = self.get_events(&[("slug", slug.to_string())]).await?;
        Ok(events.into_iter().next())
    }
}

impl Default for GammaClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventSearch for GammaClient {
    async fn search_events(&self, query: &str, tag_id: Option<u32>) -> Result<Vec<Value>, PolymarketError> {
        let mut params = vec![
            ("limit", SEARCH_LIMIT.to_string()),
            ("active", "true".to_string()),
            ("closed", "false".to_string()),
            ("q", query.to_string()),
        ];
        if let Some(tag) = tag_id {
            params.push(("tag_id", tag.to_string()));
        }
        debug!(query, ?tag_id, "gamma event search");
        self.get_events(&params).await
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_url_uses_slug() {
        assert_eq!(
            event_url("nfl-kc-bal-2025-12-15"),
            "https://polymarket.com/event/nfl-kc-bal-2025-12-15"
        );
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = GammaClient::with_base_url("http://localhost:9999/");
        assert_eq!(client.base_url, "http://localhost:9999");
    }

    #[test]
    fn type_names_for_error_messages() {
        assert_eq!(type_name(&json!({})), "object");
        assert_eq!(type_name(&json!([])), "array");
    }

    #[tokio::test]
    async fn unreachable_host_is_request_error() {
        // Port 9 (discard) on localhost is not expected to speak HTTP.
        let client = GammaClient::with_base_url("http://127.0.0.1:9");
        let err = client.search_events("chiefs", Some(450)).await.unwrap_err();
        assert!(matches!(err, PolymarketError::RequestFailed(_)));
    }
}
