use crate::publish::{Draft, Publish};
use crate::util::{retry, DEFAULT_BACKOFF_SECONDS};
use chrono::{SecondsFormat, Utc};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://api.typefully.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the draft-scheduling API.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the 30-second timeout
    #[error("Request timed out")]
    Timeout,
    /// The response carried no draft identifier
    #[error("Response missing draft id")]
    MissingId,
}

/// Client for the Typefully drafts endpoint.
///
/// The schedule date goes over the wire as a UTC ISO-8601 instant with a
/// `Z` suffix regardless of the draft's own timezone.
pub struct TypefullyClient {
    client: reqwest::Client,
    api_key: SecretString,
    attempts: u32,
    base_url: String,
}

impl TypefullyClient {
    pub fn new(client: reqwest::Client, api_key: SecretString, attempts: u32) -> Self {
        Self {
            client,
            api_key,
            attempts,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Overrides the API base URL. Intended for tests against a local mock.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn call(&self, url: &str, draft: &Draft) -> Result<String, PublishError> {
        let schedule_date = draft
            .schedule_date
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        tracing::debug!(schedule_date = %schedule_date, "Scheduling draft");

        let payload = serde_json::json!({
            "content": draft.content,
            "schedule-date": schedule_date,
            "threadify": false,
            "share": true,
        });

        let request = self
            .client
            .post(url)
            .header(
                "X-API-KEY",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(&payload);

        let response = tokio::time::timeout(REQUEST_TIMEOUT, request.send())
            .await
            .map_err(|_| PublishError::Timeout)?
            .map_err(PublishError::Network)?;

        if !response.status().is_success() {
            return Err(PublishError::HttpStatus(response.status().as_u16()));
        }

        let body: serde_json::Value = response.json().await.map_err(PublishError::Network)?;
        extract_id(&body).ok_or(PublishError::MissingId)
    }
}

impl Publish for TypefullyClient {
    async fn publish(&self, draft: &Draft) -> Result<String, PublishError> {
        let url = format!("{}/drafts/", self.base_url);
        retry(
            || self.call(&url, draft),
            self.attempts,
            DEFAULT_BACKOFF_SECONDS,
        )
        .await
    }
}

/// Draft id from the top level, falling back to a nested `draft` object.
/// The API has returned both string and numeric ids.
fn extract_id(body: &serde_json::Value) -> Option<String> {
    let id = body
        .get("id")
        .or_else(|| body.get("draft").and_then(|d| d.get("id")))?;

    match id {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
