use crate::content::{Summarize, SummaryRequest};
use crate::util::{retry, DEFAULT_BACKOFF_SECONDS};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the generative-language API.
#[derive(Debug, Error)]
pub enum ContentError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the 30-second timeout
    #[error("Request timed out")]
    Timeout,
    /// The response carried no usable candidate text
    #[error("Response did not contain any text")]
    MissingText,
}

/// Client for the Gemini `generateContent` endpoint.
///
/// Every call runs under the retry policy; a response without usable text
/// counts as a failed attempt like any transport error, and the last error
/// propagates once attempts are exhausted.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    attempts: u32,
    base_url: String,
}

impl GeminiClient {
    pub fn new(
        client: reqwest::Client,
        api_key: SecretString,
        model: impl Into<String>,
        attempts: u32,
    ) -> Self {
        Self {
            client,
            api_key,
            model: model.into(),
            attempts,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Overrides the API base URL. Intended for tests against a local mock.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn call(&self, endpoint: &str, prompt: &str) -> Result<String, ContentError> {
        let payload = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let request = self
            .client
            .post(endpoint)
            .query(&[("key", self.api_key.expose_secret())])
            .json(&payload);

        let response = tokio::time::timeout(REQUEST_TIMEOUT, request.send())
            .await
            .map_err(|_| ContentError::Timeout)?
            .map_err(ContentError::Network)?;

        if !response.status().is_success() {
            return Err(ContentError::HttpStatus(response.status().as_u16()));
        }

        let body: GenerateResponse = response.json().await.map_err(ContentError::Network)?;
        first_text(body).ok_or(ContentError::MissingText)
    }
}

impl Summarize for GeminiClient {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, ContentError> {
        let endpoint = format!("{}/{}:generateContent", self.base_url, self.model);
        let prompt = build_prompt(request);

        tracing::debug!(model = %self.model, title = %request.title, "Requesting summary");
        retry(
            || self.call(&endpoint, &prompt),
            self.attempts,
            DEFAULT_BACKOFF_SECONDS,
        )
        .await
    }
}

fn build_prompt(request: &SummaryRequest) -> String {
    format!(
        "You are a social media assistant for a tech newsletter. \
         Write a concise, engaging post summarizing the story below. \
         Do not include hashtags, URLs, or media references. \
         Keep it under 250 characters.\n\n\
         Title: {}\n\
         Summary: {}\n",
        request.title, request.summary
    )
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// First non-empty part text across all candidates, trimmed.
fn first_text(response: GenerateResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .filter_map(|p| p.text)
        .map(|t| t.trim().to_string())
        .find(|t| !t.is_empty())
}
