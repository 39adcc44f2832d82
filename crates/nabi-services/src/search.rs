//! Web-search briefings via the Perplexity chat-completions API.

use std::time::Duration;

use serde_json::json;

use crate::error::{Error, Result};

const DEFAULT_BASE_URL: &str = "https://api.perplexity.ai";
/// Cheapest online model; answers carry current web results.
const SEARCH_MODEL: &str = "sonar";
const SYSTEM_PROMPT: &str = "You are an AI assistant.";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Search client
pub struct SearchClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl SearchClient {
    /// Create a new search client with an API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create from the PERPLEXITY_API_KEY environment variable
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("PERPLEXITY_API_KEY")
            .map_err(|_| Error::MissingEnv("PERPLEXITY_API_KEY"))?;
        Ok(Self::new(api_key))
    }

    /// Override the API base URL (used by tests and proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Ask one question and return the answer text.
    pub async fn search(&self, query: &str) -> Result<String> {
        tracing::debug!(model = SEARCH_MODEL, "web search request");
        let body = json!({
            "model": SEARCH_MODEL,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": query },
            ],
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::api(status.as_u16(), text));
        }

        let value: serde_json::Value = response.json().await?;
        extract_answer(&value)
    }
}

/// Pull the first choice's message content out of a chat-completions response.
fn extract_answer(value: &serde_json::Value) -> Result<String> {
    value["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::UnexpectedResponse("no message content in response".into()))
}
