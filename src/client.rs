use crate::config::Config;
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Banner text used when the service gives no usable `detail`
pub const GENERIC_SEND_ERROR: &str = "Failed to send message";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Service returned {status}")]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },

    #[error("Received invalid json data: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Text to show the user: the server's `detail` when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Status {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => GENERIC_SEND_ERROR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub content: &'a str,
}

/// Body of a successful `POST /chat`. Missing or null metrics read as zero.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    pub content: String,
    #[serde(default, deserialize_with = "number_or_zero")]
    pub response_time: f64,
    #[serde(default, deserialize_with = "number_or_zero")]
    pub token_count: f64,
}

fn number_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthReport {
    #[serde(default)]
    pub status: Option<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status.as_deref() == Some("healthy")
    }
}

/// HTTP client for the assistant service
#[derive(Clone)]
pub struct ChatClient {
    base_url: String,
    client: reqwest::Client,
}

impl ChatClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        Self::with_timeout(&config.base_url, Duration::from_secs(config.request_timeout_secs))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<HealthReport, ClientError> {
        let url = self.url("health");
        tracing::debug!(url = %url, "Checking service health");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::Status {
                status,
                detail: extract_detail(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    pub async fn chat(&self, content: &str) -> Result<ChatReply, ClientError> {
        let url = self.url("chat");
        tracing::debug!(url = %url, content_len = content.len(), "Sending chat message");

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { content })
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), body = %body, "Chat request rejected");
            return Err(ClientError::Status {
                status,
                detail: extract_detail(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Pull a non-empty string `detail` field out of an error body
fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")
        .and_then(serde_json::Value::as_str)
        .filter(|detail| !detail.is_empty())
        .map(str::to_string)
}
