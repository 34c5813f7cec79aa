// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for a local Ollama daemon.

use std::time::Duration;

use tracing::{debug, warn};
use understudy_core::UnderstudyError;

use crate::types::{ApiErrorResponse, GenerateRequest, GenerateResponse, TagsResponse};

/// HTTP client for Ollama daemon communication.
///
/// No authentication; the daemon listens on localhost. Retries once on
/// transient statuses (429, 500, 503 -- the latter while a model loads).
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    model: String,
    max_retries: u32,
    base_url: String,
}

impl OllamaClient {
    /// Creates a new Ollama daemon client.
    ///
    /// # Arguments
    /// * `base_url` - Daemon address (e.g., "http://127.0.0.1:11434")
    /// * `model` - Model tag to generate with
    /// * `timeout` - Per-request HTTP timeout; generous, CPU generation is slow
    pub fn new(
        base_url: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, UnderstudyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UnderstudyError::Backend {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            model,
            max_retries: 1,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns the model tag requests are sent with.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends a generation request and returns the parsed response.
    ///
    /// On transient errors, retries once after a 1-second delay.
    pub async fn generate(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, UnderstudyError> {
        let url = format!("{}/api/generate", self.base_url);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying generation request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&url)
                .json(request)
                .send()
                .await
                .map_err(|e| UnderstudyError::Backend {
                    message: format!("Ollama daemon unreachable: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "generation response received");

            if status.is_success() {
                let body = response.text().await.map_err(|e| UnderstudyError::Backend {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                })?;
                let parsed: GenerateResponse =
                    serde_json::from_str(&body).map_err(|e| UnderstudyError::Backend {
                        message: format!("failed to parse daemon response: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                return Ok(parsed);
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(UnderstudyError::Backend {
                    message: format!("daemon returned {status}: {body}"),
                    source: None,
                });
                continue;
            }

            // Non-transient error or exhausted retries.
            let body = response.text().await.unwrap_or_default();
            let error_msg = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&body) {
                format!("Ollama error: {}", api_err.error)
            } else {
                format!("daemon returned {status}: {body}")
            };
            return Err(UnderstudyError::Backend {
                message: error_msg,
                source: None,
            });
        }

        Err(last_error.unwrap_or_else(|| UnderstudyError::Backend {
            message: "generation request failed after retries".into(),
            source: None,
        }))
    }

    /// Lists models available on the daemon.
    pub async fn list_models(&self) -> Result<TagsResponse, UnderstudyError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| UnderstudyError::Backend {
                message: format!("Ollama daemon unreachable: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UnderstudyError::Backend {
                message: format!("daemon returned {status}: {body}"),
                source: None,
            });
        }

        response
            .json::<TagsResponse>()
            .await
            .map_err(|e| UnderstudyError::Backend {
                message: format!("failed to parse tags response: {e}"),
                source: Some(Box::new(e)),
            })
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}
