use std::time::Duration;

use async_trait::async_trait;

use super::error::{CompletionApiError, CompletionFailure};
use super::extract::extract_text;
use super::request::{CompletionRequest, ResponsesRequest};
use crate::config::CompletionConfig;
use crate::relay::Completer;

/// Outcome of one completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionResult {
    Text(String),
    Failure(CompletionFailure),
}

impl CompletionResult {
    /// Text to deliver to the chat: the answer, or the failure's user message.
    pub fn into_reply(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Failure(failure) => failure.user_message(),
        }
    }
}

/// A completion result plus how it was reached.
#[derive(Debug, Clone)]
pub struct CompletionTrace {
    pub result: CompletionResult,
    /// HTTP requests issued (0 when the credential is missing).
    pub attempts: u32,
    /// Delays slept between attempts, in order.
    pub backoff: Vec<Duration>,
}

/// HTTP client for the Responses API with rate-limit backoff.
pub struct CompletionClient {
    client: reqwest::Client,
    config: CompletionConfig,
}

impl CompletionClient {
    pub fn new(config: CompletionConfig) -> Self {
        Self {
            client: build_completion_http_client(config.timeout),
            config,
        }
    }

    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    /// Request carrying the configured persona.
    pub fn request(&self, user_text: impl Into<String>) -> CompletionRequest {
        CompletionRequest::new(self.config.persona.clone(), user_text)
    }

    pub async fn complete(&self, request: &CompletionRequest) -> CompletionResult {
        self.complete_traced(request).await.result
    }

    pub async fn complete_traced(&self, request: &CompletionRequest) -> CompletionTrace {
        let Some(api_key) = self.config.api_key.as_deref() else {
            tracing::warn!("completion skipped: OPENAI_API_KEY is not configured");
            return CompletionTrace {
                result: CompletionResult::Failure(CompletionFailure::MissingCredential),
                attempts: 0,
                backoff: Vec::new(),
            };
        };

        let payload = request.to_payload(&self.config.model);
        let policy = self.config.retry;
        let mut backoff = Vec::new();
        let mut attempt: u32 = 1;
        loop {
            match self.request_once(api_key, &payload).await {
                Ok(text) => {
                    let result = if text.is_empty() {
                        tracing::info!(attempt, "completion API returned no text");
                        CompletionResult::Failure(CompletionFailure::EmptyResponse)
                    } else {
                        tracing::debug!(attempt, chars = text.chars().count(), "completion succeeded");
                        CompletionResult::Text(text)
                    };
                    return CompletionTrace {
                        result,
                        attempts: attempt,
                        backoff,
                    };
                }
                Err(error) if error.should_retry() && policy.allows_retry_after(attempt) => {
                    let delay = policy.delay_for_retry(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts = policy.max_attempts,
                        delay_ms = delay.as_millis(),
                        rate_limited = error.is_rate_limited(),
                        error = %error,
                        "completion API transient failure; retrying"
                    );
                    tokio::time::sleep(delay).await;
                    backoff.push(delay);
                    attempt += 1;
                }
                Err(error) => {
                    let failure = error.into_failure(attempt);
                    tracing::warn!(attempt, failure = %failure, "completion failed");
                    return CompletionTrace {
                        result: CompletionResult::Failure(failure),
                        attempts: attempt,
                        backoff,
                    };
                }
            }
        }
    }

    async fn request_once(
        &self,
        api_key: &str,
        payload: &ResponsesRequest<'_>,
    ) -> Result<String, CompletionApiError> {
        let response = self
            .client
            .post(&self.config.url)
            .bearer_auth(api_key)
            .json(payload)
            .send()
            .await
            .map_err(|error| CompletionApiError::from_reqwest(&error))?;
        let status = response.status();
        let body_text = response
            .text()
            .await
            .map_err(|error| CompletionApiError::from_reqwest(&error))?;

        if status.is_client_error() || status.is_server_error() {
            return Err(CompletionApiError::from_status(status, body_text));
        }

        match serde_json::from_str::<serde_json::Value>(&body_text) {
            Ok(data) => Ok(extract_text(&data)),
            Err(error) => {
                tracing::warn!(
                    status = %status,
                    error = %error,
                    "completion API success body is not JSON; treating as empty"
                );
                Ok(String::new())
            }
        }
    }
}

#[async_trait]
impl Completer for CompletionClient {
    fn persona(&self) -> &str {
        &self.config.persona
    }

    async fn complete(&self, request: &CompletionRequest) -> CompletionResult {
        CompletionClient::complete(self, request).await
    }
}

fn build_completion_http_client(timeout: Duration) -> reqwest::Client {
    match reqwest::Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(error) => {
            tracing::warn!(
                error = %error,
                "Failed to build completion HTTP client with timeout; falling back to default client"
            );
            reqwest::Client::new()
        }
    }
}
