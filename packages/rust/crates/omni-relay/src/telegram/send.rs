use std::time::Duration;

use async_trait::async_trait;

use super::client::build_telegram_http_client;
use super::error::{TelegramApiError, telegram_api_error_code, telegram_api_error_description};
use crate::relay::MessageSink;

/// Telegram Bot API `sendMessage` delivery. Single attempt, no retry.
pub struct TelegramSender {
    client: reqwest::Client,
    api_base: String,
    bot_token: String,
}

impl TelegramSender {
    pub fn new(bot_token: String, api_base: String, timeout: Duration) -> Self {
        Self {
            client: build_telegram_http_client(timeout),
            api_base: api_base.trim_end_matches('/').to_string(),
            bot_token,
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.bot_token)
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramApiError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        let response = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|error| TelegramApiError::from_reqwest(&error))?;
        validate_telegram_response(response).await
    }
}

#[async_trait]
impl MessageSink for TelegramSender {
    async fn send(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
        self.send_message(chat_id, text).await?;
        tracing::debug!(chat_id, chars = text.chars().count(), "Telegram message sent");
        Ok(())
    }
}

async fn validate_telegram_response(response: reqwest::Response) -> Result<(), TelegramApiError> {
    let status = response.status();
    let body_text = response.text().await.unwrap_or_default();
    let parsed = serde_json::from_str::<serde_json::Value>(&body_text).ok();

    if !status.is_success() {
        return Err(TelegramApiError {
            status: Some(status),
            error_code: parsed.as_ref().and_then(telegram_api_error_code),
            body: parsed
                .as_ref()
                .map(|data| telegram_api_error_description(data, body_text.as_str()).to_string())
                .unwrap_or(body_text),
        });
    }

    let ok = parsed
        .as_ref()
        .and_then(|data| data.get("ok"))
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(true);
    if !ok {
        let data = parsed.as_ref();
        return Err(TelegramApiError {
            status: Some(status),
            error_code: data.and_then(telegram_api_error_code),
            body: data
                .map(|data| telegram_api_error_description(data, body_text.as_str()).to_string())
                .unwrap_or(body_text),
        });
    }

    Ok(())
}
