use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde_json::Value;

use super::state::RelayWebhookState;

/// Header Telegram fills with the `secret_token` given to `setWebhook`.
const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Acknowledge first, relay in the background.
///
/// Any body (including non-JSON) gets `200 {"ok": true}`; only a secret mismatch is rejected,
/// and a rejected update is never relayed.
pub(super) async fn telegram_webhook_handler(
    State(state): State<RelayWebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, (StatusCode, &'static str)> {
    let update = serde_json::from_slice::<Value>(&body);
    let update_id = update
        .as_ref()
        .ok()
        .and_then(|update| update.get("update_id"))
        .and_then(Value::as_i64);

    if let Some(expected) = state.secret_token.as_deref()
        && !secret_matches(&headers, expected)
    {
        tracing::warn!(
            update_id = ?update_id,
            header_present = headers.contains_key(SECRET_TOKEN_HEADER),
            "Webhook secret token mismatch; update rejected"
        );
        return Err((StatusCode::UNAUTHORIZED, "invalid webhook secret token"));
    }

    match update {
        Ok(update) => {
            tracing::info!(update_id = ?update_id, "Webhook received Telegram update");
            let handler = Arc::clone(&state.handler);
            tokio::spawn(async move {
                handler.handle_update(&update).await;
            });
        }
        Err(error) => {
            tracing::debug!(error = %error, bytes = body.len(), "Webhook body is not JSON; acknowledging");
        }
    }

    Ok(Json(serde_json::json!({"ok": true})))
}

fn secret_matches(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get(SECRET_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|provided| provided == expected)
}

pub(super) async fn health_handler() -> StatusCode {
    StatusCode::OK
}
