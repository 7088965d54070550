use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use super::handler::{health_handler, telegram_webhook_handler};
use super::state::RelayWebhookState;
use crate::config::DEFAULT_WEBHOOK_PATH;
use crate::relay::RelayHandler;

/// Built webhook components for handler testing and runtime wiring.
pub struct RelayWebhookApp {
    /// Axum router serving the webhook endpoint and `GET /health`.
    pub app: Router,
    /// Normalized webhook route path.
    pub path: String,
}

/// Build the webhook router around a relay handler.
///
/// A blank `webhook_path` falls back to the default route and a missing leading `/` is added.
/// When `secret_token` is set (and not blank), requests must carry it in
/// `x-telegram-bot-api-secret-token`.
pub fn build_webhook_app(
    handler: Arc<RelayHandler>,
    webhook_path: &str,
    secret_token: Option<String>,
) -> RelayWebhookApp {
    let secret_token = secret_token
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());
    let path = match webhook_path.trim() {
        "" => DEFAULT_WEBHOOK_PATH.to_string(),
        route if route.starts_with('/') => route.to_string(),
        route => format!("/{route}"),
    };
    let state = RelayWebhookState {
        handler,
        secret_token,
    };
    let app = Router::new()
        .route(&path, post(telegram_webhook_handler))
        .route("/health", get(health_handler))
        .with_state(state);
    RelayWebhookApp { app, path }
}
