//! Telegram integration: update parsing, `sendMessage` delivery and the webhook endpoint.

mod client;
mod error;
mod parsing;
mod send;
mod webhook;

pub use parsing::parse_update;
pub use send::TelegramSender;
pub use webhook::{RelayWebhookApp, build_webhook_app, run_relay_webhook};
