mod app;
mod handler;
mod run;
mod state;

pub use app::{RelayWebhookApp, build_webhook_app};
pub use run::run_relay_webhook;
