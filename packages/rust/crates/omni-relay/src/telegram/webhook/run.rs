use std::sync::Arc;

use anyhow::{Result, anyhow};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use super::app::build_webhook_app;
use crate::config::RelayConfig;
use crate::relay::RelayHandler;

/// Serve the relay webhook until Ctrl+C or until the server task exits.
pub async fn run_relay_webhook(config: &RelayConfig) -> Result<()> {
    let handler = Arc::new(RelayHandler::from_config(config)?);
    let webhook = build_webhook_app(
        handler,
        &config.telegram.webhook_path,
        config.telegram.webhook_secret.clone(),
    );
    let bind_addr = config.telegram.webhook_bind.as_str();
    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|error| anyhow!("failed to bind relay webhook on {bind_addr}: {error}"))?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let app = webhook.app;
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    tracing::info!(
        bind = bind_addr,
        path = %webhook.path,
        model = %config.completion.model,
        max_attempts = config.completion.retry.max_attempts,
        allow_listed_chat = ?config.telegram.admin_chat_id,
        search_enabled = config.search.url.is_some(),
        secret_token = config.telegram.webhook_secret.is_some(),
        "Relay webhook listening"
    );
    if config.completion.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; replies will ask the operator to configure it");
    }

    let finished = tokio::select! {
        joined = &mut server => Some(joined),
        _ = tokio::signal::ctrl_c() => None,
    };
    match finished {
        None => {
            tracing::info!("Shutting down...");
            let _ = shutdown_tx.send(());
            // In-flight update tasks are detached; only the accept loop is drained.
            let _ = server.await;
            Ok(())
        }
        Some(Ok(Ok(()))) => {
            tracing::warn!("Relay webhook server exited");
            Ok(())
        }
        Some(Ok(Err(error))) => Err(anyhow!("relay webhook server failed: {error}")),
        Some(Err(error)) => Err(anyhow!("relay webhook task join error: {error}")),
    }
}
