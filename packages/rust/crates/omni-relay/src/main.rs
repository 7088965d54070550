//! omni-relay CLI: webhook server or one-shot completion.
//!
//! Logging: set `RUST_LOG=omni_relay=info` (or `warn`, `debug`) to see relay logs on stderr.

mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use omni_relay::{CompletionClient, RelayConfig, run_relay_webhook, set_config_home_override};

use crate::cli::{Cli, Command, ask_prompt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Some(conf_dir) = cli.conf.clone() {
        set_config_home_override(conf_dir);
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose {
            "omni_relay=debug"
        } else {
            "omni_relay=info"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let mut config = RelayConfig::from_env()?;

    match cli.command {
        Command::Serve { bind, path } => {
            if let Some(bind) = bind {
                config.telegram.webhook_bind = bind;
            }
            if let Some(path) = path {
                config.telegram.webhook_path = path;
            }
            run_relay_webhook(&config).await
        }
        Command::Ask { text } => {
            let prompt = ask_prompt(&text)?;
            let client = CompletionClient::new(config.completion);
            let request = client.request(prompt);
            let trace = client.complete_traced(&request).await;
            tracing::info!(
                attempts = trace.attempts,
                backoff_ms = ?trace.backoff.iter().map(|d| d.as_millis()).collect::<Vec<_>>(),
                "completion finished"
            );
            println!("{}", trace.result.into_reply());
            Ok(())
        }
    }
}
