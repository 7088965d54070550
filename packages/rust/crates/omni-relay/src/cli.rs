use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "omni-relay")]
#[command(about = "Telegram webhook relay to a hosted completion API.")]
pub(crate) struct Cli {
    /// Override config directory (settings are read from `<dir>/omni-relay/settings.yaml`).
    #[arg(long, global = true)]
    pub(crate) conf: Option<PathBuf>,

    /// Debug logging for omni_relay (RUST_LOG still wins when set).
    #[arg(short, long, global = true)]
    pub(crate) verbose: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Serve the Telegram webhook until Ctrl+C.
    Serve {
        /// Listen address (default from OMNI_RELAY_WEBHOOK_BIND / settings, else 0.0.0.0:8080)
        #[arg(long)]
        bind: Option<String>,

        /// Webhook route path (default from OMNI_RELAY_WEBHOOK_PATH / settings, else /telegram)
        #[arg(long)]
        path: Option<String>,
    },
    /// Send one prompt through the completion client and print the reply.
    Ask {
        /// Prompt text.
        text: String,
    },
}

/// Prompt for `ask`, trimmed. Blank prompts never reach the completion API.
pub(crate) fn ask_prompt(text: &str) -> Result<&str> {
    let prompt = text.trim();
    if prompt.is_empty() {
        bail!("ask needs a non-empty prompt");
    }
    Ok(prompt)
}
