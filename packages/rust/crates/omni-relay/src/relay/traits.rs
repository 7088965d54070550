//! Relay seams: inbound event type, outbound sink and completion backend.

use async_trait::async_trait;

use crate::completion::{CompletionRequest, CompletionResult};

/// A chat message worth looking at, parsed from one platform callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Platform update id, for logs only.
    pub update_id: Option<i64>,
    pub chat_id: i64,
    /// Trimmed message text; empty for stickers, photos and other non-text messages.
    pub text: String,
}

/// Outbound message delivery (fire-and-forget: callers log failures and move on).
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send(&self, chat_id: i64, text: &str) -> anyhow::Result<()>;
}

/// Completion backend used by the relay.
#[async_trait]
pub trait Completer: Send + Sync {
    /// System prompt for requests built by the relay.
    fn persona(&self) -> &str;

    /// Never fails: every failure is a [`CompletionResult::Failure`].
    async fn complete(&self, request: &CompletionRequest) -> CompletionResult;
}
