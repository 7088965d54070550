use std::sync::Arc;

use crate::completion::{CompletionClient, CompletionRequest};
use crate::config::{ConfigError, RelayConfig};
use crate::search::{
    DisabledSearch, SearchProvider, SearxngSearch, is_search_intent, render_search_context,
    scoped_query,
};
use crate::telegram::{TelegramSender, parse_update};

use super::commands::{REFUSAL_MESSAGE, RelayCommand};
use super::traits::{Completer, InboundEvent, MessageSink};

const DEFAULT_SEARCH_MAX_RESULTS: usize = 10;
const PREVIEW_CHARS: usize = 50;

/// Turns one inbound platform update into zero or one outbound messages.
///
/// Stateless across calls; safe to share between concurrently running update tasks.
pub struct RelayHandler {
    sink: Arc<dyn MessageSink>,
    completer: Arc<dyn Completer>,
    search: Arc<dyn SearchProvider>,
    admin_chat_id: Option<i64>,
    search_max_results: usize,
}

impl RelayHandler {
    pub fn new(
        sink: Arc<dyn MessageSink>,
        completer: Arc<dyn Completer>,
        search: Arc<dyn SearchProvider>,
        admin_chat_id: Option<i64>,
    ) -> Self {
        Self {
            sink,
            completer,
            search,
            admin_chat_id,
            search_max_results: DEFAULT_SEARCH_MAX_RESULTS,
        }
    }

    #[must_use]
    pub fn with_search_max_results(mut self, max_results: usize) -> Self {
        self.search_max_results = max_results.max(1);
        self
    }

    /// Wire Telegram delivery, the completion client and (optional) search from configuration.
    pub fn from_config(config: &RelayConfig) -> Result<Self, ConfigError> {
        let bot_token = config.require_bot_token()?;
        let sink = Arc::new(TelegramSender::new(
            bot_token.to_string(),
            config.telegram.api_base.clone(),
            config.telegram.send_timeout,
        ));
        let completer = Arc::new(CompletionClient::new(config.completion.clone()));
        let search: Arc<dyn SearchProvider> = match &config.search.url {
            Some(url) => Arc::new(SearxngSearch::new(url.clone())),
            None => Arc::new(DisabledSearch),
        };
        Ok(
            Self::new(sink, completer, search, config.telegram.admin_chat_id)
                .with_search_max_results(config.search.max_results),
        )
    }

    /// Handle a raw platform update. Irrelevant or malformed payloads are ignored silently.
    pub async fn handle_update(&self, update: &serde_json::Value) {
        match parse_update(update) {
            Some(event) => self.handle_event(event).await,
            None => tracing::debug!(
                update_id = ?update.get("update_id"),
                "update has no message; ignoring"
            ),
        }
    }

    pub async fn handle_event(&self, event: InboundEvent) {
        let chat_id = event.chat_id;
        let text = event.text.trim();
        if text.is_empty() {
            tracing::debug!(chat_id, update_id = ?event.update_id, "non-text message; no reply");
            return;
        }

        if let Some(admin_chat_id) = self.admin_chat_id
            && admin_chat_id != chat_id
        {
            tracing::warn!(chat_id, "message from chat outside the allow-list; refusing");
            self.reply(chat_id, REFUSAL_MESSAGE).await;
            return;
        }

        if let Some(command) = RelayCommand::parse(text) {
            tracing::info!(chat_id, command = ?command, "answering command locally");
            self.reply(chat_id, &command.reply(chat_id)).await;
            return;
        }

        tracing::info!(
            chat_id,
            update_id = ?event.update_id,
            content_preview = %text.chars().take(PREVIEW_CHARS).collect::<String>(),
            "relaying message to completion API"
        );
        let request = self.build_request(text).await;
        let result = self.completer.complete(&request).await;
        self.reply(chat_id, &result.into_reply()).await;
    }

    async fn build_request(&self, text: &str) -> CompletionRequest {
        let request = CompletionRequest::new(self.completer.persona(), text);
        if !is_search_intent(text) {
            return request;
        }
        let results = self
            .search
            .search(&scoped_query(text), self.search_max_results)
            .await;
        tracing::debug!(count = results.len(), "search intent detected");
        request.with_extra_context(render_search_context(&results))
    }

    async fn reply(&self, chat_id: i64, text: &str) {
        if let Err(error) = self.sink.send(chat_id, text).await {
            tracing::warn!(chat_id, error = %error, "outbound send failed");
        }
    }
}
