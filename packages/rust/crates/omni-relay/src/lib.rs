//! Telegram webhook relay to a hosted completion API.
//!
//! - **completion**: Responses API client with 429/network backoff and response-shape normalization.
//! - **relay**: per-update handling (allow-list gate, local commands, search augmentation, reply).
//! - **telegram**: update parsing, `sendMessage` delivery, axum webhook endpoint.

#![allow(missing_docs)]

mod completion;
mod config;
mod relay;
mod search;
mod telegram;

pub use completion::{
    CompletionClient, CompletionFailure, CompletionRequest, CompletionResult, CompletionTrace,
    ResponseShape, RetryPolicy, extract_text,
};
pub use config::{
    CompletionConfig, CompletionSettings, ConfigError, DEFAULT_COMPLETION_URL, DEFAULT_MODEL,
    DEFAULT_PERSONA, DEFAULT_TELEGRAM_API_BASE, DEFAULT_WEBHOOK_BIND, DEFAULT_WEBHOOK_PATH,
    RelayConfig, RelaySettings, SearchConfig, SearchSettings, TelegramConfig, TelegramSettings,
    load_relay_settings, load_relay_settings_from_paths, relay_settings_paths,
    set_config_home_override,
};
pub use relay::{Completer, InboundEvent, MessageSink, REFUSAL_MESSAGE, RelayCommand, RelayHandler};
pub use search::{
    DisabledSearch, SEARCH_SCOPE_SUFFIX, SearchProvider, SearchResult, SearxngSearch,
    is_search_intent, render_search_context, scoped_query,
};
pub use telegram::{
    RelayWebhookApp, TelegramSender, build_webhook_app, parse_update, run_relay_webhook,
};
