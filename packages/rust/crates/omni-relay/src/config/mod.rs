//! Config namespace: settings.yaml loading and the resolved relay configuration.

mod persona;
mod relay;
mod settings;

pub use persona::DEFAULT_PERSONA;
pub use relay::{
    CompletionConfig, ConfigError, DEFAULT_COMPLETION_URL, DEFAULT_MODEL,
    DEFAULT_TELEGRAM_API_BASE, DEFAULT_WEBHOOK_BIND, DEFAULT_WEBHOOK_PATH, RelayConfig,
    SearchConfig, TelegramConfig,
};
pub use settings::{
    CompletionSettings, RelaySettings, SearchSettings, TelegramSettings, load_relay_settings,
    load_relay_settings_from_paths, relay_settings_paths, set_config_home_override,
};
