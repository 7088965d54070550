//! Process-wide relay configuration, resolved once at startup (env > settings.yaml > defaults).

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use super::persona::DEFAULT_PERSONA;
use super::settings::{RelaySettings, load_relay_settings};
use crate::completion::RetryPolicy;
use crate::completion::retry::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_BASE_MS, DEFAULT_RETRY_JITTER_MS};

pub const DEFAULT_MODEL: &str = "gpt-5-mini";
pub const DEFAULT_COMPLETION_URL: &str = "https://api.openai.com/v1/responses";
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_WEBHOOK_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_WEBHOOK_PATH: &str = "/telegram";
const DEFAULT_COMPLETION_TIMEOUT_SECS: u64 = 60;
const DEFAULT_SEND_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SEARCH_MAX_RESULTS: usize = 10;

/// Startup configuration errors. Everything else degrades to a default with a warning.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ADMIN_CHAT_ID must be an integer chat id, got {0:?}")]
    InvalidAdminChatId(String),

    #[error("TELEGRAM_TOKEN is not set")]
    MissingTelegramToken,

    #[error("failed to read persona file {path}: {source}")]
    PersonaFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("persona file {0} is empty")]
    EmptyPersona(PathBuf),
}

/// Completion API settings handed to [`crate::CompletionClient`].
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Bearer credential; `None` makes every completion fail fast with a configuration message.
    pub api_key: Option<String>,
    pub url: String,
    pub model: String,
    pub persona: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            url: DEFAULT_COMPLETION_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            persona: DEFAULT_PERSONA.to_string(),
            timeout: Duration::from_secs(DEFAULT_COMPLETION_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub api_base: String,
    /// Single allow-listed chat; `None` serves every chat.
    pub admin_chat_id: Option<i64>,
    pub send_timeout: Duration,
    pub webhook_bind: String,
    pub webhook_path: String,
    pub webhook_secret: Option<String>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
            admin_chat_id: None,
            send_timeout: Duration::from_secs(DEFAULT_SEND_TIMEOUT_SECS),
            webhook_bind: DEFAULT_WEBHOOK_BIND.to_string(),
            webhook_path: DEFAULT_WEBHOOK_PATH.to_string(),
            webhook_secret: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// SearXNG base URL; `None` disables search augmentation.
    pub url: Option<String>,
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_results: DEFAULT_SEARCH_MAX_RESULTS,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RelayConfig {
    pub telegram: TelegramConfig,
    pub completion: CompletionConfig,
    pub search: SearchConfig,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let settings = load_relay_settings();
        Self::from_lookup(|name| std::env::var(name).ok(), &settings)
    }

    #[doc(hidden)]
    pub fn from_lookup_for_test<F>(lookup: F, settings: &RelaySettings) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_lookup(lookup, settings)
    }

    fn from_lookup<F>(lookup: F, settings: &RelaySettings) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let tg = &settings.telegram;
        let cs = &settings.completion;

        let admin_chat_id = match non_blank(&lookup, "ADMIN_CHAT_ID") {
            Some(raw) => Some(
                raw.parse::<i64>()
                    .map_err(|_| ConfigError::InvalidAdminChatId(raw.clone()))?,
            ),
            None => tg.admin_chat_id,
        };

        let persona_file = non_blank(&lookup, "OMNI_RELAY_PERSONA_FILE")
            .or_else(|| cs.persona_file.clone())
            .map(PathBuf::from);
        let persona = match persona_file {
            Some(path) => load_persona(path)?,
            None => DEFAULT_PERSONA.to_string(),
        };

        let telegram = TelegramConfig {
            bot_token: non_blank(&lookup, "TELEGRAM_TOKEN"),
            api_base: resolve_string(
                &lookup,
                "OMNI_RELAY_TELEGRAM_API_BASE",
                tg.api_base.as_ref(),
                DEFAULT_TELEGRAM_API_BASE,
            ),
            admin_chat_id,
            send_timeout: Duration::from_secs(resolve_u64(
                &lookup,
                "OMNI_RELAY_SEND_TIMEOUT_SECS",
                tg.send_timeout_secs,
                DEFAULT_SEND_TIMEOUT_SECS,
            )),
            webhook_bind: resolve_string(
                &lookup,
                "OMNI_RELAY_WEBHOOK_BIND",
                tg.webhook_bind.as_ref(),
                DEFAULT_WEBHOOK_BIND,
            ),
            webhook_path: resolve_string(
                &lookup,
                "OMNI_RELAY_WEBHOOK_PATH",
                tg.webhook_path.as_ref(),
                DEFAULT_WEBHOOK_PATH,
            ),
            webhook_secret: non_blank(&lookup, "OMNI_RELAY_WEBHOOK_SECRET"),
        };

        let completion = CompletionConfig {
            api_key: non_blank(&lookup, "OPENAI_API_KEY"),
            url: resolve_string(
                &lookup,
                "OMNI_RELAY_COMPLETION_URL",
                cs.url.as_ref(),
                DEFAULT_COMPLETION_URL,
            ),
            model: resolve_string(&lookup, "OPENAI_MODEL", cs.model.as_ref(), DEFAULT_MODEL),
            persona,
            timeout: Duration::from_secs(resolve_u64(
                &lookup,
                "OMNI_RELAY_COMPLETION_TIMEOUT_SECS",
                cs.timeout_secs,
                DEFAULT_COMPLETION_TIMEOUT_SECS,
            )),
            retry: RetryPolicy {
                max_attempts: u32::try_from(resolve_u64(
                    &lookup,
                    "OMNI_RELAY_MAX_ATTEMPTS",
                    cs.max_attempts.map(u64::from),
                    u64::from(DEFAULT_MAX_ATTEMPTS),
                ))
                .unwrap_or(DEFAULT_MAX_ATTEMPTS),
                base_delay: Duration::from_millis(resolve_u64(
                    &lookup,
                    "OMNI_RELAY_RETRY_BASE_MS",
                    cs.retry_base_ms,
                    DEFAULT_RETRY_BASE_MS,
                )),
                // Zero is a valid jitter bound (disables jitter), so it bypasses resolve_u64.
                jitter_max: Duration::from_millis(resolve_u64_allow_zero(
                    &lookup,
                    "OMNI_RELAY_RETRY_JITTER_MS",
                    cs.retry_jitter_ms,
                    DEFAULT_RETRY_JITTER_MS,
                )),
            },
        };

        let search = SearchConfig {
            url: non_blank(&lookup, "OMNI_RELAY_SEARCH_URL").or_else(|| {
                settings
                    .search
                    .url
                    .as_ref()
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
            }),
            max_results: match settings.search.max_results {
                Some(value) if value > 0 => value,
                _ => DEFAULT_SEARCH_MAX_RESULTS,
            },
        };

        Ok(Self {
            telegram,
            completion,
            search,
        })
    }

    /// Bot token, required to serve the webhook.
    pub fn require_bot_token(&self) -> Result<&str, ConfigError> {
        self.telegram
            .bot_token
            .as_deref()
            .ok_or(ConfigError::MissingTelegramToken)
    }
}

fn load_persona(path: PathBuf) -> Result<String, ConfigError> {
    let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::PersonaFile {
        path: path.clone(),
        source,
    })?;
    if raw.trim().is_empty() {
        return Err(ConfigError::EmptyPersona(path));
    }
    Ok(raw)
}

fn non_blank<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn resolve_string<F>(lookup: &F, name: &str, setting_value: Option<&String>, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    non_blank(lookup, name)
        .or_else(|| {
            setting_value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
        .unwrap_or_else(|| default.to_string())
}

fn resolve_u64<F>(lookup: &F, name: &str, setting_value: Option<u64>, default: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = non_blank(lookup, name) {
        match raw.parse::<u64>() {
            Ok(value) if value > 0 => return value,
            _ => tracing::warn!(
                env_var = %name,
                value = %raw,
                "invalid relay config env value; using settings/default"
            ),
        }
    }
    match setting_value {
        Some(value) if value > 0 => value,
        Some(value) => {
            tracing::warn!(
                setting = %name,
                value,
                default,
                "invalid relay config settings value; using default"
            );
            default
        }
        None => default,
    }
}

fn resolve_u64_allow_zero<F>(lookup: &F, name: &str, setting_value: Option<u64>, default: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = non_blank(lookup, name) {
        match raw.parse::<u64>() {
            Ok(value) => return value,
            Err(_) => tracing::warn!(
                env_var = %name,
                value = %raw,
                "invalid relay config env value; using settings/default"
            ),
        }
    }
    setting_value.unwrap_or(default)
}
