//! File-backed settings for omni-relay.
//!
//! Loads and merges:
//! - System defaults: `<PRJ_ROOT>/packages/conf/settings.yaml`
//! - User overrides:  `<PRJ_CONFIG_HOME>/omni-relay/settings.yaml`
//!
//! Merge precedence is user over system. Environment variables take precedence over both
//! (see [`crate::RelayConfig`]).

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Deserialize;

const DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH: &str = "packages/conf/settings.yaml";
const DEFAULT_USER_SETTINGS_RELATIVE_PATH: &str = "omni-relay/settings.yaml";
const DEFAULT_CONFIG_HOME_RELATIVE_PATH: &str = ".config";
static CONFIG_HOME_OVERRIDE: OnceLock<PathBuf> = OnceLock::new();

/// Root of `settings.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelaySettings {
    #[serde(default)]
    pub telegram: TelegramSettings,
    #[serde(default)]
    pub completion: CompletionSettings,
    #[serde(default)]
    pub search: SearchSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelegramSettings {
    pub api_base: Option<String>,
    pub admin_chat_id: Option<i64>,
    pub send_timeout_secs: Option<u64>,
    pub webhook_bind: Option<String>,
    pub webhook_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionSettings {
    pub url: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_attempts: Option<u32>,
    pub retry_base_ms: Option<u64>,
    pub retry_jitter_ms: Option<u64>,
    pub persona_file: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchSettings {
    pub url: Option<String>,
    pub max_results: Option<usize>,
}

impl RelaySettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            telegram: self.telegram.merge(overlay.telegram),
            completion: self.completion.merge(overlay.completion),
            search: self.search.merge(overlay.search),
        }
    }
}

impl TelegramSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            api_base: overlay.api_base.or(self.api_base),
            admin_chat_id: overlay.admin_chat_id.or(self.admin_chat_id),
            send_timeout_secs: overlay.send_timeout_secs.or(self.send_timeout_secs),
            webhook_bind: overlay.webhook_bind.or(self.webhook_bind),
            webhook_path: overlay.webhook_path.or(self.webhook_path),
        }
    }
}

impl CompletionSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            url: overlay.url.or(self.url),
            model: overlay.model.or(self.model),
            timeout_secs: overlay.timeout_secs.or(self.timeout_secs),
            max_attempts: overlay.max_attempts.or(self.max_attempts),
            retry_base_ms: overlay.retry_base_ms.or(self.retry_base_ms),
            retry_jitter_ms: overlay.retry_jitter_ms.or(self.retry_jitter_ms),
            persona_file: overlay.persona_file.or(self.persona_file),
        }
    }
}

impl SearchSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            url: overlay.url.or(self.url),
            max_results: overlay.max_results.or(self.max_results),
        }
    }
}

/// Load merged settings (user overrides system).
pub fn load_relay_settings() -> RelaySettings {
    let (system_path, user_path) = relay_settings_paths();
    load_relay_settings_from_paths(&system_path, &user_path)
}

#[doc(hidden)]
pub fn relay_settings_paths() -> (PathBuf, PathBuf) {
    let root = project_root();
    let system_path = root.join(DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH);
    let user_path = resolve_config_home(&root).join(DEFAULT_USER_SETTINGS_RELATIVE_PATH);
    (system_path, user_path)
}

#[doc(hidden)]
pub fn load_relay_settings_from_paths(system: &Path, user: &Path) -> RelaySettings {
    load_one(system).merge(load_one(user))
}

fn load_one(path: &Path) -> RelaySettings {
    if !path.exists() {
        return RelaySettings::default();
    }
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to read settings file; ignoring"
            );
            return RelaySettings::default();
        }
    };
    match serde_yaml::from_str::<RelaySettings>(&raw) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to parse settings yaml; ignoring file"
            );
            RelaySettings::default()
        }
    }
}

fn project_root() -> PathBuf {
    std::env::var("PRJ_ROOT")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Set config-home override (used by CLI `--conf`).
///
/// The path can be absolute, or relative to `PRJ_ROOT`/cwd.
pub fn set_config_home_override(path: impl Into<PathBuf>) {
    let path = path.into();
    if path.as_os_str().is_empty() {
        return;
    }
    if CONFIG_HOME_OVERRIDE.set(path.clone()).is_err()
        && let Some(current) = CONFIG_HOME_OVERRIDE.get()
        && current != &path
    {
        tracing::warn!(
            current = %current.display(),
            ignored = %path.display(),
            "config home override already set; ignoring subsequent value"
        );
    }
}

fn resolve_config_home(project_root: &Path) -> PathBuf {
    if let Some(path) = CONFIG_HOME_OVERRIDE.get() {
        return absolutize(project_root, path.clone());
    }

    let configured = std::env::var("PRJ_CONFIG_HOME")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_CONFIG_HOME_RELATIVE_PATH.to_string());
    absolutize(project_root, PathBuf::from(configured))
}

fn absolutize(project_root: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        project_root.join(path)
    }
}
