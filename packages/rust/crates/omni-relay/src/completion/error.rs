use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

const DETAIL_MAX_CHARS: usize = 200;

/// Why a completion produced no model text.
///
/// `Display` is for logs; [`CompletionFailure::user_message`] is what the chat receives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionFailure {
    #[error("completion API key is not configured")]
    MissingCredential,

    #[error("completion API rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("completion API error: status={status}, detail={detail}")]
    UpstreamError { status: u16, detail: String },

    #[error("completion API unreachable after {attempts} attempts: {detail}")]
    NetworkError { attempts: u32, detail: String },

    /// The API answered successfully but without text. Not an error for the user.
    #[error("completion API returned no text")]
    EmptyResponse,
}

impl CompletionFailure {
    /// Short, chat-ready message. Never empty.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingCredential => {
                "❌ Не задан OPENAI_API_KEY. Добавь ключ в настройки сервиса.".to_string()
            }
            Self::RateLimited { .. } => "⚠️ Слишком много запросов. Попробуй чуть позже.".to_string(),
            Self::UpstreamError { status, detail } if detail.is_empty() => {
                format!("❌ Ошибка OpenAI ({status}).")
            }
            Self::UpstreamError { status, detail } => format!("❌ Ошибка OpenAI ({status}): {detail}"),
            Self::NetworkError { .. } => {
                "⚠️ Временная проблема со связью. Попробуй через минуту.".to_string()
            }
            Self::EmptyResponse => "Я здесь 🙂 Напиши подробнее, что нужно сделать.".to_string(),
        }
    }

    /// Whether this outcome is worth an operator's attention.
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::EmptyResponse)
    }
}

/// One failed HTTP attempt, before retry classification.
#[derive(Debug)]
pub(super) struct CompletionApiError {
    pub(super) status: Option<StatusCode>,
    pub(super) body: String,
}

impl CompletionApiError {
    pub(super) fn from_reqwest(err: &reqwest::Error) -> Self {
        let body = if err.is_timeout() {
            format!("timed out: {err}")
        } else {
            err.to_string()
        };
        Self { status: None, body }
    }

    pub(super) fn from_status(status: StatusCode, body_text: String) -> Self {
        let detail = serde_json::from_str::<Value>(&body_text)
            .ok()
            .and_then(|data| completion_api_error_message(&data).map(str::to_string))
            .unwrap_or_else(|| truncate(body_text.trim(), DETAIL_MAX_CHARS));
        Self {
            status: Some(status),
            body: detail,
        }
    }

    /// 429 and transport failures are retried; every other status is final.
    pub(super) fn should_retry(&self) -> bool {
        match self.status {
            Some(status) => status == StatusCode::TOO_MANY_REQUESTS,
            None => true,
        }
    }

    pub(super) fn is_rate_limited(&self) -> bool {
        self.status == Some(StatusCode::TOO_MANY_REQUESTS)
    }

    /// Terminal classification once no retry follows.
    pub(super) fn into_failure(self, attempts: u32) -> CompletionFailure {
        match self.status {
            Some(StatusCode::TOO_MANY_REQUESTS) => CompletionFailure::RateLimited { attempts },
            Some(status) => CompletionFailure::UpstreamError {
                status: status.as_u16(),
                detail: self.body,
            },
            None => CompletionFailure::NetworkError {
                attempts,
                detail: self.body,
            },
        }
    }
}

impl std::fmt::Display for CompletionApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "status={status}, body={}", self.body),
            None => write!(f, "{}", self.body),
        }
    }
}

impl std::error::Error for CompletionApiError {}

/// `error.message`, then top-level `message`; blank values count as absent.
pub(super) fn completion_api_error_message(data: &Value) -> Option<&str> {
    data.get("error")
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
        .or_else(|| data.get("message").and_then(Value::as_str))
        .or_else(|| data.get("error").and_then(Value::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
