use reqwest::StatusCode;

#[derive(Debug)]
pub(super) struct TelegramApiError {
    pub(super) status: Option<StatusCode>,
    pub(super) error_code: Option<i64>,
    pub(super) body: String,
}

impl TelegramApiError {
    pub(super) fn from_reqwest(err: &reqwest::Error) -> Self {
        let body = if err.is_timeout() {
            format!("timed out: {err}")
        } else {
            err.to_string()
        };
        Self {
            status: None,
            error_code: None,
            body,
        }
    }
}

impl std::fmt::Display for TelegramApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.status, self.error_code) {
            (Some(status), Some(code)) => {
                write!(f, "status={status}, error_code={code}, body={}", self.body)
            }
            (Some(status), None) => write!(f, "status={status}, body={}", self.body),
            (None, Some(code)) => write!(f, "error_code={code}, body={}", self.body),
            (None, None) => write!(f, "{}", self.body),
        }
    }
}

impl std::error::Error for TelegramApiError {}

pub(super) fn telegram_api_error_code(data: &serde_json::Value) -> Option<i64> {
    data.get("error_code").and_then(serde_json::Value::as_i64)
}

pub(super) fn telegram_api_error_description<'a>(
    data: &'a serde_json::Value,
    fallback: &'a str,
) -> &'a str {
    data.get("description")
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback)
}
