use std::time::Duration;

const TELEGRAM_HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

pub(super) fn build_telegram_http_client(request_timeout: Duration) -> reqwest::Client {
    match reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(TELEGRAM_HTTP_CONNECT_TIMEOUT_SECS).min(request_timeout))
        .timeout(request_timeout)
        .build()
    {
        Ok(client) => client,
        Err(error) => {
            tracing::warn!(
                error = %error,
                "Failed to build Telegram HTTP client with timeouts; falling back to default client"
            );
            reqwest::Client::new()
        }
    }
}
