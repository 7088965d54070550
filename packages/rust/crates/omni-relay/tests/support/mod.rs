#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::post,
};
use omni_relay::{
    Completer, CompletionRequest, CompletionResult, MessageSink, SearchProvider, SearchResult,
};
use tokio::sync::Mutex;

pub const FAKE_BOT_TOKEN: &str = "fake-token";

/// One request seen by a mock upstream.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub authorization: Option<String>,
    pub payload: serde_json::Value,
    pub query: Option<String>,
}

/// Scripted reply: status, raw body and how long to stall before answering.
#[derive(Debug, Clone)]
pub struct Scripted {
    pub status: StatusCode,
    pub body: String,
    pub delay: Duration,
}

impl Scripted {
    pub fn json(status: StatusCode, body: serde_json::Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn raw(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    /// Successful reply that arrives only after `delay`; outlives short client timeouts.
    pub fn stalled(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::json(StatusCode::OK, serde_json::json!({"output_text": "too late"}))
        }
    }

    pub fn rate_limited() -> Self {
        Self::json(
            StatusCode::TOO_MANY_REQUESTS,
            serde_json::json!({"error": {"message": "Rate limit reached", "type": "requests"}}),
        )
    }
}

#[derive(Clone)]
struct MockState {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    last: Arc<Mutex<Option<Scripted>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// In-process HTTP upstream bound to `127.0.0.1:0`.
pub struct MockUpstream {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: tokio::task::JoinHandle<()>,
}

impl MockUpstream {
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    /// Poll until at least `count` requests arrived or the deadline passes.
    pub async fn wait_for_requests(&self, count: usize, deadline: Duration) -> usize {
        let started = tokio::time::Instant::now();
        loop {
            let seen = self.request_count().await;
            if seen >= count || started.elapsed() >= deadline {
                return seen;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_scripted(
    State(state): State<MockState>,
    headers: HeaderMap,
    uri: axum::http::Uri,
    body: axum::body::Bytes,
) -> impl IntoResponse {
    let payload = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    state.requests.lock().await.push(RecordedRequest {
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        payload,
        query: uri.query().map(str::to_string),
    });

    let next = state.script.lock().await.pop_front();
    let reply = match next {
        Some(reply) => {
            *state.last.lock().await = Some(reply.clone());
            reply
        }
        None => state
            .last
            .lock()
            .await
            .clone()
            .unwrap_or_else(|| Scripted::json(StatusCode::OK, serde_json::json!({"ok": true}))),
    };
    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }
    (
        reply.status,
        [(header::CONTENT_TYPE, "application/json")],
        reply.body,
    )
}

/// Serve `script` in order on `route` (POST and GET); the last reply repeats once exhausted.
pub async fn spawn_mock_upstream(route: &str, script: Vec<Scripted>) -> Result<Option<MockUpstream>> {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        script: Arc::new(Mutex::new(script.into_iter().collect())),
        last: Arc::new(Mutex::new(None)),
        requests: Arc::clone(&requests),
    };
    let app = Router::new()
        .route(route, post(handle_scripted).get(handle_scripted))
        .with_state(state);

    let listener = match tokio::net::TcpListener::bind("127.0.0.1:0").await {
        Ok(listener) => listener,
        Err(err) if err.kind() == std::io::ErrorKind::PermissionDenied => {
            eprintln!("skipping mock upstream tests: local socket bind is not permitted");
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    };
    let addr = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    wait_for_listener(addr).await;

    Ok(Some(MockUpstream {
        base_url: format!("http://{addr}"),
        requests,
        handle,
    }))
}

pub async fn spawn_completion_api(script: Vec<Scripted>) -> Result<Option<MockUpstream>> {
    spawn_mock_upstream("/v1/responses", script).await
}

pub async fn spawn_telegram_api() -> Result<Option<MockUpstream>> {
    spawn_mock_upstream(
        &format!("/bot{FAKE_BOT_TOKEN}/sendMessage"),
        vec![Scripted::json(
            StatusCode::OK,
            serde_json::json!({"ok": true, "result": {"message_id": 1}}),
        )],
    )
    .await
}

async fn wait_for_listener(addr: std::net::SocketAddr) {
    for _ in 0..20 {
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Sink that records every outbound message.
#[derive(Default)]
pub struct RecordingSink {
    pub sent: Mutex<Vec<(i64, String)>>,
}

impl RecordingSink {
    pub async fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().await.clone()
    }

    pub async fn wait_for_sends(&self, count: usize, deadline: Duration) -> Vec<(i64, String)> {
        let started = tokio::time::Instant::now();
        loop {
            let sent = self.sent().await;
            if sent.len() >= count || started.elapsed() >= deadline {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn send(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
        self.sent.lock().await.push((chat_id, text.to_string()));
        Ok(())
    }
}

/// Sink whose every send fails.
pub struct FailingSink {
    pub attempts: AtomicUsize,
}

#[async_trait]
impl MessageSink for FailingSink {
    async fn send(&self, _chat_id: i64, _text: &str) -> anyhow::Result<()> {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        Err(anyhow::anyhow!("telegram unreachable"))
    }
}

/// Completer returning a fixed result and recording requests.
pub struct FakeCompleter {
    pub result: CompletionResult,
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl FakeCompleter {
    pub fn replying(text: &str) -> Self {
        Self::with_result(CompletionResult::Text(text.to_string()))
    }

    pub fn with_result(result: CompletionResult) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Completer for FakeCompleter {
    fn persona(&self) -> &str {
        "test persona"
    }

    async fn complete(&self, request: &CompletionRequest) -> CompletionResult {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.requests.lock().await.push(request.clone());
        self.result.clone()
    }
}

/// Search provider returning fixed results and recording `(query, limit)`.
pub struct FakeSearch {
    pub results: Vec<SearchResult>,
    pub queries: Mutex<Vec<(String, usize)>>,
}

impl FakeSearch {
    pub fn with_results(results: Vec<SearchResult>) -> Self {
        Self {
            results,
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SearchProvider for FakeSearch {
    async fn search(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        self.queries.lock().await.push((query.to_string(), limit));
        self.results.iter().take(limit).cloned().collect()
    }
}

pub fn telegram_update(update_id: i64, chat_id: i64, text: Option<&str>) -> serde_json::Value {
    let mut update = serde_json::json!({
        "update_id": update_id,
        "message": {
            "message_id": 77,
            "chat": {"id": chat_id, "type": "private"},
            "from": {"id": chat_id, "username": "owner"}
        }
    });
    if let Some(text) = text {
        update["message"]["text"] = serde_json::json!(text);
    }
    update
}
