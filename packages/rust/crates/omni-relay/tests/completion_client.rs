#![allow(missing_docs)]

mod support;

use std::time::Duration;

use anyhow::Result;
use axum::http::StatusCode;
use omni_relay::{
    CompletionClient, CompletionConfig, CompletionFailure, CompletionRequest, CompletionResult,
    RetryPolicy,
};
use serde_json::json;

use support::{Scripted, spawn_completion_api};

fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(5),
        jitter_max: Duration::ZERO,
    }
}

fn client_for(base_url: &str, api_key: Option<&str>, retry: RetryPolicy) -> CompletionClient {
    client_with_timeout(base_url, api_key, retry, Duration::from_secs(5))
}

fn client_with_timeout(
    base_url: &str,
    api_key: Option<&str>,
    retry: RetryPolicy,
    timeout: Duration,
) -> CompletionClient {
    CompletionClient::new(CompletionConfig {
        api_key: api_key.map(str::to_string),
        url: format!("{base_url}/v1/responses"),
        model: "gpt-5-mini".to_string(),
        persona: "Ты — Клер.".to_string(),
        timeout,
        retry,
    })
}

const SHORT_TIMEOUT: Duration = Duration::from_millis(200);
const STALL: Duration = Duration::from_secs(3);

fn ok_text(text: &str) -> Scripted {
    Scripted::json(StatusCode::OK, json!({"output_text": text}))
}

#[tokio::test]
async fn missing_credential_fails_without_network_call() -> Result<()> {
    let Some(api) = spawn_completion_api(vec![ok_text("unused")]).await? else {
        return Ok(());
    };
    let client = client_for(&api.base_url, None, fast_retry(3));

    let trace = client
        .complete_traced(&client.request("напиши план на день"))
        .await;

    assert_eq!(
        trace.result,
        CompletionResult::Failure(CompletionFailure::MissingCredential)
    );
    assert_eq!(trace.attempts, 0);
    assert_eq!(api.request_count().await, 0);
    assert!(trace.result.into_reply().contains("OPENAI_API_KEY"));
    Ok(())
}

#[tokio::test]
async fn sends_model_persona_and_bearer_credential() -> Result<()> {
    let Some(api) = spawn_completion_api(vec![ok_text("готово")]).await? else {
        return Ok(());
    };
    let client = client_for(&api.base_url, Some("sk-test"), fast_retry(3));
    let request = CompletionRequest::new("Ты — Клер.", "найди канал").with_extra_context("ctx");

    let result = client.complete(&request).await;

    assert_eq!(result, CompletionResult::Text("готово".to_string()));
    let requests = api.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer sk-test"));
    assert_eq!(
        requests[0].payload,
        json!({
            "model": "gpt-5-mini",
            "input": [
                {"role": "system", "content": "Ты — Клер."},
                {"role": "user", "content": "найди канал\n\nctx"}
            ]
        })
    );
    Ok(())
}

#[tokio::test]
async fn retries_rate_limit_then_succeeds_with_growing_backoff() -> Result<()> {
    let Some(api) = spawn_completion_api(vec![
        Scripted::rate_limited(),
        Scripted::rate_limited(),
        ok_text("  третья попытка  "),
    ])
    .await?
    else {
        return Ok(());
    };
    let client = client_for(&api.base_url, Some("sk-test"), fast_retry(3));

    let trace = client.complete_traced(&client.request("привет")).await;

    assert_eq!(
        trace.result,
        CompletionResult::Text("третья попытка".to_string())
    );
    assert_eq!(trace.attempts, 3);
    assert_eq!(api.request_count().await, 3);
    assert_eq!(
        trace.backoff,
        vec![Duration::from_millis(5), Duration::from_millis(10)]
    );
    assert!(trace.backoff[1] > trace.backoff[0]);
    Ok(())
}

#[tokio::test]
async fn jitter_stays_within_bound_on_top_of_backoff() -> Result<()> {
    let Some(api) = spawn_completion_api(vec![Scripted::rate_limited(), ok_text("ok")]).await? else {
        return Ok(());
    };
    let retry = RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(5),
        jitter_max: Duration::from_millis(20),
    };
    let client = client_for(&api.base_url, Some("sk-test"), retry);

    let trace = client.complete_traced(&client.request("привет")).await;

    assert_eq!(trace.backoff.len(), 1);
    assert!(trace.backoff[0] >= Duration::from_millis(5));
    assert!(trace.backoff[0] < Duration::from_millis(25));
    Ok(())
}

#[tokio::test]
async fn exhausted_rate_limit_returns_terminal_failure() -> Result<()> {
    let Some(api) = spawn_completion_api(vec![Scripted::rate_limited()]).await? else {
        return Ok(());
    };
    let client = client_for(&api.base_url, Some("sk-test"), fast_retry(3));

    let trace = client.complete_traced(&client.request("привет")).await;

    assert_eq!(
        trace.result,
        CompletionResult::Failure(CompletionFailure::RateLimited { attempts: 3 })
    );
    assert_eq!(trace.attempts, 3);
    assert_eq!(trace.backoff.len(), 2);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(api.request_count().await, 3);
    Ok(())
}

#[tokio::test]
async fn attempt_ceiling_is_configurable() -> Result<()> {
    let Some(api) = spawn_completion_api(vec![Scripted::rate_limited()]).await? else {
        return Ok(());
    };
    let client = client_for(&api.base_url, Some("sk-test"), fast_retry(5));

    let trace = client.complete_traced(&client.request("привет")).await;

    assert_eq!(
        trace.result,
        CompletionResult::Failure(CompletionFailure::RateLimited { attempts: 5 })
    );
    assert_eq!(api.request_count().await, 5);
    assert_eq!(
        trace.backoff,
        vec![
            Duration::from_millis(5),
            Duration::from_millis(10),
            Duration::from_millis(20),
            Duration::from_millis(40),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn terminal_status_returns_after_one_attempt_with_parsed_detail() -> Result<()> {
    let Some(api) = spawn_completion_api(vec![Scripted::json(
        StatusCode::BAD_REQUEST,
        json!({"error": {"message": "Unknown model: gpt-x", "type": "invalid_request_error"}}),
    )])
    .await?
    else {
        return Ok(());
    };
    let client = client_for(&api.base_url, Some("sk-test"), fast_retry(3));

    let trace = client.complete_traced(&client.request("привет")).await;

    assert_eq!(
        trace.result,
        CompletionResult::Failure(CompletionFailure::UpstreamError {
            status: 400,
            detail: "Unknown model: gpt-x".to_string(),
        })
    );
    assert_eq!(trace.attempts, 1);
    assert!(trace.backoff.is_empty());
    assert_eq!(api.request_count().await, 1);
    let reply = trace.result.into_reply();
    assert!(reply.contains("400"));
    assert!(reply.contains("Unknown model: gpt-x"));
    Ok(())
}

#[tokio::test]
async fn server_error_with_unparseable_body_keeps_raw_text() -> Result<()> {
    let Some(api) = spawn_completion_api(vec![Scripted::raw(
        StatusCode::BAD_GATEWAY,
        "<html>bad gateway</html>",
    )])
    .await?
    else {
        return Ok(());
    };
    let client = client_for(&api.base_url, Some("sk-test"), fast_retry(3));

    let trace = client.complete_traced(&client.request("привет")).await;

    assert_eq!(
        trace.result,
        CompletionResult::Failure(CompletionFailure::UpstreamError {
            status: 502,
            detail: "<html>bad gateway</html>".to_string(),
        })
    );
    assert_eq!(api.request_count().await, 1);
    Ok(())
}

#[tokio::test]
async fn empty_answer_becomes_placeholder() -> Result<()> {
    let Some(api) = spawn_completion_api(vec![Scripted::json(
        StatusCode::OK,
        json!({"output": [{"content": [{"type": "reasoning_text", "text": "hmm"}]}]}),
    )])
    .await?
    else {
        return Ok(());
    };
    let client = client_for(&api.base_url, Some("sk-test"), fast_retry(3));

    let result = client.complete(&client.request("привет")).await;

    assert_eq!(
        result,
        CompletionResult::Failure(CompletionFailure::EmptyResponse)
    );
    assert!(!result.into_reply().trim().is_empty());
    assert_eq!(api.request_count().await, 1);
    Ok(())
}

#[tokio::test]
async fn non_json_success_body_is_an_empty_response() -> Result<()> {
    let Some(api) =
        spawn_completion_api(vec![Scripted::raw(StatusCode::OK, "definitely not json")]).await?
    else {
        return Ok(());
    };
    let client = client_for(&api.base_url, Some("sk-test"), fast_retry(3));

    let result = client.complete(&client.request("привет")).await;

    assert_eq!(
        result,
        CompletionResult::Failure(CompletionFailure::EmptyResponse)
    );
    Ok(())
}

#[tokio::test]
async fn unreachable_api_is_retried_then_reported_as_connectivity_failure() {
    // Nothing listens on port 1; every attempt fails at connect.
    let client = client_for("http://127.0.0.1:1", Some("sk-test"), fast_retry(3));

    let trace = client.complete_traced(&client.request("привет")).await;

    assert!(matches!(
        trace.result,
        CompletionResult::Failure(CompletionFailure::NetworkError { attempts: 3, .. })
    ));
    assert_eq!(trace.attempts, 3);
    assert_eq!(trace.backoff.len(), 2);
    let reply = trace.result.into_reply();
    assert!(reply.contains("минуту"));
}

#[tokio::test]
async fn request_timeout_is_retried_like_a_transport_failure() -> Result<()> {
    let Some(api) = spawn_completion_api(vec![Scripted::stalled(STALL)]).await? else {
        return Ok(());
    };
    let client = client_with_timeout(&api.base_url, Some("sk-test"), fast_retry(3), SHORT_TIMEOUT);

    let trace = client.complete_traced(&client.request("привет")).await;

    assert!(
        matches!(
            trace.result,
            CompletionResult::Failure(CompletionFailure::NetworkError { attempts: 3, .. })
        ),
        "unexpected result: {:?}",
        trace.result
    );
    assert_eq!(trace.attempts, 3);
    assert_eq!(trace.backoff.len(), 2);
    assert_eq!(api.wait_for_requests(3, Duration::from_secs(2)).await, 3);
    Ok(())
}

#[tokio::test]
async fn exhaustion_after_rate_limit_then_timeout_reports_connectivity() -> Result<()> {
    let Some(api) =
        spawn_completion_api(vec![Scripted::rate_limited(), Scripted::stalled(STALL)]).await?
    else {
        return Ok(());
    };
    let client = client_with_timeout(&api.base_url, Some("sk-test"), fast_retry(3), SHORT_TIMEOUT);

    let trace = client.complete_traced(&client.request("привет")).await;

    assert!(matches!(
        trace.result,
        CompletionResult::Failure(CompletionFailure::NetworkError { attempts: 3, .. })
    ));
    let reply = trace.result.into_reply();
    assert_eq!(
        reply,
        CompletionFailure::NetworkError {
            attempts: 3,
            detail: String::new(),
        }
        .user_message()
    );
    assert_ne!(
        reply,
        CompletionFailure::RateLimited { attempts: 3 }.user_message()
    );
    Ok(())
}

#[tokio::test]
async fn exhaustion_after_timeout_then_rate_limit_reports_overload() -> Result<()> {
    let Some(api) =
        spawn_completion_api(vec![Scripted::stalled(STALL), Scripted::rate_limited()]).await?
    else {
        return Ok(());
    };
    let client = client_with_timeout(&api.base_url, Some("sk-test"), fast_retry(3), SHORT_TIMEOUT);

    let trace = client.complete_traced(&client.request("привет")).await;

    assert_eq!(
        trace.result,
        CompletionResult::Failure(CompletionFailure::RateLimited { attempts: 3 })
    );
    assert_eq!(
        trace.result.into_reply(),
        CompletionFailure::RateLimited { attempts: 3 }.user_message()
    );
    Ok(())
}

#[test]
fn failure_messages_distinguish_failure_kinds() {
    let missing = CompletionFailure::MissingCredential.user_message();
    let overloaded = CompletionFailure::RateLimited { attempts: 3 }.user_message();
    let offline = CompletionFailure::NetworkError {
        attempts: 3,
        detail: "connection refused".to_string(),
    }
    .user_message();
    assert_ne!(missing, overloaded);
    assert_ne!(overloaded, offline);
    assert_ne!(missing, offline);
    assert!(!offline.contains("connection refused"));
    assert!(!CompletionFailure::EmptyResponse.is_error());
    assert!(CompletionFailure::MissingCredential.is_error());
}
