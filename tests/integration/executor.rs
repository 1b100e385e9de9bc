//! Retry, rate-limit and accounting behaviour of the request executor

use super::scripted::{scripted_client, ScriptedTransport, Step};
use kg_client::{Error, KgClient, RequestSpec, TransportError};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn test_timeouts_exhaust_exactly_three_attempts() {
    let transport = ScriptedTransport::new(vec![Step::Hang]);
    let client = scripted_client(Arc::clone(&transport));

    let start = Instant::now();
    let err = client.health_check().await.unwrap_err();

    match err {
        Error::TransientFailure { attempts, source } => {
            assert_eq!(attempts, 3);
            assert!(matches!(source, TransportError::Timeout(_)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(transport.attempts(), 3);

    // 3 x 30 s timeouts plus 1 s and 2 s of backoff.
    assert!(start.elapsed() >= Duration::from_secs(93));

    let stats = client.performance_snapshot();
    assert_eq!(stats.requests, 1);
    assert_eq!(stats.errors, 1);
    assert_eq!(stats.retries, 0);
    assert!(stats.total_time >= Duration::from_secs(93));
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_waits_for_retry_after_then_succeeds() {
    let transport = ScriptedTransport::new(vec![
        Step::rate_limited(Some("2")),
        Step::ok(r#"{"success":true,"data":{"status":"healthy"}}"#),
    ]);
    let client = scripted_client(Arc::clone(&transport));

    let start = Instant::now();
    let data = client.health_check().await.unwrap();

    assert_eq!(data["status"], "healthy");
    assert!(start.elapsed() >= Duration::from_secs(2));
    assert_eq!(transport.attempts(), 2);

    let stats = client.performance_snapshot();
    assert_eq!(stats.requests, 1);
    assert_eq!(stats.retries, 1);
    assert_eq!(stats.errors, 0);
    assert!(stats.total_time >= Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_without_retry_after_waits_default() {
    let transport = ScriptedTransport::new(vec![
        Step::rate_limited(None),
        Step::ok(r#"{"version":"1.0.0"}"#),
    ]);
    let client = scripted_client(transport);

    let start = Instant::now();
    client.get_version().await.unwrap();
    assert!(start.elapsed() >= Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_does_not_consume_attempts() {
    let mut steps: Vec<Step> = (0..5).map(|_| Step::rate_limited(Some("1"))).collect();
    steps.push(Step::ConnectError);
    steps.push(Step::ConnectError);
    steps.push(Step::ok(r#"{"success":true,"data":[]}"#));
    let transport = ScriptedTransport::new(steps);
    let client = scripted_client(Arc::clone(&transport));

    client.get_stats().await.unwrap();

    assert_eq!(transport.attempts(), 8);
    let stats = client.performance_snapshot();
    assert_eq!(stats.retries, 5);
    assert_eq!(stats.errors, 0);
}

#[tokio::test(start_paused = true)]
async fn test_transient_failures_back_off_exponentially() {
    let transport = ScriptedTransport::new(vec![
        Step::ConnectError,
        Step::ConnectError,
        Step::ok(r#"{"success":true,"data":{"ok":true}}"#),
    ]);
    let client = scripted_client(Arc::clone(&transport));

    let start = Instant::now();
    client.get_metrics().await.unwrap();
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_secs(3), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(4), "{elapsed:?}");
    assert_eq!(client.performance_snapshot().retries, 0);
}

#[tokio::test(start_paused = true)]
async fn test_every_attempt_shares_one_request_id() {
    let transport = ScriptedTransport::new(vec![
        Step::ConnectError,
        Step::rate_limited(Some("1")),
        Step::ok(r#"{"success":true}"#),
    ]);
    let client = scripted_client(Arc::clone(&transport));

    client.get_capabilities().await.unwrap();
    client.get_capabilities().await.unwrap();

    let sent = transport.sent();
    assert_eq!(sent.len(), 4);
    assert!(sent.iter().all(|s| s.path == "/capabilities"));
    assert_eq!(sent[0].request_id, sent[1].request_id);
    assert_eq!(sent[1].request_id, sent[2].request_id);
    assert_ne!(sent[2].request_id, sent[3].request_id);
}

#[tokio::test(start_paused = true)]
async fn test_non_transient_transport_error_is_not_retried() {
    let transport = ScriptedTransport::new(vec![Step::FatalError]);
    let client = scripted_client(Arc::clone(&transport));

    let err = client.health_check().await.unwrap_err();
    assert!(matches!(err, Error::Transport(TransportError::Other(_))));
    assert_eq!(transport.attempts(), 1);
    assert_eq!(client.performance_snapshot().errors, 1);
}

#[tokio::test(start_paused = true)]
async fn test_http_errors_are_not_retried() {
    let transport = ScriptedTransport::new(vec![Step::Respond(
        kg_client::transport::RawResponse::new(
            503,
            r#"{"success":false,"error":{"message":"maintenance","code":"UNAVAILABLE"}}"#,
        ),
    )]);
    let client = scripted_client(Arc::clone(&transport));

    let err = client.health_check().await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.code(), Some("UNAVAILABLE"));
    assert_eq!(transport.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_single_attempt_configuration() {
    let transport = ScriptedTransport::new(vec![Step::ConnectError]);
    let client = KgClient::builder()
        .max_attempts(1)
        .transport(transport.clone())
        .build()
        .unwrap();

    let err = client.health_check().await.unwrap_err();
    assert!(matches!(err, Error::TransientFailure { attempts: 1, .. }));
    assert_eq!(transport.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_per_request_timeout_override() {
    let transport = ScriptedTransport::new(vec![Step::Hang]);
    let client = KgClient::builder()
        .max_attempts(1)
        .transport(transport)
        .build()
        .unwrap();

    let start = Instant::now();
    let err = client
        .execute(RequestSpec::get("/health").with_timeout(Duration::from_secs(5)))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::TransientFailure {
            source: TransportError::Timeout(d),
            ..
        } if d == Duration::from_secs(5)
    ));
    assert!(start.elapsed() < Duration::from_secs(6));
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_call_is_counted_as_error() {
    let transport = ScriptedTransport::new(vec![Step::rate_limited(Some("100"))]);
    let client = scripted_client(transport);

    let outcome = tokio::time::timeout(Duration::from_secs(5), client.health_check()).await;
    assert!(outcome.is_err());

    let stats = client.performance_snapshot();
    assert_eq!(stats.requests, 1);
    assert_eq!(stats.errors, 1);
    assert_eq!(stats.retries, 0);
    assert!(stats.total_time >= Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn test_reset_during_call_keeps_call_out_of_new_generation() {
    let transport = ScriptedTransport::new(vec![
        Step::rate_limited(Some("10")),
        Step::ok(r#"{"success":true}"#),
    ]);
    let client = Arc::new(scripted_client(transport));

    let call = tokio::spawn({
        let client = Arc::clone(&client);
        async move { client.health_check().await }
    });
    tokio::time::sleep(Duration::from_secs(1)).await;
    client.reset_stats();
    call.await.unwrap().unwrap();

    assert_eq!(client.performance_snapshot(), kg_client::Stats::default());
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_calls_are_all_counted() {
    let transport = ScriptedTransport::new(vec![Step::ok(r#"{"success":true}"#)]);
    let client = scripted_client(transport);

    let calls = (0..50).map(|_| client.health_check());
    let results = futures::future::join_all(calls).await;

    assert!(results.iter().all(|r| r.is_ok()));
    let stats = client.performance_snapshot();
    assert_eq!(stats.requests, 50);
    assert_eq!(stats.errors, 0);
}
