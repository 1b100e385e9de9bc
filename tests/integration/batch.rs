//! Batch ingestion through the client against mockito

use super::mock_server::MockServerFixture;
use kg_client::types::ProcessKnowledge;
use mockito::Matcher;
use serde_json::json;

#[tokio::test]
async fn test_process_batch_isolates_failures() {
    let mut fixture = MockServerFixture::new().await;
    let ok = fixture
        .server
        .mock("POST", "/api/process-knowledge")
        .match_body(Matcher::Regex(r#""source":"doc_[0124]""#.to_string()))
        .with_status(200)
        .with_body(r#"{"success":true,"data":{"triplesStored":1}}"#)
        .expect(4)
        .create_async()
        .await;
    let failing = fixture
        .mock_with_body(
            "POST",
            "/process-knowledge",
            Matcher::PartialJson(json!({"source": "doc_3"})),
            422,
            r#"{"success":false,"error":{"message":"text too short"}}"#,
        )
        .await;

    let client = fixture.client();
    let texts = vec!["alpha", "beta", "gamma", "x", "epsilon"];
    let client_ref = &client;

    let result = client
        .process_batch(
            texts,
            move |text, index| {
                client_ref.process_knowledge(ProcessKnowledge::new(text, format!("doc_{index}")))
            },
            2,
        )
        .await
        .unwrap();

    assert_eq!(result.total_processed, 5);
    assert_eq!(result.success_count(), 4);
    assert_eq!(result.failure_count(), 1);

    let (index, err) = &result.failures[0];
    assert_eq!(*index, 3);
    assert_eq!(err.index, 3);
    assert_eq!(err.message, "HTTP 422: text too short");

    let mut succeeded: Vec<usize> = result.successes.iter().map(|(i, _)| *i).collect();
    succeeded.sort_unstable();
    assert_eq!(succeeded, vec![0, 1, 2, 4]);

    let stats = client.performance_snapshot();
    assert_eq!(stats.requests, 5);
    assert_eq!(stats.errors, 1);

    ok.assert_async().await;
    failing.assert_async().await;
}

#[tokio::test]
async fn test_process_batch_rejects_zero_concurrency() {
    let fixture = MockServerFixture::new().await;
    let client = fixture.client();

    let err = client
        .process_batch(
            vec!["a"],
            |text, index| client.process_knowledge(ProcessKnowledge::new(text, format!("doc_{index}"))),
            0,
        )
        .await
        .unwrap_err();

    assert!(err.is_configuration());
    assert_eq!(client.performance_snapshot().requests, 0);
}
