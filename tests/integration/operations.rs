//! Named operations over real HTTP against mockito

use super::mock_server::{MockServerFixture, API_KEY};
use kg_client::types::{ConceptSearch, EntityQuery, EntityRole, ProcessKnowledge, SearchOptions, Triple};
use kg_client::{Error, KgClient};
use mockito::Matcher;
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn test_health_check_sends_default_headers() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/api/health")
        .match_header("content-type", "application/json")
        .match_header("x-mcp-version", "2024-11-05")
        .match_header("authorization", format!("Bearer {API_KEY}").as_str())
        .match_header("user-agent", Matcher::Regex("^kg-client-rust/".to_string()))
        .match_header(
            "x-request-id",
            Matcher::Regex("^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[0-9a-f]{4}-[0-9a-f]{12}$".to_string()),
        )
        .with_status(200)
        .with_body(r#"{"success":true,"data":{"status":"healthy"}}"#)
        .expect(1)
        .create_async()
        .await;

    let client = fixture.client();
    let data = client.health_check().await.unwrap();

    assert_eq!(data, json!({"status": "healthy"}));
    mock.assert_async().await;

    let stats = client.performance_snapshot();
    assert_eq!(stats.requests, 1);
    assert_eq!(stats.errors, 0);
}

#[tokio::test]
async fn test_info_endpoints_return_payload() {
    let mut fixture = MockServerFixture::new().await;
    let _version = fixture.mock_success("GET", "/version", json!({"version": "2.1.0"})).await;
    let _metrics = fixture.mock_success("GET", "/metrics", json!({"uptime": 42})).await;
    let _caps = fixture
        .mock_success("GET", "/capabilities", json!({"tools": [{"name": "search"}]}))
        .await;
    let _stats = fixture
        .mock_success("GET", "/stats", json!({"totalTriples": 10, "totalConcepts": 3}))
        .await;

    let client = fixture.client();
    let (version, metrics, caps, stats) = tokio::try_join!(
        client.get_version(),
        client.get_metrics(),
        client.get_capabilities(),
        client.get_stats(),
    )
    .unwrap();

    assert_eq!(version["version"], "2.1.0");
    assert_eq!(metrics["uptime"], 42);
    assert_eq!(caps["tools"][0]["name"], "search");
    assert_eq!(stats["totalTriples"], 10);
    assert_eq!(client.performance_snapshot().requests, 4);
}

#[tokio::test]
async fn test_process_knowledge_payload_defaults() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_with_body(
            "POST",
            "/process-knowledge",
            Matcher::PartialJson(json!({
                "text": "Rachel is a data scientist at Netflix.",
                "source": "chat_1",
                "thread_id": "demo",
                "include_concepts": true,
                "deduplicate": true,
            })),
            200,
            r#"{"success":true,"data":{"triplesStored":2}}"#,
        )
        .await;

    let client = fixture.client();
    let data = client
        .process_knowledge(
            ProcessKnowledge::new("Rachel is a data scientist at Netflix.", "chat_1").thread_id("demo"),
        )
        .await
        .unwrap();

    assert_eq!(data["triplesStored"], 2);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_entities_query_string() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/api/entities")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("role".into(), "subject".into()),
            Matcher::UrlEncoded("min_occurrence".into(), "1".into()),
            Matcher::UrlEncoded("limit".into(), "20".into()),
            Matcher::UrlEncoded("sort_by".into(), "frequency".into()),
            Matcher::UrlEncoded("sources".into(), "a,b".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"success":true,"data":{"entities":[{"entity":"Rachel"}]}}"#)
        .create_async()
        .await;

    let client = fixture.client();
    let data = client
        .get_entities(
            EntityQuery::new()
                .role(EntityRole::Subject)
                .limit(20)
                .sources(["a", "b"]),
        )
        .await
        .unwrap();

    assert_eq!(data["entities"][0]["entity"], "Rachel");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_search_with_invalid_limit_reports_api_error() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_with_body(
            "POST",
            "/search-knowledge",
            Matcher::PartialJson(json!({"query": "", "limit": -1, "threshold": 2.0})),
            200,
            r#"{"success":false,"error":{"message":"limit must be between 1 and 100","code":"VALIDATION_ERROR"}}"#,
        )
        .await;

    let client = fixture.client();
    let err = client
        .search_knowledge("", SearchOptions::new().limit(-1).threshold(2.0))
        .await
        .unwrap_err();

    match &err {
        Error::Api { message, code } => {
            assert_eq!(message, "limit must be between 1 and 100");
            assert_eq!(code.as_deref(), Some("VALIDATION_ERROR"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let stats = client.performance_snapshot();
    assert_eq!(stats.requests, 1);
    assert_eq!(stats.errors, 1);
    assert_eq!(stats.retries, 0);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_search_filters_are_sent() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_with_body(
            "POST",
            "/search-knowledge",
            Matcher::PartialJson(json!({
                "limit": 10,
                "threshold": 0.6,
                "types": ["entity-entity", "entity-event"],
                "sources": ["batch_example_0"],
            })),
            200,
            r#"{"success":true,"data":{"results":[]}}"#,
        )
        .await;

    let client = fixture.client();
    let data = client
        .search_knowledge(
            "data scientist",
            SearchOptions::new()
                .threshold(0.6)
                .types(["entity-entity", "entity-event"])
                .sources(["batch_example_0"]),
        )
        .await
        .unwrap();

    assert_eq!(data["results"], json!([]));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_search_concepts_payload() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_with_body(
            "POST",
            "/search-concepts",
            Matcher::Json(json!({"query": "technology", "limit": 5, "threshold": 0.7})),
            200,
            r#"{"success":true,"data":{"results":[]}}"#,
        )
        .await;

    let client = fixture.client();
    client
        .search_concepts("technology", ConceptSearch::new().limit(5))
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_store_and_deduplicate_triples() {
    let mut fixture = MockServerFixture::new().await;
    let expected = json!({"triples": [
        {"subject": "Rachel", "predicate": "works_at", "object": "Netflix", "type": "entity-entity"}
    ]});
    let store = fixture
        .mock_with_body(
            "POST",
            "/store-triples",
            Matcher::Json(expected.clone()),
            200,
            r#"{"success":true,"data":{"stored":1}}"#,
        )
        .await;
    let dedup = fixture
        .mock_with_body(
            "POST",
            "/deduplicate",
            Matcher::Json(expected),
            200,
            r#"{"success":true,"data":{"duplicates":0}}"#,
        )
        .await;

    let client = fixture.client();
    let triples = vec![Triple::new("Rachel", "works_at", "Netflix").with_type("entity-entity")];

    let stored = client.store_triples(&triples).await.unwrap();
    let deduped = client.deduplicate_triples(&triples).await.unwrap();

    assert_eq!(stored["stored"], 1);
    assert_eq!(deduped["duplicates"], 0);
    store.assert_async().await;
    dedup.assert_async().await;
}

#[tokio::test]
async fn test_http_error_is_not_retried() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/api/stats")
        .with_status(500)
        .with_body(r#"{"success":false,"error":{"message":"database unavailable"}}"#)
        .expect(1)
        .create_async()
        .await;

    let client = fixture.client();
    let err = client.get_stats().await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), "HTTP 500: database unavailable");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_json_error_body_uses_status_message() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .server
        .mock("GET", "/api/health")
        .with_status(404)
        .with_body("Not Found")
        .create_async()
        .await;

    let err = fixture.client().health_check().await.unwrap_err();
    assert!(matches!(err, Error::Http { status: 404, ref message, code: None } if message == "HTTP 404"));
}

#[tokio::test]
async fn test_connection_refused_exhausts_attempts() {
    let client = KgClient::builder()
        .base_url("http://127.0.0.1:1/api")
        .max_attempts(2)
        .backoff(Duration::from_millis(10), Duration::from_millis(10))
        .build()
        .unwrap();

    let err = client.health_check().await.unwrap_err();
    assert!(matches!(err, Error::TransientFailure { attempts: 2, .. }), "{err:?}");

    let report = client.performance_report();
    assert_eq!(report.total_requests, 1);
    assert_eq!(report.total_errors, 1);
    assert_eq!(report.error_rate, 100.0);
}
