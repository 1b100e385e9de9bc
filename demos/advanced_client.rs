//! Advanced Client Example
//!
//! Walks through the client against a running knowledge graph server:
//! 1. Concurrent info calls (health, version, capabilities, metrics)
//! 2. Batch ingestion with bounded concurrency
//! 3. Filtered search
//! 4. Concurrent stats / entities / concept queries
//! 5. Error handling for a request the server rejects
//! 6. Client-side performance report
//!
//! Run with `KG_BASE_URL` pointing at the server (default
//! `http://localhost:3000/api`).

use kg_client::types::{ConceptSearch, EntityQuery, ProcessKnowledge, SearchOptions};
use kg_client::{Error, KgClient};
use serde_json::Value;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kg_client=info".into()),
        )
        .init();

    println!("Knowledge Graph - advanced Rust client example\n");

    let client = KgClient::builder().from_env().build()?;

    if let Err(e) = run(&client).await {
        eprintln!("Critical error: {e:#}");
        if let Some(Error::TransientFailure { .. } | Error::Transport(_)) = e.downcast_ref::<Error>() {
            eprintln!("Make sure the server is running with HTTP transport enabled:");
            eprintln!("   ENABLE_HTTP_TRANSPORT=true pnpm run dev:http");
        }
        return Err(e);
    }

    client.close();
    Ok(())
}

async fn run(client: &KgClient) -> anyhow::Result<()> {
    // 1. Health check and server info
    println!("1. Health check and server info...");
    let (health, version, capabilities, metrics) = tokio::try_join!(
        client.health_check(),
        client.get_version(),
        client.get_capabilities(),
        client.get_metrics(),
    )?;
    println!("   server health: {}", field(&health, "status"));
    println!("   server version: {}", field(&version, "version"));
    let tools: Vec<String> = list(&capabilities, "tools")
        .iter()
        .map(|t| field(t, "name"))
        .collect();
    println!("   available tools: {}", tools.join(", "));
    println!("   server uptime: {}\n", field(&metrics, "uptime"));

    // 2. Batch processing
    println!("2. Batch processing...");
    let texts = vec![
        "Rachel is a data scientist at Netflix. She specializes in recommendation algorithms and machine learning.",
        "Tom works as a DevOps engineer at Spotify. He focuses on Kubernetes and infrastructure automation.",
        "Lisa is a product manager at Airbnb. She works on user experience and growth strategies.",
        "James is a security researcher at Google. He specializes in cryptography and secure systems.",
        "Anna is a frontend developer at Facebook. She works with React and modern web technologies.",
    ];
    let batch = client
        .process_batch(
            texts,
            |text, index| {
                client.process_knowledge(
                    ProcessKnowledge::new(text, format!("batch_example_{index}"))
                        .thread_id("advanced_demo"),
                )
            },
            2,
        )
        .await?;
    for (index, err) in &batch.failures {
        println!("   item {index} failed: {}", err.message);
    }
    println!(
        "   batch completed: {} succeeded, {} failed in {:?}\n",
        batch.success_count(),
        batch.failure_count(),
        batch.execution_time
    );

    // 3. Filtered search
    println!("3. Advanced search...");
    let results = client
        .search_knowledge(
            "data scientist machine learning DevOps Kubernetes",
            SearchOptions::new()
                .limit(10)
                .threshold(0.6)
                .types(["entity-entity", "entity-event"])
                .sources((0..5).map(|i| format!("batch_example_{i}"))),
        )
        .await?;
    let hits = list(&results, "results");
    println!("   found {} results", hits.len());
    for (i, hit) in hits.iter().take(3).enumerate() {
        let triple = &hit["triple"];
        println!(
            "   {}. {} -> {} -> {}",
            i + 1,
            field(triple, "subject"),
            field(triple, "predicate"),
            field(triple, "object")
        );
        println!(
            "      score: {:.3} | type: {}",
            hit["similarity"].as_f64().unwrap_or_default(),
            field(triple, "type")
        );
    }
    println!();

    // 4. Concurrent operations
    println!("4. Concurrent operations...");
    let (stats, entities, concepts) = tokio::try_join!(
        client.get_stats(),
        client.get_entities(EntityQuery::new().limit(20)),
        client.search_concepts(
            "technology software programming",
            ConceptSearch::new().limit(5)
        ),
    )?;
    println!(
        "   graph stats: {} triples, {} concepts",
        field(&stats, "totalTriples"),
        field(&stats, "totalConcepts")
    );
    let top: Vec<String> = list(&entities, "entities")
        .iter()
        .take(3)
        .map(|e| field(e, "entity"))
        .collect();
    println!("   top entities: {}", top.join(", "));
    let related: Vec<String> = list(&concepts, "results")
        .iter()
        .take(3)
        .map(|c| field(&c["concept"], "concept"))
        .collect();
    println!("   related concepts: {}\n", related.join(", "));

    // 5. Error handling
    println!("5. Error handling...");
    match client
        .search_knowledge("", SearchOptions::new().limit(-1).threshold(2.0))
        .await
    {
        Ok(_) => println!("   server accepted the invalid request"),
        Err(e) => println!("   correctly handled invalid request: {e}"),
    }
    println!();

    // 6. Performance statistics
    println!("6. Client performance:");
    for line in client.performance_report().to_string().lines() {
        println!("   {line}");
    }
    println!("\nAdvanced client example completed.");
    Ok(())
}

fn field(value: &Value, key: &str) -> String {
    match &value[key] {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

fn list<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value[key].as_array().map(Vec::as_slice).unwrap_or(&[])
}
