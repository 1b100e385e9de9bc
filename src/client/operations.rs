//! Named knowledge graph operations. Each builds a [`RequestSpec`] and goes
//! through [`KgClient::execute`].

use crate::protocol::RequestSpec;
use crate::types::{ConceptSearch, EntityQuery, ProcessKnowledge, SearchOptions};
use crate::Result;
use serde::Serialize;
use serde_json::{json, Value};

use super::core::KgClient;

impl KgClient {
    /// `GET /health`
    pub async fn health_check(&self) -> Result<Value> {
        self.execute(RequestSpec::get("/health")).await
    }

    /// Extract entities, relationships and concepts from free text.
    pub async fn process_knowledge(&self, input: ProcessKnowledge) -> Result<Value> {
        self.execute(RequestSpec::post("/process-knowledge", input.to_payload()))
            .await
    }

    /// Semantic search over stored knowledge.
    pub async fn search_knowledge(&self, query: &str, options: SearchOptions) -> Result<Value> {
        self.execute(RequestSpec::post(
            "/search-knowledge",
            options.to_payload(query),
        ))
        .await
    }

    /// Semantic search over conceptual abstractions.
    pub async fn search_concepts(&self, query: &str, options: ConceptSearch) -> Result<Value> {
        self.execute(RequestSpec::post(
            "/search-concepts",
            options.to_payload(query),
        ))
        .await
    }

    /// Store pre-structured triples.
    pub async fn store_triples<T: Serialize>(&self, triples: &[T]) -> Result<Value> {
        let payload = json!({ "triples": serde_json::to_value(triples)? });
        self.execute(RequestSpec::post("/store-triples", payload))
            .await
    }

    pub async fn deduplicate_triples<T: Serialize>(&self, triples: &[T]) -> Result<Value> {
        let payload = json!({ "triples": serde_json::to_value(triples)? });
        self.execute(RequestSpec::post("/deduplicate", payload)).await
    }

    /// `GET /stats` (server-side knowledge graph statistics).
    pub async fn get_stats(&self) -> Result<Value> {
        self.execute(RequestSpec::get("/stats")).await
    }

    pub async fn get_entities(&self, query: EntityQuery) -> Result<Value> {
        let request = query
            .to_query()
            .into_iter()
            .fold(RequestSpec::get("/entities"), |req, (k, v)| {
                req.with_query(k, v)
            });
        self.execute(request).await
    }

    pub async fn get_version(&self) -> Result<Value> {
        self.execute(RequestSpec::get("/version")).await
    }

    pub async fn get_metrics(&self) -> Result<Value> {
        self.execute(RequestSpec::get("/metrics")).await
    }

    pub async fn get_capabilities(&self) -> Result<Value> {
        self.execute(RequestSpec::get("/capabilities")).await
    }
}
