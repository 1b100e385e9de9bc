//! Typed arguments for the knowledge graph operations.
//!
//! Each type turns into the JSON payload (or query string) the server
//! expects. Defaults mirror the server's documented defaults.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Text to extract knowledge from.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessKnowledge {
    pub text: String,
    pub source: String,
    pub thread_id: Option<String>,
    /// ISO-8601 timestamp; defaults to "now" (UTC) when the payload is built.
    pub conversation_date: Option<String>,
    pub include_concepts: bool,
    pub deduplicate: bool,
    pub processing_batch_id: Option<String>,
}

impl ProcessKnowledge {
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
            thread_id: None,
            conversation_date: None,
            include_concepts: true,
            deduplicate: true,
            processing_batch_id: None,
        }
    }

    pub fn thread_id(mut self, id: impl Into<String>) -> Self {
        self.thread_id = Some(id.into());
        self
    }

    pub fn conversation_date(mut self, date: impl Into<String>) -> Self {
        self.conversation_date = Some(date.into());
        self
    }

    pub fn include_concepts(mut self, include: bool) -> Self {
        self.include_concepts = include;
        self
    }

    pub fn deduplicate(mut self, dedup: bool) -> Self {
        self.deduplicate = dedup;
        self
    }

    pub fn processing_batch_id(mut self, id: impl Into<String>) -> Self {
        self.processing_batch_id = Some(id.into());
        self
    }

    pub fn to_payload(&self) -> Value {
        let mut body = json!({
            "text": self.text,
            "source": self.source,
            "include_concepts": self.include_concepts,
            "deduplicate": self.deduplicate,
        });
        if let Some(thread_id) = non_empty(&self.thread_id) {
            body["thread_id"] = json!(thread_id);
        }
        let date = match non_empty(&self.conversation_date) {
            Some(d) => d.to_string(),
            None => Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        body["conversation_date"] = json!(date);
        if let Some(batch_id) = non_empty(&self.processing_batch_id) {
            body["processing_batch_id"] = json!(batch_id);
        }
        body
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Options for `/search-knowledge`.
///
/// `limit` and `threshold` are passed through unchecked; the server owns
/// parameter validation.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub limit: i64,
    pub threshold: f64,
    pub types: Vec<String>,
    pub sources: Vec<String>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: 10,
            threshold: 0.7,
            types: Vec::new(),
            sources: Vec::new(),
        }
    }
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }
    pub fn types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }
    pub fn sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }

    pub fn to_payload(&self, query: &str) -> Value {
        let mut body = json!({
            "query": query,
            "limit": self.limit,
            "threshold": self.threshold,
        });
        if !self.types.is_empty() {
            body["types"] = json!(self.types);
        }
        if !self.sources.is_empty() {
            body["sources"] = json!(self.sources);
        }
        body
    }
}

/// Options for `/search-concepts`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConceptSearch {
    pub limit: i64,
    pub threshold: f64,
}

impl Default for ConceptSearch {
    fn default() -> Self {
        Self {
            limit: 10,
            threshold: 0.7,
        }
    }
}

impl ConceptSearch {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn to_payload(&self, query: &str) -> Value {
        json!({
            "query": query,
            "limit": self.limit,
            "threshold": self.threshold,
        })
    }
}

/// Which side of a triple an entity must appear on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityRole {
    Subject,
    Object,
    #[default]
    Both,
}

impl EntityRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityRole::Subject => "subject",
            EntityRole::Object => "object",
            EntityRole::Both => "both",
        }
    }
}

impl std::str::FromStr for EntityRole {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "subject" => Ok(EntityRole::Subject),
            "object" => Ok(EntityRole::Object),
            "both" => Ok(EntityRole::Both),
            other => Err(format!("unknown entity role: {other}")),
        }
    }
}

/// Query for `/entities`.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityQuery {
    pub role: EntityRole,
    pub min_occurrence: u32,
    pub limit: u32,
    pub sort_by: String,
    pub sources: Vec<String>,
    pub types: Vec<String>,
}

impl Default for EntityQuery {
    fn default() -> Self {
        Self {
            role: EntityRole::Both,
            min_occurrence: 1,
            limit: 100,
            sort_by: "frequency".to_string(),
            sources: Vec::new(),
            types: Vec::new(),
        }
    }
}

impl EntityQuery {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn role(mut self, role: EntityRole) -> Self {
        self.role = role;
        self
    }
    pub fn min_occurrence(mut self, n: u32) -> Self {
        self.min_occurrence = n;
        self
    }
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
    pub fn sort_by(mut self, sort_by: impl Into<String>) -> Self {
        self.sort_by = sort_by.into();
        self
    }
    pub fn sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }
    pub fn types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Query parameters in the order the server documents them. List
    /// filters are comma-joined and omitted when empty.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("role".to_string(), self.role.as_str().to_string()),
            ("min_occurrence".to_string(), self.min_occurrence.to_string()),
            ("limit".to_string(), self.limit.to_string()),
            ("sort_by".to_string(), self.sort_by.clone()),
        ];
        if !self.sources.is_empty() {
            params.push(("sources".to_string(), self.sources.join(",")));
        }
        if !self.types.is_empty() {
            params.push(("types".to_string(), self.types.join(",")));
        }
        params
    }
}

/// A pre-structured knowledge triple for `/store-triples` and `/deduplicate`.
///
/// Fields the client does not model are kept in `extra` and sent back
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub triple_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Triple {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            triple_type: None,
            source: None,
            extra: Map::new(),
        }
    }

    pub fn with_type(mut self, triple_type: impl Into<String>) -> Self {
        self.triple_type = Some(triple_type.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}
