//! Typed operation arguments.

pub mod knowledge;

pub use knowledge::{ConceptSearch, EntityQuery, EntityRole, ProcessKnowledge, SearchOptions, Triple};
