

pub mod graph;
pub mod ingest;
pub mod schema;

pub use graph::{GraphStats, KnowledgeGraph, Neighborhood};
pub use ingest::{DataIngestor, Dataset};
pub use schema::{Entity, EntityLabel, RelationType, Relationship};

use crate::core::error::Result;
use std::path::Path;

/// Ingests `source` and builds the graph in one step.
pub fn load_graph(source: impl AsRef<Path>) -> Result<KnowledgeGraph> {
    let dataset = DataIngestor::ingest(source)?;
    KnowledgeGraph::build(&dataset.diseases, &dataset.symptoms, &dataset.relationships)
}
