use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::knowledge::{EntityLabel, KnowledgeGraph};

pub const NO_INFORMATION: &str = "No relevant information found in the knowledge base.";


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContextRecord {
    pub disease: String,
    pub symptoms: Vec<String>,
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextOutcome {
    /// Nothing was retrieved for the query.
    NoInformation,
    Records(Vec<ContextRecord>),
}

impl ContextOutcome {
    pub fn records(&self) -> &[ContextRecord] {
        match self {
            Self::NoInformation => &[],
            Self::Records(records) => records,
        }
    }
}


pub struct ContextExtractor {
    graph: Arc<KnowledgeGraph>,
}

impl ContextExtractor {
    pub fn new(graph: Arc<KnowledgeGraph>) -> Self {
        Self { graph }
    }

    /// Matched entities plus their direct neighbours, as an induced subgraph.
    pub fn retrieve_subgraph<I>(&self, matched: I) -> KnowledgeGraph
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut nodes: HashSet<String> = HashSet::new();
        for entity in matched {
            let entity = entity.as_ref();
            if !self.graph.contains(entity) {
                continue;
            }
            nodes.insert(entity.to_string());
            nodes.extend(self.graph.neighbors(entity));
        }
        self.graph.induced_subgraph(&nodes)
    }

    pub fn extract_context(&self, subgraph: &KnowledgeGraph, query: &str) -> ContextOutcome {
        if subgraph.is_empty() {
            return ContextOutcome::NoInformation;
        }

        let query_lower = query.to_lowercase();
        let mut records: Vec<ContextRecord> = self
            .graph
            .nodes_by_label(EntityLabel::Disease)
            .into_iter()
            .filter(|disease| {
                disease
                    .to_lowercase()
                    .split_whitespace()
                    .any(|word| query_lower.contains(word))
            })
            .filter_map(|disease| record(&self.graph, disease))
            .collect();

        if records.is_empty() {
            debug!("No disease named in query, using subgraph-local facts");
            records = subgraph
                .nodes_by_label(EntityLabel::Disease)
                .into_iter()
                .filter_map(|disease| record(subgraph, disease))
                .collect();
        }

        debug!("Extracted {} context records", records.len());
        ContextOutcome::Records(records)
    }
}

fn record(graph: &KnowledgeGraph, disease: String) -> Option<ContextRecord> {
    let symptoms = graph.symptoms_of(&disease);
    (!symptoms.is_empty()).then_some(ContextRecord { disease, symptoms })
}

/// Renders records as the `Disease:` / `Symptoms:` block list shared by the
/// prompt and the rule-based answer.
pub fn format_context(records: &[ContextRecord]) -> String {
    let mut out = String::from("Knowledge Base Information:\n\n");
    out.push_str(&format_records(records));
    out
}

pub(crate) fn format_records(records: &[ContextRecord]) -> String {
    records
        .iter()
        .map(|r| format!("Disease: {}\nSymptoms: {}\n\n", r.disease, r.symptoms.join(", ")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::Relationship;

    fn extractor() -> ContextExtractor {
        let relationships = vec![
            Relationship::has_symptom("Diabetes", "Fever"),
            Relationship::has_symptom("Diabetes", "Fatigue"),
            Relationship::has_symptom("Hypertension", "Headache"),
            Relationship::has_symptom("Hypertension", "Chest Pain"),
            Relationship::has_symptom("Malaria", "Fever"),
            Relationship::has_symptom("Malaria", "Headache"),
        ];
        let graph = KnowledgeGraph::build(
            ["Diabetes", "Hypertension", "Malaria", "Common Cold"],
            ["Chest Pain", "Fatigue", "Fever", "Headache"],
            &relationships,
        )
        .unwrap();
        ContextExtractor::new(Arc::new(graph))
    }

    fn names(graph: &KnowledgeGraph) -> HashSet<String> {
        graph.entities().map(|e| e.name.clone()).collect()
    }

    #[test]
    fn test_subgraph_is_one_hop_neighbourhood() {
        let ex = extractor();
        let sub = ex.retrieve_subgraph(["Diabetes"]);
        let expected: HashSet<String> =
            ["Diabetes", "Fever", "Fatigue"].iter().map(|s| s.to_string()).collect();
        assert_eq!(names(&sub), expected);
        assert_eq!(sub.edge_count(), 2);
    }

    #[test]
    fn test_symptom_subgraph_pulls_diseases() {
        let ex = extractor();
        let sub = ex.retrieve_subgraph(["Headache"]);
        let expected: HashSet<String> =
            ["Headache", "Hypertension", "Malaria"].iter().map(|s| s.to_string()).collect();
        assert_eq!(names(&sub), expected);
    }

    #[test]
    fn test_unknown_entities_yield_empty_subgraph() {
        let ex = extractor();
        assert!(ex.retrieve_subgraph(["Scurvy"]).is_empty());
        assert!(ex.retrieve_subgraph(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn test_empty_subgraph_is_sentinel() {
        let ex = extractor();
        let outcome = ex.extract_context(&KnowledgeGraph::empty(), "diabetes");
        assert_eq!(outcome, ContextOutcome::NoInformation);
        assert!(outcome.records().is_empty());
    }

    #[test]
    fn test_primary_path_uses_full_graph_symptoms() {
        let ex = extractor();
        // the subgraph only holds Fever, the record still lists both symptoms
        let sub = ex.retrieve_subgraph(["Fever"]).induced_subgraph(["Diabetes", "Fever"]);
        let outcome = ex.extract_context(&sub, "what are diabetes symptoms?");
        assert_eq!(
            outcome.records(),
            &[ContextRecord {
                disease: "Diabetes".to_string(),
                symptoms: vec!["Fever".to_string(), "Fatigue".to_string()],
            }]
        );
    }

    #[test]
    fn test_diseases_without_symptoms_dropped() {
        let ex = extractor();
        let sub = ex.retrieve_subgraph(["Common Cold"]);
        assert_eq!(sub.node_count(), 1);
        assert_eq!(ex.extract_context(&sub, "common cold"), ContextOutcome::Records(vec![]));
    }

    #[test]
    fn test_falls_back_to_subgraph_edges() {
        let ex = extractor();
        let sub = ex.retrieve_subgraph(["Headache"]).induced_subgraph(["Headache", "Malaria"]);
        let outcome = ex.extract_context(&sub, "pounding head pain");
        assert_eq!(
            outcome.records(),
            &[ContextRecord {
                disease: "Malaria".to_string(),
                symptoms: vec!["Headache".to_string()],
            }]
        );
    }

    #[test]
    fn test_format_context_blocks() {
        let text = format_context(&[ContextRecord {
            disease: "Flu".to_string(),
            symptoms: vec!["Fever".to_string(), "Cough".to_string()],
        }]);
        assert_eq!(text, "Knowledge Base Information:\n\nDisease: Flu\nSymptoms: Fever, Cough\n\n");
    }
}
