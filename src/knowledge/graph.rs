use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use super::schema::{Entity, EntityLabel, RelationType, Relationship};
use crate::core::error::{AssistantError, Result};


#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphStats {
    pub diseases: usize,
    pub symptoms: usize,
    pub edges: usize,
}


#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Neighborhood {
    pub diseases: Vec<String>,
    pub symptoms: Vec<String>,
}

impl Neighborhood {
    pub fn len(&self) -> usize {
        self.diseases.len() + self.symptoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diseases.is_empty() && self.symptoms.is_empty()
    }
}

/// Undirected disease/symptom graph.
///
/// Nodes are keyed by `(label, name)` so a disease and a symptom spelled the
/// same way stay distinct; name-based lookups visit every node carrying the
/// name. Node and edge indices follow insertion order and the graph is never
/// mutated after [`KnowledgeGraph::build`] returns.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    graph: UnGraph<Entity, RelationType>,
    index: HashMap<(EntityLabel, String), NodeIndex>,
}

impl KnowledgeGraph {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn build<D, S>(diseases: D, symptoms: S, relationships: &[Relationship]) -> Result<Self>
    where
        D: IntoIterator,
        D::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        let mut kg = Self::empty();

        for disease in diseases {
            kg.add_entity(disease.as_ref(), EntityLabel::Disease)?;
        }
        for symptom in symptoms {
            kg.add_entity(symptom.as_ref(), EntityLabel::Symptom)?;
        }

        for rel in relationships {
            let (disease, symptom) = rel.disease_symptom();
            let d = kg.add_entity(disease, EntityLabel::Disease)?;
            let s = kg.add_entity(symptom, EntityLabel::Symptom)?;
            // update_edge reuses an existing d-s edge in either direction
            kg.graph.update_edge(d, s, RelationType::HasSymptom);
        }

        info!(
            "Knowledge graph built: nodes={}, edges={}, relationships={}",
            kg.node_count(),
            kg.edge_count(),
            relationships.len()
        );

        Ok(kg)
    }

    fn add_entity(&mut self, name: &str, label: EntityLabel) -> Result<NodeIndex> {
        if name.trim().is_empty() {
            return Err(AssistantError::TypeMismatch(format!(
                "{label} names must be non-empty strings"
            )));
        }

        let key = (label, name.to_string());
        if let Some(&idx) = self.index.get(&key) {
            return Ok(idx);
        }

        let idx = self.graph.add_node(Entity::new(name, label));
        self.index.insert(key, idx);
        Ok(idx)
    }

    fn nodes_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = NodeIndex> + 'a {
        [EntityLabel::Disease, EntityLabel::Symptom]
            .into_iter()
            .filter_map(move |label| self.index.get(&(label, name.to_string())).copied())
    }

    /// Neighbours of `node` ordered by edge insertion.
    fn ordered_neighbors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<_> = self
            .graph
            .edges(node)
            .map(|e| (e.id(), if e.source() == node { e.target() } else { e.source() }))
            .collect();
        edges.sort_by_key(|(id, _)| *id);
        edges.into_iter().map(|(_, other)| other).collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes_named(name).next().is_some()
    }

    pub fn labels_of(&self, name: &str) -> Vec<EntityLabel> {
        self.nodes_named(name).map(|idx| self.graph[idx].label).collect()
    }

    /// Entity called `name`. A disease wins over a symptom of the same name.
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.nodes_named(name).next().map(|idx| &self.graph[idx])
    }

    pub fn label_of(&self, name: &str) -> Option<EntityLabel> {
        self.entity(name).map(|e| e.label)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    pub fn neighbors(&self, name: &str) -> HashSet<String> {
        self.nodes_named(name)
            .flat_map(|idx| self.graph.neighbors(idx))
            .map(|n| self.graph[n].name.clone())
            .collect()
    }

    pub fn nodes_by_label(&self, label: EntityLabel) -> Vec<String> {
        self.entities()
            .filter(|e| e.label == label)
            .map(|e| e.name.clone())
            .collect()
    }

    /// Symptoms linked to `disease`, in the order their edges were added.
    pub fn symptoms_of(&self, disease: &str) -> Vec<String> {
        let Some(&idx) = self.index.get(&(EntityLabel::Disease, disease.to_string())) else {
            return Vec::new();
        };

        self.ordered_neighbors(idx)
            .into_iter()
            .filter(|&n| self.graph[n].label == EntityLabel::Symptom)
            .map(|n| self.graph[n].name.clone())
            .collect()
    }

    /// `(disease, symptom, relation)` triples in insertion order.
    pub fn edges(&self) -> Vec<(String, String, RelationType)> {
        self.graph
            .edge_references()
            .map(|e| {
                (
                    self.graph[e.source()].name.clone(),
                    self.graph[e.target()].name.clone(),
                    *e.weight(),
                )
            })
            .collect()
    }

    /// Keeps nodes whose name is in `names` and the edges between them.
    pub fn induced_subgraph<I>(&self, names: I) -> KnowledgeGraph
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let keep: HashSet<String> = names.into_iter().map(|n| n.as_ref().to_string()).collect();

        let mut sub = KnowledgeGraph::empty();
        let mut remap: HashMap<NodeIndex, NodeIndex> = HashMap::new();

        for idx in self.graph.node_indices() {
            let entity = &self.graph[idx];
            if keep.contains(&entity.name) {
                let new_idx = sub.graph.add_node(entity.clone());
                sub.index.insert((entity.label, entity.name.clone()), new_idx);
                remap.insert(idx, new_idx);
            }
        }

        for edge in self.graph.edge_references() {
            if let (Some(&a), Some(&b)) = (remap.get(&edge.source()), remap.get(&edge.target())) {
                sub.graph.add_edge(a, b, *edge.weight());
            }
        }

        debug!(
            "Induced subgraph: requested={}, nodes={}, edges={}",
            keep.len(),
            sub.node_count(),
            sub.edge_count()
        );

        sub
    }

    pub fn stats(&self) -> GraphStats {
        let diseases = self.entities().filter(|e| e.label == EntityLabel::Disease).count();
        GraphStats {
            diseases,
            symptoms: self.node_count() - diseases,
            edges: self.edge_count(),
        }
    }

    /// Case-insensitive substring search over every entity plus the 1-hop
    /// neighbourhood of each hit.
    pub fn search_neighborhood(&self, term: &str) -> Neighborhood {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return Neighborhood::default();
        }

        let mut members: HashSet<NodeIndex> = HashSet::new();
        for idx in self.graph.node_indices() {
            if self.graph[idx].name.to_lowercase().contains(&term) {
                members.insert(idx);
                members.extend(self.graph.neighbors(idx));
            }
        }

        let mut hood = Neighborhood::default();
        for idx in self.graph.node_indices().filter(|idx| members.contains(idx)) {
            let entity = &self.graph[idx];
            match entity.label {
                EntityLabel::Disease => hood.diseases.push(entity.name.clone()),
                EntityLabel::Symptom => hood.symptoms.push(entity.name.clone()),
            }
        }
        hood
    }
}
