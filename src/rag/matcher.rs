use lazy_static::lazy_static;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::similarity::similarity;
use crate::core::config::AssistantConfig;
use crate::knowledge::{EntityLabel, KnowledgeGraph};
use crate::llm::embeddings::{batch_cosine_similarity, EmbeddingError, TextEmbedder};

lazy_static! {
    static ref STOP_WORDS: HashSet<&'static str> = [
        "symptoms", "symptom", "disease", "condition", "is", "what", "are", "of", "the", "for",
    ]
    .into_iter()
    .collect();
}

/// Query tokens shorter than this never take part in fuzzy matching.
const MIN_FUZZY_TOKEN_LEN: usize = 4;

pub type MatchedSet = BTreeSet<String>;


#[derive(Debug, Clone, PartialEq)]
pub struct MatcherConfig {
    pub fuzzy_threshold: f64,
    pub relaxed_fuzzy_threshold: f64,
    pub semantic_threshold: f64,
    pub max_semantic_matches: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.7,
            relaxed_fuzzy_threshold: 0.6,
            semantic_threshold: 0.3,
            max_semantic_matches: 3,
        }
    }
}

impl From<&AssistantConfig> for MatcherConfig {
    fn from(config: &AssistantConfig) -> Self {
        Self {
            fuzzy_threshold: config.fuzzy_threshold,
            relaxed_fuzzy_threshold: config.relaxed_fuzzy_threshold,
            semantic_threshold: config.semantic_threshold,
            max_semantic_matches: config.max_semantic_matches,
        }
    }
}

/// What to do when the lexical tiers find nothing.
#[derive(Clone)]
pub enum MatchStrategy {
    /// Rank diseases by embedding similarity to the query.
    WithSemanticFallback(Arc<dyn TextEmbedder>),
    /// Re-scan every disease with the relaxed fuzzy threshold.
    FuzzyOnly,
}

impl MatchStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::WithSemanticFallback(_) => "semantic",
            Self::FuzzyOnly => "fuzzy-only",
        }
    }
}

/// Resolves free text to graph entity names.
///
/// Tiers, all unioned:
/// 1. disease names containing any lowercased query token;
/// 2. fuzzy token/name similarity for diseases tier 1 missed;
/// 3. symptom names containing any query token;
/// 4. only if 1-3 found nothing, the strategy's fallback.
pub struct EntityMatcher {
    diseases: Vec<String>,
    diseases_lower: Vec<String>,
    symptoms: Vec<String>,
    symptoms_lower: Vec<String>,
    strategy: MatchStrategy,
    config: MatcherConfig,
    disease_embeddings: OnceCell<Vec<Vec<f32>>>,
}

impl EntityMatcher {
    pub fn new(graph: &KnowledgeGraph, strategy: MatchStrategy) -> Self {
        Self::with_config(graph, strategy, MatcherConfig::default())
    }

    pub fn with_config(graph: &KnowledgeGraph, strategy: MatchStrategy, config: MatcherConfig) -> Self {
        let diseases = graph.nodes_by_label(EntityLabel::Disease);
        let symptoms = graph.nodes_by_label(EntityLabel::Symptom);
        info!(
            "EntityMatcher ready: diseases={}, symptoms={}, strategy={}",
            diseases.len(),
            symptoms.len(),
            strategy.name()
        );

        Self {
            diseases_lower: diseases.iter().map(|d| d.to_lowercase()).collect(),
            symptoms_lower: symptoms.iter().map(|s| s.to_lowercase()).collect(),
            diseases,
            symptoms,
            strategy,
            config,
            disease_embeddings: OnceCell::new(),
        }
    }

    pub fn strategy(&self) -> &MatchStrategy {
        &self.strategy
    }

    pub async fn process(&self, query: &str) -> MatchedSet {
        let tokens = tokenize(query);
        let mut matched = MatchedSet::new();

        let mut disease_hit = vec![false; self.diseases.len()];
        for (i, name) in self.diseases_lower.iter().enumerate() {
            if contains_any(name, &tokens) {
                disease_hit[i] = true;
                matched.insert(self.diseases[i].clone());
            }
        }

        let fuzzy_tokens: Vec<&str> = tokens
            .iter()
            .map(String::as_str)
            .filter(|t| t.chars().count() >= MIN_FUZZY_TOKEN_LEN && !STOP_WORDS.contains(*t))
            .collect();
        for (i, name) in self.diseases_lower.iter().enumerate() {
            if !disease_hit[i]
                && fuzzy_tokens
                    .iter()
                    .any(|t| similarity(t, name) > self.config.fuzzy_threshold)
            {
                matched.insert(self.diseases[i].clone());
            }
        }

        for (i, name) in self.symptoms_lower.iter().enumerate() {
            if contains_any(name, &tokens) {
                matched.insert(self.symptoms[i].clone());
            }
        }

        if matched.is_empty() {
            let fallback = match &self.strategy {
                MatchStrategy::WithSemanticFallback(embedder) => {
                    self.semantic_matches(embedder.as_ref(), query).await
                }
                MatchStrategy::FuzzyOnly => self.relaxed_fuzzy_matches(&tokens),
            };
            debug!("Lexical tiers empty, {} fallback found {}", self.strategy.name(), fallback.len());
            matched.extend(fallback);
        }

        debug!("Matched {} entities for query '{}'", matched.len(), crate::safe_truncate(query, 80));
        matched
    }

    fn relaxed_fuzzy_matches(&self, tokens: &[String]) -> Vec<String> {
        let long_tokens: Vec<&str> = tokens
            .iter()
            .map(String::as_str)
            .filter(|t| t.chars().count() >= MIN_FUZZY_TOKEN_LEN)
            .collect();

        self.diseases_lower
            .iter()
            .zip(&self.diseases)
            .filter(|(lower, _)| {
                long_tokens
                    .iter()
                    .any(|t| similarity(t, lower) > self.config.relaxed_fuzzy_threshold)
            })
            .map(|(_, name)| name.clone())
            .collect()
    }

    async fn semantic_matches(&self, embedder: &dyn TextEmbedder, query: &str) -> Vec<String> {
        if self.diseases.is_empty() || self.config.max_semantic_matches == 0 {
            return Vec::new();
        }

        let query_embedding = match embedder.embed(query).await {
            Ok(v) => v,
            Err(e) => {
                warn!("Query embedding failed, skipping semantic tier: {}", e);
                return Vec::new();
            }
        };

        let disease_embeddings = match self
            .disease_embeddings
            .get_or_try_init(|| self.embed_diseases(embedder))
            .await
        {
            Ok(v) => v,
            Err(e) => {
                warn!("Disease embeddings unavailable, skipping semantic tier: {}", e);
                return Vec::new();
            }
        };

        let mut ranked: Vec<(usize, f64)> = batch_cosine_similarity(&query_embedding, disease_embeddings)
            .into_iter()
            .enumerate()
            .collect();
        // stable sort: equal scores stay in disease-list order
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        ranked
            .into_iter()
            .take(self.config.max_semantic_matches)
            .filter(|(_, score)| *score > self.config.semantic_threshold)
            .map(|(i, score)| {
                debug!("Semantic match {} ({:.3})", self.diseases[i], score);
                self.diseases[i].clone()
            })
            .collect()
    }

    async fn embed_diseases(&self, embedder: &dyn TextEmbedder) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        info!(
            "Embedding {} disease names with {}",
            self.diseases.len(),
            embedder.model_name()
        );
        let mut embeddings = Vec::with_capacity(self.diseases.len());
        for disease in &self.diseases {
            embeddings.push(embedder.embed(&format!("Disease: {disease}")).await?);
        }
        Ok(embeddings)
    }
}

fn tokenize(query: &str) -> Vec<String> {
    query.to_lowercase().split_whitespace().map(str::to_string).collect()
}

fn contains_any(name_lower: &str, tokens: &[String]) -> bool {
    tokens.iter().any(|t| name_lower.contains(t.as_str()))
}
