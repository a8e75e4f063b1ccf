use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::context::ContextExtractor;
use super::matcher::{EntityMatcher, MatchStrategy, MatcherConfig};
use super::synthesizer::AnswerSynthesizer;
use crate::core::config::AssistantConfig;
use crate::knowledge::KnowledgeGraph;
use crate::llm::factory::{EmbeddingProviderFactory, LlmProviderFactory};
use crate::llm::providers::base::LlmProvider;

/// Query entry point: match, extract, answer.
///
/// Holds nothing between calls except the shared read-only graph and the
/// components built from it, so one instance can serve concurrent queries.
pub struct BiomedicalRag {
    graph: Arc<KnowledgeGraph>,
    matcher: EntityMatcher,
    extractor: ContextExtractor,
    synthesizer: AnswerSynthesizer,
}

impl BiomedicalRag {
    pub fn new(
        graph: Arc<KnowledgeGraph>,
        strategy: MatchStrategy,
        matcher_config: MatcherConfig,
        provider: Arc<dyn LlmProvider>,
        llm_timeout: Duration,
    ) -> Self {
        Self {
            matcher: EntityMatcher::with_config(&graph, strategy, matcher_config),
            extractor: ContextExtractor::new(Arc::clone(&graph)),
            synthesizer: AnswerSynthesizer::new(provider, llm_timeout),
            graph,
        }
    }

    pub fn from_config(graph: Arc<KnowledgeGraph>, config: &AssistantConfig) -> Self {
        info!("Initializing RAG system");
        Self::new(
            graph,
            EmbeddingProviderFactory::match_strategy(config),
            MatcherConfig::from(config),
            LlmProviderFactory::from_config(config),
            config.llm_timeout(),
        )
    }

    pub fn graph(&self) -> &KnowledgeGraph {
        &self.graph
    }

    pub async fn answer_query(&self, query: &str) -> String {
        let matched = self.matcher.process(query).await;
        let subgraph = self.extractor.retrieve_subgraph(&matched);
        debug!(
            "Query '{}': matched={:?}, subgraph_nodes={}",
            crate::safe_truncate(query, 80),
            matched,
            subgraph.node_count()
        );

        let context = self.extractor.extract_context(&subgraph, query);
        self.synthesizer.generate(query, &context).await
    }
}
