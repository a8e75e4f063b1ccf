use std::sync::Arc;
use tracing::warn;

use super::embeddings::{EmbeddingGenerator, TextEmbedder};
use super::providers::base::LlmProvider;
use super::providers::null::NullProvider;
use super::providers::ollama::OllamaProvider;
use crate::core::config::AssistantConfig;
use crate::core::error::{AssistantError, Result};
use crate::rag::matcher::MatchStrategy;
use crate::{DEFAULT_CACHE_SIZE, DEFAULT_CACHE_TTL};


pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Builds the configured generative backend. Anything that cannot be
    /// constructed degrades to [`NullProvider`].
    #[must_use]
    pub fn from_config(config: &AssistantConfig) -> Arc<dyn LlmProvider> {
        if !config.llm_enabled {
            return Arc::new(NullProvider::new("LLM disabled by configuration"));
        }

        match config.llm_provider.as_str() {
            "ollama" => match OllamaProvider::new(
                config.llm_base_url.clone(),
                config.llm_model.clone(),
                config.llm_temperature,
                config.llm_timeout(),
            ) {
                Ok(provider) => Arc::new(provider),
                Err(e) => {
                    warn!("LLM not initialized, using rule-based responses: {}", e);
                    Arc::new(NullProvider::new(e.to_string()))
                }
            },
            "none" => Arc::new(NullProvider::new("no LLM provider configured")),
            other => {
                warn!("Unknown LLM provider '{}', using rule-based responses", other);
                Arc::new(NullProvider::new(format!("unknown provider: {other}")))
            }
        }
    }
}


pub struct EmbeddingProviderFactory;

impl EmbeddingProviderFactory {

    pub fn from_config(config: &AssistantConfig) -> Result<EmbeddingGenerator> {
        match config.embedding_provider.as_str() {
            "ollama" | "openai" => Ok(EmbeddingGenerator::new(
                config.embedding_provider.clone(),
                config.embedding_url.clone(),
                config.embedding_model.clone(),
                config.embedding_api_key.clone(),
                config.embedding_timeout_secs,
                DEFAULT_CACHE_SIZE,
                DEFAULT_CACHE_TTL,
            )?),
            other => Err(AssistantError::Config(format!(
                "unsupported embedding provider '{other}' (expected ollama or openai)"
            ))),
        }
    }

    /// Semantic fallback when an embedder can be built, fuzzy-only otherwise.
    #[must_use]
    pub fn match_strategy(config: &AssistantConfig) -> MatchStrategy {
        if !config.semantic_matching_enabled {
            return MatchStrategy::FuzzyOnly;
        }
        match Self::from_config(config) {
            Ok(generator) => {
                let embedder: Arc<dyn TextEmbedder> = Arc::new(generator);
                MatchStrategy::WithSemanticFallback(embedder)
            }
            Err(e) => {
                warn!("Semantic matching unavailable, using fuzzy-only matching: {}", e);
                MatchStrategy::FuzzyOnly
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_llm_is_null_provider() {
        let mut config = AssistantConfig::default();
        config.llm_enabled = false;
        let provider = LlmProviderFactory::from_config(&config);
        assert!(!provider.is_available());
        assert_eq!(provider.provider_name(), "none");
    }

    #[test]
    fn test_ollama_provider_from_config() {
        let provider = LlmProviderFactory::from_config(&AssistantConfig::default());
        assert!(provider.is_available());
        assert_eq!(provider.provider_name(), "ollama");
        assert_eq!(provider.model_name(), crate::DEFAULT_LLM_MODEL);
    }

    #[test]
    fn test_unknown_llm_provider_degrades() {
        let mut config = AssistantConfig::default();
        config.llm_provider = "cerebras".to_string();
        assert!(!LlmProviderFactory::from_config(&config).is_available());
    }

    #[test]
    fn test_match_strategy_selection() {
        let mut config = AssistantConfig::default();
        assert_eq!(EmbeddingProviderFactory::match_strategy(&config).name(), "semantic");

        config.embedding_provider = "word2vec".to_string();
        assert!(matches!(
            EmbeddingProviderFactory::from_config(&config),
            Err(AssistantError::Config(_))
        ));
        assert_eq!(EmbeddingProviderFactory::match_strategy(&config).name(), "fuzzy-only");

        config.embedding_provider = "ollama".to_string();
        config.semantic_matching_enabled = false;
        assert_eq!(EmbeddingProviderFactory::match_strategy(&config).name(), "fuzzy-only");
    }
}
