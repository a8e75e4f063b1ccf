use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use biomed_assistant::knowledge::{KnowledgeGraph, Relationship};
use biomed_assistant::llm::embeddings::EmbeddingError;
use biomed_assistant::llm::providers::{LlmMetadata, LlmProvider, LlmProviderError};
use biomed_assistant::llm::TextEmbedder;
use biomed_assistant::rag::{BiomedicalRag, MatchStrategy, MatcherConfig};

struct KeywordEmbedder;

#[async_trait]
impl TextEmbedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let text = text.to_lowercase();
        let axis = |words: &[&str]| if words.iter().any(|w| text.contains(w)) { 1.0_f32 } else { 0.0 };
        Ok(vec![
            axis(&["sugar", "diabetes"]),
            axis(&["blood pressure", "hypertension"]),
            0.1,
        ])
    }

    fn model_name(&self) -> &str {
        "keyword"
    }
}

struct EchoProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl LlmProvider for EchoProvider {
    async fn generate(
        &self,
        _system_prompt: &str,
        user_prompt: &str,
    ) -> Result<(String, LlmMetadata), LlmProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let facts: Vec<&str> = user_prompt.lines().filter(|l| l.starts_with("Disease:")).collect();
        Ok((format!("According to the knowledge base: {}", facts.join("; ")), LlmMetadata::default()))
    }

    fn provider_name(&self) -> &str {
        "echo"
    }

    fn model_name(&self) -> &str {
        "echo"
    }
}

fn graph() -> Arc<KnowledgeGraph> {
    let relationships = vec![
        Relationship::has_symptom("Diabetes", "Frequent Urination"),
        Relationship::has_symptom("Diabetes", "Thirst"),
        Relationship::has_symptom("Hypertension", "Headache"),
    ];
    Arc::new(
        KnowledgeGraph::build(
            ["Diabetes", "Hypertension"],
            ["Frequent Urination", "Thirst", "Headache"],
            &relationships,
        )
        .unwrap(),
    )
}

#[tokio::test]
async fn test_semantic_match_feeds_generative_answer() {
    let provider = Arc::new(EchoProvider {
        calls: AtomicUsize::new(0),
    });
    let rag = BiomedicalRag::new(
        graph(),
        MatchStrategy::WithSemanticFallback(Arc::new(KeywordEmbedder)),
        MatcherConfig::default(),
        provider.clone(),
        Duration::from_secs(5),
    );

    let answer = rag.answer_query("too much sugar").await;
    assert_eq!(answer, "According to the knowledge base: Disease: Diabetes");
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_sentinel_bypasses_generative_backend() {
    let provider = Arc::new(EchoProvider {
        calls: AtomicUsize::new(0),
    });
    let rag = BiomedicalRag::new(
        graph(),
        MatchStrategy::WithSemanticFallback(Arc::new(KeywordEmbedder)),
        MatcherConfig::default(),
        provider.clone(),
        Duration::from_secs(5),
    );

    // every disease scores below the semantic threshold
    let answer = rag.answer_query("zzzz qqqq").await;
    assert_eq!(answer, biomed_assistant::rag::NO_INFORMATION);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}
