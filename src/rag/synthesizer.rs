use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::context::{format_context, format_records, ContextOutcome, ContextRecord, NO_INFORMATION};
use crate::core::error::{AssistantError, Result};
use crate::llm::providers::base::LlmProvider;

pub const SYSTEM_PROMPT: &str = r#"You are a helpful medical assistant providing information about diseases and symptoms.
Use ONLY the information provided in the knowledge base to answer the query.
If the information is not in the knowledge base, acknowledge that you don't have that information.
Format your response in a clear, concise manner."#;

pub const FALLBACK_PREAMBLE: &str = "Here's what I found related to your query:\n\n";

pub const FALLBACK_EMPTY: &str = "No relevant information found.";


pub fn build_answer_prompt(query: &str, records: &[ContextRecord]) -> String {
    format!(
        "Query: {query}\n\n{context}Answer:",
        context = format_context(records)
    )
}

/// Deterministic answer carrying exactly the facts in `records`.
pub fn rule_based_answer(records: &[ContextRecord]) -> String {
    let mut answer = String::from(FALLBACK_PREAMBLE);
    if records.is_empty() {
        answer.push_str(FALLBACK_EMPTY);
    } else {
        answer.push_str(&format_records(records));
    }
    answer
}


pub struct AnswerSynthesizer {
    provider: Arc<dyn LlmProvider>,
    timeout: Duration,
}

impl AnswerSynthesizer {
    pub fn new(provider: Arc<dyn LlmProvider>, timeout: Duration) -> Self {
        if provider.is_available() {
            info!(
                "AnswerSynthesizer using {} ({}), timeout={:?}",
                provider.provider_name(),
                provider.model_name(),
                timeout
            );
        } else {
            info!("AnswerSynthesizer has no generative backend, using rule-based answers");
        }
        Self { provider, timeout }
    }

    pub fn provider(&self) -> &dyn LlmProvider {
        self.provider.as_ref()
    }

    /// Never fails: backend errors and timeouts fall back to the rule-based answer.
    pub async fn generate(&self, query: &str, context: &ContextOutcome) -> String {
        let records = match context {
            ContextOutcome::NoInformation => return NO_INFORMATION.to_string(),
            ContextOutcome::Records(records) => records,
        };

        if records.is_empty() || !self.provider.is_available() {
            return rule_based_answer(records);
        }

        match self.generate_with_llm(query, records).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!("LLM answer failed, using rule-based answer: {}", e);
                rule_based_answer(records)
            }
        }
    }

    async fn generate_with_llm(&self, query: &str, records: &[ContextRecord]) -> Result<String> {
        let prompt = build_answer_prompt(query, records);
        debug!("Prompt: {}", crate::safe_truncate_ellipsis(&prompt, 200));

        let (content, metadata) = tokio::time::timeout(
            self.timeout,
            self.provider.generate(SYSTEM_PROMPT, &prompt),
        )
        .await
        .map_err(|_| {
            AssistantError::ExternalService(format!(
                "{} did not answer within {:?}",
                self.provider.provider_name(),
                self.timeout
            ))
        })??;

        debug!(
            "LLM answered: provider={}, tokens={:?}",
            metadata.provider, metadata.tokens_total
        );

        let answer = content.trim();
        if answer.is_empty() {
            return Err(AssistantError::ExternalService("empty answer".to_string()));
        }
        Ok(answer.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::providers::base::{LlmMetadata, LlmProviderError};
    use crate::llm::providers::NullProvider;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct ScriptedProvider {
        reply: std::result::Result<String, String>,
        delay: Duration,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn new(reply: std::result::Result<&str, &str>, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.map(str::to_string).map_err(str::to_string),
                delay,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn generate(
            &self,
            _system_prompt: &str,
            user_prompt: &str,
        ) -> std::result::Result<(String, LlmMetadata), LlmProviderError> {
            self.prompts.lock().push(user_prompt.to_string());
            tokio::time::sleep(self.delay).await;
            match &self.reply {
                Ok(text) => Ok((text.clone(), LlmMetadata::default())),
                Err(msg) => Err(LlmProviderError::Provider(msg.clone())),
            }
        }

        fn provider_name(&self) -> &str {
            "scripted"
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    fn diabetes() -> ContextOutcome {
        ContextOutcome::Records(vec![ContextRecord {
            disease: "Diabetes".to_string(),
            symptoms: vec!["Fever".to_string(), "Fatigue".to_string()],
        }])
    }

    #[tokio::test]
    async fn test_sentinel_returned_verbatim() {
        let synth = AnswerSynthesizer::new(Arc::new(NullProvider::default()), Duration::from_secs(1));
        assert_eq!(synth.generate("anything", &ContextOutcome::NoInformation).await, NO_INFORMATION);
    }

    #[tokio::test]
    async fn test_rule_based_answer_without_backend() {
        let synth = AnswerSynthesizer::new(Arc::new(NullProvider::default()), Duration::from_secs(1));
        let answer = synth.generate("What are the symptoms of Diabetes?", &diabetes()).await;
        assert_eq!(
            answer,
            "Here's what I found related to your query:\n\nDisease: Diabetes\nSymptoms: Fever, Fatigue\n\n"
        );
    }

    #[tokio::test]
    async fn test_empty_records_skip_backend() {
        let provider = ScriptedProvider::new(Ok("hallucination"), Duration::ZERO);
        let synth = AnswerSynthesizer::new(provider.clone(), Duration::from_secs(1));
        let answer = synth.generate("q", &ContextOutcome::Records(vec![])).await;
        assert_eq!(answer, format!("{FALLBACK_PREAMBLE}{FALLBACK_EMPTY}"));
        assert!(provider.prompts.lock().is_empty());
    }

    #[tokio::test]
    async fn test_llm_answer_used_and_prompt_carries_facts() {
        let provider = ScriptedProvider::new(Ok("  Diabetes causes Fever and Fatigue.\n"), Duration::ZERO);
        let synth = AnswerSynthesizer::new(provider.clone(), Duration::from_secs(1));
        let answer = synth.generate("diabetes?", &diabetes()).await;
        assert_eq!(answer, "Diabetes causes Fever and Fatigue.");

        let prompts = provider.prompts.lock();
        assert!(prompts[0].starts_with("Query: diabetes?\n\nKnowledge Base Information:"));
        assert!(prompts[0].contains("Symptoms: Fever, Fatigue"));
        assert!(prompts[0].ends_with("Answer:"));
    }

    #[tokio::test]
    async fn test_backend_error_falls_back() {
        let provider = ScriptedProvider::new(Err("connection refused"), Duration::ZERO);
        let synth = AnswerSynthesizer::new(provider, Duration::from_secs(1));
        let answer = synth.generate("diabetes?", &diabetes()).await;
        assert!(answer.starts_with(FALLBACK_PREAMBLE));
        assert!(answer.contains("Fatigue"));
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let provider = ScriptedProvider::new(Ok("too late"), Duration::from_millis(500));
        let synth = AnswerSynthesizer::new(provider, Duration::from_millis(20));
        let answer = synth.generate("diabetes?", &diabetes()).await;
        assert_eq!(answer, rule_based_answer(diabetes().records()));
    }

    #[tokio::test]
    async fn test_blank_completion_falls_back() {
        let provider = ScriptedProvider::new(Ok("   "), Duration::ZERO);
        let synth = AnswerSynthesizer::new(provider, Duration::from_secs(1));
        let answer = synth.generate("diabetes?", &diabetes()).await;
        assert!(answer.starts_with(FALLBACK_PREAMBLE));
    }
}
