use async_trait::async_trait;

use super::base::{LlmMetadata, LlmProvider, LlmProviderError};

/// Stand-in used when no generative model is configured or reachable.
/// Always reports itself unavailable so callers take the rule-based path.
#[derive(Debug, Clone, Default)]
pub struct NullProvider {
    reason: String,
}

impl NullProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl LlmProvider for NullProvider {
    async fn generate(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
    ) -> Result<(String, LlmMetadata), LlmProviderError> {
        Err(LlmProviderError::Unavailable(self.reason.clone()))
    }

    fn is_available(&self) -> bool {
        false
    }

    fn provider_name(&self) -> &str {
        "none"
    }

    fn model_name(&self) -> &str {
        "none"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_provider_never_generates() {
        let provider = NullProvider::new("LLM disabled");
        assert!(!provider.is_available());
        let err = provider.generate("sys", "user").await.unwrap_err();
        assert!(err.to_string().contains("LLM disabled"));
    }
}
