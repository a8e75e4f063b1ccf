

pub mod base;
pub mod null;
pub mod ollama;

pub use base::{LlmMetadata, LlmProvider, LlmProviderError};
pub use null::NullProvider;
pub use ollama::OllamaProvider;
