

pub mod embeddings;
pub mod factory;
pub mod providers;

pub use embeddings::{EmbeddingGenerator, TextEmbedder};
pub use factory::{EmbeddingProviderFactory, LlmProviderFactory};
pub use providers::{LlmProvider, NullProvider, OllamaProvider};
