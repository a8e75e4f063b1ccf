use thiserror::Error;

use crate::llm::embeddings::EmbeddingError;
use crate::llm::providers::base::LlmProviderError;


#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Data format error: {0}")]
    DataFormat(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

impl From<LlmProviderError> for AssistantError {
    fn from(err: LlmProviderError) -> Self {
        Self::ExternalService(err.to_string())
    }
}

impl From<EmbeddingError> for AssistantError {
    fn from(err: EmbeddingError) -> Self {
        Self::ExternalService(err.to_string())
    }
}


pub type Result<T> = std::result::Result<T, AssistantError>;
