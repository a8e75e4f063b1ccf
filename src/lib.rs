pub mod core;
pub mod knowledge;
pub mod llm;
pub mod rag;
pub mod utils;

pub use utils::{safe_truncate, safe_truncate_ellipsis};


pub use core::config::AssistantConfig;
pub use core::error::{AssistantError, Result};
pub use knowledge::{load_graph, DataIngestor, KnowledgeGraph};
pub use rag::BiomedicalRag;


pub const DEFAULT_DATA_PATH: &str = "data/dataset.csv";


pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";


pub const DEFAULT_LLM_MODEL: &str = "llama3.2";


pub const DEFAULT_EMBEDDING_MODEL: &str = "all-minilm";


pub const DEFAULT_CACHE_SIZE: usize = 1000;


pub const DEFAULT_CACHE_TTL: u64 = 3600;
