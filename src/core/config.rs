

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{DEFAULT_DATA_PATH, DEFAULT_EMBEDDING_MODEL, DEFAULT_LLM_MODEL, DEFAULT_OLLAMA_URL};


#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    pub data_path: String,


    pub llm_enabled: bool,
    pub llm_provider: String,
    pub llm_model: String,
    pub llm_base_url: String,
    pub llm_temperature: f64,
    pub llm_timeout_secs: u64,


    pub semantic_matching_enabled: bool,
    pub embedding_provider: String,
    pub embedding_model: String,
    pub embedding_url: String,
    pub embedding_api_key: Option<String>,
    pub embedding_timeout_secs: u64,


    pub fuzzy_threshold: f64,
    pub relaxed_fuzzy_threshold: f64,
    pub semantic_threshold: f64,
    pub max_semantic_matches: usize,
}

impl AssistantConfig {
    pub fn new(data_path: &str) -> Self {
        Self {
            data_path: data_path.to_string(),

            llm_enabled: true,
            llm_provider: "ollama".to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            llm_base_url: DEFAULT_OLLAMA_URL.to_string(),
            llm_temperature: 0.3,
            llm_timeout_secs: 60,

            semantic_matching_enabled: true,
            embedding_provider: "ollama".to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_url: DEFAULT_OLLAMA_URL.to_string(),
            embedding_api_key: None,
            embedding_timeout_secs: 30,

            fuzzy_threshold: 0.7,
            relaxed_fuzzy_threshold: 0.6,
            semantic_threshold: 0.3,
            max_semantic_matches: 3,
        }
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    /// Reads `BIOMED_*` overrides on top of the defaults. Unparseable numeric
    /// or boolean values keep the default.
    pub fn from_env() -> Self {
        let mut config = Self::new(
            &std::env::var("BIOMED_DATA_PATH").unwrap_or_else(|_| DEFAULT_DATA_PATH.to_string()),
        );

        if let Some(enabled) = env_bool("BIOMED_LLM_ENABLED") {
            config.llm_enabled = enabled;
        }
        if let Ok(provider) = std::env::var("BIOMED_LLM_PROVIDER") {
            config.llm_provider = provider;
        }
        if let Ok(model) = std::env::var("BIOMED_LLM_MODEL") {
            config.llm_model = model;
        }
        if let Ok(url) = std::env::var("BIOMED_LLM_BASE_URL") {
            config.llm_base_url = url;
        }
        if let Some(temperature) = env_parse("BIOMED_LLM_TEMPERATURE") {
            config.llm_temperature = temperature;
        }
        if let Some(timeout) = env_parse("BIOMED_LLM_TIMEOUT") {
            config.llm_timeout_secs = timeout;
        }
        if let Some(enabled) = env_bool("BIOMED_SEMANTIC_MATCHING") {
            config.semantic_matching_enabled = enabled;
        }
        if let Ok(provider) = std::env::var("BIOMED_EMBEDDING_PROVIDER") {
            config.embedding_provider = provider;
        }
        if let Ok(model) = std::env::var("BIOMED_EMBEDDING_MODEL") {
            config.embedding_model = model;
        }
        if let Ok(url) = std::env::var("BIOMED_EMBEDDING_URL") {
            config.embedding_url = url;
        }
        if let Ok(key) = std::env::var("BIOMED_EMBEDDING_API_KEY") {
            config.embedding_api_key = Some(key);
        }
        if let Some(timeout) = env_parse("BIOMED_EMBEDDING_TIMEOUT") {
            config.embedding_timeout_secs = timeout;
        }
        if let Some(threshold) = env_parse("BIOMED_FUZZY_THRESHOLD") {
            config.fuzzy_threshold = threshold;
        }
        if let Some(threshold) = env_parse("BIOMED_SEMANTIC_THRESHOLD") {
            config.semantic_threshold = threshold;
        }

        config
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_PATH)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key).ok().and_then(|v| match v.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    })
}
