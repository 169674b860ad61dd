//! Configuration settings for MathMentor.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub model: ModelSettings,
    pub embedding: EmbeddingSettings,
    pub knowledge_base: KnowledgeBaseSettings,
    pub web_search: WebSearchSettings,
    pub server: ServerSettings,
    pub render: RenderSettings,
    pub benchmark: BenchmarkSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.mathmentor".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Chat model provider.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    /// Groq's OpenAI-compatible endpoint (default).
    #[default]
    Groq,
    /// OpenAI.
    OpenAi,
}

impl ModelProvider {
    /// Environment variable holding the API key for this provider.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ModelProvider::Groq => "GROQ_API_KEY",
            ModelProvider::OpenAi => "OPENAI_API_KEY",
        }
    }
}

impl std::str::FromStr for ModelProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "groq" => Ok(ModelProvider::Groq),
            "openai" => Ok(ModelProvider::OpenAi),
            _ => Err(format!("Unsupported model provider: {}", s)),
        }
    }
}

impl std::fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelProvider::Groq => write!(f, "groq"),
            ModelProvider::OpenAi => write!(f, "openai"),
        }
    }
}

/// Chat model settings shared by the tutor and feedback agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Provider (groq, openai).
    pub provider: ModelProvider,
    /// Model name as understood by the provider.
    pub name: String,
    /// Sampling temperature. None leaves the provider default.
    pub temperature: Option<f32>,
    /// Maximum LLM calls per tutoring run.
    pub max_iterations: usize,
    /// HTTP timeout for model calls, in seconds.
    pub timeout_seconds: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: ModelProvider::Groq,
            name: "openai/gpt-oss-120b".to_string(),
            temperature: None,
            max_iterations: 15,
            timeout_seconds: crate::openai::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Embedding provider.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Local sentence-transformer model run with fastembed (default).
    #[default]
    Local,
    /// OpenAI embeddings API.
    OpenAi,
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (local, openai).
    pub provider: EmbeddingProvider,
    /// Embedding model. Local: `all-MiniLM-L6-v2`, `all-MiniLM-L12-v2`,
    /// `bge-small-en-v1.5`, `bge-base-en-v1.5`. OpenAI: any embedding model.
    pub model: String,
    /// Embedding dimensions (OpenAI only; local models have a fixed size).
    pub dimensions: u32,
    /// Where local model files are downloaded and cached.
    pub cache_dir: String,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Local,
            model: "all-MiniLM-L6-v2".to_string(),
            dimensions: 384,
            cache_dir: "~/.mathmentor/models".to_string(),
        }
    }
}

/// Knowledge base location and seeding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeBaseSettings {
    /// Root directory; the index lives in `<path>/vector_store`.
    pub path: String,
    /// Number of knowledge units returned by `retrieve_data`.
    pub top_k: usize,
    /// Hugging Face dataset used to seed the index.
    pub seed_dataset: String,
    /// Dataset config name.
    pub seed_config: String,
    /// Dataset split.
    pub seed_split: String,
    /// Number of seed rows to index.
    pub seed_limit: usize,
}

impl Default for KnowledgeBaseSettings {
    fn default() -> Self {
        Self {
            path: "~/.mathmentor/vector_db".to_string(),
            top_k: 3,
            seed_dataset: "openai/gsm8k".to_string(),
            seed_config: "main".to_string(),
            seed_split: "train".to_string(),
            seed_limit: 500,
        }
    }
}

/// Web search settings (Tavily).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSearchSettings {
    /// Search API endpoint.
    pub endpoint: String,
    /// Maximum results per query.
    pub max_results: u32,
    /// Search depth (basic, advanced).
    pub search_depth: String,
    /// Search topic (general, news).
    pub topic: String,
    /// Ask the provider to include raw page content.
    pub include_raw_content: bool,
    /// HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for WebSearchSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.tavily.com/search".to_string(),
            max_results: 3,
            search_depth: "advanced".to_string(),
            topic: "general".to_string(),
            include_raw_content: true,
            timeout_seconds: 30,
        }
    }
}

/// HTTP API server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8010,
        }
    }
}

/// How caret exponents are rendered in answers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExponentStyle {
    /// Unicode superscript characters (x²).
    #[default]
    Unicode,
    /// HTML tags (x<sup>2</sup>).
    Html,
}

/// Answer rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct RenderSettings {
    pub exponents: ExponentStyle,
}

/// Benchmark dataset settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkSettings {
    pub dataset: String,
    pub config: String,
    pub split: String,
    /// Default number of questions to evaluate.
    pub max_questions: usize,
}

impl Default for BenchmarkSettings {
    fn default() -> Self {
        Self {
            dataset: "CK0607/2025-Jee-Mains-Question".to_string(),
            config: "default".to_string(),
            split: "train".to_string(),
            max_questions: 20,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    ///
    /// `MODEL_PROVIDER` and `MODEL_NAME` override the file.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.apply_env_overrides(
            std::env::var("MODEL_PROVIDER").ok(),
            std::env::var("MODEL_NAME").ok(),
        )?;
        Ok(settings)
    }

    fn apply_env_overrides(
        &mut self,
        provider: Option<String>,
        name: Option<String>,
    ) -> crate::error::Result<()> {
        if let Some(provider) = provider.filter(|p| !p.trim().is_empty()) {
            self.model.provider = provider
                .parse()
                .map_err(crate::error::MentorError::Config)?;
        }
        if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
            self.model.name = name;
        }
        Ok(())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::MentorError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mathmentor")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Directory holding the persisted vector index.
    pub fn vector_store_dir(&self) -> PathBuf {
        Self::expand_path(&self.knowledge_base.path).join("vector_store")
    }

    /// Directory holding downloaded local embedding models.
    pub fn model_cache_dir(&self) -> PathBuf {
        Self::expand_path(&self.embedding.cache_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.model.provider, ModelProvider::Groq);
        assert_eq!(settings.server.port, 8010);
        assert_eq!(settings.knowledge_base.top_k, 3);
        assert!(settings.vector_store_dir().ends_with("vector_db/vector_store"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [model]
            provider = "openai"
            name = "gpt-4o-mini"

            [render]
            exponents = "html"
            "#,
        )
        .unwrap();

        assert_eq!(settings.model.provider, ModelProvider::OpenAi);
        assert_eq!(settings.model.name, "gpt-4o-mini");
        assert_eq!(settings.model.max_iterations, 15);
        assert_eq!(settings.render.exponents, ExponentStyle::Html);
        assert_eq!(settings.embedding.provider, EmbeddingProvider::Local);
        assert_eq!(settings.embedding.model, "all-MiniLM-L6-v2");
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        settings
            .apply_env_overrides(Some("OpenAI".to_string()), Some("gpt-4.1".to_string()))
            .unwrap();
        assert_eq!(settings.model.provider, ModelProvider::OpenAi);
        assert_eq!(settings.model.name, "gpt-4.1");

        assert!(settings
            .apply_env_overrides(Some("anthropic".to_string()), None)
            .is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.server.port = 9000;
        settings.save_to(&path).unwrap();

        let loaded: Settings = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.server.port, 9000);
    }
}
