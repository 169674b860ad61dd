//! Error types for MathMentor.

use std::path::PathBuf;
use thiserror::Error;

/// Library-level error type for MathMentor operations.
#[derive(Error, Debug)]
pub enum MentorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Knowledge base not found at {}. Run 'mathmentor seed' to create it.", .0.display())]
    IndexNotFound(PathBuf),

    #[error("Knowledge base already exists at {}. Use --force to overwrite it.", .0.display())]
    IndexExists(PathBuf),

    #[error("Model provider error: {0}")]
    Provider(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Web search failed: {0}")]
    WebSearch(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

/// Result type alias for MathMentor operations.
pub type Result<T> = std::result::Result<T, MentorError>;
