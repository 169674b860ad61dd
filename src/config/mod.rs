//! Configuration module for MathMentor.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{FeedbackPrompts, Prompts, TutorPrompts};
pub use settings::{
    BenchmarkSettings, EmbeddingProvider, EmbeddingSettings, ExponentStyle, GeneralSettings,
    KnowledgeBaseSettings, ModelProvider, ModelSettings, PromptSettings, RenderSettings,
    ServerSettings, Settings, WebSearchSettings,
};
