//! MathMentor - retrieval-augmented math tutoring
//!
//! A tutoring backend that answers math questions with a tool-calling LLM,
//! grows a knowledge base from every answered question, and refines answers
//! from user feedback.
//!
//! # Overview
//!
//! MathMentor allows you to:
//! - Seed a knowledge base of solved problems from a Q/A dataset
//! - Serve `ask` and `feedback` endpoints over HTTP
//! - Expose the tutor's tools to MCP clients
//! - Benchmark the tutor on multiple-choice questions
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `embedding` - Embedding generation (local fastembed model or OpenAI)
//! - `vector_store` - Flat vector index with on-disk persistence
//! - `knowledge` - Shared knowledge base service with serialized updates
//! - `search` - Web search providers
//! - `agent` - Tutor tool loop and feedback refiner
//! - `render` - LaTeX and exponent post-processing
//! - `benchmark` - Answer extraction and accuracy scoring
//! - `datasets` - Local and Hugging Face dataset rows
//! - `mcp` - MCP server
//!
//! # Example
//!
//! ```rust,no_run
//! use mathmentor::config::Settings;
//! use mathmentor::embedding::create_embedder;
//! use mathmentor::knowledge::KnowledgeBase;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let embedder = create_embedder(&settings)?;
//!     let kb = KnowledgeBase::open(settings.vector_store_dir(), embedder)?;
//!
//!     kb.add_pair("What is 6 * 7?", "42").await;
//!     for hit in kb.search("6 times 7", 3).await? {
//!         println!("{:.2} {}", hit.score, hit.document.content);
//!     }
//!
//!     kb.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod benchmark;
pub mod cli;
pub mod config;
pub mod datasets;
pub mod embedding;
pub mod error;
pub mod knowledge;
pub mod mcp;
pub mod openai;
pub mod render;
pub mod search;
pub mod vector_store;

pub use error::{MentorError, Result};
