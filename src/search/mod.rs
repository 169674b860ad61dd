//! Web search providers used by the `web_search` tool.

mod tavily;

pub use tavily::TavilySearch;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single web search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    /// Snippet or extracted page content.
    pub content: String,
}

/// Trait for web search implementations.
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Run a query and return ranked hits, best first.
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}
