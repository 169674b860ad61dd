//! CLI command implementations.

mod ask;
mod bench;
mod config;
mod feedback;
mod mcp;
mod search;
mod seed;
mod serve;

pub use ask::run_ask;
pub use bench::run_bench;
pub use config::run_config;
pub use feedback::run_feedback;
pub use mcp::run_mcp;
pub use search::run_search;
pub use seed::run_seed;
pub use serve::{router, run_serve, AppState};

use crate::agent::ToolContext;
use crate::cli::Output;
use crate::config::Settings;
use crate::datasets::{read_local_rows, HubClient, Row};
use crate::embedding::create_embedder;
use crate::knowledge::KnowledgeBase;
use crate::search::TavilySearch;
use std::sync::Arc;

/// Open the configured knowledge base. A missing index is fatal.
fn open_knowledge_base(settings: &Settings) -> anyhow::Result<Arc<KnowledgeBase>> {
    let embedder = create_embedder(settings)?;
    let kb = KnowledgeBase::open(settings.vector_store_dir(), embedder)?;
    Ok(Arc::new(kb))
}

/// Tool context over the knowledge base and Tavily search.
fn tool_context(settings: &Settings, kb: Arc<KnowledgeBase>) -> anyhow::Result<ToolContext> {
    let web = Arc::new(TavilySearch::from_settings(&settings.web_search)?);
    Ok(ToolContext::new(kb, web, settings.knowledge_base.top_k))
}

/// Rows from a local file, or the first `limit` rows of a hub dataset split.
async fn load_rows(
    input: Option<&str>,
    dataset: &str,
    config: &str,
    split: &str,
    limit: usize,
) -> anyhow::Result<Vec<Row>> {
    if let Some(path) = input {
        return Ok(read_local_rows(&Settings::expand_path(path))?);
    }

    let spinner = Output::spinner(&format!("Downloading {} ({}/{})...", dataset, config, split));
    let rows = HubClient::new()?
        .fetch_rows(dataset, config, split, limit)
        .await;
    spinner.finish_and_clear();
    Ok(rows?)
}
