//! Search command implementation.

use super::open_knowledge_base;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(query: &str, limit: Option<usize>, settings: Settings) -> Result<()> {
    preflight::check(Operation::Search, &settings)?;

    let kb = open_knowledge_base(&settings)?;
    let limit = limit.unwrap_or(settings.knowledge_base.top_k);

    let results = match kb.search(query, limit).await {
        Ok(results) => results,
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    };

    if results.is_empty() {
        Output::warning("The knowledge base is empty.");
        return Ok(());
    }

    Output::success(&format!(
        "Top {} of {} knowledge units",
        results.len(),
        kb.len().await
    ));
    for (i, result) in results.iter().enumerate() {
        Output::search_result(i + 1, result.score, &result.document.content);
    }

    Ok(())
}
