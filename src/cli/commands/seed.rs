//! Seed command implementation.

use super::load_rows;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::create_embedder;
use crate::error::MentorError;
use crate::knowledge::{seed_texts, KnowledgeBase};
use anyhow::Result;

/// Build the knowledge base from question/answer rows.
pub async fn run_seed(
    input: Option<&str>,
    limit: Option<usize>,
    force: bool,
    settings: Settings,
) -> Result<()> {
    preflight::check(Operation::Seed, &settings)?;

    let dir = settings.vector_store_dir();
    if dir.exists() && !force {
        return Err(MentorError::IndexExists(dir).into());
    }

    let kb_settings = &settings.knowledge_base;
    let limit = limit.unwrap_or(kb_settings.seed_limit);
    let rows = load_rows(
        input,
        &kb_settings.seed_dataset,
        &kb_settings.seed_config,
        &kb_settings.seed_split,
        limit,
    )
    .await?;

    let texts = seed_texts(&rows, limit);
    if texts.is_empty() {
        anyhow::bail!("No rows with both a question and an answer were found");
    }

    let embedder = create_embedder(&settings)?;
    let spinner = Output::spinner(&format!("Embedding {} knowledge units...", texts.len()));
    let result = KnowledgeBase::create(dir, embedder, texts, force).await;
    spinner.finish_and_clear();

    let kb = result?;
    Output::success(&format!(
        "Knowledge base ready at {} ({} units)",
        kb.dir().display(),
        kb.len().await
    ));
    Ok(())
}
