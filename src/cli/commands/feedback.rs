//! Feedback command implementation.

use crate::agent::{FeedbackRefiner, Refiner};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use anyhow::Result;

/// Run the feedback command.
pub async fn run_feedback(
    question: &str,
    answer: &str,
    feedback: &str,
    settings: Settings,
) -> Result<()> {
    if [question, answer, feedback].iter().any(|s| s.trim().is_empty()) {
        anyhow::bail!("question, answer and feedback required");
    }

    preflight::check(Operation::Answer, &settings)?;

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    let refiner = FeedbackRefiner::from_settings(&settings, &prompts)?;

    let spinner = Output::spinner("Refining answer...");
    let result = refiner.refine(question, answer, feedback).await;
    spinner.finish_and_clear();

    let improved = result.inspect_err(|e| Output::error(&format!("Failed to refine: {}", e)))?;
    println!("\n{}\n", improved);
    Ok(())
}
