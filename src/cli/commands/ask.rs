//! Ask command implementation.

use super::{open_knowledge_base, tool_context};
use crate::agent::MathTutor;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use anyhow::Result;

/// Run the ask command. The answer is printed, not stored.
pub async fn run_ask(question: &str, settings: Settings) -> Result<()> {
    if question.trim().is_empty() {
        anyhow::bail!("Empty question");
    }

    if let Err(e) = preflight::check(Operation::Answer, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    let kb = open_knowledge_base(&settings)?;
    let tutor = MathTutor::from_settings(&settings, &prompts, tool_context(&settings, kb)?)?;

    let spinner = Output::spinner("Working on it...");
    let result = tutor.run(question).await;
    spinner.finish_and_clear();

    match result {
        Ok(response) => {
            println!("\n{}\n", response.content);

            if !response.tool_calls.is_empty() {
                Output::header("Tools used");
                for call in &response.tool_calls {
                    Output::kv(&call.name, &call.arguments);
                }
            }
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Failed to answer: {}", e));
            Err(e.into())
        }
    }
}
