//! Bench command implementation.

use super::{load_rows, open_knowledge_base, tool_context};
use crate::agent::MathTutor;
use crate::benchmark::{items_from_rows, run_benchmark, OptionExtractor};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use anyhow::Result;

/// Run the multiple-choice benchmark and print accuracy.
pub async fn run_bench(max: Option<usize>, input: Option<&str>, settings: Settings) -> Result<()> {
    preflight::check(Operation::Answer, &settings)?;

    let bench = &settings.benchmark;
    let max = max.unwrap_or(bench.max_questions);
    let rows = load_rows(input, &bench.dataset, &bench.config, &bench.split, max).await?;

    let items = items_from_rows(&rows, max);
    if items.is_empty() {
        Output::warning("No questions loaded.");
        return Ok(());
    }

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    let kb = open_knowledge_base(&settings)?;
    let tutor = MathTutor::from_settings(&settings, &prompts, tool_context(&settings, kb)?)?;
    let extractor = OptionExtractor::new();

    let pb = Output::progress_bar(items.len() as u64, "questions");
    let mut index = 0;
    let report = run_benchmark(&tutor, &items, &extractor, |result| {
        index += 1;
        pb.println(Output::prediction(
            index,
            &result.prediction.label(),
            &result.gold,
        ));
        pb.inc(1);
    })
    .await;
    pb.finish_and_clear();

    Output::header("Benchmark");
    Output::kv("Dataset", input.unwrap_or(bench.dataset.as_str()));
    Output::kv(
        "Accuracy",
        &format!(
            "{}/{} = {:.2}%",
            report.correct(),
            report.total(),
            report.accuracy() * 100.0
        ),
    );
    Ok(())
}
