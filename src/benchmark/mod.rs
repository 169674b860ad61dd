//! Multiple-choice benchmark for the tutor.

mod extract;

pub use extract::{OptionExtractor, Prediction};

use crate::agent::Tutor;
use crate::datasets::{field, Row};
use serde::Serialize;
use tracing::{info, warn};

const QUESTION_FIELDS: &[&str] = &["Question Text", "Question", "question"];
const GOLD_FIELDS: &[&str] = &["Correct Option", "Answer", "answer"];

/// One benchmark question with its gold option label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkItem {
    pub question: String,
    /// Trimmed, uppercased label, e.g. `"3"`.
    pub gold: String,
}

/// Build items from the first `max` rows. Rows missing a question or a gold
/// label are skipped but still count toward `max`.
pub fn items_from_rows(rows: &[Row], max: usize) -> Vec<BenchmarkItem> {
    rows.iter()
        .take(max)
        .filter_map(|row| {
            let question = field(row, QUESTION_FIELDS)?;
            let gold = field(row, GOLD_FIELDS)?.trim().to_uppercase();
            Some(BenchmarkItem { question, gold })
        })
        .collect()
}

/// Outcome for one item.
#[derive(Debug, Clone, Serialize)]
pub struct ItemResult {
    pub question: String,
    pub gold: String,
    pub prediction: Prediction,
    /// Rendered tutor answer, or `None` if the tutor failed.
    pub answer: Option<String>,
    pub correct: bool,
}

/// Aggregate benchmark outcome.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BenchmarkReport {
    pub results: Vec<ItemResult>,
}

impl BenchmarkReport {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn correct(&self) -> usize {
        self.results.iter().filter(|r| r.correct).count()
    }

    /// Fraction correct, 0.0 for an empty run.
    pub fn accuracy(&self) -> f64 {
        if self.results.is_empty() {
            return 0.0;
        }
        self.correct() as f64 / self.total() as f64
    }
}

/// Ask the tutor every question in order and score the extracted options.
///
/// A tutor error is scored as an undetermined prediction. `on_result` is
/// called after each item.
pub async fn run_benchmark(
    tutor: &dyn Tutor,
    items: &[BenchmarkItem],
    extractor: &OptionExtractor,
    mut on_result: impl FnMut(&ItemResult),
) -> BenchmarkReport {
    let mut report = BenchmarkReport::default();

    for (i, item) in items.iter().enumerate() {
        let answer = match tutor.solve(&item.question).await {
            Ok(answer) => Some(answer),
            Err(e) => {
                warn!("Tutor failed on question {}: {}", i + 1, e);
                None
            }
        };

        let prediction = answer
            .as_deref()
            .map_or(Prediction::Undetermined, |a| extractor.extract(a, &item.question));

        let result = ItemResult {
            question: item.question.clone(),
            gold: item.gold.clone(),
            correct: prediction.label() == item.gold,
            prediction,
            answer,
        };
        on_result(&result);
        report.results.push(result);
    }

    info!(
        "Benchmark finished: {}/{} correct",
        report.correct(),
        report.total()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MentorError, Result};
    use async_trait::async_trait;
    use serde_json::json;

    /// Answers from a fixed list keyed by question prefix; anything else fails.
    struct ScriptedTutor(Vec<(&'static str, &'static str)>);

    #[async_trait]
    impl Tutor for ScriptedTutor {
        async fn solve(&self, question: &str) -> Result<String> {
            self.0
                .iter()
                .find(|(prefix, _)| question.starts_with(prefix))
                .map(|(_, answer)| answer.to_string())
                .ok_or_else(|| MentorError::Provider("rate limited".to_string()))
        }
    }

    fn rows(values: Vec<serde_json::Value>) -> Vec<Row> {
        values
            .into_iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    #[test]
    fn test_items_from_rows_field_fallbacks() {
        let rows = rows(vec![
            json!({"Question Text": "Q1 (1) a (2) b", "Correct Option": " 2 "}),
            json!({"Question": "Q2", "Answer": 1}),
            json!({"question": "no gold"}),
            json!({"question": "Q4", "answer": "c"}),
        ]);

        let items = items_from_rows(&rows, 3);
        assert_eq!(
            items,
            vec![
                BenchmarkItem {
                    question: "Q1 (1) a (2) b".to_string(),
                    gold: "2".to_string()
                },
                BenchmarkItem {
                    question: "Q2".to_string(),
                    gold: "1".to_string()
                },
            ]
        );
        assert_eq!(items_from_rows(&rows, 10)[2].gold, "C");
    }

    #[tokio::test]
    async fn test_run_benchmark_scores_and_tolerates_errors() {
        let question = "(1) 5 (2) 10 (3) 784 (4) 900";
        let items = vec![
            BenchmarkItem {
                question: format!("What is 28 squared? {}", question),
                gold: "3".to_string(),
            },
            BenchmarkItem {
                question: format!("What is 30 squared? {}", question),
                gold: "4".to_string(),
            },
            BenchmarkItem {
                question: format!("What is 2 + 3? {}", question),
                gold: "1".to_string(),
            },
        ];
        let tutor = ScriptedTutor(vec![
            ("What is 28", "The answer is (3) 784"),
            ("What is 30", "Final answer: 784"),
        ]);

        let mut seen = 0;
        let report = run_benchmark(&tutor, &items, &OptionExtractor::new(), |_| seen += 1).await;

        assert_eq!(seen, 3);
        assert_eq!(report.total(), 3);
        assert_eq!(report.correct(), 1);
        assert!((report.accuracy() - 1.0 / 3.0).abs() < 1e-9);

        assert_eq!(report.results[1].prediction, Prediction::Choice(3));
        assert_eq!(report.results[2].prediction, Prediction::Undetermined);
        assert!(report.results[2].answer.is_none());
    }

    #[test]
    fn test_empty_report_accuracy() {
        assert_eq!(BenchmarkReport::default().accuracy(), 0.0);
    }
}
