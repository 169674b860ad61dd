//! Seed texts for a fresh knowledge base.

use crate::datasets::{field, Row};
use crate::vector_store::knowledge_unit;

/// Format the first `limit` rows that carry both a question and an answer as
/// knowledge units. Rows missing either field are skipped without counting.
pub fn seed_texts(rows: &[Row], limit: usize) -> Vec<String> {
    rows.iter()
        .filter_map(|row| {
            let question = field(row, &["question", "Question"])?;
            let answer = field(row, &["answer", "Answer"])?;
            Some(knowledge_unit(&question, &answer))
        })
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_seed_texts_formats_and_limits() {
        let rows: Vec<Row> = vec![
            json!({"question": "Weng earns $12 an hour. How much for 50 minutes?", "answer": "10"}),
            json!({"question": "no answer here"}),
            json!({"question": "What is 3*4?", "answer": "12"}),
            json!({"question": "What is 5-2?", "answer": "3"}),
        ]
        .into_iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect();

        let texts = seed_texts(&rows, 2);
        assert_eq!(
            texts,
            vec![
                "Q: Weng earns $12 an hour. How much for 50 minutes?\nA: 10".to_string(),
                "Q: What is 3*4?\nA: 12".to_string(),
            ]
        );
    }
}
