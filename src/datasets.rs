//! Dataset row access for seeding and benchmarking.
//!
//! Rows come either from a local JSON array / JSON Lines file, or from the
//! Hugging Face datasets-server `rows` endpoint, paged 100 rows at a time.

use crate::error::{MentorError, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// One dataset row, keyed by column name.
pub type Row = Map<String, Value>;

const DEFAULT_HUB_URL: &str = "https://datasets-server.huggingface.co/rows";

/// Maximum page size accepted by the datasets-server.
const PAGE_SIZE: usize = 100;

/// Read rows from a local file. `.jsonl` files hold one object per line,
/// anything else must be a JSON array of objects.
pub fn read_local_rows(path: &Path) -> Result<Vec<Row>> {
    let content = std::fs::read_to_string(path)?;

    let is_jsonl = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jsonl"));

    if is_jsonl {
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str::<Row>(line).map_err(|e| {
                    MentorError::Dataset(format!("{}:{}: {}", path.display(), i + 1, e))
                })
            })
            .collect()
    } else {
        serde_json::from_str::<Vec<Row>>(&content)
            .map_err(|e| MentorError::Dataset(format!("{}: {}", path.display(), e)))
    }
}

/// Return the first non-empty value among the given column names, as text.
pub fn field(row: &Row, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| match row.get(*name)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

#[derive(Deserialize)]
struct RowsPage {
    rows: Vec<RowEntry>,
    #[serde(default)]
    num_rows_total: Option<usize>,
}

#[derive(Deserialize)]
struct RowEntry {
    row: Row,
}

/// Client for the Hugging Face datasets-server.
pub struct HubClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HubClient {
    /// Create a client for the public datasets-server.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_HUB_URL)
    }

    /// Create a client against a custom `rows` endpoint.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
        })
    }

    /// Build the URL for one page of rows.
    fn page_url(
        &self,
        dataset: &str,
        config: &str,
        split: &str,
        offset: usize,
        length: usize,
    ) -> Result<Url> {
        let offset = offset.to_string();
        let length = length.to_string();
        Ok(Url::parse_with_params(
            self.base_url.as_str(),
            &[
                ("dataset", dataset),
                ("config", config),
                ("split", split),
                ("offset", offset.as_str()),
                ("length", length.as_str()),
            ],
        )?)
    }

    /// Fetch up to `limit` rows from the start of a split.
    #[instrument(skip(self))]
    pub async fn fetch_rows(
        &self,
        dataset: &str,
        config: &str,
        split: &str,
        limit: usize,
    ) -> Result<Vec<Row>> {
        let mut rows = Vec::with_capacity(limit);

        while rows.len() < limit {
            let length = (limit - rows.len()).min(PAGE_SIZE);
            let url = self.page_url(dataset, config, split, rows.len(), length)?;
            debug!("Fetching {}", url);

            let response = self.client.get(url).send().await?;
            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(MentorError::Dataset(format!(
                    "datasets-server returned {}: {}",
                    status, body
                )));
            }

            let page: RowsPage = response.json().await?;
            let fetched = page.rows.len();
            rows.extend(page.rows.into_iter().map(|entry| entry.row));

            let exhausted = page.num_rows_total.is_some_and(|total| rows.len() >= total);
            if fetched == 0 || exhausted {
                break;
            }
        }

        rows.truncate(limit);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_field_fallback_order() {
        let r = row(json!({"Question Text": "", "Question": "What is 2+2?", "Correct Option": 3}));
        assert_eq!(
            field(&r, &["Question Text", "Question", "question"]),
            Some("What is 2+2?".to_string())
        );
        assert_eq!(field(&r, &["Correct Option", "Answer"]), Some("3".to_string()));
        assert_eq!(field(&r, &["missing"]), None);
    }

    #[test]
    fn test_read_jsonl_and_array() {
        let dir = tempfile::tempdir().unwrap();

        let jsonl = dir.path().join("rows.jsonl");
        std::fs::write(&jsonl, "{\"question\": \"a\"}\n\n{\"question\": \"b\"}\n").unwrap();
        assert_eq!(read_local_rows(&jsonl).unwrap().len(), 2);

        let array = dir.path().join("rows.json");
        std::fs::write(&array, r#"[{"question": "a"}]"#).unwrap();
        let rows = read_local_rows(&array).unwrap();
        assert_eq!(field(&rows[0], &["question"]), Some("a".to_string()));
    }

    #[test]
    fn test_bad_jsonl_line_reports_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.jsonl");
        std::fs::write(&path, "{\"question\": \"a\"}\nnot json\n").unwrap();

        let err = read_local_rows(&path).unwrap_err().to_string();
        assert!(err.contains(":2:"));
    }

    #[test]
    fn test_page_url_encodes_params() {
        let client = HubClient::new().unwrap();
        let url = client
            .page_url("openai/gsm8k", "main", "train", 100, 50)
            .unwrap();
        let query: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(query["dataset"], "openai/gsm8k");
        assert_eq!(query["offset"], "100");
        assert_eq!(query["length"], "50");
    }

    #[test]
    fn test_rows_page_parsing() {
        let page: RowsPage = serde_json::from_value(json!({
            "features": [],
            "rows": [{"row_idx": 0, "row": {"question": "q", "answer": "a"}, "truncated_cells": []}],
            "num_rows_total": 1
        }))
        .unwrap();
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.num_rows_total, Some(1));
    }
}
