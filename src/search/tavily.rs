//! Tavily search API client.

use super::{SearchHit, WebSearch};
use crate::config::WebSearchSettings;
use crate::error::{MentorError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

const API_KEY_ENV: &str = "TAVILY_API_KEY";

#[derive(Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u32,
    search_depth: &'a str,
    topic: &'a str,
    include_raw_content: bool,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

/// Tavily-backed web search.
pub struct TavilySearch {
    client: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
    settings: WebSearchSettings,
}

impl TavilySearch {
    /// Create a client from settings, reading the key from `TAVILY_API_KEY`.
    ///
    /// A missing key is reported when a search runs, so the tutor can still
    /// answer from the knowledge base alone.
    pub fn from_settings(settings: &WebSearchSettings) -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
        Self::with_api_key(settings, api_key)
    }

    pub fn with_api_key(settings: &WebSearchSettings, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: Url::parse(&settings.endpoint)?,
            api_key,
            settings: settings.clone(),
        })
    }
}

#[async_trait]
impl WebSearch for TavilySearch {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| MentorError::WebSearch(format!("{} not set", API_KEY_ENV)))?;

        let request = SearchRequest {
            api_key,
            query,
            max_results: self.settings.max_results,
            search_depth: &self.settings.search_depth,
            topic: &self.settings.topic,
            include_raw_content: self.settings.include_raw_content,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| MentorError::WebSearch(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MentorError::WebSearch(format!("Tavily returned {}: {}", status, body)));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| MentorError::WebSearch(format!("Invalid response: {}", e)))?;

        debug!("Tavily returned {} results", body.results.len());
        Ok(body.results.into_iter().map(SearchHit::from).collect())
    }
}

impl From<TavilyResult> for SearchHit {
    fn from(result: TavilyResult) -> Self {
        Self {
            title: result.title,
            url: result.url,
            content: result.content,
        }
    }
}
