use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;

use super::{SearchProvider, SearchResult};

const SEARXNG_TIMEOUT_SECS: u64 = 15;

/// Response from the SearXNG JSON API.
#[derive(Debug, Deserialize)]
struct SearxngResponse {
    #[serde(default)]
    results: Vec<SearxngResult>,
}

#[derive(Debug, Deserialize)]
struct SearxngResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

/// SearXNG-backed search.
pub struct SearxngSearch {
    client: reqwest::Client,
    base_url: String,
}

impl SearxngSearch {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(SEARXNG_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|error| {
                tracing::warn!(
                    error = %error,
                    "Failed to build search HTTP client with timeout; falling back to default client"
                );
                reqwest::Client::new()
            });
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn try_search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let url = format!("{}/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json")])
            .send()
            .await?;

        let status = response.status();
        let body_text = response.text().await?;
        if !status.is_success() {
            return Err(anyhow!(
                "search API error: HTTP {status}, body: {}",
                body_text.chars().take(200).collect::<String>()
            ));
        }

        let parsed: SearxngResponse = serde_json::from_str(&body_text)
            .map_err(|e| anyhow!("failed to parse search response: {e}"))?;
        Ok(parsed
            .results
            .into_iter()
            .take(limit)
            .map(|hit| SearchResult {
                title: hit.title,
                url: hit.url,
                snippet: hit.content,
            })
            .collect())
    }
}

#[async_trait]
impl SearchProvider for SearxngSearch {
    async fn search(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        match self.try_search(query, limit).await {
            Ok(results) => {
                tracing::debug!(query, count = results.len(), "search completed");
                results
            }
            Err(error) => {
                tracing::warn!(query, error = %error, "search failed; continuing without results");
                Vec::new()
            }
        }
    }
}
