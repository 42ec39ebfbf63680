//! Full-text index client.
//!
//! [`IndexClient`] is the seam between request construction and the index.
//! [`OpenSearchClient`] is the production implementation; tests substitute
//! an in-memory fake.
//!
//! No retries happen here: a failed round-trip is returned to the caller as
//! a single error.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::config::IndexConfig;
use crate::models::RawSearchResponse;

/// Executes `_search` requests against one index.
#[async_trait]
pub trait IndexClient: Send + Sync {
    /// Runs a search with the given request body.
    async fn search(&self, body: &Value) -> Result<RawSearchResponse>;
}

/// OpenSearch over HTTP.
pub struct OpenSearchClient {
    http: reqwest::Client,
    search_url: String,
}

impl OpenSearchClient {
    pub fn new(config: &IndexConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            search_url: search_url(&config.host, &config.name),
        })
    }
}

fn search_url(host: &str, index: &str) -> String {
    format!("{}/{}/_search", host.trim_end_matches('/'), index)
}

#[async_trait]
impl IndexClient for OpenSearchClient {
    async fn search(&self, body: &Value) -> Result<RawSearchResponse> {
        let resp = self
            .http
            .post(&self.search_url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("request to {} failed", self.search_url))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            bail!("index returned {}: {}", status, text);
        }

        resp.json::<RawSearchResponse>()
            .await
            .context("failed to decode search response")
    }
}
