//! iCite citation-count collaborator.
//!
//! Failures here never fail the pipeline: any batch that cannot be resolved
//! defaults its PMIDs to a count of zero.

use std::collections::HashMap;

use reqwest::Client;
use serde::Deserialize;

use crate::config::{api, Config};
use crate::models::Paper;

/// Client for the iCite publication metrics API.
#[derive(Clone)]
pub struct IciteClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct IciteResponse {
    #[serde(default)]
    data: Vec<IciteRecord>,
}

#[derive(Debug, Deserialize)]
struct IciteRecord {
    #[serde(default)]
    pmid: Option<serde_json::Value>,
    #[serde(default)]
    citation_count: Option<u32>,
}

impl IciteClient {
    /// Create a new client from the process configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .gzip(true)
            .build()?;

        Ok(Self { client, base_url: config.icite_url.clone() })
    }

    /// Fetch citation counts for a PMID list, in batches of up to 1000.
    ///
    /// A failing batch logs a diagnostic and defaults its PMIDs to zero;
    /// this method never returns an error.
    pub async fn citation_counts(&self, pmids: &[String]) -> HashMap<String, u32> {
        let mut counts = HashMap::new();
        if pmids.is_empty() {
            return counts;
        }

        for batch in pmids.chunks(api::ICITE_BATCH_SIZE) {
            match self.fetch_batch(batch).await {
                Ok(batch_counts) => counts.extend(batch_counts),
                Err(e) => {
                    tracing::warn!(error = %e, batch_len = batch.len(), "iCite lookup failed");
                }
            }

            // Missing or failed identifiers count as zero.
            for pmid in batch {
                counts.entry(pmid.clone()).or_insert(0);
            }
        }

        counts
    }

    /// Merge citation counts into a paper list in place.
    pub async fn enrich(&self, papers: &mut [Paper]) {
        let pmids: Vec<String> =
            papers.iter().filter(|p| !p.pmid.is_empty()).map(|p| p.pmid.clone()).collect();
        let counts = self.citation_counts(&pmids).await;

        for paper in papers {
            paper.citation_count = Some(counts.get(&paper.pmid).copied().unwrap_or(0));
        }
    }

    async fn fetch_batch(&self, pmids: &[String]) -> anyhow::Result<HashMap<String, u32>> {
        let params =
            [("pmids".to_string(), pmids.join(",")), ("format".to_string(), "json".to_string())];

        let response =
            self.client.get(&self.base_url).query(&params).send().await?.error_for_status()?;
        let body: IciteResponse = response.json().await?;

        let mut counts = HashMap::new();
        for record in body.data {
            // iCite reports pmid as a number; normalize to the string keys
            // used everywhere else.
            let pmid = match record.pmid {
                Some(serde_json::Value::Number(n)) => n.to_string(),
                Some(serde_json::Value::String(s)) => s,
                _ => continue,
            };
            counts.insert(pmid, record.citation_count.unwrap_or(0));
        }

        Ok(counts)
    }
}

impl std::fmt::Debug for IciteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IciteClient").field("base_url", &self.base_url).finish()
    }
}
