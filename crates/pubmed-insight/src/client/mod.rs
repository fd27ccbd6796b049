//! PubMed E-utilities client.
//!
//! One esearch call resolves a query to a total count and a page of PMIDs;
//! one efetch call resolves a PMID list to parsed [`Paper`] records. Calls
//! are blocking-with-timeout and never retried; a short-lived request scope
//! is released unconditionally on completion or error.

pub mod query;
pub mod xml;

use reqwest::Client;
use serde::{Deserialize, Deserializer};

use crate::config::Config;
use crate::error::{ClientError, ClientResult};
use crate::models::Paper;

pub use query::{build_search_term, SortBy};

/// Client for the NCBI esearch/efetch endpoints.
#[derive(Clone)]
pub struct PubMedClient {
    client: Client,
    esearch_url: String,
    efetch_url: String,
    api_key: Option<String>,
}

/// esearch JSON envelope.
#[derive(Debug, Deserialize)]
struct EsearchResponse {
    #[serde(default)]
    esearchresult: EsearchResult,
}

/// The nested esearch result. The live endpoint reports `count` as a JSON
/// string; accept either representation.
#[derive(Debug, Default, Deserialize)]
struct EsearchResult {
    #[serde(default, deserialize_with = "string_or_u64")]
    count: u64,
    #[serde(default)]
    idlist: Vec<String>,
}

fn string_or_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Str(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Str(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

impl PubMedClient {
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

        Ok(Self {
            client,
            esearch_url: config.esearch_url.clone(),
            efetch_url: config.efetch_url.clone(),
            api_key: config.ncbi_api_key.clone(),
        })
    }

    /// Check if an NCBI API key is configured.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Search PubMed, returning the upstream total and one page of PMIDs.
    ///
    /// `page` is 1-based; the offset sent upstream is
    /// `(page - 1) * page_size`.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or a non-2xx response.
    pub async fn search(
        &self,
        term: &str,
        page: u32,
        page_size: u32,
        sort: &str,
    ) -> ClientResult<(u64, Vec<String>)> {
        let offset = (u64::from(page) - 1) * u64::from(page_size);

        let mut params = vec![
            ("db".to_string(), "pubmed".to_string()),
            ("term".to_string(), term.to_string()),
            ("retmax".to_string(), page_size.to_string()),
            ("retstart".to_string(), offset.to_string()),
            ("retmode".to_string(), "json".to_string()),
            ("sort".to_string(), sort.to_string()),
        ];

        if let Some(key) = &self.api_key {
            params.push(("api_key".to_string(), key.clone()));
        }

        let response = self.client.get(&self.esearch_url).query(&params).send().await?;
        let response = check_status(response).await?;

        let body: EsearchResponse = serde_json::from_slice(&response.bytes().await?)?;
        Ok((body.esearchresult.count, body.esearchresult.idlist))
    }

    /// Fetch and parse detail records for a PMID list.
    ///
    /// An empty input returns an empty list without any network call. One
    /// batched efetch request covers the full id list; per-record parse
    /// failures are absorbed by the parser. Output order follows the
    /// upstream response, not the input list.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, a non-2xx response, or a
    /// malformed XML document.
    pub async fn fetch_details(&self, pmids: &[String]) -> ClientResult<Vec<Paper>> {
        if pmids.is_empty() {
            return Ok(Vec::new());
        }

        let mut params = vec![
            ("db".to_string(), "pubmed".to_string()),
            ("id".to_string(), pmids.join(",")),
            ("retmode".to_string(), "xml".to_string()),
        ];

        if let Some(key) = &self.api_key {
            params.push(("api_key".to_string(), key.clone()));
        }

        let response = self.client.get(&self.efetch_url).query(&params).send().await?;
        let response = check_status(response).await?;

        let body = response.text().await?;
        xml::parse_articles(&body)
    }

    /// Fetch a single record by PMID.
    ///
    /// # Errors
    ///
    /// Returns error on transport or document-level parse failure.
    pub async fn fetch_one(&self, pmid: &str) -> ClientResult<Option<Paper>> {
        let papers = self.fetch_details(&[pmid.to_string()]).await?;
        Ok(papers.into_iter().next())
    }
}

/// Surface a non-2xx response as a status error with its body.
async fn check_status(response: reqwest::Response) -> ClientResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(ClientError::status(status.as_u16(), message))
}

impl std::fmt::Debug for PubMedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PubMedClient").field("has_api_key", &self.has_api_key()).finish()
    }
}
