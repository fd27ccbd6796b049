//! Configuration for the PubMed Insight server.

use std::time::Duration;

/// Upstream endpoint constants.
pub mod api {
    use std::time::Duration;

    /// NCBI E-utilities esearch endpoint.
    pub const ESEARCH_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi";

    /// NCBI E-utilities efetch endpoint.
    pub const EFETCH_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi";

    /// iCite publication metrics endpoint.
    pub const ICITE_URL: &str = "https://icite.od.nih.gov/api/pubs";

    /// Groq OpenAI-compatible chat completions endpoint.
    pub const GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

    /// Model used for summaries, chat, and query generation.
    pub const LLM_MODEL: &str = "llama-3.1-8b-instant";

    /// Request timeout for every upstream call. Requests are not retried.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Maximum PMIDs per iCite batch call.
    pub const ICITE_BATCH_SIZE: usize = 1000;
}

/// Pagination limits surfaced to clients.
pub mod paging {
    /// Default page size for search requests.
    pub const DEFAULT_PAGE_SIZE: u32 = 20;

    /// Maximum page size for search requests.
    pub const MAX_PAGE_SIZE: u32 = 100;

    /// Maximum records fetched for a CSV export.
    pub const MAX_EXPORT_RESULTS: u32 = 500;

    /// Maximum top-N for frequency analyses.
    pub const MAX_TOP_N: usize = 50;
}

/// Server configuration.
///
/// Built once at process start and immutable thereafter; handed by reference
/// to the upstream clients at construction time.
#[derive(Debug, Clone)]
pub struct Config {
    /// NCBI API key (optional, raises E-utilities rate limits).
    pub ncbi_api_key: Option<String>,

    /// Groq API key (optional; AI features degrade to placeholders without it).
    pub groq_api_key: Option<String>,

    /// esearch base URL (overridable for mock servers).
    pub esearch_url: String,

    /// efetch base URL (overridable for mock servers).
    pub efetch_url: String,

    /// iCite base URL (overridable for mock servers).
    pub icite_url: String,

    /// Chat completions base URL (overridable for mock servers).
    pub groq_url: String,

    /// LLM model identifier.
    pub llm_model: String,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,
}

impl Config {
    /// Create a new configuration with optional upstream credentials.
    #[must_use]
    pub fn new(ncbi_api_key: Option<String>, groq_api_key: Option<String>) -> Self {
        Self {
            ncbi_api_key,
            groq_api_key,
            esearch_url: api::ESEARCH_URL.to_string(),
            efetch_url: api::EFETCH_URL.to_string(),
            icite_url: api::ICITE_URL.to_string(),
            groq_url: api::GROQ_URL.to_string(),
            llm_model: api::LLM_MODEL.to_string(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
        }
    }

    /// Create a test configuration with every upstream pointed at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            ncbi_api_key: None,
            groq_api_key: None,
            esearch_url: format!("{base_url}/entrez/eutils/esearch.fcgi"),
            efetch_url: format!("{base_url}/entrez/eutils/efetch.fcgi"),
            icite_url: format!("{base_url}/api/pubs"),
            groq_url: format!("{base_url}/openai/v1/chat/completions"),
            llm_model: api::LLM_MODEL.to_string(),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Reads `NCBI_API_KEY` and `GROQ_API_KEY`; a `.env` file is honored.
    ///
    /// # Errors
    ///
    /// Returns error if environment variables are invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        let ncbi_api_key = std::env::var("NCBI_API_KEY").ok().filter(|k| !k.is_empty());
        let groq_api_key = std::env::var("GROQ_API_KEY").ok().filter(|k| !k.is_empty());
        Ok(Self::new(ncbi_api_key, groq_api_key))
    }

    /// Check if an NCBI API key is configured.
    #[must_use]
    pub const fn has_ncbi_key(&self) -> bool {
        self.ncbi_api_key.is_some()
    }

    /// Check if a Groq API key is configured.
    #[must_use]
    pub const fn has_groq_key(&self) -> bool {
        self.groq_api_key.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None, None)
    }
}
