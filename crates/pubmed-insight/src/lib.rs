//! PubMed Insight
//!
//! A web backend for searching PubMed, extracting structured paper metadata,
//! computing keyword/author/year aggregates, and generating AI summaries and
//! chat answers grounded in a selected set of papers.
//!
//! # Architecture
//!
//! - **Linear pipeline per request**: query building → esearch → efetch →
//!   XML parsing → analysis/summarization
//! - **Failure isolation**: one unparseable record never fails the batch
//! - **Collaborators**: iCite citation counts and an LLM completion backend,
//!   both degrading gracefully instead of failing the pipeline
//!
//! # Example
//!
//! ```no_run
//! use pubmed_insight::{client::PubMedClient, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let client = PubMedClient::new(&config)?;
//!
//!     let (total, pmids) = client.search("crispr", 1, 20, "relevance").await?;
//!     let papers = client.fetch_details(&pmids).await?;
//!     println!("{total} matches, fetched {}", papers.len());
//!     Ok(())
//! }
//! ```

pub mod ai;
pub mod analysis;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod icite;
pub mod models;
pub mod server;

pub use client::PubMedClient;
pub use config::Config;
pub use error::{ApiError, ClientError};
