//! Request and response payloads for the HTTP API.

use serde::{Deserialize, Serialize};

use super::Paper;

/// Response for a paged search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Total matches reported by the upstream engine, independent of how
    /// many detail records were actually fetched or parsable.
    pub total: u64,

    /// 1-based page number.
    pub page: u32,

    /// Requested page size.
    pub page_size: u32,

    /// Papers on this page, in upstream response order (or citation order
    /// when client-side citation sorting was requested).
    pub papers: Vec<Paper>,
}

/// Request to summarize a set of papers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeRequest {
    /// PMIDs of the papers to summarize.
    pub pmids: Vec<String>,

    /// Output language ("korean" or "english").
    #[serde(default = "default_language")]
    pub language: String,
}

/// AI summary response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    /// Generated summary text.
    pub summary: String,

    /// PMIDs the summary is grounded in.
    pub pmids: Vec<String>,
}

/// One chat turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "user" or "assistant".
    pub role: String,

    /// Message text.
    pub content: String,
}

/// Request for a chat answer grounded in selected papers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// PMIDs of the grounding papers.
    pub pmids: Vec<String>,

    /// Current user message.
    pub message: String,

    /// Prior conversation turns.
    #[serde(default)]
    pub history: Vec<ChatMessage>,

    /// Output language ("korean" or "english").
    #[serde(default = "default_language")]
    pub language: String,
}

/// Chat answer response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Generated answer text.
    pub response: String,

    /// PMIDs the answer is grounded in.
    pub pmids: Vec<String>,
}

/// Request to convert a natural-language question into a PubMed query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NaturalQueryRequest {
    /// Free-text question.
    pub query: String,
}

/// A generated PubMed query with its rationale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratedQuery {
    /// The original natural-language input.
    pub original_query: String,

    /// The generated boolean query. Falls back to the original input when
    /// the completion contains no QUERY line.
    pub pubmed_query: String,

    /// Why this query was chosen.
    pub explanation: String,

    /// Core keywords extracted from the question.
    pub keywords: Vec<String>,
}

/// Request to tag papers as interventional-radiology related.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrDetectRequest {
    /// PMIDs of the papers to classify.
    pub pmids: Vec<String>,
}

/// IR classification response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrDetectResponse {
    /// pmid → whether the paper is IR related.
    pub tags: std::collections::HashMap<String, bool>,
}

/// A keyword with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
    /// The keyword.
    pub keyword: String,

    /// Number of occurrences across the paper set.
    pub count: usize,
}

/// An author with their paper count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorCount {
    /// Author display name.
    pub author: String,

    /// Number of papers in the set listing this author.
    pub count: usize,
}

/// A publication year with its paper count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCount {
    /// Four-digit year string.
    pub year: String,

    /// Papers published that year.
    pub count: usize,
}

fn default_language() -> String {
    "korean".to_string()
}
