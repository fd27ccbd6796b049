//! Data models for PubMed records and API request/response payloads.
//!
//! Wire payloads use snake_case field names; optional fields use
//! `#[serde(default)]`.

mod paper;
mod requests;

pub use paper::Paper;
pub use requests::{
    AuthorCount, ChatMessage, ChatRequest, ChatResponse, GeneratedQuery, IrDetectRequest,
    IrDetectResponse, KeywordCount, NaturalQueryRequest, SearchResponse, SummarizeRequest,
    SummaryResponse, YearCount,
};
