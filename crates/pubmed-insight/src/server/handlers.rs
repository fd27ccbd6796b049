//! Route handlers.
//!
//! Each handler runs the linear pipeline (query → search → fetch → parse)
//! and hands the resulting Paper list to analyzers or collaborators. Any
//! unrecovered upstream failure surfaces as a generic server error.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::analysis;
use crate::client::{build_search_term, SortBy};
use crate::config::paging;
use crate::error::{ApiError, ApiResult};
use crate::export;
use crate::models::{
    ChatRequest, ChatResponse, IrDetectRequest, IrDetectResponse, NaturalQueryRequest, Paper,
    SearchResponse, SummarizeRequest, SummaryResponse,
};

/// Default specialty lens for summaries and chat.
const SPECIALTY: &str = "radiology";

/// Liveness check.
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "pubmed-insight",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Query parameters for search and analysis endpoints.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Free-text query.
    pub query: String,

    /// Optional author filter.
    #[serde(default)]
    pub author: Option<String>,

    /// Optional start year.
    #[serde(default)]
    pub start_date: Option<String>,

    /// Optional end year.
    #[serde(default)]
    pub end_date: Option<String>,

    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: u32,

    /// Page size, bounded by the configured maximum.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Sort preference.
    #[serde(default)]
    pub sort_by: SortBy,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    paging::DEFAULT_PAGE_SIZE
}

impl SearchParams {
    fn validate(&self) -> ApiResult<()> {
        if self.page == 0 {
            return Err(ApiError::bad_request("page must be >= 1"));
        }
        if self.page_size == 0 || self.page_size > paging::MAX_PAGE_SIZE {
            return Err(ApiError::bad_request(format!(
                "page_size must be between 1 and {}",
                paging::MAX_PAGE_SIZE
            )));
        }
        Ok(())
    }
}

/// Run the search pipeline for one page and return parsed papers.
async fn run_pipeline(
    state: &AppState,
    params: &SearchParams,
    page: u32,
    page_size: u32,
) -> ApiResult<(u64, Vec<Paper>)> {
    let term = build_search_term(
        &params.query,
        params.author.as_deref(),
        params.start_date.as_deref(),
        params.end_date.as_deref(),
    );

    let (total, pmids) =
        state.pubmed.search(&term, page, page_size, params.sort_by.engine_key()).await?;
    let papers = state.pubmed.fetch_details(&pmids).await?;

    Ok((total, papers))
}

/// GET /api/search — paged search with citation enrichment.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchResponse>> {
    params.validate()?;

    let (total, mut papers) = run_pipeline(&state, &params, params.page, params.page_size).await?;

    state.icite.enrich(&mut papers).await;

    // PubMed cannot sort by citations; re-rank here after enrichment.
    if params.sort_by.client_side() {
        papers.sort_by(|a, b| b.citations().cmp(&a.citations()));
    }

    Ok(Json(SearchResponse { total, page: params.page, page_size: params.page_size, papers }))
}

/// GET /api/paper/{pmid} — single record lookup.
pub async fn get_paper(
    State(state): State<Arc<AppState>>,
    Path(pmid): Path<String>,
) -> ApiResult<Json<Paper>> {
    let paper = state
        .pubmed
        .fetch_one(&pmid)
        .await?
        .ok_or_else(|| ApiError::not_found("paper not found"))?;

    Ok(Json(paper))
}

/// POST /api/generate-query — natural language to PubMed query.
pub async fn generate_query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NaturalQueryRequest>,
) -> ApiResult<Json<crate::models::GeneratedQuery>> {
    let generated = state.llm.generate_search_query(&request.query).await?;
    Ok(Json(generated))
}

/// Query parameters for the frequency analyses.
///
/// Query `flatten` is avoided on purpose; urlencoded deserialization does
/// not support it for non-string fields.
#[derive(Debug, Deserialize)]
pub struct AnalyzeParams {
    /// Free-text query.
    pub query: String,

    /// Optional author filter.
    #[serde(default)]
    pub author: Option<String>,

    /// Optional start year.
    #[serde(default)]
    pub start_date: Option<String>,

    /// Optional end year.
    #[serde(default)]
    pub end_date: Option<String>,

    /// Number of entries to return.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    20
}

impl AnalyzeParams {
    fn validate(&self) -> ApiResult<()> {
        if self.top_n < 1 || self.top_n > paging::MAX_TOP_N {
            return Err(ApiError::bad_request(format!(
                "top_n must be between 1 and {}",
                paging::MAX_TOP_N
            )));
        }
        Ok(())
    }

    fn as_search(&self) -> SearchParams {
        SearchParams {
            query: self.query.clone(),
            author: self.author.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            page: 1,
            page_size: paging::MAX_PAGE_SIZE,
            sort_by: SortBy::Relevance,
        }
    }
}

/// GET /api/analyze/keywords — keyword frequency over the first 100 hits.
pub async fn analyze_keywords(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnalyzeParams>,
) -> ApiResult<Json<Vec<crate::models::KeywordCount>>> {
    params.validate()?;
    let (_, papers) = run_pipeline(&state, &params.as_search(), 1, paging::MAX_PAGE_SIZE).await?;
    Ok(Json(analysis::keyword_frequency(&papers, params.top_n)))
}

/// GET /api/analyze/trends — publications per year over the first 100 hits.
pub async fn analyze_trends(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<crate::models::YearCount>>> {
    let (_, papers) = run_pipeline(&state, &params, 1, paging::MAX_PAGE_SIZE).await?;
    Ok(Json(analysis::year_trend(&papers)))
}

/// GET /api/analyze/authors — author frequency over the first 100 hits.
pub async fn analyze_authors(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnalyzeParams>,
) -> ApiResult<Json<Vec<crate::models::AuthorCount>>> {
    params.validate()?;
    let (_, papers) = run_pipeline(&state, &params.as_search(), 1, paging::MAX_PAGE_SIZE).await?;
    Ok(Json(analysis::author_frequency(&papers, params.top_n)))
}

/// POST /api/analyze/ir — tag papers as interventional-radiology related.
pub async fn detect_ir(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IrDetectRequest>,
) -> ApiResult<Json<IrDetectResponse>> {
    let papers = state.pubmed.fetch_details(&request.pmids).await?;
    let tags = state.llm.detect_ir_papers(&papers).await;
    Ok(Json(IrDetectResponse { tags }))
}

/// POST /api/summarize — AI summary of selected papers.
pub async fn summarize(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SummarizeRequest>,
) -> ApiResult<Json<SummaryResponse>> {
    let papers = state.pubmed.fetch_details(&request.pmids).await?;
    if papers.is_empty() {
        return Err(ApiError::not_found("no papers found for the given pmids"));
    }

    let summary = if papers.len() == 1 {
        state.llm.summarize_paper(&papers[0], &request.language, SPECIALTY).await?
    } else {
        state.llm.summarize_papers(&papers, &request.language, SPECIALTY).await?
    };

    Ok(Json(SummaryResponse { summary, pmids: request.pmids }))
}

/// POST /api/chat — chat grounded in selected papers.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let papers = state.pubmed.fetch_details(&request.pmids).await?;
    if papers.is_empty() {
        return Err(ApiError::not_found("no papers found for the given pmids"));
    }

    let response = state
        .llm
        .chat_with_papers(&papers, &request.message, &request.history, &request.language, SPECIALTY)
        .await?;

    Ok(Json(ChatResponse { response, pmids: request.pmids }))
}

/// Query parameters for CSV export.
#[derive(Debug, Deserialize)]
pub struct ExportParams {
    /// Free-text query.
    pub query: String,

    /// Optional author filter.
    #[serde(default)]
    pub author: Option<String>,

    /// Optional start year.
    #[serde(default)]
    pub start_date: Option<String>,

    /// Optional end year.
    #[serde(default)]
    pub end_date: Option<String>,

    /// Sort preference.
    #[serde(default)]
    pub sort_by: SortBy,

    /// Maximum records to export.
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

fn default_max_results() -> u32 {
    100
}

/// GET /api/export/csv — search results as a CSV attachment.
pub async fn export_csv(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExportParams>,
) -> ApiResult<impl IntoResponse> {
    if params.max_results == 0 || params.max_results > paging::MAX_EXPORT_RESULTS {
        return Err(ApiError::bad_request(format!(
            "max_results must be between 1 and {}",
            paging::MAX_EXPORT_RESULTS
        )));
    }

    let term = build_search_term(
        &params.query,
        params.author.as_deref(),
        params.start_date.as_deref(),
        params.end_date.as_deref(),
    );

    // A single oversized page keeps the efetch call batched.
    let (_, pmids) = state
        .pubmed
        .search(&term, 1, params.max_results, params.sort_by.engine_key())
        .await?;

    let papers = state.pubmed.fetch_details(&pmids).await?;
    let csv = export::to_csv(&papers);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=pubmed_results.csv"),
        ],
        csv,
    ))
}
