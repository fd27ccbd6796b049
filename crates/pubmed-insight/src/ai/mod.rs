//! LLM collaborator: summaries, grounded chat, query generation, IR tagging.
//!
//! Talks to a Groq-compatible chat-completions endpoint. Missing credentials
//! are not an error: every operation degrades to a fixed placeholder so the
//! rest of the pipeline keeps working.

pub mod prompts;

use std::collections::HashMap;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{ClientError, ClientResult};
use crate::models::{ChatMessage, GeneratedQuery, Paper};

/// Returned by every operation when no API key is configured.
pub const NO_KEY_PLACEHOLDER: &str = "AI features are unavailable: no API key is configured.";

/// Returned when the completion comes back empty.
const EMPTY_COMPLETION: &str = "Unable to generate a response.";

/// One message in a chat-completions request.
#[derive(Debug, Clone, Serialize)]
struct CompletionMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [CompletionMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionContent,
}

#[derive(Debug, Deserialize)]
struct CompletionContent {
    #[serde(default)]
    content: Option<String>,
}

/// Client for the chat-completions collaborator.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl LlmClient {
    /// Create a new client from the process configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.groq_url.clone(),
            model: config.llm_model.clone(),
            api_key: config.groq_api_key.clone(),
        })
    }

    /// Check if an API key is configured.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Summarize a single paper.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure (missing key is not an error).
    pub async fn summarize_paper(
        &self,
        paper: &Paper,
        language: &str,
        specialty: &str,
    ) -> ClientResult<String> {
        if self.api_key.is_none() {
            return Ok(NO_KEY_PLACEHOLDER.to_string());
        }
        if paper.abstract_text.is_empty() {
            return Ok("No abstract is available for this paper.".to_string());
        }

        let prompt = prompts::single_summary(paper, language, specialty);
        self.complete(&[user(prompt)], 1000, 0.3).await
    }

    /// Synthesize a summary across multiple papers.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure (missing key is not an error).
    pub async fn summarize_papers(
        &self,
        papers: &[Paper],
        language: &str,
        specialty: &str,
    ) -> ClientResult<String> {
        if self.api_key.is_none() {
            return Ok(NO_KEY_PLACEHOLDER.to_string());
        }
        if papers.is_empty() {
            return Ok("There are no papers to summarize.".to_string());
        }

        let prompt = prompts::multi_summary(papers, language, specialty);
        self.complete(&[user(prompt)], 1500, 0.3).await
    }

    /// Answer a question grounded in the given papers.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure (missing key is not an error).
    pub async fn chat_with_papers(
        &self,
        papers: &[Paper],
        message: &str,
        history: &[ChatMessage],
        language: &str,
        specialty: &str,
    ) -> ClientResult<String> {
        if self.api_key.is_none() {
            return Ok(NO_KEY_PLACEHOLDER.to_string());
        }
        if papers.is_empty() {
            return Ok("No papers are selected.".to_string());
        }

        let mut messages =
            vec![CompletionMessage { role: "system", content: prompts::chat_system(papers, language, specialty) }];

        for turn in prompts::recent_history(history) {
            messages.push(CompletionMessage {
                role: if turn.role == "assistant" { "assistant" } else { "user" },
                content: turn.content.clone(),
            });
        }
        messages.push(user(message.to_string()));

        self.complete(&messages, 1500, 0.4).await
    }

    /// Convert a natural-language question into a PubMed query.
    ///
    /// Falls back to echoing the input verbatim when the completion
    /// contains no QUERY line.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure (missing key is not an error).
    pub async fn generate_search_query(&self, natural_query: &str) -> ClientResult<GeneratedQuery> {
        if self.api_key.is_none() {
            return Ok(GeneratedQuery {
                original_query: natural_query.to_string(),
                pubmed_query: natural_query.to_string(),
                explanation: NO_KEY_PLACEHOLDER.to_string(),
                keywords: Vec::new(),
            });
        }

        let prompt = prompts::query_generation(natural_query);
        let completion = self.complete(&[user(prompt)], 500, 0.2).await?;
        Ok(parse_generated_query(natural_query, &completion))
    }

    /// Tag papers as interventional-radiology related.
    ///
    /// Any failure (missing key, transport, unparseable completion) yields
    /// an empty map rather than an error.
    pub async fn detect_ir_papers(&self, papers: &[Paper]) -> HashMap<String, bool> {
        if self.api_key.is_none() || papers.is_empty() {
            return HashMap::new();
        }

        let prompt = prompts::ir_detection(papers);
        match self.complete(&[user(prompt)], 500, 0.1).await {
            Ok(completion) => parse_ir_tags(&completion),
            Err(e) => {
                tracing::warn!(error = %e, "IR detection failed");
                HashMap::new()
            }
        }
    }

    /// Issue one chat-completions call.
    async fn complete(
        &self,
        messages: &[CompletionMessage],
        max_tokens: u32,
        temperature: f32,
    ) -> ClientResult<String> {
        let request =
            CompletionRequest { model: &self.model, messages, max_tokens, temperature };

        let mut builder = self.client.post(&self.base_url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::status(status.as_u16(), message));
        }

        let body: CompletionResponse = serde_json::from_slice(&response.bytes().await?)?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty());

        Ok(content.unwrap_or_else(|| EMPTY_COMPLETION.to_string()))
    }
}

fn user(content: String) -> CompletionMessage {
    CompletionMessage { role: "user", content }
}

/// Parse the QUERY/EXPLANATION/KEYWORDS line protocol from a completion.
///
/// Lines outside the protocol are ignored. When no QUERY line is found the
/// generated query falls back to the original input verbatim.
#[must_use]
pub fn parse_generated_query(original: &str, completion: &str) -> GeneratedQuery {
    let mut result = GeneratedQuery { original_query: original.to_string(), ..GeneratedQuery::default() };

    for line in completion.lines() {
        let line = line.trim();
        if let Some(query) = line.strip_prefix("QUERY:") {
            result.pubmed_query = query.trim().to_string();
        } else if let Some(explanation) = line.strip_prefix("EXPLANATION:") {
            result.explanation = explanation.trim().to_string();
        } else if let Some(keywords) = line.strip_prefix("KEYWORDS:") {
            result.keywords = keywords
                .split(',')
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect();
        }
    }

    if result.pubmed_query.is_empty() {
        result.pubmed_query = original.to_string();
    }

    result
}

/// Extract the pmid→bool map from an IR-detection completion.
///
/// Takes the JSON object between the first `{` and the last `}`; anything
/// unparseable yields an empty map.
#[must_use]
pub fn parse_ir_tags(completion: &str) -> HashMap<String, bool> {
    let Some(start) = completion.find('{') else { return HashMap::new() };
    let Some(end) = completion.rfind('}') else { return HashMap::new() };
    if end < start {
        return HashMap::new();
    }

    serde_json::from_str(&completion[start..=end]).unwrap_or_default()
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("model", &self.model)
            .field("has_api_key", &self.has_api_key())
            .finish()
    }
}
