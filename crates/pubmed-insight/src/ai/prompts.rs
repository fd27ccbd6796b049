//! Prompt templates for the LLM collaborator.
//!
//! Pure string builders; the caps applied here (paper counts, abstract
//! lengths) protect the completion context window and do not affect the
//! parser, which is uncapped.

use crate::models::{ChatMessage, Paper};

/// Papers included in a multi-paper prompt.
pub const MAX_PROMPT_PAPERS: usize = 10;

/// Abstract cap for summary prompts.
pub const SUMMARY_ABSTRACT_CAP: usize = 600;

/// Abstract cap for chat context.
pub const CHAT_ABSTRACT_CAP: usize = 800;

/// Chat history turns kept.
pub const MAX_HISTORY_TURNS: usize = 10;

/// Papers included in an IR-detection prompt.
pub const MAX_IR_PAPERS: usize = 20;

/// Abstract cap for IR detection.
pub const IR_ABSTRACT_CAP: usize = 300;

const SPECIALTY_RADIOLOGY: &str = "You are an expert at analyzing medical literature. \
     Summarize papers clearly enough for a general physician, covering the study's \
     purpose, methodology, key results, and clinical significance.";

const SPECIALTY_GENERAL: &str = "You are an expert at analyzing medical literature. \
     Clearly summarize the study's purpose, methodology, key results, and clinical \
     significance.";

const IR_INSIGHT: &str = "\nAdditionally, from the perspective of an interventional \
     radiologist, analyze any of the following if present: image-guided procedures \
     (CT/US/fluoroscopy), vascular access and embolization technique, procedural \
     success and complication rates, locoregional tumor therapy (TACE, RFA, MWA, \
     cryoablation), vascular intervention (stenting, thrombectomy, TIPS), and \
     non-vascular intervention (drainage, biopsy, vertebroplasty). If none apply, \
     mark that section \"not applicable\".";

/// Language directive appended to every prompt.
#[must_use]
pub fn language_instruction(language: &str) -> &'static str {
    if language == "korean" { "Please write in Korean." } else { "Please write in English." }
}

fn specialty_prompt(specialty: &str) -> &'static str {
    if specialty == "radiology" { SPECIALTY_RADIOLOGY } else { SPECIALTY_GENERAL }
}

fn ir_section(specialty: &str) -> &'static str {
    if specialty == "radiology" { IR_INSIGHT } else { "" }
}

/// Truncate to a character count, UTF-8 safe.
#[must_use]
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max { s.to_string() } else { s.chars().take(max).collect() }
}

/// Prompt for a single-paper summary.
#[must_use]
pub fn single_summary(paper: &Paper, language: &str, specialty: &str) -> String {
    format!(
        "{specialty_prompt}\n\n{lang}\n\n\
         ## Paper\n\
         **Title**: {title}\n\
         **Journal**: {journal}\n\
         **Published**: {date}\n\
         **Abstract**: {abstract_text}\n\n\
         ## Summary format\n\
         Use this structure:\n\n\
         ### Study overview\n(purpose and background, concise)\n\n\
         ### Methods\n(population, design, analysis)\n\n\
         ### Key results\n(core numbers and statistical significance)\n\n\
         ### Clinical significance\n(points applicable to practice)\n\n\
         ### Limitations\n(if any){ir}\n",
        specialty_prompt = specialty_prompt(specialty),
        lang = language_instruction(language),
        title = paper.title,
        journal = paper.journal,
        date = paper.pub_date,
        abstract_text = paper.abstract_text,
        ir = ir_section(specialty),
    )
}

/// Prompt for a multi-paper synthesis.
#[must_use]
pub fn multi_summary(papers: &[Paper], language: &str, specialty: &str) -> String {
    let papers_text: Vec<String> = papers
        .iter()
        .take(MAX_PROMPT_PAPERS)
        .enumerate()
        .map(|(i, paper)| {
            format!(
                "**[Paper {n}]**\n- Title: {title}\n- Journal: {journal} ({date})\n- Abstract: {abs}",
                n = i + 1,
                title = paper.title,
                journal = paper.journal,
                date = paper.pub_date,
                abs = truncate_chars(&paper.abstract_text, SUMMARY_ABSTRACT_CAP),
            )
        })
        .collect();

    format!(
        "{specialty_prompt}\n\n{lang}\n\n\
         ## Papers to analyze ({count} total)\n\n{papers}\n\n\
         ## Synthesis format\n\
         Use this structure:\n\n\
         ### Research landscape\n(common themes and trends across the papers)\n\n\
         ### Methods compared\n(commonalities and differences in populations and designs)\n\n\
         ### Consolidated findings\n(consistent results; note any conflicts)\n\n\
         ### Practice points\n(what a clinician should take away)\n\n\
         ### Future directions\n(current limits and needed follow-up work){ir}\n",
        specialty_prompt = specialty_prompt(specialty),
        lang = language_instruction(language),
        count = papers.len(),
        papers = papers_text.join("\n\n"),
        ir = ir_section(specialty),
    )
}

/// System prompt grounding a chat conversation in the given papers.
#[must_use]
pub fn chat_system(papers: &[Paper], language: &str, specialty: &str) -> String {
    let context: Vec<String> = papers
        .iter()
        .take(MAX_PROMPT_PAPERS)
        .enumerate()
        .map(|(i, paper)| {
            format!(
                "[Paper {n}]\nTitle: {title}\nAuthors: {authors}\nJournal: {journal}\n\
                 Published: {date}\nAbstract: {abs}",
                n = i + 1,
                title = paper.title,
                authors = paper.authors.iter().take(5).cloned().collect::<Vec<_>>().join(", "),
                journal = paper.journal,
                date = paper.pub_date,
                abs = truncate_chars(&paper.abstract_text, CHAT_ABSTRACT_CAP),
            )
        })
        .collect();

    let specialty_context = if specialty == "radiology" {
        "The user is an interventional radiologist. Answer from a general medical \
         perspective, and additionally note anything relevant to interventional \
         procedures (vascular/non-vascular intervention, image-guided procedures).\n"
    } else {
        ""
    };

    format!(
        "You are an expert at analyzing academic papers. Answer questions based on \
         the papers provided by the user.\n{specialty_context}{lang}\n\n\
         ## Provided papers:\n{context}\n\n\
         ## Answer guidelines:\n\
         - Answer accurately from the provided papers\n\
         - Do not speculate beyond them; say \"the provided papers do not contain \
           that information\" when applicable\n\
         - Cite which paper information came from when possible\n\
         - Keep answers clear and structured",
        specialty_context = specialty_context,
        lang = language_instruction(language),
        context = context.join("\n\n"),
    )
}

/// Prompt converting a natural-language question into a PubMed query.
///
/// The completion must follow the `QUERY:` / `EXPLANATION:` / `KEYWORDS:`
/// line protocol parsed by [`super::parse_generated_query`].
#[must_use]
pub fn query_generation(natural_query: &str) -> String {
    format!(
        "You are a PubMed search expert. Convert the user's natural-language \
         question into an optimal PubMed search query.\n\n\
         ## User question\n\"{natural_query}\"\n\n\
         ## Conversion rules\n\
         1. Map core medical concepts to English MeSH terms\n\
         2. Use Boolean operators (AND, OR) appropriately\n\
         3. Use field tags ([Title/Abstract], [MeSH Terms]) where useful\n\
         4. Aim for a query neither too narrow nor too broad\n\n\
         ## Output format (exactly these lines)\n\
         QUERY: (the PubMed query)\n\
         EXPLANATION: (why this query, briefly)\n\
         KEYWORDS: (3-5 core keywords, comma separated)\n\n\
         Example:\n\
         QUERY: (lung cancer[MeSH Terms]) AND (CT scan[Title/Abstract]) AND (diagnosis[MeSH Terms])\n\
         EXPLANATION: Combines MeSH terms with title/abstract search for CT diagnosis of lung cancer.\n\
         KEYWORDS: lung cancer, CT, diagnosis, imaging"
    )
}

/// Prompt classifying papers as interventional-radiology related.
///
/// The completion must be a JSON object mapping pmid to a boolean.
#[must_use]
pub fn ir_detection(papers: &[Paper]) -> String {
    let papers_info: Vec<serde_json::Value> = papers
        .iter()
        .take(MAX_IR_PAPERS)
        .map(|paper| {
            serde_json::json!({
                "pmid": paper.pmid,
                "title": paper.title,
                "abstract": truncate_chars(&paper.abstract_text, IR_ABSTRACT_CAP),
            })
        })
        .collect();

    format!(
        "You are an interventional radiology expert. Decide whether each paper \
         below relates to interventional radiology.\n\n\
         ## IR topics (any one qualifies):\n\
         - Vascular intervention: TACE, TARE, embolization, stenting, TIPS, thrombectomy, aneurysm treatment\n\
         - Non-vascular intervention: percutaneous drainage, biopsy, vertebroplasty, nerve block\n\
         - Tumor ablation: RFA, MWA, cryoablation, IRE\n\
         - Image-guided procedures: CT/US/fluoroscopy guidance\n\
         - Vascular access: catheters, guidewires, puncture technique\n\
         - Interventional oncology: locoregional therapy of liver/kidney/lung tumors\n\n\
         ## Papers:\n{papers}\n\n\
         ## Output format (JSON only):\n\
         {{\"pmid1\": true, \"pmid2\": false, ...}}\n\n\
         true = IR related, false = not IR related",
        papers = serde_json::Value::Array(papers_info),
    )
}

/// Trim a chat history to the most recent turns.
#[must_use]
pub fn recent_history(history: &[ChatMessage]) -> &[ChatMessage] {
    let start = history.len().saturating_sub(MAX_HISTORY_TURNS);
    &history[start..]
}
