//! Aggregate analyzers over a paper list.
//!
//! Pure, stateless functions: keyword and author frequency tables and a
//! year-bucketed publication trend. No I/O; empty input yields empty output.

use std::collections::HashMap;

use crate::models::{AuthorCount, KeywordCount, Paper, YearCount};

/// Top-N keyword frequencies across all papers, descending by count.
///
/// Ties break ascending by keyword so the order is deterministic for a
/// given input.
#[must_use]
pub fn keyword_frequency(papers: &[Paper], top_n: usize) -> Vec<KeywordCount> {
    let terms = papers.iter().flat_map(|p| p.keywords.iter());
    top_counts(terms, top_n)
        .into_iter()
        .map(|(keyword, count)| KeywordCount { keyword, count })
        .collect()
}

/// Top-N author frequencies across all papers, descending by count.
#[must_use]
pub fn author_frequency(papers: &[Paper], top_n: usize) -> Vec<AuthorCount> {
    let names = papers.iter().flat_map(|p| p.authors.iter());
    top_counts(names, top_n)
        .into_iter()
        .map(|(author, count)| AuthorCount { author, count })
        .collect()
}

/// Paper counts per publication year, ascending by year string.
///
/// Uses the leading year component of each paper's date; papers whose
/// extracted value is not entirely numeric are skipped.
#[must_use]
pub fn year_trend(papers: &[Paper]) -> Vec<YearCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for paper in papers {
        if let Some(year) = paper.year() {
            *counts.entry(year.to_string()).or_insert(0) += 1;
        }
    }

    let mut years: Vec<YearCount> =
        counts.into_iter().map(|(year, count)| YearCount { year, count }).collect();
    years.sort_by(|a, b| a.year.cmp(&b.year));
    years
}

/// Count occurrences and keep the top N, count descending then term
/// ascending.
fn top_counts<'a>(terms: impl Iterator<Item = &'a String>, top_n: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for term in terms {
        *counts.entry(term.as_str()).or_insert(0) += 1;
    }

    let mut ranked: Vec<(String, usize)> =
        counts.into_iter().map(|(term, count)| (term.to_string(), count)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(top_n);
    ranked
}
