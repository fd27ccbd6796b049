//! PubMed boolean query construction.
//!
//! Composes an E-utilities search term from free text plus optional author
//! and date-range filters. Construction never fails; the worst case is the
//! raw input unchanged.

use serde::{Deserialize, Serialize};

/// Sentinel far-future year for open-ended start ranges.
const FAR_FUTURE_YEAR: &str = "3000";

/// Sentinel far-past year for open-ended end ranges.
const FAR_PAST_YEAR: &str = "1900";

/// Result sort preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Engine relevance ranking.
    #[default]
    Relevance,
    /// Newest first.
    Date,
    /// Most cited first. PubMed has no native citation sort; results are
    /// fetched in relevance order and re-sorted after citation enrichment.
    Citations,
}

impl SortBy {
    /// The esearch `sort` parameter value.
    #[must_use]
    pub const fn engine_key(self) -> &'static str {
        match self {
            Self::Relevance | Self::Citations => "relevance",
            Self::Date => "pub_date",
        }
    }

    /// Whether the caller must sort client-side after citation enrichment.
    #[must_use]
    pub const fn client_side(self) -> bool {
        matches!(self, Self::Citations)
    }
}

/// Build the esearch term from free text and optional filters.
///
/// - Author is AND-ed as an `[Author]` field filter.
/// - Both date bounds present: inclusive `[dp]` range. A single bound is
///   completed with a sentinel year on the open side. Years only.
#[must_use]
pub fn build_search_term(
    query: &str,
    author: Option<&str>,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> String {
    let mut term = query.to_string();

    if let Some(author) = author {
        term.push_str(&format!(" AND {author}[Author]"));
    }

    match (start_date, end_date) {
        (Some(start), Some(end)) => term.push_str(&format!(" AND {start}:{end}[dp]")),
        (Some(start), None) => term.push_str(&format!(" AND {start}:{FAR_FUTURE_YEAR}[dp]")),
        (None, Some(end)) => term.push_str(&format!(" AND {FAR_PAST_YEAR}:{end}[dp]")),
        (None, None) => (),
    }

    term
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_bare_query_unchanged() {
        assert_eq!(build_search_term("lung cancer", None, None, None), "lung cancer");
    }

    #[test]
    fn test_author_filter() {
        assert_eq!(
            build_search_term("crispr", Some("Doudna"), None, None),
            "crispr AND Doudna[Author]"
        );
    }

    #[test]
    fn test_date_range_both_bounds() {
        assert_eq!(
            build_search_term("crispr", None, Some("2015"), Some("2020")),
            "crispr AND 2015:2020[dp]"
        );
    }

    #[test]
    fn test_date_range_open_end() {
        assert_eq!(
            build_search_term("crispr", None, Some("2015"), None),
            "crispr AND 2015:3000[dp]"
        );
    }

    #[test]
    fn test_date_range_open_start() {
        assert_eq!(
            build_search_term("crispr", None, None, Some("2020")),
            "crispr AND 1900:2020[dp]"
        );
    }

    #[test]
    fn test_all_filters_combined() {
        assert_eq!(
            build_search_term("tace", Some("Kim"), Some("2018"), Some("2024")),
            "tace AND Kim[Author] AND 2018:2024[dp]"
        );
    }

    #[test]
    fn test_sort_engine_keys() {
        assert_eq!(SortBy::Relevance.engine_key(), "relevance");
        assert_eq!(SortBy::Date.engine_key(), "pub_date");
        assert_eq!(SortBy::Citations.engine_key(), "relevance");
    }

    #[test]
    fn test_only_citations_sorts_client_side() {
        assert!(SortBy::Citations.client_side());
        assert!(!SortBy::Relevance.client_side());
        assert!(!SortBy::Date.client_side());
    }

    #[test]
    fn test_sort_deserializes_lowercase() {
        let sort: SortBy = serde_json::from_str("\"citations\"").unwrap();
        assert_eq!(sort, SortBy::Citations);
    }

    proptest! {
        /// The built term always contains the original query, and each
        /// configured filter clause exactly once.
        #[test]
        fn prop_term_is_superset_with_each_clause_once(
            query in "[a-z ]{1,20}",
            author in proptest::option::of("[A-Z][a-z]{1,10}"),
            start in proptest::option::of("(19|20)[0-9]{2}"),
            end in proptest::option::of("(19|20)[0-9]{2}"),
        ) {
            let term = build_search_term(
                &query,
                author.as_deref(),
                start.as_deref(),
                end.as_deref(),
            );

            prop_assert!(term.contains(&query));

            if let Some(author) = &author {
                let clause = format!("AND {author}[Author]");
                prop_assert_eq!(term.matches(&clause).count(), 1);
            }

            let date_clauses = term.matches("[dp]").count();
            if start.is_some() || end.is_some() {
                prop_assert_eq!(date_clauses, 1);
            } else {
                prop_assert_eq!(date_clauses, 0);
            }
        }
    }
}
