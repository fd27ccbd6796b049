//! The Paper entity extracted from PubMed efetch XML.

use serde::{Deserialize, Serialize};

/// A single PubMed record in normalized form.
///
/// Constructed by the XML parser, enriched afterwards with a citation count
/// by the iCite collaborator, and otherwise immutable. Created fresh per
/// fetch; never cached.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paper {
    /// PubMed identifier. Empty string when the source PMID element is
    /// absent; such degenerate records are still kept.
    pub pmid: String,

    /// Article title, empty if absent.
    #[serde(default)]
    pub title: String,

    /// Author display names, "Lastname Forename" or "Lastname".
    #[serde(default)]
    pub authors: Vec<String>,

    /// All abstract segments joined by a single space, each prefixed with
    /// "Label: " when the source element carries a Label attribute.
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,

    /// Publication date as "YYYY", "YYYY-MM", or "YYYY-MM-DD" depending on
    /// which sub-fields were present.
    #[serde(default)]
    pub pub_date: String,

    /// Journal title, empty if absent.
    #[serde(default)]
    pub journal: String,

    /// Keyword elements followed by MeSH descriptor terms, encounter order,
    /// duplicates preserved.
    #[serde(default)]
    pub keywords: Vec<String>,

    /// PMC identifier when free full text is available.
    #[serde(default)]
    pub pmc_id: Option<String>,

    /// Citation count from iCite; absent until enrichment runs.
    #[serde(default)]
    pub citation_count: Option<u32>,
}

impl Paper {
    /// Leading year component of `pub_date` (characters before the first
    /// separator), or `None` when it is not entirely numeric.
    #[must_use]
    pub fn year(&self) -> Option<&str> {
        let year = self.pub_date.split('-').next().unwrap_or("");
        (!year.is_empty() && year.chars().all(|c| c.is_ascii_digit())).then_some(year)
    }

    /// Citation count or 0 if enrichment has not run.
    #[must_use]
    pub fn citations(&self) -> u32 {
        self.citation_count.unwrap_or(0)
    }

    /// Whether free full text is available through PMC.
    #[must_use]
    pub const fn has_free_full_text(&self) -> bool {
        self.pmc_id.is_some()
    }
}
