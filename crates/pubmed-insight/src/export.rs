//! CSV export of a paper list.
//!
//! UTF-8 with a byte-order mark for spreadsheet compatibility; multi-valued
//! fields are semicolon-joined.

use crate::models::Paper;

/// UTF-8 byte-order mark expected by Excel.
const BOM: &str = "\u{feff}";

const HEADER: &str = "pmid,title,authors,abstract,pub_date,journal,keywords\n";

/// Render papers as a CSV document.
#[must_use]
pub fn to_csv(papers: &[Paper]) -> String {
    let mut output = String::from(BOM);
    output.push_str(HEADER);

    for paper in papers {
        let row = [
            csv_escape(&paper.pmid),
            csv_escape(&paper.title),
            csv_escape(&paper.authors.join("; ")),
            csv_escape(&paper.abstract_text),
            csv_escape(&paper.pub_date),
            csv_escape(&paper.journal),
            csv_escape(&paper.keywords.join("; ")),
        ];
        output.push_str(&row.join(","));
        output.push('\n');
    }

    output
}

/// Quote a field when it contains a delimiter, quote, or newline.
fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_paper() -> Paper {
        Paper {
            pmid: "12345".to_string(),
            title: "A study, with a comma".to_string(),
            authors: vec!["Kim Minjun".to_string(), "Lee".to_string()],
            abstract_text: "Background text.".to_string(),
            pub_date: "2021-03".to_string(),
            journal: "Test Journal".to_string(),
            keywords: vec!["crispr".to_string(), "Neoplasms".to_string()],
            pmc_id: None,
            citation_count: Some(3),
        }
    }

    #[test]
    fn test_csv_starts_with_bom_and_header() {
        let csv = to_csv(&[sample_paper()]);
        assert!(csv.starts_with('\u{feff}'));
        assert!(csv[3..].starts_with("pmid,title,authors,"));
    }

    #[test]
    fn test_csv_row_content() {
        let csv = to_csv(&[sample_paper()]);
        assert!(csv.contains("\"A study, with a comma\""));
        assert!(csv.contains("Kim Minjun; Lee"));
        assert!(csv.contains("crispr; Neoplasms"));
    }

    #[test]
    fn test_csv_escapes_quotes() {
        let paper = Paper { title: "say \"hi\"".to_string(), ..Paper::default() };
        let csv = to_csv(&[paper]);
        assert!(csv.contains("\"say \"\"hi\"\"\""));
    }

    #[test]
    fn test_csv_empty_input_is_header_only() {
        let csv = to_csv(&[]);
        assert_eq!(csv.lines().count(), 1);
    }
}
