//! PubMed efetch XML parser.
//!
//! Event-driven extraction of normalized [`Paper`] records from a
//! `PubmedArticleSet` document. The schema is loosely structured and
//! partially optional, so every field read is defensive: a missing
//! sub-element degrades to an empty value, a failing record is dropped with
//! a diagnostic, and only a document that is not well-formed XML fails the
//! whole call.

use quick_xml::events::Event;
use quick_xml::name::QName;
use quick_xml::Reader;

use crate::error::{ClientError, ClientResult};
use crate::models::Paper;

/// Parse an efetch response into papers, in document order.
///
/// Records that fail to parse are logged and skipped; the batch never fails
/// because of a single record.
///
/// # Errors
///
/// Returns [`ClientError::Xml`] only when the document itself is malformed.
pub fn parse_articles(xml: &str) -> ClientResult<Vec<Paper>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut papers = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name() == QName(b"PubmedArticle") => {
                match parse_record(&mut reader, &mut buf) {
                    Ok(paper) => papers.push(paper),
                    Err(RecordError::Document(e)) => return Err(ClientError::Xml(e)),
                    Err(RecordError::Record(e)) => {
                        tracing::warn!(error = %e, "skipping unparseable PubmedArticle record");
                        skip_record(&mut reader, &mut buf)?;
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ClientError::Xml(e)),
            _ => (),
        }
        buf.clear();
    }

    Ok(papers)
}

/// Failure modes while inside one record.
enum RecordError {
    /// Recoverable: drop this record, keep the batch.
    Record(String),
    /// The reader itself is broken; the whole document fails.
    Document(quick_xml::Error),
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Record(msg) => write!(f, "{msg}"),
            Self::Document(e) => write!(f, "{e}"),
        }
    }
}

/// Parse one `PubmedArticle` element; the opening tag is already consumed.
///
/// All field reads default to empty rather than failing, so the only record
/// errors left are broken text escapes and broken attributes.
fn parse_record(reader: &mut Reader<&[u8]>, buf: &mut Vec<u8>) -> Result<Paper, RecordError> {
    let mut pmid: Option<String> = None;
    let mut title = String::new();
    let mut authors: Vec<String> = Vec::new();
    let mut abstract_parts: Vec<String> = Vec::new();
    let mut journal = String::new();
    let mut keywords: Vec<String> = Vec::new();
    let mut mesh_terms: Vec<String> = Vec::new();
    let mut pmc_id: Option<String> = None;

    // Date parts from the first PubDate sub-tree only.
    let mut year = String::new();
    let mut month = String::new();
    let mut day = String::new();
    let mut pub_date_seen = false;

    // Element tracking. The text accumulator collects character data of the
    // innermost field element currently open.
    let mut text = String::new();
    let mut in_field = false;
    let mut in_journal = false;
    let mut in_author = false;
    let mut in_pub_date = false;
    let mut in_mesh_heading = false;

    // Per-author state; an author with a blank surname is omitted entirely.
    let mut last_name = String::new();
    let mut fore_name = String::new();

    // Pending attribute state for the element currently accumulating text.
    let mut abstract_label: Option<String> = None;
    let mut article_id_type: Option<String> = None;

    loop {
        match reader.read_event_into(buf) {
            Ok(Event::Start(ref e)) => {
                match e.name().as_ref() {
                    b"Journal" => in_journal = true,
                    b"Author" => {
                        in_author = true;
                        last_name.clear();
                        fore_name.clear();
                    }
                    b"PubDate" if !pub_date_seen => in_pub_date = true,
                    b"MeshHeading" => in_mesh_heading = true,
                    b"PMID" | b"ArticleTitle" | b"Keyword" => {
                        in_field = true;
                        text.clear();
                    }
                    b"LastName" | b"ForeName" if in_author => {
                        in_field = true;
                        text.clear();
                    }
                    b"Title" if in_journal => {
                        in_field = true;
                        text.clear();
                    }
                    b"Year" | b"Month" | b"Day" if in_pub_date => {
                        in_field = true;
                        text.clear();
                    }
                    b"DescriptorName" if in_mesh_heading => {
                        in_field = true;
                        text.clear();
                    }
                    b"AbstractText" => {
                        in_field = true;
                        text.clear();
                        abstract_label = attribute_value(e, b"Label")?;
                    }
                    b"ArticleId" => {
                        in_field = true;
                        text.clear();
                        article_id_type = attribute_value(e, b"IdType")?;
                    }
                    _ => (),
                }
            }
            Ok(Event::Text(ref e)) if in_field => {
                let unescaped = e
                    .unescape()
                    .map_err(|e| RecordError::Record(format!("invalid text content: {e}")))?;
                text.push_str(&unescaped);
            }
            Ok(Event::End(ref e)) => {
                match e.name().as_ref() {
                    b"PubmedArticle" => break,
                    b"Journal" => in_journal = false,
                    b"MeshHeading" => in_mesh_heading = false,
                    b"PubDate" if in_pub_date => {
                        in_pub_date = false;
                        pub_date_seen = true;
                    }
                    b"Author" => {
                        in_author = false;
                        // Blank surname means the entry is dropped, not a
                        // placeholder.
                        if !last_name.is_empty() {
                            if fore_name.is_empty() {
                                authors.push(last_name.clone());
                            } else {
                                authors.push(format!("{last_name} {fore_name}"));
                            }
                        }
                    }
                    b"PMID" => {
                        // CommentsCorrections carry PMIDs too; only the
                        // first one in the record identifies it.
                        if pmid.is_none() {
                            pmid = Some(text.clone());
                        }
                        in_field = false;
                    }
                    b"ArticleTitle" => {
                        if title.is_empty() {
                            title = text.clone();
                        }
                        in_field = false;
                    }
                    b"AbstractText" => {
                        if !text.is_empty() {
                            match abstract_label.take() {
                                Some(label) if !label.is_empty() => {
                                    abstract_parts.push(format!("{label}: {text}"));
                                }
                                _ => abstract_parts.push(text.clone()),
                            }
                        }
                        in_field = false;
                    }
                    b"LastName" => {
                        last_name = text.clone();
                        in_field = false;
                    }
                    b"ForeName" => {
                        fore_name = text.clone();
                        in_field = false;
                    }
                    b"Title" => {
                        if in_journal && journal.is_empty() {
                            journal = text.clone();
                        }
                        in_field = false;
                    }
                    b"Year" => {
                        if in_pub_date {
                            year = text.clone();
                        }
                        in_field = false;
                    }
                    b"Month" => {
                        if in_pub_date {
                            month = text.clone();
                        }
                        in_field = false;
                    }
                    b"Day" => {
                        if in_pub_date {
                            day = text.clone();
                        }
                        in_field = false;
                    }
                    b"Keyword" => {
                        if !text.is_empty() {
                            keywords.push(text.clone());
                        }
                        in_field = false;
                    }
                    b"DescriptorName" => {
                        if !text.is_empty() {
                            mesh_terms.push(text.clone());
                        }
                        in_field = false;
                    }
                    b"ArticleId" => {
                        if pmc_id.is_none()
                            && article_id_type.take().as_deref() == Some("pmc")
                            && !text.is_empty()
                        {
                            pmc_id = Some(text.clone());
                        }
                        in_field = false;
                    }
                    _ => (),
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(RecordError::Document(e)),
            _ => (),
        }
        buf.clear();
    }

    // Day only appended when a month is present, month only with a year.
    let mut pub_date = String::new();
    if !year.is_empty() {
        pub_date = year;
        if !month.is_empty() {
            pub_date.push('-');
            pub_date.push_str(&month);
            if !day.is_empty() {
                pub_date.push('-');
                pub_date.push_str(&day);
            }
        }
    }

    keywords.extend(mesh_terms);

    Ok(Paper {
        pmid: pmid.unwrap_or_default(),
        title,
        authors,
        abstract_text: abstract_parts.join(" "),
        pub_date,
        journal,
        keywords,
        pmc_id,
        citation_count: None,
    })
}

/// Read one attribute of a start tag, unescaped.
fn attribute_value(
    e: &quick_xml::events::BytesStart<'_>,
    key: &[u8],
) -> Result<Option<String>, RecordError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| RecordError::Record(format!("invalid attribute: {e}")))?;
        if attr.key.as_ref() == key {
            let value = attr
                .unescape_value()
                .map_err(|e| RecordError::Record(format!("invalid attribute value: {e}")))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Consume events until the end of the current `PubmedArticle` element.
///
/// Used after a record-level failure so the following records can still be
/// parsed; a reader error here means the document itself is broken.
fn skip_record(reader: &mut Reader<&[u8]>, buf: &mut Vec<u8>) -> ClientResult<()> {
    loop {
        match reader.read_event_into(buf) {
            Ok(Event::End(ref e)) if e.name() == QName(b"PubmedArticle") => return Ok(()),
            Ok(Event::Eof) => return Ok(()),
            Err(e) => return Err(ClientError::Xml(e)),
            _ => (),
        }
        buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(records: &str) -> String {
        format!("<?xml version=\"1.0\"?><PubmedArticleSet>{records}</PubmedArticleSet>")
    }

    const FULL_RECORD: &str = r#"
        <PubmedArticle>
          <MedlineCitation>
            <PMID Version="1">12345</PMID>
            <Article>
              <Journal>
                <Title>Test Journal of Medicine</Title>
                <JournalIssue>
                  <PubDate><Year>2021</Year><Month>03</Month><Day>15</Day></PubDate>
                </JournalIssue>
              </Journal>
              <ArticleTitle>A study of things</ArticleTitle>
              <Abstract>
                <AbstractText Label="BACKGROUND">Background text.</AbstractText>
                <AbstractText Label="RESULTS">Results text.</AbstractText>
              </Abstract>
              <AuthorList>
                <Author><LastName>Kim</LastName><ForeName>Minjun</ForeName></Author>
                <Author><LastName>Lee</LastName></Author>
              </AuthorList>
            </Article>
            <MeshHeadingList>
              <MeshHeading><DescriptorName>Neoplasms</DescriptorName></MeshHeading>
            </MeshHeadingList>
            <KeywordList><Keyword>crispr</Keyword></KeywordList>
          </MedlineCitation>
          <PubmedData>
            <ArticleIdList>
              <ArticleId IdType="pubmed">12345</ArticleId>
              <ArticleId IdType="pmc">PMC99887</ArticleId>
            </ArticleIdList>
          </PubmedData>
        </PubmedArticle>"#;

    #[test]
    fn test_full_record_extraction() {
        let papers = parse_articles(&wrap(FULL_RECORD)).unwrap();
        assert_eq!(papers.len(), 1);

        let paper = &papers[0];
        assert_eq!(paper.pmid, "12345");
        assert_eq!(paper.title, "A study of things");
        assert_eq!(paper.authors, vec!["Kim Minjun", "Lee"]);
        assert_eq!(paper.abstract_text, "BACKGROUND: Background text. RESULTS: Results text.");
        assert_eq!(paper.pub_date, "2021-03-15");
        assert_eq!(paper.journal, "Test Journal of Medicine");
        assert_eq!(paper.keywords, vec!["crispr", "Neoplasms"]);
        assert_eq!(paper.pmc_id.as_deref(), Some("PMC99887"));
        assert_eq!(paper.citation_count, None);
    }

    #[test]
    fn test_year_only_date() {
        let xml = wrap(
            "<PubmedArticle><MedlineCitation><PMID>1</PMID>\
             <Article><Journal><JournalIssue><PubDate><Year>1999</Year></PubDate>\
             </JournalIssue></Journal></Article></MedlineCitation></PubmedArticle>",
        );
        let papers = parse_articles(&xml).unwrap();
        assert_eq!(papers[0].pub_date, "1999");
    }

    #[test]
    fn test_month_without_year_is_empty() {
        let xml = wrap(
            "<PubmedArticle><MedlineCitation><PMID>1</PMID>\
             <Article><Journal><JournalIssue><PubDate><Month>05</Month></PubDate>\
             </JournalIssue></Journal></Article></MedlineCitation></PubmedArticle>",
        );
        let papers = parse_articles(&xml).unwrap();
        assert_eq!(papers[0].pub_date, "");
    }

    #[test]
    fn test_day_without_month_not_appended() {
        let xml = wrap(
            "<PubmedArticle><MedlineCitation><PMID>1</PMID>\
             <Article><Journal><JournalIssue><PubDate><Year>2020</Year><Day>09</Day></PubDate>\
             </JournalIssue></Journal></Article></MedlineCitation></PubmedArticle>",
        );
        let papers = parse_articles(&xml).unwrap();
        assert_eq!(papers[0].pub_date, "2020");
    }

    #[test]
    fn test_blank_surname_author_omitted() {
        let xml = wrap(
            "<PubmedArticle><MedlineCitation><PMID>1</PMID><Article><AuthorList>\
             <Author><LastName></LastName><ForeName>Ghost</ForeName></Author>\
             <Author><ForeName>NoSurname</ForeName></Author>\
             <Author><LastName>Park</LastName><ForeName>Jiwoo</ForeName></Author>\
             </AuthorList></Article></MedlineCitation></PubmedArticle>",
        );
        let papers = parse_articles(&xml).unwrap();
        assert_eq!(papers[0].authors, vec!["Park Jiwoo"]);
    }

    #[test]
    fn test_zero_authors_zero_keywords() {
        let xml = wrap("<PubmedArticle><MedlineCitation><PMID>7</PMID></MedlineCitation></PubmedArticle>");
        let papers = parse_articles(&xml).unwrap();
        assert!(papers[0].authors.is_empty());
        assert!(papers[0].keywords.is_empty());
        assert_eq!(papers[0].abstract_text, "");
    }

    #[test]
    fn test_missing_pmid_still_yields_record() {
        let xml = wrap(
            "<PubmedArticle><MedlineCitation>\
             <Article><ArticleTitle>Orphan</ArticleTitle></Article>\
             </MedlineCitation></PubmedArticle>",
        );
        let papers = parse_articles(&xml).unwrap();
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].pmid, "");
        assert_eq!(papers[0].title, "Orphan");
    }

    #[test]
    fn test_document_order_preserved() {
        let records: String = (1..=3)
            .map(|i| {
                format!(
                    "<PubmedArticle><MedlineCitation><PMID>{i}</PMID>\
                     </MedlineCitation></PubmedArticle>"
                )
            })
            .collect();
        let papers = parse_articles(&wrap(&records)).unwrap();
        let pmids: Vec<&str> = papers.iter().map(|p| p.pmid.as_str()).collect();
        assert_eq!(pmids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_bad_record_dropped_batch_survives() {
        let records = "<PubmedArticle><MedlineCitation><PMID>1</PMID></MedlineCitation></PubmedArticle>\
             <PubmedArticle><MedlineCitation><PMID>2</PMID>\
             <Article><ArticleTitle>bad &bogus; entity</ArticleTitle></Article>\
             </MedlineCitation></PubmedArticle>\
             <PubmedArticle><MedlineCitation><PMID>3</PMID></MedlineCitation></PubmedArticle>";
        let papers = parse_articles(&wrap(records)).unwrap();
        let pmids: Vec<&str> = papers.iter().map(|p| p.pmid.as_str()).collect();
        assert_eq!(pmids, vec!["1", "3"]);
    }

    #[test]
    fn test_malformed_document_fails_whole_call() {
        let result = parse_articles("<PubmedArticleSet><PubmedArticle></Wrong>");
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_document_yields_no_papers() {
        let papers = parse_articles(&wrap("")).unwrap();
        assert!(papers.is_empty());
    }

    #[test]
    fn test_unlabeled_abstract_segment() {
        let xml = wrap(
            "<PubmedArticle><MedlineCitation><PMID>1</PMID><Article><Abstract>\
             <AbstractText>Plain text.</AbstractText>\
             </Abstract></Article></MedlineCitation></PubmedArticle>",
        );
        let papers = parse_articles(&xml).unwrap();
        assert_eq!(papers[0].abstract_text, "Plain text.");
    }

    #[test]
    fn test_duplicate_keywords_not_deduplicated() {
        let xml = wrap(
            "<PubmedArticle><MedlineCitation><PMID>1</PMID>\
             <MeshHeadingList><MeshHeading><DescriptorName>crispr</DescriptorName></MeshHeading></MeshHeadingList>\
             <KeywordList><Keyword>crispr</Keyword></KeywordList>\
             </MedlineCitation></PubmedArticle>",
        );
        let papers = parse_articles(&xml).unwrap();
        assert_eq!(papers[0].keywords, vec!["crispr", "crispr"]);
    }
}
