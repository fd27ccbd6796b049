//! Mock-based tests for the PubMed E-utilities client: esearch paging,
//! efetch parsing, and upstream failure surfacing.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pubmed_insight::client::PubMedClient;
use pubmed_insight::config::Config;
use pubmed_insight::error::ClientError;

fn setup_client(mock_server: &MockServer) -> PubMedClient {
    let config = Config::for_testing(&mock_server.uri());
    PubMedClient::new(&config).unwrap()
}

fn esearch_body(count: &str, ids: &[&str]) -> serde_json::Value {
    json!({
        "esearchresult": {
            "count": count,
            "idlist": ids
        }
    })
}

const SAMPLE_ARTICLE_SET: &str = r#"<?xml version="1.0"?>
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation>
      <PMID>11111</PMID>
      <Article>
        <ArticleTitle>Hepatic ablation outcomes</ArticleTitle>
        <Abstract>
          <AbstractText Label="BACKGROUND">Context here.</AbstractText>
          <AbstractText Label="RESULTS">Findings here.</AbstractText>
        </Abstract>
        <AuthorList>
          <Author>
            <LastName>Park</LastName>
            <ForeName>Jihye</ForeName>
          </Author>
        </AuthorList>
        <Journal>
          <Title>Journal of Testing</Title>
          <JournalIssue>
            <PubDate>
              <Year>2022</Year>
              <Month>04</Month>
            </PubDate>
          </JournalIssue>
        </Journal>
      </Article>
      <MeshHeadingList>
        <MeshHeading>
          <DescriptorName>Liver Neoplasms</DescriptorName>
        </MeshHeading>
      </MeshHeadingList>
    </MedlineCitation>
    <PubmedData>
      <ArticleIdList>
        <ArticleId IdType="pubmed">11111</ArticleId>
        <ArticleId IdType="pmc">PMC99999</ArticleId>
      </ArticleIdList>
    </PubmedData>
  </PubmedArticle>
</PubmedArticleSet>"#;

#[tokio::test]
async fn test_search_sends_paging_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/entrez/eutils/esearch.fcgi"))
        .and(query_param("db", "pubmed"))
        .and(query_param("term", "crispr"))
        .and(query_param("retmax", "20"))
        .and(query_param("retstart", "40"))
        .and(query_param("retmode", "json"))
        .and(query_param("sort", "relevance"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(esearch_body("123", &["1", "2", "3"])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let (total, pmids) = client.search("crispr", 3, 20, "relevance").await.unwrap();

    assert_eq!(total, 123);
    assert_eq!(pmids, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_search_accepts_numeric_count() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/entrez/eutils/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "esearchresult": {"count": 5, "idlist": ["9"]}
        })))
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let (total, pmids) = client.search("q", 1, 10, "pub_date").await.unwrap();

    assert_eq!(total, 5);
    assert_eq!(pmids, vec!["9"]);
}

#[tokio::test]
async fn test_search_surfaces_upstream_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/entrez/eutils/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let err = client.search("q", 1, 10, "relevance").await.unwrap_err();

    match err {
        ClientError::Status { status, message } => {
            assert_eq!(status, 429);
            assert!(message.contains("rate limited"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_details_parses_article_set() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/entrez/eutils/efetch.fcgi"))
        .and(query_param("db", "pubmed"))
        .and(query_param("id", "11111"))
        .and(query_param("retmode", "xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_ARTICLE_SET))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let papers = client.fetch_details(&["11111".to_string()]).await.unwrap();

    assert_eq!(papers.len(), 1);
    let paper = &papers[0];
    assert_eq!(paper.pmid, "11111");
    assert_eq!(paper.title, "Hepatic ablation outcomes");
    assert_eq!(paper.abstract_text, "BACKGROUND: Context here. RESULTS: Findings here.");
    assert_eq!(paper.authors, vec!["Park Jihye"]);
    assert_eq!(paper.journal, "Journal of Testing");
    assert_eq!(paper.pub_date, "2022-04");
    assert_eq!(paper.keywords, vec!["Liver Neoplasms"]);
    assert_eq!(paper.pmc_id.as_deref(), Some("PMC99999"));
}

#[tokio::test]
async fn test_fetch_details_batches_ids_in_one_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/entrez/eutils/efetch.fcgi"))
        .and(query_param("id", "1,2,3"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<PubmedArticleSet></PubmedArticleSet>"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let papers = client
        .fetch_details(&["1".to_string(), "2".to_string(), "3".to_string()])
        .await
        .unwrap();

    assert!(papers.is_empty());
}

#[tokio::test]
async fn test_fetch_details_empty_input_skips_network() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/entrez/eutils/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let papers = client.fetch_details(&[]).await.unwrap();

    assert!(papers.is_empty());
}

#[tokio::test]
async fn test_fetch_details_malformed_document_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/entrez/eutils/efetch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<PubmedArticleSet><PubmedArticle></Mismatched>"),
        )
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let result = client.fetch_details(&["1".to_string()]).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_fetch_one_missing_record_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/entrez/eutils/efetch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<PubmedArticleSet></PubmedArticleSet>"),
        )
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let paper = client.fetch_one("404404").await.unwrap();

    assert!(paper.is_none());
}
