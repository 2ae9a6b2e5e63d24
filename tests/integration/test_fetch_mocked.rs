//! Integration tests for per-record EFetch and collection using mocked HTTP responses

mod common;

use std::time::Duration;

use common::{create_mock_client, efetch_response, mount_efetch, xml};
use pubmed_wordcloud::{
    ClientConfig, FailureReason, FetchOutcome, PubMedClient, collect_records,
};
use tracing_test::traced_test;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STRUCTURED_ABSTRACT_RESPONSE: &str = r#"<?xml version="1.0" ?>
<PubmedArticleSet>
    <PubmedArticle>
        <MedlineCitation Status="MEDLINE" Owner="NLM">
            <PMID Version="1">33515491</PMID>
            <Article PubModel="Print-Electronic">
                <Journal>
                    <JournalIssue CitedMedium="Internet">
                        <Volume>12</Volume>
                        <PubDate>
                            <Year>2021</Year>
                            <Month>Feb</Month>
                        </PubDate>
                    </JournalIssue>
                    <Title>Nature communications</Title>
                </Journal>
                <ArticleTitle>Metformin and <i>GLP-1</i> receptor agonists in type 2 diabetes.</ArticleTitle>
                <Abstract>
                    <AbstractText Label="BACKGROUND" NlmCategory="BACKGROUND">Insulin resistance drives
                        hyperglycemia.</AbstractText>
                    <AbstractText Label="RESULTS" NlmCategory="RESULTS">Metformin lowered HbA1c.</AbstractText>
                </Abstract>
            </Article>
        </MedlineCitation>
        <PubmedData>
            <History>
                <PubMedPubDate PubStatus="received"><Year>2020</Year></PubMedPubDate>
            </History>
        </PubmedData>
    </PubmedArticle>
</PubmedArticleSet>"#;

#[tokio::test]
#[traced_test]
async fn test_fetch_record_extracts_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("db", "pubmed"))
        .and(query_param("retmode", "xml"))
        .and(query_param("id", "33515491"))
        .respond_with(xml(STRUCTURED_ABSTRACT_RESPONSE.to_string()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let FetchOutcome::Fetched(record) = client.fetch_record("33515491").await else {
        panic!("expected a fetched record");
    };

    assert_eq!(record.pmid, "33515491");
    assert_eq!(
        record.title.as_deref(),
        Some("Metformin and GLP-1 receptor agonists in type 2 diabetes.")
    );
    assert_eq!(
        record.abstract_text.as_deref(),
        Some("Insulin resistance drives hyperglycemia. Metformin lowered HbA1c.")
    );
    assert_eq!(record.pub_year.as_deref(), Some("2021"));
}

#[tokio::test]
#[traced_test]
async fn test_missing_fields_are_not_failures() {
    let mock_server = MockServer::start().await;
    mount_efetch(
        &mock_server,
        "1001",
        xml(efetch_response("1001", Some("Editorial"), None, None)),
    )
    .await;

    let client = create_mock_client(&mock_server);
    let outcome = client.fetch_record("1001").await;

    let FetchOutcome::Fetched(record) = outcome else {
        panic!("expected a fetched record");
    };
    assert_eq!(record.title.as_deref(), Some("Editorial"));
    assert_eq!(record.abstract_text, None);
    assert_eq!(record.pub_year, None);
    assert_eq!(record.abstract_or_placeholder(), "Abstract not available");
    assert_eq!(record.year_or_placeholder(), "Year not available");
}

#[tokio::test]
#[traced_test]
async fn test_http_error_becomes_failure() {
    let mock_server = MockServer::start().await;
    mount_efetch(&mock_server, "2002", ResponseTemplate::new(500)).await;

    let client = create_mock_client(&mock_server);
    let outcome = client.fetch_record("2002").await;

    match outcome {
        FetchOutcome::Failed(failure) => {
            assert_eq!(failure.pmid, "2002");
            assert_eq!(failure.reason, FailureReason::HttpStatus(500));
        }
        FetchOutcome::Fetched(_) => panic!("expected a failure"),
    }
}

#[tokio::test]
#[traced_test]
async fn test_empty_article_set_is_not_found() {
    let mock_server = MockServer::start().await;
    mount_efetch(
        &mock_server,
        "3003",
        xml("<PubmedArticleSet></PubmedArticleSet>".to_string()),
    )
    .await;

    let client = create_mock_client(&mock_server);
    let outcome = client.fetch_record("3003").await;

    assert!(matches!(
        outcome,
        FetchOutcome::Failed(ref f) if f.reason == FailureReason::NotFound
    ));
}

#[tokio::test]
#[traced_test]
async fn test_malformed_xml_becomes_failure() {
    let mock_server = MockServer::start().await;
    mount_efetch(
        &mock_server,
        "4004",
        xml("<PubmedArticleSet><PubmedArticle><ArticleTitle>x</PubmedArticle>".to_string()),
    )
    .await;

    let client = create_mock_client(&mock_server);
    let outcome = client.fetch_record("4004").await;

    assert!(matches!(
        outcome,
        FetchOutcome::Failed(ref f) if matches!(f.reason, FailureReason::MalformedXml(_))
    ));
}

#[tokio::test]
#[traced_test]
async fn test_timeout_becomes_transport_failure() {
    let mock_server = MockServer::start().await;
    mount_efetch(
        &mock_server,
        "5005",
        xml(efetch_response("5005", Some("Slow"), None, None)).set_delay(Duration::from_secs(5)),
    )
    .await;

    let config = ClientConfig::new()
        .with_base_url(mock_server.uri())
        .with_timeout(Duration::from_millis(200));
    let client = PubMedClient::with_config(config).unwrap();
    let outcome = client.fetch_record("5005").await;

    assert!(matches!(
        outcome,
        FetchOutcome::Failed(ref f) if matches!(f.reason, FailureReason::Transport(_))
    ));
}

#[tokio::test]
#[traced_test]
async fn test_invalid_pmid_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let outcome = client.fetch_record("PMC123").await;

    assert!(matches!(
        outcome,
        FetchOutcome::Failed(ref f) if f.reason == FailureReason::InvalidPmid
    ));
}

#[tokio::test]
#[traced_test]
async fn test_collect_records_partitions_in_order() {
    let mock_server = MockServer::start().await;
    let pmids: Vec<String> = ["11", "22", "33", "44", "55"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    mount_efetch(&mock_server, "11", xml(efetch_response("11", Some("A"), Some("a"), Some("2001")))).await;
    mount_efetch(&mock_server, "22", ResponseTemplate::new(503)).await;
    mount_efetch(&mock_server, "33", xml(efetch_response("33", Some("C"), None, Some("2003")))).await;
    mount_efetch(&mock_server, "44", xml("<PubmedArticleSet/>".to_string())).await;
    mount_efetch(&mock_server, "55", xml(efetch_response("55", None, Some("e"), None))).await;

    let client = create_mock_client(&mock_server);
    let mut seen = Vec::new();
    let collection = collect_records(&client, &pmids, |progress| {
        seen.push((progress.position, progress.total, progress.outcome.pmid().to_string()));
    })
    .await;

    let article_ids: Vec<_> = collection.articles.iter().map(|a| a.pmid.as_str()).collect();
    assert_eq!(article_ids, vec!["11", "33", "55"]);
    assert_eq!(collection.failed_pmids(), vec!["22", "44"]);
    assert_eq!(collection.len(), pmids.len());

    // every requested id appears exactly once across both partitions
    let mut all: Vec<&str> = article_ids
        .iter()
        .copied()
        .chain(collection.failed_pmids())
        .collect();
    all.sort_unstable();
    assert_eq!(all, vec!["11", "22", "33", "44", "55"]);

    assert_eq!(
        seen,
        vec![
            (1, 5, "11".to_string()),
            (2, 5, "22".to_string()),
            (3, 5, "33".to_string()),
            (4, 5, "44".to_string()),
            (5, 5, "55".to_string()),
        ]
    );
}

#[tokio::test]
#[traced_test]
async fn test_collect_records_with_no_ids() {
    let mock_server = MockServer::start().await;
    let client = create_mock_client(&mock_server);

    let collection = collect_records(&client, &[], |_| panic!("no progress expected")).await;

    assert!(collection.is_empty());
}
