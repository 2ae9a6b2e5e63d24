//! Integration tests for ESearch using mocked HTTP responses
//!
//! These tests verify query encoding, response parsing and the fatal error
//! paths of a search without making real API calls.

mod common;

use common::{create_mock_client, esearch_response};
use pubmed_wordcloud::Error;
use rstest::rstest;
use tracing_test::traced_test;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
#[traced_test]
async fn test_search_sends_expected_parameters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("db", "pubmed"))
        .and(query_param("retmode", "xml"))
        .and(query_param("term", "covid-19 AND lung cancer"))
        .and(query_param("retmax", "1000"))
        .and(query_param("email", "test@example.com"))
        .and(query_param("tool", "pubmed-wordcloud"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(esearch_response(&["111", "222"], 2)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let result = client
        .search("covid-19 AND lung cancer", 1000)
        .await
        .expect("search should succeed");

    assert_eq!(result.pmids, vec!["111", "222"]);
    assert_eq!(result.total_count, 2);
}

#[tokio::test]
#[traced_test]
async fn test_total_count_may_exceed_returned_ids() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(esearch_response(&["1", "2", "3"], 245_871)),
        )
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let result = client.search("diabetes", 3).await.unwrap();

    assert_eq!(result.pmids.len(), 3);
    // the per-term Count inside TranslationStack is not the total
    assert_eq!(result.total_count, 245_871);
}

#[tokio::test]
#[traced_test]
async fn test_empty_query_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let result = client.search("   ", 1000).await.unwrap();

    assert!(result.pmids.is_empty());
    assert_eq!(result.total_count, 0);
}

#[rstest]
#[case(500)]
#[case(429)]
#[case(404)]
#[tokio::test]
async fn test_non_success_status_is_fatal(#[case] status: u16) {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let err = client.search("diabetes", 10).await.unwrap_err();

    match err {
        Error::ApiError { status: got, .. } => assert_eq!(got, status),
        other => panic!("expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
#[traced_test]
async fn test_error_element_is_fatal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<eSearchResult><ERROR>Invalid query syntax</ERROR></eSearchResult>",
        ))
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let err = client.search("((", 10).await.unwrap_err();

    assert!(matches!(err, Error::ApiError { .. }));
    assert!(err.to_string().contains("Invalid query syntax"));
}

#[rstest]
#[case::html("<html><body>Service temporarily unavailable</body></html>")]
#[case::missing_count("<eSearchResult><IdList><Id>1</Id></IdList></eSearchResult>")]
#[case::mismatched_tags("<eSearchResult><Count>3</IdList></eSearchResult>")]
#[tokio::test]
async fn test_unparseable_response_is_fatal(#[case] body: &str) {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&mock_server)
        .await;

    let client = create_mock_client(&mock_server);
    let err = client.search("diabetes", 10).await.unwrap_err();

    assert!(matches!(err, Error::XmlParseError { .. }), "got {err:?}");
}
