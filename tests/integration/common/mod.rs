//! Shared helpers for the mocked E-utilities tests

#![allow(dead_code)]

use std::path::Path;

use calamine::{Reader, Xlsx, open_workbook};
use pubmed_wordcloud::{ClientConfig, PubMedClient};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// ESearch response listing `pmids` with a top-level count of `total`
pub fn esearch_response(pmids: &[&str], total: usize) -> String {
    let ids: String = pmids
        .iter()
        .map(|id| format!("        <Id>{id}</Id>\n"))
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" ?>
<!DOCTYPE eSearchResult PUBLIC "-//NLM//DTD esearch 20060628//EN" "https://eutils.ncbi.nlm.nih.gov/eutils/dtd/20060628/esearch.dtd">
<eSearchResult>
    <Count>{total}</Count>
    <RetMax>{retmax}</RetMax>
    <RetStart>0</RetStart>
    <IdList>
{ids}    </IdList>
    <TranslationSet/>
    <TranslationStack>
        <TermSet>
            <Term>query[All Fields]</Term>
            <Field>All Fields</Field>
            <Count>987654</Count>
            <Explode>N</Explode>
        </TermSet>
        <OP>GROUP</OP>
    </TranslationStack>
    <QueryTranslation>query[All Fields]</QueryTranslation>
</eSearchResult>"#,
        retmax = pmids.len(),
    )
}

/// EFetch response with one article; `None` fields are left out of the XML
pub fn efetch_response(
    pmid: &str,
    title: Option<&str>,
    abstract_text: Option<&str>,
    year: Option<&str>,
) -> String {
    let title = title
        .map(|t| format!("<ArticleTitle>{t}</ArticleTitle>"))
        .unwrap_or_default();
    let abstract_xml = abstract_text
        .map(|a| format!("<Abstract><AbstractText>{a}</AbstractText></Abstract>"))
        .unwrap_or_default();
    let year = year.map(|y| format!("<Year>{y}</Year>")).unwrap_or_default();

    format!(
        r#"<?xml version="1.0" ?>
<!DOCTYPE PubmedArticleSet PUBLIC "-//NLM//DTD PubMedArticle, 1st January 2024//EN" "https://dtd.nlm.nih.gov/ncbi/pubmed/out/pubmed_240101.dtd">
<PubmedArticleSet>
    <PubmedArticle>
        <MedlineCitation Status="MEDLINE" Owner="NLM">
            <PMID Version="1">{pmid}</PMID>
            <Article PubModel="Print">
                <Journal>
                    <JournalIssue CitedMedium="Internet">
                        <PubDate>{year}<Month>Jan</Month></PubDate>
                    </JournalIssue>
                    <Title>Test Journal</Title>
                </Journal>
                {title}
                {abstract_xml}
            </Article>
        </MedlineCitation>
    </PubmedArticle>
</PubmedArticleSet>"#
    )
}

/// Mount an ESearch mock answering with `pmids`
pub async fn mount_esearch(mock_server: &MockServer, term: &str, pmids: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("term", term))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(esearch_response(pmids, pmids.len()))
                .insert_header("content-type", "text/xml"),
        )
        .mount(mock_server)
        .await;
}

/// Mount an EFetch mock for one PMID
pub async fn mount_efetch(mock_server: &MockServer, pmid: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("id", pmid))
        .respond_with(response)
        .mount(mock_server)
        .await;
}

/// A 200 response carrying an XML body
pub fn xml(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/xml")
}

/// Helper to create a client pointing at a mock server
pub fn create_mock_client(mock_server: &MockServer) -> PubMedClient {
    let config = ClientConfig::new()
        .with_base_url(mock_server.uri())
        .with_email("test@example.com");

    PubMedClient::with_config(config).expect("client should build")
}

/// Every row of the single sheet of an exported workbook, as text
pub fn read_xlsx_rows(path: &Path) -> Vec<Vec<String>> {
    let mut workbook: Xlsx<_> = open_workbook(path).expect("workbook should open");
    let range = workbook
        .worksheet_range("Sheet1")
        .expect("workbook should have Sheet1");

    range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}
