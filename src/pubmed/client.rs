use reqwest::{Client, Response};
use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::pubmed::models::{
    ArticleRecord, FailureReason, FetchFailure, FetchOutcome, SearchResult,
};
use crate::pubmed::parser::PubMedXmlParser;

/// Client for the PubMed ESearch and EFetch endpoints
#[derive(Clone)]
pub struct PubMedClient {
    client: Client,
    base_url: String,
    config: ClientConfig,
}

impl PubMedClient {
    /// Create a new PubMed client with default configuration
    ///
    /// # Example
    ///
    /// ```
    /// use pubmed_wordcloud::PubMedClient;
    ///
    /// let client = PubMedClient::new().unwrap();
    /// ```
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::new())
    }

    /// Create a new PubMed client with custom configuration
    ///
    /// # Example
    ///
    /// ```
    /// use pubmed_wordcloud::{ClientConfig, PubMedClient};
    ///
    /// let config = ClientConfig::new().with_email("researcher@university.edu");
    /// let client = PubMedClient::with_config(config).unwrap();
    /// ```
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.effective_user_agent())
            .build()?;

        Ok(Self::with_client(client, config))
    }

    /// Create a PubMed client around an existing HTTP client
    pub fn with_client(client: Client, config: ClientConfig) -> Self {
        let base_url = config.effective_base_url().to_string();

        Self {
            client,
            base_url,
            config,
        }
    }

    fn build_url(&self, endpoint: &str, params: &[(&str, &str)]) -> String {
        let mut url = format!("{}/{}", self.base_url, endpoint);
        let mut separator = '?';

        let api_params = self.config.build_api_params();
        let all_params = params
            .iter()
            .map(|(key, value)| (*key, *value))
            .chain(api_params.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        for (key, value) in all_params {
            url.push(separator);
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
            separator = '&';
        }

        url
    }

    async fn get(&self, url: &str) -> Result<Response> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            warn!("API request failed with status: {}", response.status());
            return Err(Error::from_status(response.status()));
        }

        Ok(response)
    }

    /// Search PubMed and return identifiers plus the total match count
    ///
    /// Any failure here is fatal to a run: a non-success status, an
    /// unreachable endpoint or a response that is not an ESearch document.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pubmed_wordcloud::PubMedClient;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = PubMedClient::new()?;
    ///     let result = client.search("diabetes", 20).await?;
    ///     println!("{} of {} PMIDs", result.pmids.len(), result.total_count);
    ///     Ok(())
    /// }
    /// ```
    #[instrument(skip(self), fields(query = %query, max_results = max_results))]
    pub async fn search(&self, query: &str, max_results: usize) -> Result<SearchResult> {
        if query.trim().is_empty() {
            debug!("Empty query provided, returning empty results");
            return Ok(SearchResult {
                pmids: Vec::new(),
                total_count: 0,
            });
        }

        let retmax = max_results.to_string();
        let url = self.build_url(
            "esearch.fcgi",
            &[
                ("db", "pubmed"),
                ("retmode", "xml"),
                ("term", query),
                ("retmax", &retmax),
            ],
        );

        debug!("Making ESearch API request");
        let xml = self.get(&url).await?.text().await?;
        let result = PubMedXmlParser::parse_search_result(&xml)?;

        info!(
            total_count = result.total_count,
            returned_count = result.pmids.len(),
            "Search completed successfully"
        );

        Ok(result)
    }

    /// Fetch the EFetch XML document for one PMID
    #[instrument(skip(self), fields(pmid = %pmid))]
    pub async fn fetch_record_xml(&self, pmid: &str) -> Result<String> {
        let url = self.build_url(
            "efetch.fcgi",
            &[("db", "pubmed"), ("retmode", "xml"), ("id", pmid)],
        );

        debug!("Making EFetch API request");
        Ok(self.get(&url).await?.text().await?)
    }

    /// Fetch and parse one record
    ///
    /// Never fails: anything that prevents a record from being built is
    /// reported as a [`FetchFailure`]. Missing title, abstract or year do not
    /// count as failures.
    #[instrument(skip(self), fields(pmid = %pmid))]
    pub async fn fetch_record(&self, pmid: &str) -> FetchOutcome {
        let failed = |reason: FailureReason| {
            FetchOutcome::Failed(FetchFailure {
                pmid: pmid.to_string(),
                reason,
            })
        };

        if pmid.trim().is_empty() || !pmid.chars().all(|c| c.is_ascii_digit()) {
            warn!("Invalid PMID format provided");
            return failed(FailureReason::InvalidPmid);
        }

        let xml = match self.fetch_record_xml(pmid).await {
            Ok(xml) => xml,
            Err(Error::ApiError { status, .. }) => {
                warn!(status, "Error fetching article");
                return failed(FailureReason::HttpStatus(status));
            }
            Err(e) => {
                warn!(error = %e, "Error fetching article");
                return failed(FailureReason::Transport(e.to_string()));
            }
        };

        match PubMedXmlParser::parse_article_record(&xml, pmid) {
            Ok(Some(record)) => {
                log_parsed(&record);
                FetchOutcome::Fetched(record)
            }
            Ok(None) => {
                warn!("EFetch response contained no article");
                failed(FailureReason::NotFound)
            }
            Err(e) => {
                warn!(error = %e, "Failed to parse article XML");
                failed(FailureReason::MalformedXml(e.to_string()))
            }
        }
    }
}

fn log_parsed(record: &ArticleRecord) {
    info!(
        has_title = record.title.is_some(),
        has_abstract = record.abstract_text.is_some(),
        pub_year = record.pub_year.as_deref().unwrap_or("-"),
        "Successfully parsed article"
    );
}
