use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder exported when an article has no abstract
pub const ABSTRACT_NOT_AVAILABLE: &str = "Abstract not available";

/// Placeholder exported when an article has no publication year
pub const YEAR_NOT_AVAILABLE: &str = "Year not available";

/// Result of one ESearch request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// PMIDs in the order returned by the search endpoint
    pub pmids: Vec<String>,
    /// Total number of matches, which may exceed `pmids.len()`
    pub total_count: usize,
}

/// Flat record extracted from one EFetch response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// PubMed ID, always the identifier that was requested
    pub pmid: String,
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub pub_year: Option<String>,
}

impl ArticleRecord {
    /// Abstract text, or the export placeholder when absent
    pub fn abstract_or_placeholder(&self) -> &str {
        self.abstract_text.as_deref().unwrap_or(ABSTRACT_NOT_AVAILABLE)
    }

    /// Publication year, or the export placeholder when absent
    pub fn year_or_placeholder(&self) -> &str {
        self.pub_year.as_deref().unwrap_or(YEAR_NOT_AVAILABLE)
    }
}

/// Why a record could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The endpoint answered with a non-success status
    HttpStatus(u16),
    /// The request never produced a response (connection, timeout, body read)
    Transport(String),
    /// The response body was not well-formed markup
    MalformedXml(String),
    /// The response contained no article
    NotFound,
    /// The identifier is not a PMID; no request was made
    InvalidPmid,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpStatus(status) => write!(f, "HTTP status {status}"),
            Self::Transport(message) => write!(f, "transport error: {message}"),
            Self::MalformedXml(message) => write!(f, "malformed XML: {message}"),
            Self::NotFound => write!(f, "article not found"),
            Self::InvalidPmid => write!(f, "invalid PMID"),
        }
    }
}

/// A record that could not be fetched; never retried
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub pmid: String,
    pub reason: FailureReason,
}

/// Outcome of fetching one identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Fetched(ArticleRecord),
    Failed(FetchFailure),
}

impl FetchOutcome {
    pub fn pmid(&self) -> &str {
        match self {
            Self::Fetched(record) => &record.pmid,
            Self::Failed(failure) => &failure.pmid,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Fetched(_))
    }
}

/// Fetched records and failures, each in identifier order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordCollection {
    pub articles: Vec<ArticleRecord>,
    pub failures: Vec<FetchFailure>,
}

impl RecordCollection {
    pub fn push(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Fetched(record) => self.articles.push(record),
            FetchOutcome::Failed(failure) => self.failures.push(failure),
        }
    }

    pub fn len(&self) -> usize {
        self.articles.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn failed_pmids(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.pmid.as_str()).collect()
    }
}
