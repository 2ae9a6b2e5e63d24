//! PubMed client for searching and fetching article records
//!
//! This module talks to the NCBI E-utilities ESearch and EFetch endpoints
//! and turns their XML responses into flat [`ArticleRecord`]s.

pub mod client;
pub mod models;
pub mod parser;

// Re-export public types
pub use client::PubMedClient;
pub use models::{
    ABSTRACT_NOT_AVAILABLE, ArticleRecord, FailureReason, FetchFailure, FetchOutcome,
    RecordCollection, SearchResult, YEAR_NOT_AVAILABLE,
};
pub use parser::PubMedXmlParser;
