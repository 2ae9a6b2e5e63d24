//! # PubMed Word Cloud
//!
//! Search PubMed, fetch every matching record, export the titles, abstracts
//! and publication years as tables, extract biomedical entity mentions from
//! the abstracts and draw them as a word cloud.
//!
//! ## Features
//!
//! - **E-utilities client**: one ESearch request per query, one EFetch request per record
//! - **Partial failure**: records that cannot be fetched are collected, not fatal
//! - **Exports**: paired XLSX and CSV tables for articles, failures and entities
//! - **Pluggable NER**: any [`Annotator`] can be passed in, [`LexiconAnnotator`] is built in
//! - **Word cloud**: PNG rendering with seeded, reproducible layouts
//!
//! ## Quick Start
//!
//! ```no_run
//! use pubmed_wordcloud::{
//!     ClientConfig, LexiconAnnotator, PersistOptions, Pipeline, PipelineConfig, PubMedClient,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PubMedClient::with_config(
//!         ClientConfig::new().with_email("researcher@university.edu"),
//!     )?;
//!     let config = PipelineConfig::new()
//!         .with_max_results(50)
//!         .with_persist(PersistOptions::none());
//!
//!     let summary = Pipeline::new(client, LexiconAnnotator::new(), config)
//!         .run("insulin resistance")
//!         .await?;
//!
//!     println!("{} matches, {} fetched", summary.total_found, summary.article_count());
//!     for entity in summary.entities.iter().take(10) {
//!         println!("{entity}");
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cloud;
pub mod collector;
pub mod config;
pub mod error;
pub mod export;
pub mod ner;
pub mod pipeline;
pub mod pubmed;
mod stopwords;

// Re-export main types for convenience
pub use cloud::{WordCloud, WordCloudOptions};
pub use collector::{FetchProgress, collect_records};
pub use config::{ClientConfig, PersistOptions, PipelineConfig};
pub use error::{Error, Result};
pub use export::ArtifactPaths;
pub use ner::{Annotator, Entity, LexiconAnnotator, extract_entities};
pub use pipeline::{Pipeline, RunSummary};
pub use pubmed::{
    ArticleRecord, FailureReason, FetchFailure, FetchOutcome, PubMedClient, RecordCollection,
    SearchResult,
};
