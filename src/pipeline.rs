//! End-to-end run: search, fetch, export, annotate and draw

use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::cloud::{WordCloud, open_in_viewer};
use crate::collector::{FetchProgress, collect_records};
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::export::{ArtifactPaths, write_csv, write_table_pair};
use crate::ner::{Annotator, extract_entities};
use crate::pubmed::{ArticleRecord, FetchFailure, PubMedClient};

/// Everything a run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub query: String,
    /// Total matches reported by the search, which may exceed the fetched count
    pub total_found: usize,
    pub articles: Vec<ArticleRecord>,
    pub failures: Vec<FetchFailure>,
    pub entities: Vec<String>,
    /// Files written, in write order
    pub artifacts: Vec<PathBuf>,
}

impl RunSummary {
    pub fn article_count(&self) -> usize {
        self.articles.len()
    }

    /// Identifiers whose fetch failed, in request order
    pub fn failed_pmids(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.pmid.as_str()).collect()
    }
}

/// The query-to-word-cloud pipeline
///
/// # Example
///
/// ```no_run
/// use pubmed_wordcloud::{LexiconAnnotator, Pipeline, PipelineConfig, PubMedClient};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pipeline = Pipeline::new(
///         PubMedClient::new()?,
///         LexiconAnnotator::new(),
///         PipelineConfig::new().with_output_dir("out"),
///     );
///     let summary = pipeline.run("diabetes").await?;
///     println!("{} of {} articles", summary.article_count(), summary.total_found);
///     Ok(())
/// }
/// ```
pub struct Pipeline<A> {
    client: PubMedClient,
    annotator: A,
    config: PipelineConfig,
}

impl<A: Annotator> Pipeline<A> {
    pub fn new(client: PubMedClient, annotator: A, config: PipelineConfig) -> Self {
        Self {
            client,
            annotator,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline for `query`
    pub async fn run(&self, query: &str) -> Result<RunSummary> {
        self.run_with_progress(query, |_| {}).await
    }

    /// Run the pipeline for `query`, reporting each fetch to `on_progress`
    ///
    /// A failed search, a failed write or a failed annotation aborts the run
    /// and files already written are left in place. Individual fetch failures
    /// are collected instead. When no entity survives to be drawn the image
    /// is skipped with a warning.
    #[instrument(skip(self, on_progress), fields(query = %query))]
    pub async fn run_with_progress<F>(&self, query: &str, on_progress: F) -> Result<RunSummary>
    where
        F: FnMut(FetchProgress<'_>),
    {
        let search = self.client.search(query, self.config.max_results).await?;
        info!(
            total_found = search.total_count,
            pmids = search.pmids.len(),
            "Found articles"
        );

        let collection = collect_records(&self.client, &search.pmids, on_progress).await;
        for failure in &collection.failures {
            warn!(pmid = %failure.pmid, reason = %failure.reason, "Could not retrieve article");
        }

        fs::create_dir_all(&self.config.output_dir)?;
        let paths = ArtifactPaths::for_query(&self.config.output_dir, query);
        let persist = self.config.persist;
        let mut artifacts = Vec::new();

        if persist.persist_articles {
            write_table_pair(&paths.articles_xlsx, &paths.articles_csv, &collection.articles)?;
            artifacts.push(paths.articles_xlsx.clone());
            artifacts.push(paths.articles_csv.clone());
        }
        if persist.persist_errors {
            write_table_pair(&paths.errors_xlsx, &paths.errors_csv, &collection.failures)?;
            artifacts.push(paths.errors_xlsx.clone());
            artifacts.push(paths.errors_csv.clone());
        }

        let entities = extract_entities(&self.annotator, &collection.articles)?;
        if persist.persist_entities {
            write_csv(&paths.entities_csv, &entities)?;
            info!(path = %paths.entities_csv.display(), "Entities CSV file saved successfully");
            artifacts.push(paths.entities_csv.clone());
        }

        let cloud = WordCloud::new(self.config.cloud.clone());
        match cloud.render_to_file(&entities, &paths.wordcloud_png) {
            Ok(()) => {
                artifacts.push(paths.wordcloud_png.clone());
                if self.config.display {
                    if let Err(err) = open_in_viewer(&paths.wordcloud_png) {
                        warn!(error = %err, "Could not open word cloud image");
                    }
                }
            }
            Err(Error::EmptyWordCloud) => {
                warn!(entities = entities.len(), "No words to draw, skipping word cloud image");
            }
            Err(err) => return Err(err),
        }

        Ok(RunSummary {
            query: query.to_string(),
            total_found: search.total_count,
            articles: collection.articles,
            failures: collection.failures,
            entities,
            artifacts,
        })
    }
}
