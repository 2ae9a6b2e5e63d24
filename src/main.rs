use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pubmed_wordcloud::config::{DEFAULT_MAX_RESULTS, DEFAULT_TOOL};
use pubmed_wordcloud::{
    ClientConfig, LexiconAnnotator, PersistOptions, Pipeline, PipelineConfig, PubMedClient,
    WordCloudOptions,
};
use tracing::info;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(
    name = "pubmed-wordcloud",
    about = "Draw a word cloud of biomedical entities from PubMed abstracts",
    long_about = "Searches PubMed, fetches every matching record, exports articles, \
                  failures and entities as XLSX/CSV and renders the entities as a PNG word cloud"
)]
struct Cli {
    /// PubMed search query (e.g. "diabetes" or "covid-19 AND lung cancer")
    query: String,

    /// Maximum number of PMIDs to fetch
    #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
    max_results: usize,

    /// Directory for the exported tables and the image
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Do not open the word cloud image after writing it
    #[arg(long)]
    no_display: bool,

    /// Email for NCBI requests (recommended)
    #[arg(long)]
    email: Option<String>,

    /// Tool name for NCBI requests
    #[arg(long, default_value = DEFAULT_TOOL)]
    tool: String,

    /// Seed for a reproducible word cloud layout
    #[arg(long)]
    seed: Option<u64>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Log filter from `RUST_LOG` when it parses, otherwise from `--verbose`
fn env_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    let fallback = if verbose { "debug" } else { "info" };

    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(fallback))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with indicatif layer for progress bars
    let filter = env_filter(cli.verbose, std::env::var("RUST_LOG").ok().as_deref());

    let indicatif_layer = IndicatifLayer::new();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(indicatif_layer.get_stderr_writer()),
        )
        .with(indicatif_layer)
        .with(filter)
        .init();

    let mut client_config = ClientConfig::new().with_tool(&cli.tool);
    if let Some(email) = &cli.email {
        client_config = client_config.with_email(email);
    }
    let client = PubMedClient::with_config(client_config).context("Failed to create PubMed client")?;

    let mut cloud = WordCloudOptions::default();
    if let Some(seed) = cli.seed {
        cloud = cloud.with_seed(seed);
    }
    let config = PipelineConfig::new()
        .with_max_results(cli.max_results)
        .with_output_dir(&cli.output_dir)
        .with_persist(PersistOptions::all())
        .with_cloud(cloud)
        .with_display(!cli.no_display);

    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} records ({msg})")
            .context("Failed to set progress bar style")?
            .progress_chars("#>-"),
    );

    let pipeline = Pipeline::new(client, LexiconAnnotator::new(), config);
    let summary = pipeline
        .run_with_progress(&cli.query, |update| {
            progress.set_length(update.total as u64);
            progress.set_position(update.position as u64);
            let status = if update.outcome.is_success() { "ok" } else { "failed" };
            progress.set_message(format!("{} {}", update.outcome.pmid(), status));
        })
        .await
        .with_context(|| format!("Pipeline failed for query '{}'", cli.query))?;

    progress.finish_with_message(format!(
        "Processed {} records ({} failed)",
        summary.articles.len() + summary.failures.len(),
        summary.failures.len()
    ));

    info!(
        total_found = summary.total_found,
        articles = summary.article_count(),
        failures = summary.failures.len(),
        entities = summary.entities.len(),
        "Run complete"
    );

    println!("Query: {}", summary.query);
    println!("Total articles found: {}", summary.total_found);
    println!("Articles retrieved: {}", summary.article_count());
    if !summary.failures.is_empty() {
        println!("PubMed IDs with errors: {}", summary.failed_pmids().join(", "));
    }
    println!("Entities extracted: {}", summary.entities.len());
    for path in &summary.artifacts {
        println!("  {}", path.display());
    }

    Ok(())
}
