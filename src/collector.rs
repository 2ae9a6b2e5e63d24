//! Sequential fetch pass over a search result

use tracing::{info, instrument};

use crate::pubmed::{FetchOutcome, PubMedClient, RecordCollection};

/// Progress report handed to observers after each fetch
#[derive(Debug, Clone, Copy)]
pub struct FetchProgress<'a> {
    /// 1-based position of the identifier just fetched
    pub position: usize,
    pub total: usize,
    pub outcome: &'a FetchOutcome,
}

/// Fetch every identifier in order and partition the outcomes
///
/// Identifiers are fetched one at a time. Each one ends up in exactly one of
/// `articles` or `failures`, and both keep the input order.
#[instrument(skip(client, pmids, on_progress), fields(pmids_count = pmids.len()))]
pub async fn collect_records<F>(
    client: &PubMedClient,
    pmids: &[String],
    mut on_progress: F,
) -> RecordCollection
where
    F: FnMut(FetchProgress<'_>),
{
    let total = pmids.len();
    let mut collection = RecordCollection::default();

    for (index, pmid) in pmids.iter().enumerate() {
        let outcome = client.fetch_record(pmid).await;

        info!(
            pmid = %pmid,
            position = index + 1,
            total,
            success = outcome.is_success(),
            "Fetched record"
        );
        on_progress(FetchProgress {
            position: index + 1,
            total,
            outcome: &outcome,
        });

        collection.push(outcome);
    }

    info!(
        articles = collection.articles.len(),
        failures = collection.failures.len(),
        "Collected records"
    );

    collection
}
