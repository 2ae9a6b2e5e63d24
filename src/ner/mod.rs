//! Named-entity extraction over article abstracts
//!
//! The annotation model is a capability passed in by the caller: anything
//! implementing [`Annotator`] can be used, and [`LexiconAnnotator`] is the
//! built-in rule-based implementation.

mod lexicon;

pub use lexicon::LexiconAnnotator;

use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::pubmed::ArticleRecord;

/// One entity mention found by an annotator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Surface text exactly as it appears in the annotated string
    pub text: String,
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
}

/// A named-entity annotation model
pub trait Annotator {
    /// Annotate `text`, returning mentions in discovery order
    fn annotate(&self, text: &str) -> Result<Vec<Entity>>;
}

impl<A: Annotator + ?Sized> Annotator for &A {
    fn annotate(&self, text: &str) -> Result<Vec<Entity>> {
        (**self).annotate(text)
    }
}

impl<A: Annotator + ?Sized> Annotator for Box<A> {
    fn annotate(&self, text: &str) -> Result<Vec<Entity>> {
        (**self).annotate(text)
    }
}

/// Run `annotator` over every present abstract and flatten the mentions
///
/// Records without an abstract are skipped and never reach the annotator.
/// Mentions keep abstract order, then discovery order within an abstract;
/// nothing is deduplicated or normalized. The first annotation error aborts.
#[instrument(skip_all, fields(articles = articles.len()))]
pub fn extract_entities<A: Annotator + ?Sized>(
    annotator: &A,
    articles: &[ArticleRecord],
) -> Result<Vec<String>> {
    let mut mentions = Vec::new();
    let mut annotated = 0usize;

    for article in articles {
        let Some(text) = article.abstract_text.as_deref() else {
            debug!(pmid = %article.pmid, "No abstract, skipping annotation");
            continue;
        };

        let entities = annotator.annotate(text)?;
        debug!(pmid = %article.pmid, entities = entities.len(), "Annotated abstract");
        mentions.extend(entities.into_iter().map(|entity| entity.text));
        annotated += 1;
    }

    info!(
        annotated,
        entities = mentions.len(),
        "Extracted entities from abstracts"
    );

    Ok(mentions)
}
