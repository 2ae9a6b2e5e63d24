use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::{Annotator, Entity};
use crate::error::Result;
use crate::stopwords::is_stopword;

/// Word tokens; internal hyphens, slashes, apostrophes and a trailing `+` are kept
static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{L}\p{N}](?:[\p{L}\p{N}\-/'+]*[\p{L}\p{N}+])?")
        .expect("token pattern is a valid regex")
});

/// Function words common in abstracts but missing from the English list
const ABSTRACT_FUNCTION_WORDS: &[&str] = &[
    "al", "although", "among", "either", "et", "furthermore", "many", "may", "might", "moreover",
    "much", "must", "neither", "often", "onto", "per", "respectively", "several", "still",
    "though", "thus", "upon", "various", "versus", "via", "vs", "well", "whereas", "whether",
    "will", "within", "without", "yet",
];

/// Reporting and relation verbs that separate mentions
const RELATION_VERBS: &[&str] = &[
    "activate", "activates", "affect", "affects", "appear", "appears", "assess", "assesses",
    "compare", "compares", "contribute", "contributes", "demonstrate", "demonstrates",
    "determine", "determines", "enhance", "enhances", "evaluate", "evaluates", "examine",
    "examines", "exhibit", "exhibits", "found", "identify", "identifies", "improve", "improves",
    "include", "includes", "induce", "induces", "indicate", "indicates", "inhibit", "inhibits",
    "investigate", "investigates", "involve", "involves", "mediate", "mediates", "occur",
    "occurs", "promote", "promotes", "provide", "provides", "reduce", "reduces", "regulate",
    "regulates", "remain", "remains", "represent", "represents", "require", "requires",
    "reveal", "reveals", "show", "shows", "shown", "suggest", "suggests",
];

const DEFAULT_MAX_SPAN_TOKENS: usize = 5;

/// Rule-based biomedical mention chunker
///
/// A mention is a maximal run of adjacent content tokens. Runs break at any
/// punctuation between tokens, at stopwords and relation verbs, at
/// lowercase `-ed`/`-ing`/`-ly` forms, at purely numeric tokens and
/// lowercase single letters, and after `max_span_tokens` tokens. Tokens with
/// inner capitals (acronyms, gene symbols) are always content unless they
/// are stopwords.
///
/// # Example
///
/// ```
/// use pubmed_wordcloud::ner::{Annotator, LexiconAnnotator};
///
/// let annotator = LexiconAnnotator::new();
/// let entities = annotator.annotate("Insulin regulates glucose.").unwrap();
/// let texts: Vec<_> = entities.iter().map(|e| e.text.as_str()).collect();
/// assert_eq!(texts, vec!["Insulin", "glucose"]);
/// ```
#[derive(Debug, Clone)]
pub struct LexiconAnnotator {
    blocked: HashSet<String>,
    max_span_tokens: usize,
}

impl LexiconAnnotator {
    pub fn new() -> Self {
        let blocked = ABSTRACT_FUNCTION_WORDS
            .iter()
            .chain(RELATION_VERBS)
            .map(|word| word.to_string())
            .collect();

        Self {
            blocked,
            max_span_tokens: DEFAULT_MAX_SPAN_TOKENS,
        }
    }

    /// Add words that must never be part of a mention
    pub fn with_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.blocked
            .extend(words.into_iter().map(|w| w.as_ref().to_lowercase()));
        self
    }

    pub fn with_max_span_tokens(mut self, max_span_tokens: usize) -> Self {
        self.max_span_tokens = max_span_tokens.max(1);
        self
    }

    fn is_content(&self, token: &str) -> bool {
        if !token.chars().any(char::is_alphabetic) {
            return false;
        }

        let lower = token.to_lowercase();
        if is_stopword(&lower) || self.blocked.contains(&lower) {
            return false;
        }

        let has_inner_capital = token.chars().skip(1).any(char::is_uppercase);
        if has_inner_capital {
            return true;
        }

        // single letters only count as capitals, as in "T cells"
        if lower.chars().count() < 2 {
            return token.chars().all(char::is_uppercase);
        }

        let inflected = (lower.ends_with("ed") && lower.len() > 4)
            || (lower.ends_with("ing") && lower.len() > 5)
            || (lower.ends_with("ly") && lower.len() > 5);
        !inflected
    }
}

impl Default for LexiconAnnotator {
    fn default() -> Self {
        Self::new()
    }
}

/// A run of content tokens under construction
struct Span {
    start: usize,
    end: usize,
    tokens: usize,
}

impl Annotator for LexiconAnnotator {
    fn annotate(&self, text: &str) -> Result<Vec<Entity>> {
        let mut entities = Vec::new();
        let mut current: Option<Span> = None;
        let mut last_end = 0;

        let flush = |span: Option<Span>, entities: &mut Vec<Entity>| {
            if let Some(span) = span {
                entities.push(Entity {
                    text: text[span.start..span.end].to_string(),
                    start: span.start,
                    end: span.end,
                });
            }
        };

        for token in TOKEN.find_iter(text) {
            let gap = &text[last_end..token.start()];
            if !gap.chars().all(char::is_whitespace) {
                flush(current.take(), &mut entities);
            }
            last_end = token.end();

            if !self.is_content(token.as_str()) {
                flush(current.take(), &mut entities);
                continue;
            }

            match current.as_mut() {
                Some(span) if span.tokens < self.max_span_tokens => {
                    span.end = token.end();
                    span.tokens += 1;
                }
                _ => {
                    flush(current.take(), &mut entities);
                    current = Some(Span {
                        start: token.start(),
                        end: token.end(),
                        tokens: 1,
                    });
                }
            }
        }
        flush(current.take(), &mut entities);

        Ok(entities)
    }
}
