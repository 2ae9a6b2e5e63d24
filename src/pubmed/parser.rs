use std::io::BufReader;
use std::sync::LazyLock;

use quick_xml::Reader;
use quick_xml::events::{BytesText, Event};
use regex::Regex;
use tracing::{debug, instrument, warn};

use crate::error::{Error, Result};
use crate::pubmed::models::{ArticleRecord, SearchResult};

static YEAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4})\b").expect("year pattern is a valid regex")
});

/// Stack of open element names
#[derive(Default)]
struct ElementPath(Vec<Vec<u8>>);

impl ElementPath {
    fn push(&mut self, name: &[u8]) {
        self.0.push(name.to_vec());
    }

    fn pop(&mut self) {
        self.0.pop();
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when the open elements are exactly `expected`, root first
    fn is(&self, expected: &[&str]) -> bool {
        self.0.len() == expected.len() && self.ends_with(expected)
    }

    fn ends_with(&self, expected: &[&str]) -> bool {
        self.0.len() >= expected.len()
            && self.0[self.0.len() - expected.len()..]
                .iter()
                .zip(expected)
                .all(|(open, want)| open.as_slice() == want.as_bytes())
    }

    fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|open| open.as_slice() == name.as_bytes())
    }
}

fn decode_text(text: &BytesText<'_>) -> Result<String> {
    text.unescape()
        .map(|cow| cow.into_owned())
        .map_err(|e| Error::XmlParseError {
            message: format!("Failed to decode text: {e}"),
        })
}

/// Collapse whitespace runs; `None` when nothing but whitespace remains
fn collapse_whitespace(text: &str) -> Option<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

pub struct PubMedXmlParser;

impl PubMedXmlParser {
    /// Parse an ESearch XML response into identifiers and the total match count
    ///
    /// Only the top-level `Count` is read; the per-term counts inside
    /// `TranslationStack` are ignored.
    #[instrument(skip(xml), fields(xml_size = xml.len()))]
    pub fn parse_search_result(xml: &str) -> Result<SearchResult> {
        let mut reader = Reader::from_reader(BufReader::new(xml.as_bytes()));
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut path = ElementPath::default();
        let mut saw_root = false;
        let mut count: Option<String> = None;
        let mut api_error: Option<String> = None;
        let mut pmids = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    if path.is_empty() && e.name().as_ref() == b"eSearchResult" {
                        saw_root = true;
                    }
                    path.push(e.name().as_ref());
                }
                Ok(Event::End(_)) => path.pop(),
                Ok(Event::Text(ref e)) => {
                    if path.is(&["eSearchResult", "Count"]) {
                        count = Some(decode_text(e)?);
                    } else if path.is(&["eSearchResult", "IdList", "Id"]) {
                        pmids.push(decode_text(e)?);
                    } else if path.is(&["eSearchResult", "ERROR"]) {
                        api_error = Some(decode_text(e)?);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlParseError {
                        message: format!(
                            "Malformed ESearch response at position {}: {e}",
                            reader.buffer_position()
                        ),
                    });
                }
                _ => {}
            }
            buf.clear();
        }

        if !saw_root {
            return Err(Error::XmlParseError {
                message: "ESearch response has no eSearchResult element".to_string(),
            });
        }

        if let Some(message) = api_error {
            return Err(Error::ApiError {
                status: 200,
                message: format!("NCBI ESearch API error: {message}"),
            });
        }

        let count = count.ok_or_else(|| Error::XmlParseError {
            message: "ESearch response has no Count element".to_string(),
        })?;
        let total_count = count.trim().parse().map_err(|_| Error::XmlParseError {
            message: format!("ESearch Count is not a number: {count}"),
        })?;

        debug!(total_count, returned = pmids.len(), "Parsed ESearch response");

        Ok(SearchResult { pmids, total_count })
    }

    /// Parse the first article of an EFetch XML response
    ///
    /// Returns `Ok(None)` when the response holds no `PubmedArticle` or
    /// `PubmedBookArticle`. Title, abstract and year are looked up
    /// independently; a missing node leaves that field `None`.
    #[instrument(skip(xml), fields(pmid = %pmid, xml_size = xml.len()))]
    pub fn parse_article_record(xml: &str, pmid: &str) -> Result<Option<ArticleRecord>> {
        let mut reader = Reader::from_reader(BufReader::new(xml.as_bytes()));
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut path = ElementPath::default();
        let mut articles_seen = 0usize;
        let mut in_first_article = false;
        let mut state = ArticleState::default();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let name = e.name();
                    if matches!(name.as_ref(), b"PubmedArticle" | b"PubmedBookArticle") {
                        articles_seen += 1;
                        in_first_article = articles_seen == 1;
                    }
                    path.push(name.as_ref());
                }
                Ok(Event::End(ref e)) => {
                    if in_first_article {
                        match e.name().as_ref() {
                            b"PubmedArticle" | b"PubmedBookArticle" => in_first_article = false,
                            name => state.close(&path, name),
                        }
                    }
                    path.pop();
                }
                Ok(Event::Text(ref e)) if in_first_article => {
                    state.text(&path, &decode_text(e)?);
                }
                Ok(Event::CData(ref e)) if in_first_article => {
                    state.text(&path, &String::from_utf8_lossy(e));
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlParseError {
                        message: format!(
                            "Malformed EFetch response at position {}: {e}",
                            reader.buffer_position()
                        ),
                    });
                }
                _ => {}
            }
            buf.clear();
        }

        if articles_seen == 0 {
            debug!("EFetch response contains no article");
            return Ok(None);
        }
        if articles_seen > 1 {
            warn!(articles_seen, "EFetch response contains several articles, using the first");
        }

        Ok(Some(state.into_record(pmid)))
    }
}

/// Text collected from the first article of an EFetch response
#[derive(Default)]
struct ArticleState {
    cited_pmid: String,
    title: String,
    title_done: bool,
    abstract_sections: Vec<String>,
    current_section: String,
    year: String,
    medline_date: String,
    pub_date_done: bool,
}

impl ArticleState {
    fn text(&mut self, path: &ElementPath, text: &str) {
        if path.ends_with(&["MedlineCitation", "PMID"]) {
            if self.cited_pmid.is_empty() {
                self.cited_pmid.push_str(text);
            }
        } else if path.contains("ArticleTitle") {
            if !self.title_done {
                self.title.push_str(text);
            }
        } else if path.contains("Abstract") && path.contains("AbstractText") {
            self.current_section.push_str(text);
        } else if !self.pub_date_done {
            if path.ends_with(&["PubDate", "Year"]) {
                self.year.push_str(text);
            } else if path.ends_with(&["PubDate", "MedlineDate"]) {
                self.medline_date.push_str(text);
            }
        }
    }

    /// Called before `name` is popped from `path`
    fn close(&mut self, path: &ElementPath, name: &[u8]) {
        match name {
            b"ArticleTitle" => self.title_done = true,
            b"AbstractText" if path.contains("Abstract") => {
                self.abstract_sections
                    .push(std::mem::take(&mut self.current_section));
            }
            b"PubDate" => self.pub_date_done = true,
            _ => {}
        }
    }

    fn into_record(self, pmid: &str) -> ArticleRecord {
        let cited_pmid = self.cited_pmid.trim();
        if !cited_pmid.is_empty() && cited_pmid != pmid {
            warn!(pmid, cited_pmid, "EFetch returned a record for a different PMID");
        }

        let pub_year = collapse_whitespace(&self.year).or_else(|| {
            YEAR_PATTERN
                .captures(&self.medline_date)
                .map(|caps| caps[1].to_string())
        });

        ArticleRecord {
            pmid: pmid.to_string(),
            title: collapse_whitespace(&self.title),
            abstract_text: collapse_whitespace(&self.abstract_sections.join(" ")),
            pub_year,
        }
    }
}
