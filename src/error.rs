use std::result;

use thiserror::Error;

/// Error types for pipeline operations
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// XML parsing error with detailed message
    #[error("XML parsing error: {message}")]
    XmlParseError { message: String },

    /// Generic API error with HTTP status code
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    /// IO error for file operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Delimited-text export failed
    #[error("CSV export failed: {0}")]
    CsvError(#[from] csv::Error),

    /// Spreadsheet export failed
    #[error("XLSX export failed: {0}")]
    XlsxError(#[from] rust_xlsxwriter::XlsxError),

    /// Image encoding or writing failed
    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    /// The annotator rejected an abstract
    #[error("Annotation failed: {message}")]
    AnnotationError { message: String },

    /// A word cloud needs at least one word
    #[error("Cannot render a word cloud without words")]
    EmptyWordCloud,
}

pub type Result<T> = result::Result<T, Error>;

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParseError {
            message: err.to_string(),
        }
    }
}

impl Error {
    /// Build an `ApiError` from a non-success HTTP status
    pub(crate) fn from_status(status: reqwest::StatusCode) -> Self {
        Error::ApiError {
            status: status.as_u16(),
            message: format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown error")
            ),
        }
    }
}
