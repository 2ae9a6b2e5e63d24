//! Tabular exports (CSV and XLSX) and artifact naming
//!
//! Every table is written with a fixed header row. Absent fields are
//! replaced by their placeholder strings here and nowhere else.

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{ColNum, DocProperties, ExcelDateTime, Format, RowNum, Workbook};
use tracing::{debug, info, instrument, warn};

use crate::error::Result;
use crate::pubmed::{ArticleRecord, FetchFailure};

/// Longest string a spreadsheet cell accepts, in characters
pub const XLSX_MAX_CELL_CHARS: usize = 32_767;

/// A value that can be written as one row of a table
pub trait TableRow {
    /// Column names, in column order
    const HEADERS: &'static [&'static str];

    /// Cell values, one per header
    fn cells(&self) -> Vec<&str>;
}

impl TableRow for ArticleRecord {
    const HEADERS: &'static [&'static str] = &["id", "title", "abstract", "publication_year"];

    fn cells(&self) -> Vec<&str> {
        vec![
            self.pmid.as_str(),
            self.title.as_deref().unwrap_or(""),
            self.abstract_or_placeholder(),
            self.year_or_placeholder(),
        ]
    }
}

impl TableRow for FetchFailure {
    const HEADERS: &'static [&'static str] = &["id"];

    fn cells(&self) -> Vec<&str> {
        vec![self.pmid.as_str()]
    }
}

/// Entity mentions are exported one per row
impl TableRow for String {
    const HEADERS: &'static [&'static str] = &["entity"];

    fn cells(&self) -> Vec<&str> {
        vec![self.as_str()]
    }
}

/// Turn a query into a file-name fragment
///
/// The query is used literally except for path separators and NUL, which
/// would otherwise move the artifact out of the output directory.
pub fn query_file_fragment(query: &str) -> String {
    query
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            other => other,
        })
        .collect()
}

/// Locations of every artifact a run may write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub articles_xlsx: PathBuf,
    pub articles_csv: PathBuf,
    pub errors_xlsx: PathBuf,
    pub errors_csv: PathBuf,
    pub entities_csv: PathBuf,
    pub wordcloud_png: PathBuf,
}

impl ArtifactPaths {
    /// Deterministic artifact names for `query` inside `dir`
    ///
    /// # Example
    ///
    /// ```
    /// use pubmed_wordcloud::export::ArtifactPaths;
    /// use std::path::Path;
    ///
    /// let paths = ArtifactPaths::for_query(Path::new("out"), "diabetes");
    /// assert_eq!(paths.articles_csv, Path::new("out/pubmed_articles_diabetes.csv"));
    /// assert_eq!(paths.wordcloud_png, Path::new("out/wordcloud_diabetes.png"));
    /// ```
    pub fn for_query(dir: &Path, query: &str) -> Self {
        let q = query_file_fragment(query);

        Self {
            articles_xlsx: dir.join(format!("pubmed_articles_{q}.xlsx")),
            articles_csv: dir.join(format!("pubmed_articles_{q}.csv")),
            errors_xlsx: dir.join(format!("pubmed_errors_{q}.xlsx")),
            errors_csv: dir.join(format!("pubmed_errors_{q}.csv")),
            entities_csv: dir.join(format!("abstract_entities_{q}.csv")),
            wordcloud_png: dir.join(format!("wordcloud_{q}.png")),
        }
    }
}

/// Write rows as delimited text with a header row
#[instrument(skip(rows), fields(path = %path.display(), rows = rows.len()))]
pub fn write_csv<T: TableRow>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    writer.write_record(T::HEADERS)?;
    for row in rows {
        writer.write_record(row.cells())?;
    }
    writer.flush()?;

    debug!("CSV file written");
    Ok(())
}

/// Cut `cell` to the spreadsheet limit, on a character boundary
fn fit_xlsx_cell(cell: &str) -> &str {
    match cell.char_indices().nth(XLSX_MAX_CELL_CHARS) {
        Some((end, _)) => &cell[..end],
        None => cell,
    }
}

/// Write rows as a single-sheet spreadsheet with a bold header row
///
/// The document creation time is pinned so identical rows produce identical
/// files. Cells over [`XLSX_MAX_CELL_CHARS`] are truncated with a warning;
/// the CSV export keeps the full text.
#[instrument(skip(rows), fields(path = %path.display(), rows = rows.len()))]
pub fn write_xlsx<T: TableRow>(path: &Path, rows: &[T]) -> Result<()> {
    let mut workbook = Workbook::new();
    let created = ExcelDateTime::from_ymd(2000, 1, 1)?;
    workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));

    let header_format = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();

    for (col, header) in T::HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as ColNum, *header, &header_format)?;
    }
    for (index, row) in rows.iter().enumerate() {
        let row_num = (index + 1) as RowNum;
        for (col, cell) in row.cells().into_iter().enumerate() {
            let fitted = fit_xlsx_cell(cell);
            if fitted.len() < cell.len() {
                warn!(
                    row = row_num,
                    column = T::HEADERS[col],
                    chars = cell.chars().count(),
                    "Cell exceeds the spreadsheet limit, truncating"
                );
            }
            worksheet.write_string(row_num, col as ColNum, fitted)?;
        }
    }

    workbook.save(path)?;

    debug!("XLSX file written");
    Ok(())
}

/// Write the same rows as both XLSX and CSV
pub fn write_table_pair<T: TableRow>(xlsx: &Path, csv: &Path, rows: &[T]) -> Result<()> {
    write_xlsx(xlsx, rows)?;
    info!(path = %xlsx.display(), "Excel file saved successfully");
    write_csv(csv, rows)?;
    info!(path = %csv.display(), "CSV file saved successfully");
    Ok(())
}
