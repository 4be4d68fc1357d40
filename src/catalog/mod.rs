//! Book catalog model and spreadsheet adapter.
//!
//! The catalog is a spreadsheet with one row per book. Only four columns are
//! read; everything else in the sheet is ignored.
//!
//! - [`CatalogTable`] - Header row plus string cells, independent of file format
//! - [`books_from_catalog`] - Converts a table into normalized [`Book`] records
//! - [`source`] - Loading and caching the spreadsheet itself

mod error;
pub mod source;

pub use error::CatalogError;
pub use source::{
    CACHED_CATALOG_FILENAME, CatalogSource, DEFAULT_CATALOG_URL, load_catalog, read_spreadsheet,
};

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::download::BookOutcome;
use crate::resolver::replace_hostile_chars;

/// Column holding the book title.
pub const TITLE_COLUMN: &str = "Book Title";
/// Column holding the author list.
pub const AUTHOR_COLUMN: &str = "Author";
/// Column holding the category label.
pub const PACKAGE_COLUMN: &str = "English Package Name";
/// Column holding the landing page URL.
pub const URL_COLUMN: &str = "OpenURL";

/// One catalog entry to be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    /// Book title as listed in the catalog.
    pub title: String,
    /// Author list as listed in the catalog.
    pub author: String,
    /// Normalized category name, used verbatim as a directory name.
    pub package_name: String,
    /// Landing page URL; never itself a downloadable asset.
    pub source_url: String,
    /// Processing outcome, `None` until the book has been attempted.
    pub outcome: Option<BookOutcome>,
}

impl Book {
    /// Creates an unprocessed book, normalizing the raw package label.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        package_label: &str,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            package_name: normalize_package_name(package_label),
            source_url: source_url.into(),
            outcome: None,
        }
    }

    /// Directory this book's files are written to.
    #[must_use]
    pub fn package_dir(&self, destination_root: &Path) -> PathBuf {
        destination_root.join(&self.package_name)
    }

    /// Returns a copy of this book with `outcome` attached.
    #[must_use]
    pub fn with_outcome(mut self, outcome: BookOutcome) -> Self {
        self.outcome = Some(outcome);
        self
    }
}

/// Turns a raw category label into a directory name.
///
/// Every whitespace character becomes `_` (runs are not collapsed, so names
/// match trees written by earlier versions of this tool), commas are dropped
/// and filesystem-hostile characters become `_`. Leading and trailing dots
/// are stripped so the name can never address a parent directory.
#[must_use]
pub fn normalize_package_name(label: &str) -> String {
    let underscored: String = label
        .chars()
        .filter(|c| *c != ',')
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    let cleaned = replace_hostile_chars(&underscored);
    let trimmed = cleaned.trim_matches('.');
    if trimmed.is_empty() {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}

/// A raw two-dimensional catalog: one header row and any number of data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CatalogTable {
    /// Creates a table from a header row and data rows.
    #[must_use]
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Returns the header row.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Returns the data rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Returns the number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, name: &'static str) -> Result<usize, CatalogError> {
        self.headers
            .iter()
            .position(|header| header.trim() == name)
            .ok_or(CatalogError::MissingColumn { column: name })
    }
}

/// Converts a catalog table into book records, one per non-blank row.
///
/// Rows whose cells are all empty are spreadsheet padding and are skipped.
///
/// # Errors
///
/// Returns [`CatalogError::MissingColumn`] when a required header is absent,
/// [`CatalogError::MalformedRow`] when a row leaves a required field empty and
/// [`CatalogError::InvalidUrl`] when a landing page URL is not absolute http(s).
pub fn books_from_catalog(table: &CatalogTable) -> Result<Vec<Book>, CatalogError> {
    let title_index = table.column_index(TITLE_COLUMN)?;
    let author_index = table.column_index(AUTHOR_COLUMN)?;
    let package_index = table.column_index(PACKAGE_COLUMN)?;
    let url_index = table.column_index(URL_COLUMN)?;

    let mut books = Vec::with_capacity(table.len());
    for (index, row) in table.rows().iter().enumerate() {
        // Header occupies spreadsheet row 1.
        let row_number = index + 2;

        if row.iter().all(|cell| cell.trim().is_empty()) {
            debug!(row = row_number, "skipping blank catalog row");
            continue;
        }

        let field = |column_index: usize, column: &'static str| {
            row.get(column_index)
                .map(|cell| cell.trim())
                .filter(|cell| !cell.is_empty())
                .ok_or(CatalogError::malformed_row(row_number, column))
        };

        let title = field(title_index, TITLE_COLUMN)?;
        let author = field(author_index, AUTHOR_COLUMN)?;
        let package_label = field(package_index, PACKAGE_COLUMN)?;
        let url = field(url_index, URL_COLUMN)?;

        let is_web_url = Url::parse(url)
            .ok()
            .is_some_and(|parsed| matches!(parsed.scheme(), "http" | "https"));
        if !is_web_url {
            return Err(CatalogError::invalid_url(row_number, url));
        }

        books.push(Book::new(title, author, package_label, url));
    }

    debug!(books = books.len(), "catalog parsed");
    Ok(books)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn headers() -> Vec<String> {
        ["Book Title", "Author", "Edition", "English Package Name", "OpenURL"]
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_books_from_catalog_maps_each_row() {
        let table = CatalogTable::new(
            headers(),
            vec![
                row(&[
                    "Fundamentals of Power Electronics",
                    "Robert W. Erickson, Dragan Maksimovic",
                    "2nd ed. 2001",
                    "Engineering",
                    "http://link.example.com/openurl?genre=book&isbn=978-0-7923-7270-7",
                ]),
                row(&[
                    "Introductory Statistics with R",
                    "Peter Dalgaard",
                    "2nd ed. 2008",
                    "Mathematics and Statistics",
                    "http://link.example.com/openurl?genre=book&isbn=978-0-387-79054-1",
                ]),
            ],
        );

        let books = books_from_catalog(&table).unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].title, "Fundamentals of Power Electronics");
        assert_eq!(books[0].author, "Robert W. Erickson, Dragan Maksimovic");
        assert_eq!(books[0].package_name, "Engineering");
        assert_eq!(books[1].package_name, "Mathematics_and_Statistics");
        assert!(books.iter().all(|book| book.outcome.is_none()));
    }

    #[test]
    fn test_books_from_catalog_missing_column_fails() {
        let table = CatalogTable::new(row(&["Book Title", "Author", "OpenURL"]), vec![]);
        let err = books_from_catalog(&table).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::MissingColumn {
                column: "English Package Name"
            }
        ));
    }

    #[test]
    fn test_books_from_catalog_empty_field_fails_whole_read() {
        let table = CatalogTable::new(
            headers(),
            vec![
                row(&["Good", "Author", "", "Pkg", "https://example.com/book/1"]),
                row(&["Bad", "", "", "Pkg", "https://example.com/book/2"]),
            ],
        );
        let err = books_from_catalog(&table).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::MalformedRow {
                row: 3,
                column: "Author"
            }
        ));
    }

    #[test]
    fn test_books_from_catalog_short_row_is_malformed() {
        let table = CatalogTable::new(headers(), vec![row(&["Only title"])]);
        let err = books_from_catalog(&table).unwrap_err();
        assert!(matches!(err, CatalogError::MalformedRow { row: 2, .. }));
    }

    #[test]
    fn test_books_from_catalog_rejects_non_web_url() {
        let table = CatalogTable::new(
            headers(),
            vec![row(&["T", "A", "", "Pkg", "ftp://example.com/book/1"])],
        );
        let err = books_from_catalog(&table).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidUrl { row: 2, .. }));
    }

    #[test]
    fn test_books_from_catalog_skips_blank_rows() {
        let table = CatalogTable::new(
            headers(),
            vec![
                row(&["", " ", "", "", ""]),
                row(&["T", "A", "", "Pkg", "https://example.com/book/1"]),
                vec![],
            ],
        );
        let books = books_from_catalog(&table).unwrap();
        assert_eq!(books.len(), 1);
    }

    #[test]
    fn test_books_from_catalog_trims_header_and_cells() {
        let table = CatalogTable::new(
            row(&[" Book Title ", "Author", "English Package Name", "OpenURL "]),
            vec![row(&["  T  ", " A", "Pkg ", " https://example.com/book/1 "])],
        );
        let books = books_from_catalog(&table).unwrap();
        assert_eq!(books[0].title, "T");
        assert_eq!(books[0].source_url, "https://example.com/book/1");
    }

    #[test]
    fn test_normalize_package_name() {
        assert_eq!(
            normalize_package_name("Behavioral Science and Psychology"),
            "Behavioral_Science_and_Psychology"
        );
        assert_eq!(
            normalize_package_name("Business and Management, Economics"),
            "Business_and_Management_Economics"
        );
        assert_eq!(normalize_package_name("Earth  Sciences"), "Earth__Sciences");
        assert_eq!(normalize_package_name("Math\tStats"), "Math_Stats");
        assert_eq!(normalize_package_name("Law/Criminology"), "Law_Criminology");
        assert_eq!(normalize_package_name(".."), "_");
    }

    #[test]
    fn test_book_package_dir_joins_root() {
        let book = Book::new("T", "A", "Computer Science", "https://example.com/book/1");
        assert_eq!(
            book.package_dir(Path::new("/data")),
            PathBuf::from("/data/Computer_Science")
        );
    }
}
