//! Error types for catalog loading and parsing.

use std::path::PathBuf;

use thiserror::Error;

use crate::download::DownloadError;

/// Errors that can occur while loading or interpreting the book catalog.
///
/// Every variant is fatal to the whole run: downstream directory and
/// filename construction needs all four catalog fields for every row.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A required column header is absent from the spreadsheet.
    #[error("catalog is missing required column '{column}'")]
    MissingColumn {
        /// The missing column header.
        column: &'static str,
    },

    /// A row has an empty value in a required column.
    #[error("malformed catalog row {row}: column '{column}' is empty")]
    MalformedRow {
        /// 1-based spreadsheet row number (the header is row 1).
        row: usize,
        /// The column whose value is missing.
        column: &'static str,
    },

    /// A row's landing page URL is not an absolute http(s) URL.
    #[error("malformed catalog row {row}: invalid landing page URL '{url}'")]
    InvalidUrl {
        /// 1-based spreadsheet row number.
        row: usize,
        /// The offending URL text.
        url: String,
    },

    /// The spreadsheet has no worksheet or no header row.
    #[error("catalog spreadsheet {path} contains no worksheet data")]
    EmptyWorkbook {
        /// Spreadsheet path.
        path: PathBuf,
    },

    /// The spreadsheet could not be opened or decoded.
    #[error("failed to read catalog spreadsheet {path}: {source}")]
    Spreadsheet {
        /// Spreadsheet path.
        path: PathBuf,
        /// The underlying spreadsheet error.
        #[source]
        source: calamine::Error,
    },

    /// The catalog could not be fetched from its remote source.
    #[error("failed to fetch catalog from {url}: {source}")]
    Fetch {
        /// Catalog endpoint.
        url: String,
        /// The underlying download error.
        #[source]
        source: DownloadError,
    },

    /// A downloaded catalog could not be moved into the cache location.
    #[error("failed to cache catalog at {path}: {source}")]
    Cache {
        /// Cache location.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl CatalogError {
    /// Creates a `MalformedRow` error.
    #[must_use]
    pub fn malformed_row(row: usize, column: &'static str) -> Self {
        Self::MalformedRow { row, column }
    }

    /// Creates an `InvalidUrl` error.
    #[must_use]
    pub fn invalid_url(row: usize, url: impl Into<String>) -> Self {
        Self::InvalidUrl {
            row,
            url: url.into(),
        }
    }

    /// Creates a `Spreadsheet` error.
    pub fn spreadsheet(path: impl Into<PathBuf>, source: calamine::Error) -> Self {
        Self::Spreadsheet {
            path: path.into(),
            source,
        }
    }

    /// Creates a `Cache` error.
    pub fn cache(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Cache {
            path: path.into(),
            source,
        }
    }

    /// Creates a `Fetch` error.
    pub fn fetch(url: impl Into<String>, source: DownloadError) -> Self {
        Self::Fetch {
            url: url.into(),
            source,
        }
    }
}
