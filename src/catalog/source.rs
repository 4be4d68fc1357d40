//! Catalog spreadsheet loading and local caching.
//!
//! The remote catalog is downloaded once into the destination directory and
//! read from there on later runs, so repeated runs do not hit the catalog
//! service unless a refresh is requested.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use calamine::{Data, Reader, open_workbook_auto};
use tracing::{debug, info, instrument};

use super::{CatalogError, CatalogTable};
use crate::download::HttpClient;

/// Springer Nature's free textbook list.
pub const DEFAULT_CATALOG_URL: &str =
    "https://resource-cms.springernature.com/springer-cms/rest/v1/content/17858272/data/v4";

/// Name of the cached spreadsheet inside the destination directory.
pub const CACHED_CATALOG_FILENAME: &str = "table.xlsx";

/// Where the catalog spreadsheet comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// Fetched over HTTP and cached at `cache_path`.
    Remote {
        /// Catalog endpoint.
        url: String,
        /// Local cache location.
        cache_path: PathBuf,
    },
    /// A spreadsheet already on disk; never fetched or written.
    Local(PathBuf),
}

impl CatalogSource {
    /// Remote source cached as [`CACHED_CATALOG_FILENAME`] inside `destination_root`.
    #[must_use]
    pub fn remote(url: impl Into<String>, destination_root: &Path) -> Self {
        Self::Remote {
            url: url.into(),
            cache_path: destination_root.join(CACHED_CATALOG_FILENAME),
        }
    }
}

/// Loads the catalog table, fetching and caching remote sources as needed.
///
/// With `refresh` set, a remote catalog is downloaded again even when a cached
/// copy exists. A fresh download is parsed before it replaces the cache, so a
/// bad response never overwrites a good cache or becomes one.
///
/// # Errors
///
/// Returns [`CatalogError::Fetch`] when the remote catalog cannot be
/// downloaded, [`CatalogError::Cache`] when it cannot be moved into place, and
/// the errors of [`read_spreadsheet`] otherwise.
#[instrument(skip(client))]
pub async fn load_catalog(
    source: &CatalogSource,
    client: &HttpClient,
    refresh: bool,
) -> Result<CatalogTable, CatalogError> {
    let table = match source {
        CatalogSource::Local(path) => read_spreadsheet(path)?,
        CatalogSource::Remote { url, cache_path } => {
            if refresh || !cache_path.exists() {
                fetch_and_cache(url, cache_path, client).await?
            } else {
                info!(cache = %cache_path.display(), "using cached catalog");
                read_spreadsheet(cache_path)?
            }
        }
    };

    info!(rows = table.len(), "catalog loaded");
    Ok(table)
}

async fn fetch_and_cache(
    url: &str,
    cache_path: &Path,
    client: &HttpClient,
) -> Result<CatalogTable, CatalogError> {
    let staged = staging_path(cache_path);
    info!(url = %url, cache = %cache_path.display(), "fetching catalog");
    let bytes = client
        .fetch_to_file(url, &staged)
        .await
        .map_err(|e| CatalogError::fetch(url, e))?;

    let table = match read_spreadsheet(&staged) {
        Ok(table) => table,
        Err(e) => {
            let _ = tokio::fs::remove_file(&staged).await;
            return Err(e);
        }
    };

    if let Err(e) = tokio::fs::rename(&staged, cache_path).await {
        let _ = tokio::fs::remove_file(&staged).await;
        return Err(CatalogError::cache(cache_path, e));
    }
    debug!(bytes, "catalog cached");
    Ok(table)
}

/// Sibling of `cache_path` a fresh download is parsed from. Keeps the
/// extension, which decides how the workbook is decoded.
fn staging_path(cache_path: &Path) -> PathBuf {
    let stem = cache_path
        .file_stem()
        .map_or(Cow::Borrowed("catalog"), |stem| stem.to_string_lossy());
    let name = match cache_path.extension() {
        Some(ext) => format!("{stem}.download.{}", ext.to_string_lossy()),
        None => format!("{stem}.download"),
    };
    cache_path.with_file_name(name)
}

/// Reads the first worksheet of a spreadsheet (xlsx, xls, xlsb or ods).
///
/// The first row is taken as the header row.
///
/// # Errors
///
/// Returns [`CatalogError::Spreadsheet`] when the file cannot be opened or
/// decoded and [`CatalogError::EmptyWorkbook`] when it has no worksheet or no
/// header row.
pub fn read_spreadsheet(path: &Path) -> Result<CatalogTable, CatalogError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| CatalogError::spreadsheet(path, e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| CatalogError::EmptyWorkbook {
            path: path.to_path_buf(),
        })?
        .map_err(|e| CatalogError::spreadsheet(path, e))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| CatalogError::EmptyWorkbook {
            path: path.to_path_buf(),
        })?
        .iter()
        .map(cell_to_string)
        .collect();
    let data = rows
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    Ok(CatalogTable::new(headers, data))
}

/// Renders a cell as text; integral floats lose their trailing `.0`.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.trim().to_string(),
        Data::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
            format!("{}", *value as i64)
        }
        other => other.to_string(),
    }
}
