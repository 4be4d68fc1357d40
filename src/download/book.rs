//! Single-book downloader.
//!
//! For one catalog entry: make sure the package directory exists, follow the
//! landing page to its final location, then fetch each requested format that
//! is not already on disk.

use std::path::Path;

use tracing::{debug, info, instrument, warn};

use super::outcome::{AssetFailure, AssetOutcomes, AssetStatus, BookOutcome, SkipReason};
use super::{DownloadError, HttpClient};
use crate::catalog::Book;
use crate::resolver::{Format, resolve};

/// Downloads the requested formats of one book and returns it with its outcome attached.
///
/// Side effects: may create the book's package directory, writes zero to two
/// files and performs one to three GET requests.
///
/// Failures never propagate: an unreachable landing page (or an uncreatable
/// package directory) produces [`BookOutcome::Unresolved`]; any failure while
/// fetching one format is recorded as [`AssetStatus::Failed`] for that format
/// only.
#[instrument(skip(client, book), fields(title = %book.title, url = %book.source_url))]
pub async fn download_book(
    client: &HttpClient,
    book: Book,
    destination_root: &Path,
    include_epub: bool,
) -> Book {
    let package_dir = book.package_dir(destination_root);
    if let Err(e) = tokio::fs::create_dir_all(&package_dir).await {
        let error = DownloadError::io(&package_dir, e);
        warn!(error = %error, "cannot create package directory");
        return book.with_outcome(BookOutcome::unresolved(error.to_string()));
    }

    let landing_url = match client.resolve_landing(&book.source_url).await {
        Ok(url) => url,
        Err(error) => {
            warn!(error = %error, "landing page unreachable");
            return book.with_outcome(BookOutcome::unresolved(error.to_string()));
        }
    };

    let mut outcomes = AssetOutcomes::default();
    for format in Format::ALL {
        let status = if format == Format::Epub && !include_epub {
            AssetStatus::NotRequested
        } else {
            fetch_asset(client, &book, &landing_url, &package_dir, format).await
        };
        if let Err(error) = outcomes.record(format, status) {
            warn!(error = %error, "ignoring duplicate outcome");
        }
    }

    book.with_outcome(BookOutcome::Resolved(outcomes))
}

async fn fetch_asset(
    client: &HttpClient,
    book: &Book,
    landing_url: &str,
    package_dir: &Path,
    format: Format,
) -> AssetStatus {
    let asset = resolve(landing_url, &book.title, &book.author, format);
    let target = package_dir.join(&asset.filename);

    if tokio::fs::try_exists(&target).await.unwrap_or(false) {
        debug!(%format, path = %target.display(), "already downloaded");
        return AssetStatus::Skipped(SkipReason::AlreadyExists);
    }

    match client.fetch_to_file(&asset.direct_url, &target).await {
        Ok(0) => {
            // An empty file would be mistaken for a finished download next run.
            let _ = tokio::fs::remove_file(&target).await;
            warn!(%format, url = %asset.direct_url, "empty response body");
            AssetStatus::Failed(AssetFailure::EmptyBody)
        }
        Ok(bytes) => {
            info!(%format, path = %target.display(), bytes, "downloaded");
            AssetStatus::Success { bytes }
        }
        Err(DownloadError::HttpStatus { status, .. }) => {
            warn!(%format, url = %asset.direct_url, status, "asset request rejected");
            AssetStatus::Failed(AssetFailure::HttpStatus(status))
        }
        Err(error) => {
            warn!(%format, url = %asset.direct_url, error = %error, "asset download failed");
            AssetStatus::Failed(AssetFailure::Transfer(error.to_string()))
        }
    }
}
