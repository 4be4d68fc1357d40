//! HTTP client wrapper for landing page resolution and streaming downloads.
//!
//! This module provides the `HttpClient` struct which follows redirects,
//! applies request deadlines and streams response bodies straight to disk.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, MAX_REDIRECTS, READ_TIMEOUT_SECS};
use super::error::DownloadError;
use crate::user_agent;

/// HTTP client shared by every worker in a batch.
///
/// Cloning is cheap and shares the underlying connection pool.
///
/// # Example
///
/// ```no_run
/// use book_downloader_core::download::HttpClient;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new();
/// let landing = client.resolve_landing("https://link.example.com/openurl?isbn=1").await?;
/// let bytes = client
///     .fetch_to_file("https://link.example.com/content/pdf/x.pdf", Path::new("x.pdf"))
///     .await?;
/// println!("{landing}: {bytes} bytes");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// Default configuration:
    /// - Connect timeout: 30 seconds
    /// - Request deadline: 5 minutes
    /// - Up to 10 redirects followed
    /// - Gzip decompression: enabled
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static configuration.
    /// This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::try_new_with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
            .expect("failed to build HTTP client with static configuration")
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ClientBuild`] if the TLS backend or system
    /// configuration prevents building a client.
    #[instrument(level = "debug")]
    pub fn try_new_with_timeouts(
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .redirect(Policy::limited(MAX_REDIRECTS))
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()
            .map_err(|source| DownloadError::ClientBuild { source })?;
        Ok(Self { client })
    }

    /// Fetches a landing page and returns the final URL after redirects.
    ///
    /// The response status is not inspected: the catalog host routinely
    /// answers landing pages with error pages while still redirecting to the
    /// book's canonical location, and only that location matters.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::InvalidUrl`] for unparsable URLs and
    /// [`DownloadError::Network`] / [`DownloadError::Timeout`] when the
    /// request cannot be completed.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn resolve_landing(&self, url: &str) -> Result<String, DownloadError> {
        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        let final_url = response.url().to_string();
        debug!(
            status = response.status().as_u16(),
            final_url = %final_url,
            "landing page resolved"
        );
        Ok(final_url)
    }

    /// Downloads `url` into `path`, returning the number of bytes written.
    ///
    /// Only HTTP 200 responses are written; any other status returns
    /// [`DownloadError::HttpStatus`] and no file is created. The body is
    /// streamed into a sibling [`partial_path`] and renamed onto `path` only
    /// once it is complete, so `path` never holds a truncated download even
    /// if the process is killed mid-transfer.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The URL is invalid
    /// - The request fails (network error, timeout)
    /// - The server returns a status other than 200
    /// - Writing to disk fails
    #[instrument(skip(self), fields(url = %url, path = %path.display()))]
    pub async fn fetch_to_file(&self, url: &str, path: &Path) -> Result<u64, DownloadError> {
        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }

        let part_path = partial_path(path);
        let mut file = File::create(&part_path)
            .await
            .map_err(|e| DownloadError::io(&part_path, e))?;

        let stream_result = stream_to_file(&mut file, response, url, &part_path).await;
        drop(file);

        let finished = match stream_result {
            Ok(bytes) => tokio::fs::rename(&part_path, path)
                .await
                .map(|()| bytes)
                .map_err(|e| DownloadError::io(path, e)),
            Err(e) => Err(e),
        };
        if finished.is_err() {
            debug!(path = %part_path.display(), "cleaning up partial file after error");
            let _ = tokio::fs::remove_file(&part_path).await;
        }

        finished
    }
}

/// Sibling path a download is staged in before it is renamed onto `path`.
///
/// Only the final name ever counts as a finished download.
#[must_use]
pub fn partial_path(path: &Path) -> PathBuf {
    let mut staged = path.as_os_str().to_owned();
    staged.push(".part");
    PathBuf::from(staged)
}

/// Streams response body to file, returning bytes written.
///
/// This is extracted to enable cleanup on error in the caller.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::network(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path, e))?;

        bytes_written += chunk.len() as u64;
    }

    // Ensure all data is flushed to disk
    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path, e))?;

    Ok(bytes_written)
}
