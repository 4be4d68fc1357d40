//! Bounded-concurrency batch processing of catalog books.
//!
//! The coordinator spawns one Tokio task per book, gated by a semaphore so
//! that at most `max_concurrency` books are in flight. Every book comes back
//! exactly once with an outcome attached, in catalog order. A failure (or
//! panic) while processing one book never affects the others.

use std::sync::Arc;

use async_trait::async_trait;
use indicatif::ProgressBar;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use super::book::download_book;
use super::HttpClient;
use super::outcome::{BatchSummary, BookOutcome};
use crate::catalog::Book;
use crate::config::{BatchConfig, MAX_CONCURRENCY, MIN_CONCURRENCY};

/// Error type for coordinator construction and scheduling.
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },

    /// Semaphore was closed unexpectedly.
    #[error("semaphore closed unexpectedly")]
    SemaphoreClosed,
}

/// Processes a single book. Implementations must not panic on network or
/// disk failures; they record them in the returned book's outcome instead.
#[async_trait]
pub trait BookFetcher: Send + Sync {
    /// Processes `book` and returns it with its outcome attached.
    async fn fetch(&self, book: Book, config: &BatchConfig) -> Book;
}

/// [`BookFetcher`] backed by a shared [`HttpClient`].
#[derive(Debug, Clone, Default)]
pub struct HttpBookFetcher {
    client: HttpClient,
}

impl HttpBookFetcher {
    /// Wraps `client`.
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BookFetcher for HttpBookFetcher {
    async fn fetch(&self, book: Book, config: &BatchConfig) -> Book {
        download_book(
            &self.client,
            book,
            &config.destination_root,
            config.include_epub,
        )
        .await
    }
}

/// Runs a batch of books through a [`BookFetcher`] with bounded concurrency.
///
/// # Example
///
/// ```no_run
/// use book_downloader_core::config::BatchConfig;
/// use book_downloader_core::download::{BatchCoordinator, HttpClient};
///
/// # async fn example(books: Vec<book_downloader_core::catalog::Book>) -> Result<(), Box<dyn std::error::Error>> {
/// let config = BatchConfig::new("download").with_max_concurrency(8);
/// let coordinator = BatchCoordinator::with_http_client(config, HttpClient::new())?;
/// let books = coordinator.download_all(books).await?;
/// println!("{} books processed", books.len());
/// # Ok(())
/// # }
/// ```
pub struct BatchCoordinator {
    semaphore: Arc<Semaphore>,
    config: Arc<BatchConfig>,
    fetcher: Arc<dyn BookFetcher>,
    progress: Option<ProgressBar>,
}

impl std::fmt::Debug for BatchCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchCoordinator")
            .field("config", &self.config)
            .field("progress", &self.progress.is_some())
            .finish_non_exhaustive()
    }
}

impl BatchCoordinator {
    /// Creates a coordinator that processes books with `fetcher`.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::InvalidConcurrency`] if
    /// `config.max_concurrency` is outside 1-100.
    #[instrument(level = "debug", skip(fetcher))]
    pub fn new(
        config: BatchConfig,
        fetcher: Arc<dyn BookFetcher>,
    ) -> Result<Self, CoordinatorError> {
        let concurrency = config.max_concurrency;
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(CoordinatorError::InvalidConcurrency { value: concurrency });
        }

        debug!(
            concurrency,
            include_epub = config.include_epub,
            "creating batch coordinator"
        );

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(concurrency)),
            config: Arc::new(config),
            fetcher,
            progress: None,
        })
    }

    /// Creates a coordinator that downloads over HTTP with `client`.
    ///
    /// # Errors
    ///
    /// Same as [`BatchCoordinator::new`].
    pub fn with_http_client(
        config: BatchConfig,
        client: HttpClient,
    ) -> Result<Self, CoordinatorError> {
        Self::new(config, Arc::new(HttpBookFetcher::new(client)))
    }

    /// Advances `progress` by one for every finished book.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Processes every book and returns them, each with an outcome, in input order.
    ///
    /// Individual book failures do NOT cause this method to error; they are
    /// recorded in each book's outcome. A task that panics yields its book
    /// with an [`BookOutcome::Unresolved`] outcome.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::SemaphoreClosed`] if the semaphore is closed.
    #[instrument(skip(self, books), fields(books = books.len()))]
    pub async fn download_all(&self, books: Vec<Book>) -> Result<Vec<Book>, CoordinatorError> {
        let mut handles = Vec::with_capacity(books.len());

        info!(
            concurrency = self.config.max_concurrency,
            "starting batch"
        );

        for book in books {
            let permit = self
                .semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| CoordinatorError::SemaphoreClosed)?;

            // Handed back if the task panics, so the book is never lost.
            let fallback = book.clone();
            let fetcher = Arc::clone(&self.fetcher);
            let config = Arc::clone(&self.config);
            let progress = self.progress.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let done = fetcher.fetch(book, &config).await;
                if let Some(bar) = progress {
                    bar.inc(1);
                }
                done
            });
            handles.push((fallback, handle));
        }

        debug!(task_count = handles.len(), "waiting for books to complete");

        let mut finished = Vec::with_capacity(handles.len());
        for (fallback, handle) in handles {
            match handle.await {
                Ok(book) => finished.push(book),
                Err(e) => {
                    warn!(title = %fallback.title, error = %e, "book task panicked");
                    if let Some(bar) = &self.progress {
                        bar.inc(1);
                    }
                    finished.push(
                        fallback.with_outcome(BookOutcome::unresolved(format!(
                            "processing task failed: {e}"
                        ))),
                    );
                }
            }
        }

        let summary = BatchSummary::from_books(&finished);
        info!(
            books = summary.books,
            unresolved = summary.unresolved,
            pdf_downloaded = summary.pdf.succeeded,
            pdf_present = summary.pdf.skipped,
            pdf_failed = summary.pdf.failed,
            epub_downloaded = summary.epub.succeeded,
            epub_present = summary.epub.skipped,
            epub_failed = summary.epub.failed,
            "batch complete"
        );

        Ok(finished)
    }
}
