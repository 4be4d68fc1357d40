//! Book downloading: HTTP transport, per-book processing and batch coordination.
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for large books)
//! - Landing page redirect following (up to 10 hops)
//! - Idempotent reruns: assets already on disk are skipped without a request
//! - Bounded concurrency with per-book failure isolation
//!
//! # Example
//!
//! ```no_run
//! use book_downloader_core::catalog::Book;
//! use book_downloader_core::download::{HttpClient, download_book};
//! use std::path::Path;
//!
//! # async fn example() {
//! let client = HttpClient::new();
//! let book = Book::new(
//!     "My Title",
//!     "A. Author",
//!     "Computer Science",
//!     "https://link.example.com/openurl?isbn=1",
//! );
//! let done = download_book(&client, book, Path::new("./download"), false).await;
//! println!("{:?}", done.outcome);
//! # }
//! ```

mod book;
mod client;
pub mod constants;
mod coordinator;
mod error;
mod outcome;

pub use book::download_book;
pub use client::HttpClient;
pub use coordinator::{BatchCoordinator, BookFetcher, CoordinatorError, HttpBookFetcher};
pub use error::DownloadError;
pub use outcome::{
    AssetFailure, AssetOutcomes, AssetStatus, BatchSummary, BookOutcome, FormatCounts,
    OutcomeError, SkipReason,
};

// Note: we do NOT define module-local Result aliases.
// Use `Result<T, DownloadError>` explicitly in function signatures.
