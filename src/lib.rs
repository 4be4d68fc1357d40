//! Book Downloader Core Library
//!
//! Bulk-fetches the freely available e-books listed in a publisher catalog
//! spreadsheet, storing each book's PDF (and optionally EPUB) under a
//! directory named after its subject package.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`catalog`] - Catalog spreadsheet loading, caching and row normalization
//! - [`config`] - Batch settings passed into the coordinator
//! - [`download`] - HTTP transport, single-book processing, batch coordination
//! - [`resolver`] - Landing page to direct asset URL and filename mapping

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod config;
pub mod download;
pub mod resolver;
mod user_agent;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use catalog::{Book, CatalogError, CatalogSource, CatalogTable, books_from_catalog, load_catalog};
pub use config::{BatchConfig, DEFAULT_MAX_CONCURRENCY};
pub use download::{
    AssetStatus, BatchCoordinator, BatchSummary, BookOutcome, DownloadError, HttpClient,
    download_book,
};
pub use resolver::{Format, ResolveError, ResolvedAsset, resolve};
