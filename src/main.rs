//! CLI entry point for book-downloader.

use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use book_downloader_core::catalog::{CatalogSource, DEFAULT_CATALOG_URL};
use book_downloader_core::download::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use book_downloader_core::{
    AssetStatus, BatchConfig, BatchCoordinator, BatchSummary, Book, BookOutcome,
    DEFAULT_MAX_CONCURRENCY, HttpClient, books_from_catalog, load_catalog,
};
use clap::Parser;
use tracing::{debug, info};

mod app_config;
mod cli;
mod terminal;

use app_config::FileConfig;
use cli::Args;

/// Effective run settings after merging CLI flags over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Settings {
    max_workers: usize,
    epub: bool,
    catalog_url: String,
    connect_timeout_secs: u64,
    read_timeout_secs: u64,
}

impl Settings {
    fn resolve(args: &Args, file: &FileConfig) -> Self {
        Self {
            max_workers: args
                .max_workers
                .or(file.max_workers)
                .map_or(DEFAULT_MAX_CONCURRENCY, usize::from),
            epub: args.epub || file.epub.unwrap_or(false),
            catalog_url: args
                .catalog_url
                .clone()
                .or_else(|| file.catalog_url.clone())
                .unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string()),
            connect_timeout_secs: file.connect_timeout_secs.unwrap_or(CONNECT_TIMEOUT_SECS),
            read_timeout_secs: file.read_timeout_secs.unwrap_or(READ_TIMEOUT_SECS),
        }
    }
}

/// Expands a leading `~` and anchors relative paths at the working directory.
fn absolute_destination(dest: &Path) -> Result<PathBuf> {
    let expanded = match dest.strip_prefix("~") {
        Ok(rest) => {
            let home = std::env::var_os("HOME").context("cannot expand '~': HOME is not set")?;
            PathBuf::from(home).join(rest)
        }
        Err(_) => dest.to_path_buf(),
    };
    std::path::absolute(&expanded)
        .with_context(|| format!("cannot resolve destination '{}'", expanded.display()))
}

/// One line per unresolved book or failed asset, in batch order.
fn failure_lines(books: &[Book]) -> Vec<String> {
    let mut lines = Vec::new();
    for book in books {
        match &book.outcome {
            Some(BookOutcome::Unresolved { reason }) => {
                lines.push(format!("  {}: not resolved ({reason})", book.title));
            }
            Some(BookOutcome::Resolved(assets)) => {
                for (format, status) in assets.iter() {
                    if let AssetStatus::Failed(failure) = status {
                        lines.push(format!("  {} [{format}]: {failure}", book.title));
                    }
                }
            }
            None => {}
        }
    }
    lines
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    terminal::init_tracing(terminal::default_log_level(args.quiet, args.verbose));
    debug!(?args, "CLI arguments parsed");

    let loaded = app_config::load_default_file_config()?;
    if let Some(path) = loaded.config.as_ref().and(loaded.path.as_deref()) {
        debug!(path = %path.display(), "loaded config file");
    }
    let settings = Settings::resolve(&args, &loaded.config.unwrap_or_default());
    debug!(?settings, "effective settings");

    let destination = absolute_destination(&args.dest_dir)?;
    fs::create_dir_all(&destination).with_context(|| {
        format!(
            "failed to create destination directory '{}'",
            destination.display()
        )
    })?;

    let client =
        HttpClient::try_new_with_timeouts(settings.connect_timeout_secs, settings.read_timeout_secs)?;

    let source = match &args.catalog {
        Some(path) => CatalogSource::Local(path.clone()),
        None => CatalogSource::remote(settings.catalog_url.clone(), &destination),
    };
    let table = load_catalog(&source, &client, args.refresh_catalog)
        .await
        .context("failed to load catalog")?;
    let books = books_from_catalog(&table).context("catalog is malformed")?;

    info!(
        books = books.len(),
        destination = %destination.display(),
        epub = settings.epub,
        workers = settings.max_workers,
        "Book downloader starting"
    );

    let config = BatchConfig::new(destination.clone())
        .with_epub(settings.epub)
        .with_max_concurrency(settings.max_workers);
    let show_progress = terminal::should_show_progress(
        io::stderr().is_terminal(),
        args.quiet,
        terminal::is_dumb_terminal(),
    );
    let progress = terminal::batch_progress(books.len(), show_progress);
    let coordinator =
        BatchCoordinator::with_http_client(config, client)?.with_progress(progress.clone());

    let started = Instant::now();
    let books = coordinator.download_all(books).await?;
    let elapsed = started.elapsed();
    progress.finish_and_clear();

    let summary = BatchSummary::from_books(&books);
    if !args.quiet {
        print!("{summary}");
        if summary.failures() > 0 {
            println!("Failed:");
            for line in failure_lines(&books) {
                println!("{line}");
            }
            println!("{} failed; run again to retry them", summary.failures());
        }
        println!("Elapsed: {:.1}s", elapsed.as_secs_f64());
    }

    if let Some(report_path) = &args.report {
        let json = serde_json::to_string_pretty(&books).context("failed to serialize report")?;
        fs::write(report_path, json)
            .with_context(|| format!("failed to write report '{}'", report_path.display()))?;
        info!(path = %report_path.display(), "report written");
    }

    Ok(())
}
