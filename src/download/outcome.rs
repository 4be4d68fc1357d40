//! Per-book and per-format processing outcomes.
//!
//! A book either could not be resolved at all (landing page unreachable) or
//! was resolved and carries one terminal status per format. Statuses are
//! write-once: recording a second status for the same format is an error.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::catalog::Book;
use crate::resolver::Format;

/// Why an asset was not downloaded even though it was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The target file was already present on disk.
    AlreadyExists,
}

/// Why a requested asset download failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetFailure {
    /// The server answered with a status other than 200.
    HttpStatus(u16),
    /// The server answered 200 with an empty body.
    EmptyBody,
    /// The request or the file write failed part-way.
    Transfer(String),
}

impl fmt::Display for AssetFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpStatus(status) => write!(f, "HTTP {status}"),
            Self::EmptyBody => f.write_str("empty response body"),
            Self::Transfer(message) => f.write_str(message),
        }
    }
}

/// Terminal status of one format for one book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    /// Not downloaded; no request was made.
    Skipped(SkipReason),
    /// Downloaded and written to disk.
    Success {
        /// Bytes written.
        bytes: u64,
    },
    /// Requested but not obtained.
    Failed(AssetFailure),
    /// The format was not requested for this run.
    NotRequested,
}

impl AssetStatus {
    /// Returns true for [`AssetStatus::Success`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Error returned when an outcome is recorded twice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutcomeError {
    /// The format already has a terminal status.
    #[error("outcome for {format} already recorded")]
    AlreadyRecorded {
        /// The format recorded twice.
        format: Format,
    },
}

/// Write-once statuses for every format of one resolved book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssetOutcomes {
    pdf: Option<AssetStatus>,
    epub: Option<AssetStatus>,
}

impl AssetOutcomes {
    /// Records the terminal status for `format`.
    ///
    /// # Errors
    ///
    /// Returns [`OutcomeError::AlreadyRecorded`] if `format` already has a
    /// status; the existing status is kept.
    pub fn record(&mut self, format: Format, status: AssetStatus) -> Result<(), OutcomeError> {
        let slot = match format {
            Format::Pdf => &mut self.pdf,
            Format::Epub => &mut self.epub,
        };
        if slot.is_some() {
            return Err(OutcomeError::AlreadyRecorded { format });
        }
        *slot = Some(status);
        Ok(())
    }

    /// Returns the status recorded for `format`, if any.
    #[must_use]
    pub fn get(&self, format: Format) -> Option<&AssetStatus> {
        match format {
            Format::Pdf => self.pdf.as_ref(),
            Format::Epub => self.epub.as_ref(),
        }
    }

    /// Iterates over recorded statuses in format order.
    pub fn iter(&self) -> impl Iterator<Item = (Format, &AssetStatus)> {
        Format::ALL
            .into_iter()
            .filter_map(|format| self.get(format).map(|status| (format, status)))
    }
}

/// Outcome of processing one book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BookOutcome {
    /// The landing page was fetched; per-format statuses follow.
    Resolved(AssetOutcomes),
    /// The book could not be resolved; no asset was attempted.
    Unresolved {
        /// Human-readable cause.
        reason: String,
    },
}

impl BookOutcome {
    /// Creates an `Unresolved` outcome.
    #[must_use]
    pub fn unresolved(reason: impl Into<String>) -> Self {
        Self::Unresolved {
            reason: reason.into(),
        }
    }

    /// Returns the per-format statuses for resolved books.
    #[must_use]
    pub fn assets(&self) -> Option<&AssetOutcomes> {
        match self {
            Self::Resolved(assets) => Some(assets),
            Self::Unresolved { .. } => None,
        }
    }
}

/// Status counts for one format across a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FormatCounts {
    /// Downloaded this run.
    pub succeeded: usize,
    /// Already on disk.
    pub skipped: usize,
    /// Requested but failed.
    pub failed: usize,
    /// Not requested.
    pub not_requested: usize,
}

impl FormatCounts {
    fn add(&mut self, status: &AssetStatus) {
        match status {
            AssetStatus::Success { .. } => self.succeeded += 1,
            AssetStatus::Skipped(_) => self.skipped += 1,
            AssetStatus::Failed(_) => self.failed += 1,
            AssetStatus::NotRequested => self.not_requested += 1,
        }
    }
}

/// Aggregate view of a finished batch, built from the returned books.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Books in the batch.
    pub books: usize,
    /// Books whose landing page could not be resolved.
    pub unresolved: usize,
    /// Books without any outcome (never attempted).
    pub pending: usize,
    /// PDF status counts.
    pub pdf: FormatCounts,
    /// EPUB status counts.
    pub epub: FormatCounts,
}

impl BatchSummary {
    /// Tallies outcomes across `books`.
    #[must_use]
    pub fn from_books(books: &[Book]) -> Self {
        let mut summary = Self {
            books: books.len(),
            ..Self::default()
        };
        for book in books {
            match &book.outcome {
                None => summary.pending += 1,
                Some(BookOutcome::Unresolved { .. }) => summary.unresolved += 1,
                Some(BookOutcome::Resolved(assets)) => {
                    for (format, status) in assets.iter() {
                        summary.counts_mut(format).add(status);
                    }
                }
            }
        }
        summary
    }

    /// Returns the counts for `format`.
    #[must_use]
    pub fn counts(&self, format: Format) -> &FormatCounts {
        match format {
            Format::Pdf => &self.pdf,
            Format::Epub => &self.epub,
        }
    }

    fn counts_mut(&mut self, format: Format) -> &mut FormatCounts {
        match format {
            Format::Pdf => &mut self.pdf,
            Format::Epub => &mut self.epub,
        }
    }

    /// Total assets that failed across all formats, plus unresolved books.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.pdf.failed + self.epub.failed + self.unresolved
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} books, {} could not be resolved",
            self.books, self.unresolved
        )?;
        for format in Format::ALL {
            let counts = self.counts(format);
            if counts.succeeded + counts.skipped + counts.failed == 0 {
                continue;
            }
            writeln!(
                f,
                "  {format}: {} downloaded, {} already present, {} failed",
                counts.succeeded, counts.skipped, counts.failed
            )?;
        }
        Ok(())
    }
}
