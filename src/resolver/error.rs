//! Error types for URL resolution.

use thiserror::Error;

/// Errors that can occur while resolving a landing page into a direct asset URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The requested format is not one the catalog host serves.
    #[error("unsupported format '{format}'\n  Suggestion: use one of: pdf, epub")]
    UnsupportedFormat {
        /// The format label that was requested.
        format: String,
    },
}

impl ResolveError {
    /// Creates an `UnsupportedFormat` error.
    #[must_use]
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }
}
