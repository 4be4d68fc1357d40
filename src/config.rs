//! Batch configuration passed explicitly into the coordinator.

use std::path::PathBuf;

/// Default number of books processed at the same time.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Minimum allowed concurrency value.
pub const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
pub const MAX_CONCURRENCY: usize = 100;

/// Settings for one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Root directory; one subdirectory per package is created beneath it.
    pub destination_root: PathBuf,
    /// Also fetch EPUB assets.
    pub include_epub: bool,
    /// Upper bound on books processed simultaneously.
    pub max_concurrency: usize,
}

impl BatchConfig {
    /// Creates a PDF-only configuration with the default concurrency.
    #[must_use]
    pub fn new(destination_root: impl Into<PathBuf>) -> Self {
        Self {
            destination_root: destination_root.into(),
            include_epub: false,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Sets whether EPUB assets are fetched.
    #[must_use]
    pub fn with_epub(mut self, include_epub: bool) -> Self {
        self.include_epub = include_epub;
        self
    }

    /// Sets the concurrency bound.
    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_config_defaults() {
        let config = BatchConfig::new("out");
        assert_eq!(config.destination_root, PathBuf::from("out"));
        assert!(!config.include_epub);
        assert_eq!(config.max_concurrency, 8);
    }

    #[test]
    fn test_batch_config_builders() {
        let config = BatchConfig::new("out").with_epub(true).with_max_concurrency(3);
        assert!(config.include_epub);
        assert_eq!(config.max_concurrency, 3);
    }
}
