//! Asset formats offered by the catalog host.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::ResolveError;

/// A downloadable e-book format.
///
/// Ordering follows download order: PDF is always fetched first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Portable Document Format, served under `/content/pdf/`.
    Pdf,
    /// EPUB e-book, served under `/download/epub/`.
    Epub,
}

impl Format {
    /// All supported formats in download order.
    pub const ALL: [Self; 2] = [Self::Pdf, Self::Epub];

    /// Returns the lowercase format label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Epub => "epub",
        }
    }

    /// Returns the file extension including the leading dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => ".pdf",
            Self::Epub => ".epub",
        }
    }

    /// Path prefix that replaces the landing page `book` segment.
    #[must_use]
    pub fn path_prefix(self) -> &'static str {
        match self {
            Self::Pdf => "content/pdf",
            Self::Epub => "download/epub",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "epub" => Ok(Self::Epub),
            _ => Err(ResolveError::unsupported_format(s)),
        }
    }
}
