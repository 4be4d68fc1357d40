//! Landing page to direct asset URL resolution.
//!
//! The catalog lists each book by its landing page (`.../book/<doi>`). The
//! host serves the PDF at `.../content/pdf/<doi>.pdf` and the EPUB at
//! `.../download/epub/<doi>.epub`, so resolution is a pure string
//! transformation once the final (post-redirect) landing URL is known.
//!
//! # Example
//!
//! ```
//! use book_downloader_core::resolver::{Format, resolve};
//!
//! let asset = resolve(
//!     "https://link.example.com/book/10.1007%2F978-3-319-00000-0",
//!     "My Title",
//!     "A. Author",
//!     Format::Pdf,
//! );
//! assert_eq!(
//!     asset.direct_url,
//!     "https://link.example.com/content/pdf/10.1007/978-3-319-00000-0.pdf"
//! );
//! assert_eq!(asset.filename, "My Title - A. Author - 10.1007_978-3-319-00000-0.pdf");
//! ```

mod error;
mod filename;
mod format;

pub use error::ResolveError;
pub use filename::{
    FILENAME_SEPARATOR, build_filename, replace_hostile_chars, sanitize_asset_name,
    sanitize_name_component,
};
pub use format::Format;

use std::ops::Range;

use serde::Serialize;

/// Path segment that marks a landing page.
const BOOK_SEGMENT: &str = "book";

/// A direct download URL paired with the local filename it should be saved as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAsset {
    /// URL that returns the raw asset bytes.
    pub direct_url: String,
    /// Human-readable local filename (no directory component).
    pub filename: String,
}

/// Resolves a landing page URL into the direct asset URL and local filename for `format`.
///
/// The URL is percent-decoded, the first path segment equal to `book` is
/// replaced by the format's path prefix and the format extension is appended.
/// When no path segment equals `book`, the first literal occurrence of `book`
/// anywhere in the URL is replaced instead.
///
/// This function performs no I/O and is deterministic.
#[must_use]
pub fn resolve(landing_url: &str, title: &str, author: &str, format: Format) -> ResolvedAsset {
    let decoded = percent_decode(landing_url);
    let prefix = format.path_prefix();

    let (rewritten, asset_name) = match find_book_segment(&decoded) {
        Some(segment) => {
            let path_end = path_bounds(&decoded).end;
            let tail = &decoded[segment.end..path_end];
            let rewritten = format!(
                "{}{prefix}{}",
                &decoded[..segment.start],
                &decoded[segment.end..]
            );
            (rewritten, Some(tail.to_string()))
        }
        None => (decoded.replacen(BOOK_SEGMENT, prefix, 1), None),
    };

    let direct_url = format!("{rewritten}{}", format.extension());
    let asset_name = match asset_name {
        Some(tail) if !tail.trim_matches('/').is_empty() => {
            format!("{}{}", tail.trim_matches('/'), format.extension())
        }
        _ => last_path_segment(&direct_url).to_string(),
    };

    ResolvedAsset {
        filename: build_filename(title, author, &asset_name),
        direct_url,
    }
}

/// Resolves using a format label such as `"pdf"` or `"epub"`.
///
/// # Errors
///
/// Returns [`ResolveError::UnsupportedFormat`] for any label other than
/// `pdf` or `epub`.
pub fn resolve_format_name(
    landing_url: &str,
    title: &str,
    author: &str,
    format: &str,
) -> Result<ResolvedAsset, ResolveError> {
    let format = format.parse::<Format>()?;
    Ok(resolve(landing_url, title, author, format))
}

fn percent_decode(value: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(value.as_bytes())).into_owned()
}

/// Byte range of the path component (after authority, before query/fragment).
fn path_bounds(url: &str) -> Range<usize> {
    let after_scheme = url.find("://").map_or(0, |index| index + 3);
    let start = url[after_scheme..]
        .find('/')
        .map_or(url.len(), |index| after_scheme + index);
    let end = url[start..]
        .find(['?', '#'])
        .map_or(url.len(), |index| start + index);
    start..end
}

fn find_book_segment(url: &str) -> Option<Range<usize>> {
    let bounds = path_bounds(url);
    let mut offset = bounds.start;
    for segment in url[bounds.clone()].split('/') {
        if segment == BOOK_SEGMENT {
            return Some(offset..offset + segment.len());
        }
        offset += segment.len() + 1;
    }
    None
}

fn last_path_segment(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}
