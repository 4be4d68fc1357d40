//! Filename sanitization for locally saved assets.
//!
//! Titles and authors come straight from the catalog spreadsheet and may hold
//! characters that are invalid on one filesystem or another. Everything that
//! is hostile on Windows, macOS or Linux is mapped to `_`.

/// Separator placed between title, author and asset name.
pub const FILENAME_SEPARATOR: &str = " - ";

/// Placeholder used when sanitizing leaves nothing behind.
const EMPTY_COMPONENT: &str = "_";

/// Returns true for characters that cannot appear in a filename on common filesystems.
fn is_hostile(c: char) -> bool {
    matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_control()
}

/// Replaces filesystem-hostile characters with `_`, leaving everything else intact.
#[must_use]
pub fn replace_hostile_chars(value: &str) -> String {
    value
        .chars()
        .map(|c| if is_hostile(c) { '_' } else { c })
        .collect()
}

/// Sanitizes a human-readable name component (title or author).
///
/// Whitespace runs collapse to a single space, the filename separator is
/// collapsed to `-` so components never contain it, and leading/trailing
/// dots and spaces are removed.
#[must_use]
pub fn sanitize_name_component(value: &str) -> String {
    let mapped: String = value
        .chars()
        .map(|c| {
            if c.is_whitespace() {
                ' '
            } else if is_hostile(c) {
                '_'
            } else {
                c
            }
        })
        .collect();

    let collapsed = mapped.split_whitespace().collect::<Vec<_>>().join(" ");
    let collapsed = collapsed.replace(FILENAME_SEPARATOR, "-");
    let trimmed = collapsed.trim_matches(|c: char| c == '.' || c == ' ');

    if trimmed.is_empty() {
        EMPTY_COMPONENT.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Sanitizes the server-side asset name (e.g. `10.1007/978-3-319-00000-0.pdf`).
#[must_use]
pub fn sanitize_asset_name(value: &str) -> String {
    let sanitized = replace_hostile_chars(value.trim_matches('/'));
    if sanitized.is_empty() {
        EMPTY_COMPONENT.to_string()
    } else {
        sanitized
    }
}

/// Joins the sanitized parts into the final local filename.
#[must_use]
pub fn build_filename(title: &str, author: &str, asset_name: &str) -> String {
    [
        sanitize_name_component(title),
        sanitize_name_component(author),
        sanitize_asset_name(asset_name),
    ]
    .join(FILENAME_SEPARATOR)
}
