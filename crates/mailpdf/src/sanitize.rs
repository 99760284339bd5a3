//! Helpers for turning untrusted attachment metadata into safe output names.
//!
//! Attachment filenames come straight from message headers. Nothing read
//! from a message may choose where a file lands outside the output directory.

use std::path::Path;

/// Reduces a declared attachment filename to a single safe path component.
///
/// Keeps only the text after the last `/` or `\`, drops control characters,
/// and trims surrounding whitespace and trailing dots. Returns `None` when
/// nothing usable remains (empty, `.` or `..`).
///
/// Ordinary names pass through unchanged: `invoice (1).pdf` stays as is.
pub fn sanitize_attachment_filename(filename: &str) -> Option<String> {
    let last_component = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let cleaned: String = last_component
        .chars()
        .filter(|c| !c.is_control())
        .collect();

    let cleaned = cleaned.trim().trim_end_matches('.').trim_end();

    match cleaned {
        "" | "." | ".." => None,
        name => Some(name.to_string()),
    }
}

/// Returns only the filename component of a path (no directory).
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}
