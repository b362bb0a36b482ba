//! Path validation
//!
//! Confinement rules for caller-supplied paths. Everything here is pure
//! string inspection; rejection happens before any filesystem call.

use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;

use crate::error::StorageError;

/// Validates a caller-supplied path and returns its relative form.
///
/// One leading separator is tolerated and stripped. After that the path is
/// rejected when it is empty, when its first character is `.`, or when it
/// contains `/.` anywhere. The one substring rule blocks hidden entries and
/// every dot-segment escape (`..`) at once.
pub fn validate_relative_path(raw: &str) -> Result<&str, StorageError> {
    let rel = raw.strip_prefix('/').unwrap_or(raw);
    if rel.is_empty() || rel.starts_with('.') || rel.contains("/.") {
        return Err(StorageError::InvalidPath(rel.to_string()));
    }
    Ok(rel)
}

/// True for directory-entry names beginning with `.`.
///
/// Works on raw bytes so non-UTF-8 names are classified correctly.
pub fn is_hidden_name(name: &OsStr) -> bool {
    name.as_bytes().first() == Some(&b'.')
}

/// Scans a root-relative path for a hidden segment and returns the path of
/// the directory containing the first one found.
///
/// The requested path itself has already passed validation, so any hidden
/// segment found here was introduced below it by traversal.
pub fn hidden_segment_parent(rel: &str) -> Option<&str> {
    let mut consumed = 0usize;
    for segment in rel.split('/') {
        if segment.starts_with('.') {
            return Some(&rel[..consumed.saturating_sub(1)]);
        }
        consumed += segment.len() + 1;
    }
    None
}
