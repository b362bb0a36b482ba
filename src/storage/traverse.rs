//! Subtree traversal
//!
//! Enumerates everything under a path into one flat list in post-order:
//! a directory's own entry follows every entry produced from its contents.
//! Deletion consumes the list front to back, so children are gone before
//! their container comes up.

use std::fs;

use crate::error::TraverseError;
use crate::storage::root::{ConfinedRoot, ResolvedPath};

/// One traversal result.
#[derive(Debug)]
pub struct TraversalEntry {
    pub path: ResolvedPath,
    pub is_dir: bool,
}

impl TraversalEntry {
    /// The reported form: the relative path, with a trailing separator
    /// marking directories.
    pub fn marker(&self) -> String {
        if self.is_dir {
            format!("{}/", self.path.relative())
        } else {
            self.path.relative().to_string()
        }
    }
}

enum Frame {
    Enter(ResolvedPath),
    Exit(ResolvedPath),
}

/// Appends the whole subtree under `start` to `out`, post-order.
///
/// Runs on an explicit stack, so a deeply nested tree cannot exhaust the
/// call stack. Any stat or listing failure aborts the whole walk with an
/// error; the caller discards the partial list rather than acting on it.
pub fn traverse_into(
    root: &ConfinedRoot,
    start: ResolvedPath,
    out: &mut Vec<TraversalEntry>,
) -> Result<(), TraverseError> {
    let mut stack = vec![Frame::Enter(start)];
    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter(path) => {
                let meta = fs::metadata(path.as_path()).map_err(|error| TraverseError::Stat {
                    path: path.relative().to_string(),
                    error,
                })?;
                if !meta.is_dir() {
                    out.push(TraversalEntry { path, is_dir: false });
                    continue;
                }
                let listing = fs::read_dir(path.as_path()).map_err(|error| TraverseError::List {
                    path: path.relative().to_string(),
                    error,
                })?;
                let mut children = Vec::new();
                for entry in listing {
                    let entry = entry.map_err(|error| TraverseError::List {
                        path: path.relative().to_string(),
                        error,
                    })?;
                    children.push(root.child(&path, &entry.file_name()));
                }
                stack.push(Frame::Exit(path));
                // Reversed so children pop back off in listing order.
                for child in children.into_iter().rev() {
                    stack.push(Frame::Enter(child));
                }
            }
            Frame::Exit(path) => out.push(TraversalEntry { path, is_dir: true }),
        }
    }
    Ok(())
}
