//! Root confinement
//!
//! Every request operates inside one configured root directory. The
//! [`ConfinedRoot`] accessor is the only place where caller-supplied paths
//! and real filesystem paths meet: handlers can only obtain a
//! [`ResolvedPath`] through it, so a path that escaped validation cannot
//! exist by construction.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::StorageError;
use crate::storage::validation;

/// A validated path inside the root: the relative form used in responses
/// and log lines, plus the absolute form used for filesystem calls.
#[derive(Debug, Clone)]
pub struct ResolvedPath {
    rel: String,
    abs: PathBuf,
}

impl ResolvedPath {
    /// Absolute path for filesystem operations.
    pub fn as_path(&self) -> &Path {
        &self.abs
    }

    /// Root-relative form, as reported back to the caller.
    pub fn relative(&self) -> &str {
        &self.rel
    }
}

/// The confined root directory all operations resolve against.
#[derive(Debug, Clone)]
pub struct ConfinedRoot {
    base: PathBuf,
}

impl ConfinedRoot {
    /// Validates `root` and returns an accessor that prefixes it onto every
    /// resolved path. One trailing separator is tolerated and stripped.
    pub fn new(root: &str) -> Result<ConfinedRoot, StorageError> {
        Self::validate(PathBuf::from(trim_root(root)))
    }

    /// Like [`ConfinedRoot::new`], but first tries to chroot(2) into the
    /// root so even an undiscovered resolver bug cannot reach outside it.
    /// Chroot needs privileges the hosting server rarely grants; on failure
    /// the literal prefix is kept and resolution alone does the confining.
    pub fn confine(root: &str) -> Result<ConfinedRoot, StorageError> {
        let trimmed = trim_root(root);
        match std::os::unix::fs::chroot(trimmed) {
            Ok(()) => {
                info!("chroot \"{}\"", trimmed);
                Self::validate(PathBuf::from("/"))
            }
            Err(e) => {
                warn!("chroot \"{}\": {}", trimmed, e);
                Self::validate(PathBuf::from(trimmed))
            }
        }
    }

    fn validate(base: PathBuf) -> Result<ConfinedRoot, StorageError> {
        match fs::metadata(&base) {
            Err(e) => Err(StorageError::RootUnavailable(format!("root stat: \"{}\"", e))),
            Ok(meta) if !meta.is_dir() => Err(StorageError::RootUnavailable(format!(
                "root directory \"{}\" is not a directory",
                base.display()
            ))),
            Ok(_) => Ok(ConfinedRoot { base }),
        }
    }

    /// Resolves one caller-supplied path, applying the validation rules.
    pub fn resolve(&self, raw: &str) -> Result<ResolvedPath, StorageError> {
        let rel = validation::validate_relative_path(raw)?;
        Ok(ResolvedPath {
            rel: rel.to_string(),
            // Leading separators would make join replace the base outright.
            abs: self.base.join(rel.trim_start_matches('/')),
        })
    }

    /// The root itself, reported as the empty relative path.
    pub fn root_path(&self) -> ResolvedPath {
        ResolvedPath {
            rel: String::new(),
            abs: self.base.clone(),
        }
    }

    /// Extends a resolved directory by one entry name read back from the
    /// filesystem. Hidden names are not rejected here; traversal has to see
    /// them to refuse the subtree that contains them.
    pub(crate) fn child(&self, parent: &ResolvedPath, name: &OsStr) -> ResolvedPath {
        let display = name.to_string_lossy();
        let rel = if parent.rel.is_empty() {
            display.into_owned()
        } else {
            format!("{}/{}", parent.rel, display)
        };
        ResolvedPath {
            rel,
            abs: parent.abs.join(name),
        }
    }
}

fn trim_root(root: &str) -> &str {
    root.strip_suffix('/').unwrap_or(root)
}
