//! Confined filesystem storage
//!
//! Root confinement, path validation, permission checks and subtree
//! traversal.

pub mod permissions;
pub mod root;
pub mod traverse;
pub mod validation;

pub use root::{ConfinedRoot, ResolvedPath};
pub use traverse::{TraversalEntry, traverse_into};
