//! Error handling
//!
//! Defines error types and handling for the file manager.

pub mod types;

pub use types::*;
