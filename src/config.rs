//! Configuration management for the file manager.
//!
//! Two values cover everything this program needs: the root directory it
//! is confined to, and where log lines go. Both resolve with the same
//! precedence: command-line override, then environment variable, then the
//! built-in default. An empty string means "not configured".

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Built-in defaults. Empty leaves the value unconfigured.
const DEFAULT_ROOT: &str = "";
const DEFAULT_LOG: &str = "";

/// Resolved startup configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    /// Root directory every operation is confined to.
    /// Environment: FILEMANAGER_ROOT
    pub root: String,

    /// Log destination: a file path, or the literal "syslog".
    /// Environment: FILEMANAGER_LOG
    pub log: String,
}

/// Explicit values from the command line; they win over everything.
#[derive(Debug, Default)]
pub struct Overrides {
    pub root: Option<String>,
    pub log: Option<String>,
}

impl Settings {
    /// Load configuration: defaults, then FILEMANAGER_* environment
    /// variables, then explicit overrides.
    pub fn load(overrides: Overrides) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("root", DEFAULT_ROOT)?
            .set_default("log", DEFAULT_LOG)?
            .add_source(Environment::with_prefix("FILEMANAGER"))
            .set_override_option("root", overrides.root)?
            .set_override_option("log", overrides.log)?
            .build()?
            .try_deserialize()
    }

    /// The configured root directory, if any.
    pub fn root(&self) -> Option<&str> {
        (!self.root.is_empty()).then_some(self.root.as_str())
    }

    /// The configured log destination, if any.
    pub fn log(&self) -> Option<&str> {
        (!self.log.is_empty()).then_some(self.log.as_str())
    }
}
