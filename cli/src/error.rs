//! Domain-specific error types for the dotter engine.
//!
//! Planning code returns typed errors ([`ConfigError`], [`PlanError`]) so
//! callers and tests can tell a broken `dot.json` from a missing topic.
//! Resources raise [`ResourceError`] inside `anyhow` context chains. Command
//! handlers at the CLI boundary convert everything to [`anyhow::Error`] via
//! the standard `?` operator.
//!
//! # Error types
//!
//! ```text
//! ConfigError    : settings, dot.json loading and parsing, ignore patterns
//! PlanError      : category/topic lookup, wrapped config errors
//! ResourceError  : copy, link and touch operations
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise while locating and loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required directory (configuration dir or output root) is absent.
    #[error("{kind} is not found '{}'", path.display())]
    DirNotFound {
        /// Which directory was expected (e.g. `"Configuration dir"`).
        kind: &'static str,
        /// Path that was checked.
        path: PathBuf,
    },

    /// A `dot.json` fragment exists but is not valid configuration.
    #[error("Can not parse configuration {}: {message}", path.display())]
    Parse {
        /// Path to the fragment.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// An I/O error occurred while reading a fragment.
    #[error("IO error reading configuration {}: {source}", path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A directory was resolved that does not lie under the category root.
    #[error("{} is outside of category {}", path.display(), category.display())]
    OutsideCategory {
        /// Path that was resolved.
        path: PathBuf,
        /// Category root.
        category: PathBuf,
    },

    /// The merged configuration lacks a reserved key that planning injects.
    #[error("Configuration is missing reserved key '{0}'")]
    MissingReserved(&'static str),

    /// A glob in an `ignore` list could not be compiled. Never fatal.
    #[error("Invalid ignore pattern '{pattern}': {message}")]
    IgnorePattern {
        /// The offending pattern.
        pattern: String,
        /// Compiler message.
        message: String,
    },
}

/// Errors that arise while planning a category.
#[derive(Error, Debug)]
pub enum PlanError {
    /// The requested category is not a directory under the configuration dir.
    #[error("Category {category} is not found under '{}'", conf_dir.display())]
    UnknownCategory {
        /// Requested category.
        category: String,
        /// Configuration directory that was searched.
        conf_dir: PathBuf,
    },

    /// The requested topic is not present (or ignored) in the category.
    #[error("Topic ({topic}) does not exist in category {category}")]
    UnknownTopic {
        /// Requested topic.
        topic: String,
        /// Category that was searched.
        category: String,
    },

    /// An entry of the category tree could not be inspected.
    #[error("Can not read {}: {source}", path.display())]
    Io {
        /// Entry that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Structural configuration failure; aborts the whole category.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors that arise from resource operations.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// A symlink operation failed.
    #[error("Symlink error: {0}")]
    Symlink(String),

    /// A copy operation failed.
    #[error("Copy error: {0}")]
    Copy(String),

    /// The source of an operation was not found.
    #[error("File not found: {0}")]
    NotFound(String),
}
