//! Glob matching for the `ignore` option.
//!
//! Patterns follow shell-glob rules (`*`, `?`, `[...]`, `**`), are
//! case-sensitive, and `*` never crosses a `/`. A path is ignored when its
//! basename or any component-suffix of it matches, so `*.swp` excludes
//! `a/b/.x.swp` and `__pycache__/*` excludes `a/__pycache__/m.pyc`.
use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use crate::error::ConfigError;

/// A compiled set of ignore patterns.
#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    patterns: Vec<String>,
    set: GlobSet,
}

impl IgnoreMatcher {
    /// Compile `patterns`. Malformed patterns are dropped with a warning.
    #[must_use]
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let mut builder = GlobSetBuilder::new();
        let mut accepted = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let pattern = pattern.as_ref();
            match compile(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                    accepted.push(pattern.to_string());
                }
                Err(err) => tracing::warn!("{err}"),
            }
        }
        let set = builder.build().unwrap_or_else(|err| {
            tracing::warn!("ignore patterns disabled: {err}");
            GlobSet::empty()
        });
        Self {
            patterns: accepted,
            set,
        }
    }

    /// A matcher that ignores nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
        }
    }

    /// The patterns that compiled successfully.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether `relative` (a category-relative path) is ignored.
    #[must_use]
    pub fn is_match(&self, relative: &Path) -> bool {
        if self.set.is_empty() {
            return false;
        }
        let components: Vec<&OsStr> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name),
                _ => None,
            })
            .collect();
        // Shortest suffix (the basename) first.
        (0..components.len()).rev().any(|start| {
            let suffix: PathBuf = components.iter().skip(start).collect();
            self.set.is_match(&suffix)
        })
    }
}

/// Compile one pattern with the matcher's glob options.
///
/// # Errors
///
/// Returns [`ConfigError::IgnorePattern`] if the pattern is malformed.
pub fn compile(pattern: &str) -> Result<Glob, ConfigError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| ConfigError::IgnorePattern {
            pattern: pattern.to_string(),
            message: e.kind().to_string(),
        })
}

/// One-shot form of [`IgnoreMatcher::is_match`].
#[must_use]
pub fn should_ignore<S: AsRef<str>>(path: &Path, patterns: &[S]) -> bool {
    IgnoreMatcher::new(patterns).is_match(path)
}
