//! The merged configuration visible at one directory.
use std::path::{Path, PathBuf};

use super::fragment::{
    CATEGORY_PATH_KEY, DEFAULT_COPY_MODE, DEFAULT_DIR_MODE, DEFAULT_DOT_MODE, Fragment,
    ROOT_PATH_KEY,
};
use super::ignore::IgnoreMatcher;
use super::modes::{CopyMode, DotMode, Mode};
use crate::error::ConfigError;

/// A fully merged [`Fragment`] with defaults applied and ignore patterns
/// compiled.
///
/// Values are immutable; [`layer`](Self::layer) returns a new config for a
/// subtree instead of mutating a shared stack.
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    /// Placement of the topic directory.
    pub copy_mode: CopyMode,
    /// Operation for matched entities.
    pub dir_mode: Mode,
    /// Dot prefixing of the first destination component.
    pub dot_mode: DotMode,
    /// Output root.
    pub root_path: PathBuf,
    /// Category directory.
    pub category_path: PathBuf,
    ignore: IgnoreMatcher,
    fragment: Fragment,
}

impl EffectiveConfig {
    /// Build from a merged fragment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingReserved`] if the reserved paths were
    /// never injected.
    pub fn from_fragment(fragment: Fragment) -> Result<Self, ConfigError> {
        let root_path = fragment
            .root_path
            .clone()
            .ok_or(ConfigError::MissingReserved(ROOT_PATH_KEY))?;
        let category_path = fragment
            .category_path
            .clone()
            .ok_or(ConfigError::MissingReserved(CATEGORY_PATH_KEY))?;
        let ignore = fragment
            .ignore
            .as_deref()
            .map_or_else(IgnoreMatcher::empty, IgnoreMatcher::new);
        Ok(Self {
            copy_mode: fragment.copy_mode.unwrap_or(DEFAULT_COPY_MODE),
            dir_mode: fragment.dir_mode.unwrap_or(DEFAULT_DIR_MODE),
            dot_mode: fragment.dot_mode.unwrap_or(DEFAULT_DOT_MODE),
            root_path,
            category_path,
            ignore,
            fragment,
        })
    }

    /// The config for a subtree that adds `over` on top of this one.
    ///
    /// # Errors
    ///
    /// Propagates [`from_fragment`](Self::from_fragment) errors.
    pub fn layer(&self, over: &Fragment) -> Result<Self, ConfigError> {
        Self::from_fragment(self.fragment.merge(over))
    }

    /// The merged fragment this config was built from.
    #[must_use]
    pub const fn fragment(&self) -> &Fragment {
        &self.fragment
    }

    /// The compiled ignore patterns.
    #[must_use]
    pub const fn ignore(&self) -> &IgnoreMatcher {
        &self.ignore
    }

    /// Whether `path` (absolute, under the category) is ignored.
    #[must_use]
    pub fn is_ignored(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.category_path).unwrap_or(path);
        self.ignore.is_match(relative)
    }
}
