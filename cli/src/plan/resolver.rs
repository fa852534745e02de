//! Effective configuration of directories under a category.
use std::path::{Path, PathBuf};

use crate::config::CONF_FILE_NAME;
use crate::config::effective::EffectiveConfig;
use crate::config::fragment::Fragment;
use crate::error::ConfigError;

/// Resolves the configuration visible at any directory of one category.
///
/// Layers, lowest first: defaults and reserved paths, the category
/// `dot.json`, the category's `dirconf` entry for the topic, then the
/// `dot.json` of every directory from the topic root down.
#[derive(Debug, Clone)]
pub struct Resolver {
    category: EffectiveConfig,
}

impl Resolver {
    /// Create a resolver over a category-level configuration.
    #[must_use]
    pub const fn new(category: EffectiveConfig) -> Self {
        Self { category }
    }

    /// The category-level configuration.
    #[must_use]
    pub const fn category(&self) -> &EffectiveConfig {
        &self.category
    }

    /// The category directory.
    #[must_use]
    pub fn category_dir(&self) -> &Path {
        &self.category.category_path
    }

    /// Directory of `topic`.
    #[must_use]
    pub fn topic_dir(&self, topic: &str) -> PathBuf {
        self.category_dir().join(topic)
    }

    /// Configuration a topic directory inherits, before its own `dot.json`.
    ///
    /// # Errors
    ///
    /// Propagates layering errors.
    pub fn topic_base(&self, topic: &str) -> Result<EffectiveConfig, ConfigError> {
        match self.category.fragment().dirconf.get(topic) {
            Some(fragment) => self.category.layer(fragment),
            None => Ok(self.category.clone()),
        }
    }

    /// Layer the `dot.json` of `dir` (if any) onto `inherited`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] or [`ConfigError::Io`] if the override
    /// exists but cannot be used.
    pub fn descend(
        &self,
        inherited: &EffectiveConfig,
        dir: &Path,
    ) -> Result<EffectiveConfig, ConfigError> {
        let path = dir.join(CONF_FILE_NAME);
        match Fragment::load(&path)? {
            Some(fragment) => {
                tracing::debug!("applying {}", path.display());
                inherited.layer(&fragment)
            }
            None => Ok(inherited.clone()),
        }
    }

    /// Effective configuration of `dir`, walking down from the category root.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutsideCategory`] if `dir` is not under the
    /// category, or any error from [`descend`](Self::descend).
    pub fn resolve(&self, dir: &Path) -> Result<EffectiveConfig, ConfigError> {
        let relative =
            dir.strip_prefix(self.category_dir())
                .map_err(|_| ConfigError::OutsideCategory {
                    path: dir.to_path_buf(),
                    category: self.category_dir().to_path_buf(),
                })?;
        let mut components = relative.components();
        let Some(topic) = components.next() else {
            return Ok(self.category.clone());
        };
        let topic = topic.as_os_str().to_string_lossy();
        let mut current = self.topic_dir(&topic);
        let mut config = self.descend(&self.topic_base(&topic)?, &current)?;
        for component in components {
            current.push(component);
            config = self.descend(&config, &current)?;
        }
        Ok(config)
    }
}
