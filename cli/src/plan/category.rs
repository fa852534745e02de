//! Topic discovery and planning of a whole category.
use std::path::{Path, PathBuf};

use super::resolver::Resolver;
use super::walker::{readable_entries, walk};
use super::CategoryPlan;
use crate::config::effective::EffectiveConfig;
use crate::config::fragment::{ConfigStack, Fragment};
use crate::config::{CONF_FILE_NAME, Settings};
use crate::error::{ConfigError, PlanError};

/// Category directories under `conf_dir`, sorted, skipping dot-prefixed
/// names and plain files.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if `conf_dir` cannot be listed.
pub fn categories(conf_dir: &Path) -> Result<Vec<String>, ConfigError> {
    let entries = std::fs::read_dir(conf_dir).map_err(|source| ConfigError::Io {
        path: conf_dir.to_path_buf(),
        source,
    })?;
    Ok(readable_entries(conf_dir, entries)
        .into_iter()
        .filter(|(path, _)| path.is_dir())
        .filter_map(|(path, _)| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .filter(|name| !name.starts_with('.'))
        .collect())
}

/// A loaded category: its name and the resolver over its configuration.
#[derive(Debug, Clone)]
pub struct CategoryProcessor {
    name: String,
    resolver: Resolver,
}

impl CategoryProcessor {
    /// Load `category` from `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::UnknownCategory`] if the category directory does
    /// not exist, or a configuration error if its `dot.json` is broken.
    pub fn load(settings: &Settings, category: &str) -> Result<Self, PlanError> {
        let category_dir = settings.category_dir(category);
        if category.is_empty() || !category_dir.is_dir() {
            return Err(PlanError::UnknownCategory {
                category: category.to_string(),
                conf_dir: settings.conf_dir.clone(),
            });
        }

        let mut stack = ConfigStack::new();
        stack.push(Fragment::defaults());
        stack.push(Fragment::reserved(&settings.root_dir, &category_dir));
        if let Some(fragment) = Fragment::load(&category_dir.join(CONF_FILE_NAME))? {
            stack.push(fragment);
        }
        let config = EffectiveConfig::from_fragment(stack.merged())?;
        tracing::debug!(
            "category {category}: copy-mode={:?} dir-mode={} dot-mode={:?}",
            config.copy_mode,
            config.dir_mode,
            config.dot_mode
        );
        Ok(Self {
            name: category.to_string(),
            resolver: Resolver::new(config),
        })
    }

    /// Category name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Category directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.resolver.category_dir()
    }

    /// Sorted topic names: subdirectories not matched by the category
    /// `ignore` list.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the category directory cannot be listed.
    pub fn topics(&self) -> Result<Vec<String>, ConfigError> {
        let dir = self.dir();
        let entries = std::fs::read_dir(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let config = self.resolver.category();
        let topics: Vec<String> = readable_entries(dir, entries)
            .into_iter()
            .filter(|(_, file_type)| file_type.is_dir())
            .map(|(path, _)| path)
            .filter(|path| {
                let ignored = config.is_ignored(path);
                if ignored {
                    tracing::debug!("ignoring topic {}", path.display());
                }
                !ignored
            })
            .filter_map(|path: PathBuf| {
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .collect();
        Ok(topics)
    }

    /// Plan every topic, or only `topic` when given.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::UnknownTopic`] if `topic` is not one of
    /// [`topics`](Self::topics), or the first configuration error met while
    /// walking; no partial plan is returned in that case.
    pub fn process(&self, topic: Option<&str>) -> Result<CategoryPlan, PlanError> {
        let topics = self.topics()?;
        let selected: Vec<&str> = match topic {
            Some(wanted) => {
                if !topics.iter().any(|t| t == wanted) {
                    return Err(PlanError::UnknownTopic {
                        topic: wanted.to_string(),
                        category: self.name.clone(),
                    });
                }
                vec![wanted]
            }
            None => topics.iter().map(String::as_str).collect(),
        };

        let mut plan = CategoryPlan::new();
        for name in selected {
            let operations = walk(&self.resolver, name)?;
            tracing::debug!("topic {name}: {} operation(s)", operations.len());
            plan.insert(name.to_string(), operations);
        }
        Ok(plan)
    }
}

/// Load `category` and plan it in one step.
///
/// # Errors
///
/// See [`CategoryProcessor::load`] and [`CategoryProcessor::process`].
pub fn process(
    settings: &Settings,
    category: &str,
    topic: Option<&str>,
) -> Result<CategoryPlan, PlanError> {
    CategoryProcessor::load(settings, category)?.process(topic)
}
