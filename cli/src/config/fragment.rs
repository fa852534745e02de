//! One configuration layer (`dot.json`) and the stack that merges layers.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::modes::{CopyMode, DotMode, Mode};
use crate::error::ConfigError;

/// Reserved key carrying the output root. Injected, never read from JSON.
pub const ROOT_PATH_KEY: &str = "root-path";

/// Reserved key carrying the category directory. Injected, never read from JSON.
pub const CATEGORY_PATH_KEY: &str = "category-path";

/// Built-in `copy-mode`.
pub const DEFAULT_COPY_MODE: CopyMode = CopyMode::Root;

/// Built-in `dir-mode`.
pub const DEFAULT_DIR_MODE: Mode = Mode::Rlink;

/// Built-in `dot-mode`.
pub const DEFAULT_DOT_MODE: DotMode = DotMode::NoDot;

/// A single configuration layer.
///
/// Every recognised option is optional so that a layer only states what it
/// overrides. Keys the schema does not know (`comment`, `reference`, …) are
/// kept in [`extra`](Self::extra) and merged like any JSON object.
///
/// # Examples
///
/// ```
/// use dotter_cli::config::fragment::Fragment;
/// use dotter_cli::config::modes::Mode;
/// use std::path::Path;
///
/// let base = Fragment::defaults();
/// let over = Fragment::parse(r#"{"dir-mode": "copy"}"#, Path::new("dot.json")).unwrap();
/// assert_eq!(base.merge(&over).dir_mode, Some(Mode::Copy));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Fragment {
    /// `copy-mode`.
    #[serde(alias = "copy_mode", skip_serializing_if = "Option::is_none")]
    pub copy_mode: Option<CopyMode>,
    /// `dir-mode`.
    #[serde(alias = "dir_mode", skip_serializing_if = "Option::is_none")]
    pub dir_mode: Option<Mode>,
    /// `dot-mode`.
    #[serde(alias = "dot_mode", skip_serializing_if = "Option::is_none")]
    pub dot_mode: Option<DotMode>,
    /// `ignore`; replaced wholesale by an overriding layer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore: Option<Vec<String>>,
    /// Per-topic layers, keyed by topic name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dirconf: BTreeMap<String, Fragment>,
    /// Output root (reserved).
    #[serde(skip)]
    pub root_path: Option<PathBuf>,
    /// Category directory (reserved).
    #[serde(skip)]
    pub category_path: Option<PathBuf>,
    /// Unrecognised keys, passed through verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Fragment {
    /// The built-in bottom layer.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            copy_mode: Some(DEFAULT_COPY_MODE),
            dir_mode: Some(DEFAULT_DIR_MODE),
            dot_mode: Some(DEFAULT_DOT_MODE),
            ignore: Some(Vec::new()),
            ..Self::default()
        }
    }

    /// A layer holding only the reserved paths.
    #[must_use]
    pub fn reserved(root_path: &Path, category_path: &Path) -> Self {
        Self {
            root_path: Some(root_path.to_path_buf()),
            category_path: Some(category_path.to_path_buf()),
            ..Self::default()
        }
    }

    /// Parse a fragment from JSON text read from `path`.
    ///
    /// Reserved keys present in the text are dropped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the text is not a valid fragment.
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut fragment: Self = serde_json::from_str(text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        for key in [ROOT_PATH_KEY, CATEGORY_PATH_KEY] {
            if fragment.extra.remove(key).is_some() {
                tracing::warn!("ignoring reserved key '{key}' in {}", path.display());
            }
        }
        Ok(fragment)
    }

    /// Load the fragment at `path`, or `None` when there is no such file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file exists but cannot be read, or
    /// [`ConfigError::Parse`] if it is not a valid fragment.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.is_file() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path).map(Some)
    }

    /// Merge `over` on top of `self`.
    ///
    /// Options present in `over` win; `dirconf` and unrecognised objects
    /// merge recursively; `ignore` lists are replaced, not concatenated.
    #[must_use]
    pub fn merge(&self, over: &Self) -> Self {
        Self {
            copy_mode: over.copy_mode.or(self.copy_mode),
            dir_mode: over.dir_mode.or(self.dir_mode),
            dot_mode: over.dot_mode.or(self.dot_mode),
            ignore: over.ignore.clone().or_else(|| self.ignore.clone()),
            dirconf: merge_dirconf(&self.dirconf, &over.dirconf),
            root_path: over.root_path.clone().or_else(|| self.root_path.clone()),
            category_path: over
                .category_path
                .clone()
                .or_else(|| self.category_path.clone()),
            extra: merge_objects(&self.extra, &over.extra),
        }
    }
}

fn merge_dirconf(
    base: &BTreeMap<String, Fragment>,
    over: &BTreeMap<String, Fragment>,
) -> BTreeMap<String, Fragment> {
    let mut out = base.clone();
    for (name, fragment) in over {
        let merged = out
            .get(name)
            .map_or_else(|| fragment.clone(), |existing| existing.merge(fragment));
        out.insert(name.clone(), merged);
    }
    out
}

fn merge_objects(base: &Map<String, Value>, over: &Map<String, Value>) -> Map<String, Value> {
    let mut out = base.clone();
    for (key, value) in over {
        let merged = match (out.get(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                Value::Object(merge_objects(existing, incoming))
            }
            _ => value.clone(),
        };
        out.insert(key.clone(), merged);
    }
    out
}

/// Ordered configuration layers, lowest precedence first.
#[derive(Debug, Clone, Default)]
pub struct ConfigStack {
    layers: Vec<Fragment>,
}

impl ConfigStack {
    /// An empty stack.
    #[must_use]
    pub const fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Push a layer with higher precedence than every existing one.
    pub fn push(&mut self, fragment: Fragment) {
        self.layers.push(fragment);
    }

    /// Fold every layer into one fragment.
    #[must_use]
    pub fn merged(&self) -> Fragment {
        self.layers
            .iter()
            .fold(Fragment::default(), |acc, layer| acc.merge(layer))
    }
}
