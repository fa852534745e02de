//! Classification engine: turns a category tree into operations.
//!
//! The pipeline, outermost first:
//!
//! - [`category`]: discovers topics and owns the category configuration
//! - [`walker`]: walks one topic, deduplicating claimed subtrees
//! - [`classify`]: mode and destination of a single entry
//! - [`resolver`]: effective configuration of any directory
//!
//! Planning only reads the filesystem; the result is handed to
//! [`apply`](crate::apply) or printed by `query`.
pub mod category;
pub mod classify;
pub mod resolver;
pub mod walker;

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::config::modes::Mode;

pub use category::{CategoryProcessor, categories, process};
pub use classify::{Classification, Placement, classify};
pub use resolver::Resolver;
pub use walker::walk;

/// One placement: `mode` applied from `source` to `destination`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Operation {
    /// What to do.
    pub mode: Mode,
    /// Absolute path under the category directory.
    pub source: PathBuf,
    /// Absolute path under the output root.
    pub destination: PathBuf,
}

impl Operation {
    /// Create an operation.
    #[must_use]
    pub const fn new(mode: Mode, source: PathBuf, destination: PathBuf) -> Self {
        Self {
            mode,
            source,
            destination,
        }
    }
}

/// Mode → unique `(source, destination)` pairs, always iterated sorted.
///
/// Serializes as `{"link": [["/src", "/dst"], …], …}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OperationSet {
    by_mode: BTreeMap<Mode, BTreeSet<(PathBuf, PathBuf)>>,
}

impl OperationSet {
    /// Record a pair; returns `false` if it was already present.
    pub fn insert(&mut self, mode: Mode, source: PathBuf, destination: PathBuf) -> bool {
        self.by_mode
            .entry(mode)
            .or_default()
            .insert((source, destination))
    }

    /// Sorted pairs recorded for `mode`.
    #[must_use]
    pub fn pairs(&self, mode: Mode) -> Vec<(&Path, &Path)> {
        self.by_mode.get(&mode).map_or_else(Vec::new, |pairs| {
            pairs
                .iter()
                .map(|(s, d)| (s.as_path(), d.as_path()))
                .collect()
        })
    }

    /// Modes that have at least one pair, in order.
    pub fn modes(&self) -> impl Iterator<Item = Mode> + '_ {
        self.by_mode.keys().copied()
    }

    /// Every operation, by mode then by pair.
    pub fn iter(&self) -> impl Iterator<Item = Operation> + '_ {
        self.by_mode.iter().flat_map(|(mode, pairs)| {
            pairs
                .iter()
                .map(|(s, d)| Operation::new(*mode, s.clone(), d.clone()))
        })
    }

    /// Total number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_mode.values().map(BTreeSet::len).sum()
    }

    /// Whether no operation was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Topic name → its operations, ordered by topic name.
pub type CategoryPlan = BTreeMap<String, OperationSet>;
