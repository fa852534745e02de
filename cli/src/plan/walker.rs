//! Depth-first walk of one topic.
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs::{FileType, ReadDir};
use std::path::{Path, PathBuf};

use super::OperationSet;
use super::classify::Placement;
use super::resolver::Resolver;
use crate::config::CONF_FILE_NAME;
use crate::config::effective::EffectiveConfig;
use crate::error::PlanError;

/// Walk `topic` and return its operations.
///
/// Entries are visited in sorted order. Once a directory is classified with
/// a mode that places it whole (`copy`, `link`, `touch`), nothing below it is
/// visited again. Ignored directories are pruned the same way. Symlinks in
/// the source tree are treated as leaves and never followed.
///
/// # Errors
///
/// Returns a configuration error if any `dot.json` on the way cannot be
/// read or parsed; the topic produces no operations in that case.
pub fn walk(resolver: &Resolver, topic: &str) -> Result<OperationSet, PlanError> {
    let topic_dir = resolver.topic_dir(topic);
    let topic_config = resolver.descend(&resolver.topic_base(topic)?, &topic_dir)?;
    let mut walk = TopicWalk {
        resolver,
        placement: Placement::new(topic, &topic_config),
        claimed: BTreeSet::new(),
        operations: OperationSet::default(),
    };
    walk.enter(&topic_dir, &topic_config, true)?;
    Ok(walk.operations)
}

struct TopicWalk<'a> {
    resolver: &'a Resolver,
    placement: Placement,
    claimed: BTreeSet<PathBuf>,
    operations: OperationSet,
}

impl TopicWalk<'_> {
    fn is_claimed(&self, path: &Path) -> bool {
        self.claimed.iter().any(|prefix| path.starts_with(prefix))
    }

    /// Visit a child of a directory whose configuration is `parent`.
    fn visit(&mut self, path: &Path, is_dir: bool, parent: &EffectiveConfig) -> Result<(), PlanError> {
        if self.is_claimed(path) {
            return Ok(());
        }
        if parent.is_ignored(path) {
            tracing::debug!("ignoring {}", path.display());
            if is_dir {
                self.claimed.insert(path.to_path_buf());
            }
            return Ok(());
        }
        if is_dir {
            let config = self.resolver.descend(parent, path)?;
            self.enter(path, &config, true)
        } else {
            self.enter(path, parent, false)
        }
    }

    /// Classify `path` under `config` and record or recurse.
    fn enter(&mut self, path: &Path, config: &EffectiveConfig, is_dir: bool) -> Result<(), PlanError> {
        let classification = self.placement.classify(path, config, is_dir);
        if classification.mode.claims_subtree() {
            tracing::trace!(
                "{} {} -> {}",
                classification.mode,
                classification.source.display(),
                classification.destination.display()
            );
            self.operations.insert(
                classification.mode,
                classification.source,
                classification.destination,
            );
            if is_dir {
                self.claimed.insert(path.to_path_buf());
            }
            return Ok(());
        }
        if is_dir {
            for (child, child_is_dir) in children(path) {
                self.visit(&child, child_is_dir, config)?;
            }
        }
        Ok(())
    }
}

/// Sorted children of `dir`, minus override files.
///
/// Unreadable directories and entries are skipped with a warning.
fn children(dir: &Path) -> Vec<(PathBuf, bool)> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!("skipping unreadable directory {}: {err}", dir.display());
            return Vec::new();
        }
    };
    readable_entries(dir, entries)
        .into_iter()
        .filter_map(|(path, file_type)| {
            let is_dir = file_type.is_dir();
            if !is_dir && path.file_name() == Some(OsStr::new(CONF_FILE_NAME)) {
                return None;
            }
            Some((path, is_dir))
        })
        .collect()
}

/// Entries of `dir` with their (unfollowed) file types, sorted by path.
///
/// An entry that cannot be read or typed is skipped with a warning.
pub(super) fn readable_entries(dir: &Path, entries: ReadDir) -> Vec<(PathBuf, FileType)> {
    let mut out: Vec<(PathBuf, FileType)> = entries
        .filter_map(|entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!("skipping entry in {}: {err}", dir.display());
                    return None;
                }
            };
            match entry.file_type() {
                Ok(file_type) => Some((entry.path(), file_type)),
                Err(err) => {
                    tracing::warn!("skipping {}: {err}", entry.path().display());
                    None
                }
            }
        })
        .collect();
    out.sort_by(|a, b| a.0.cmp(&b.0));
    out
}
