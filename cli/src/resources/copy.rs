//! Copy resource: file or directory tree duplicated at the destination.
use anyhow::Result;
use std::path::PathBuf;

use super::helpers::fs::{copy_path, ensure_parent_dir, remove_path, same_content};
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::ResourceError;

/// A copy of `source` at `destination`, compared by SHA-256 content digest.
#[derive(Debug, Clone)]
pub struct CopyResource {
    /// File or directory to copy.
    pub source: PathBuf,
    /// Where the copy lives.
    pub destination: PathBuf,
}

impl CopyResource {
    /// Create a new copy resource.
    #[must_use]
    pub const fn new(source: PathBuf, destination: PathBuf) -> Self {
        Self {
            source,
            destination,
        }
    }
}

impl Applicable for CopyResource {
    fn description(&self) -> String {
        format!("{} <= {}", self.destination.display(), self.source.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        if !self.source.exists() {
            return Err(ResourceError::NotFound(self.source.display().to_string()).into());
        }
        ensure_parent_dir(&self.destination)?;
        remove_path(&self.destination)?;
        copy_path(&self.source, &self.destination).map_err(|e| {
            ResourceError::Copy(format!(
                "{} to {}: {e:#}",
                self.source.display(),
                self.destination.display()
            ))
        })?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for CopyResource {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.source.exists() {
            return Ok(ResourceState::Invalid {
                reason: format!("source does not exist: {}", self.source.display()),
            });
        }
        let Ok(meta) = self.destination.symlink_metadata() else {
            return Ok(ResourceState::Missing);
        };
        if meta.is_symlink() {
            return Ok(ResourceState::Incorrect {
                current: "destination is a symlink".to_string(),
            });
        }
        if same_content(&self.source, &self.destination)? {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: "content differs".to_string(),
            })
        }
    }
}
