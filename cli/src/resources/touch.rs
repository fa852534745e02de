//! Touch resource: copy only when nothing is at the destination yet.
use anyhow::Result;
use std::path::PathBuf;

use super::copy::CopyResource;
use super::helpers::fs::entry_exists;
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// Seeds `destination` with a copy of `source` once; an existing
/// destination (even a dangling symlink) is never touched again.
#[derive(Debug, Clone)]
pub struct TouchResource {
    copy: CopyResource,
}

impl TouchResource {
    /// Create a new touch resource.
    #[must_use]
    pub const fn new(source: PathBuf, destination: PathBuf) -> Self {
        Self {
            copy: CopyResource::new(source, destination),
        }
    }
}

impl Applicable for TouchResource {
    fn description(&self) -> String {
        format!(
            "{} <= {} (if absent)",
            self.copy.destination.display(),
            self.copy.source.display()
        )
    }

    fn apply(&self) -> Result<ResourceChange> {
        if entry_exists(&self.copy.destination) {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        self.copy.apply()
    }
}

impl Resource for TouchResource {
    fn current_state(&self) -> Result<ResourceState> {
        if entry_exists(&self.copy.destination) {
            return Ok(ResourceState::Correct);
        }
        if !self.copy.source.exists() {
            return Ok(ResourceState::Invalid {
                reason: format!("source does not exist: {}", self.copy.source.display()),
            });
        }
        Ok(ResourceState::Missing)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn creates_once_and_keeps_local_edits() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("local.conf");
        let destination = dir.path().join("home/.local.conf");
        std::fs::write(&source, "template").unwrap();

        let resource = TouchResource::new(source.clone(), destination.clone());
        assert_eq!(resource.current_state().unwrap(), ResourceState::Missing);
        assert_eq!(resource.apply().unwrap(), ResourceChange::Applied);

        std::fs::write(&destination, "edited").unwrap();
        std::fs::write(&source, "template v2").unwrap();
        assert_eq!(resource.current_state().unwrap(), ResourceState::Correct);
        assert_eq!(resource.apply().unwrap(), ResourceChange::AlreadyCorrect);
        assert_eq!(std::fs::read_to_string(&destination).unwrap(), "edited");
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_counts_as_present() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src");
        let destination = dir.path().join("dst");
        std::fs::write(&source, "x").unwrap();
        std::os::unix::fs::symlink("/nonexistent/target", &destination).unwrap();

        let resource = TouchResource::new(source, destination);
        assert_eq!(resource.current_state().unwrap(), ResourceState::Correct);
    }

    #[test]
    fn missing_source_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let resource = TouchResource::new(dir.path().join("nope"), dir.path().join("dst"));
        assert!(matches!(
            resource.current_state().unwrap(),
            ResourceState::Invalid { .. }
        ));
    }
}
