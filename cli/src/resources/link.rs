//! Symlink resource.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::helpers::fs::{ensure_parent_dir, entry_exists, remove_path};
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::ResourceError;

/// A symlink at `destination` pointing to `source`.
#[derive(Debug, Clone)]
pub struct LinkResource {
    /// What the symlink points to.
    pub source: PathBuf,
    /// Where the symlink is created.
    pub destination: PathBuf,
}

impl LinkResource {
    /// Create a new link resource.
    #[must_use]
    pub const fn new(source: PathBuf, destination: PathBuf) -> Self {
        Self {
            source,
            destination,
        }
    }
}

impl Applicable for LinkResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.destination.display(), self.source.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        ensure_parent_dir(&self.destination)?;
        remove_path(&self.destination)?;
        create_symlink(&self.source, &self.destination)?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for LinkResource {
    fn current_state(&self) -> Result<ResourceState> {
        if !entry_exists(&self.source) {
            return Ok(ResourceState::Invalid {
                reason: format!("source does not exist: {}", self.source.display()),
            });
        }
        let Ok(meta) = self.destination.symlink_metadata() else {
            return Ok(ResourceState::Missing);
        };
        // A symlinked parent can make the destination the source itself.
        if resolves_to(&self.destination, &self.source) {
            return Ok(ResourceState::Correct);
        }
        if !meta.is_symlink() {
            let kind = if meta.is_dir() { "directory" } else { "file" };
            return Ok(ResourceState::Incorrect {
                current: format!("destination is a regular {kind}"),
            });
        }
        let existing = std::fs::read_link(&self.destination)
            .with_context(|| format!("reading link {}", self.destination.display()))?;
        if existing == self.source {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: format!("points to {}", existing.display()),
            })
        }
    }
}

/// Whether `link` and `target` resolve to the same canonical path.
fn resolves_to(link: &Path, target: &Path) -> bool {
    match (link.canonicalize(), target.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Create a symlink at `link` pointing to `target`.
fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link).map_err(|e| {
            ResourceError::Symlink(format!(
                "creating symlink {} -> {}: {e}",
                link.display(),
                target.display()
            ))
        })?;
    }

    #[cfg(windows)]
    {
        let result = if target.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        };
        result.map_err(|e| {
            ResourceError::Symlink(format!(
                "creating symlink {} -> {}: {e}",
                link.display(),
                target.display()
            ))
        })?;
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn link_resource_description() {
        let resource = LinkResource::new(PathBuf::from("/source"), PathBuf::from("/target"));
        assert_eq!(resource.description(), "/target -> /source");
    }

    #[test]
    fn invalid_when_source_missing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let resource = LinkResource::new(
            temp_dir.path().join("nonexistent"),
            temp_dir.path().join("target"),
        );
        let state = resource.current_state().unwrap();
        assert!(matches!(state, ResourceState::Invalid { .. }));
    }

    #[test]
    fn missing_then_correct_after_apply() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("source");
        std::fs::write(&source, "test").unwrap();
        let target = temp_dir.path().join("nested/dir/target");

        let resource = LinkResource::new(source.clone(), target.clone());
        assert_eq!(resource.current_state().unwrap(), ResourceState::Missing);
        assert!(resource.needs_change().unwrap());

        assert_eq!(resource.apply().unwrap(), ResourceChange::Applied);
        assert_eq!(resource.current_state().unwrap(), ResourceState::Correct);
        assert_eq!(std::fs::read_link(&target).unwrap(), source);
    }

    #[cfg(unix)]
    #[test]
    fn correct_when_link_resolves_to_source() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("source");
        let alias = temp_dir.path().join("alias");
        let target = temp_dir.path().join("target");
        std::fs::write(&source, "test").unwrap();
        std::os::unix::fs::symlink(&source, &alias).unwrap();
        std::os::unix::fs::symlink(&alias, &target).unwrap();

        let resource = LinkResource::new(source, target);
        assert_eq!(resource.current_state().unwrap(), ResourceState::Correct);
    }

    #[cfg(unix)]
    #[test]
    fn correct_when_parent_directory_links_into_source() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source_dir = temp_dir.path().join("conf/fish");
        std::fs::create_dir_all(&source_dir).unwrap();
        std::fs::write(source_dir.join("config.fish"), "mine").unwrap();
        let dest_dir = temp_dir.path().join("fish");
        std::os::unix::fs::symlink(&source_dir, &dest_dir).unwrap();

        let resource = LinkResource::new(source_dir.join("config.fish"), dest_dir.join("config.fish"));
        assert_eq!(resource.current_state().unwrap(), ResourceState::Correct);
        assert!(!resource.needs_change().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn incorrect_when_link_points_elsewhere() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("source");
        let other = temp_dir.path().join("other");
        let target = temp_dir.path().join("target");
        std::fs::write(&source, "test").unwrap();
        std::fs::write(&other, "other").unwrap();
        std::os::unix::fs::symlink(&other, &target).unwrap();

        let resource = LinkResource::new(source, target);
        let state = resource.current_state().unwrap();
        assert!(matches!(state, ResourceState::Incorrect { ref current } if current.contains("points to")));
    }

    #[test]
    fn incorrect_when_destination_is_regular_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("source");
        let target = temp_dir.path().join("target");
        std::fs::write(&source, "content").unwrap();
        std::fs::write(&target, "other content").unwrap();

        let resource = LinkResource::new(source, target.clone());
        assert!(matches!(
            resource.current_state().unwrap(),
            ResourceState::Incorrect { .. }
        ));

        resource.apply().unwrap();
        assert!(target.symlink_metadata().unwrap().is_symlink());
    }

    #[test]
    fn apply_replaces_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("source");
        let target = temp_dir.path().join("target");
        std::fs::create_dir(&source).unwrap();
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("old"), "").unwrap();

        let resource = LinkResource::new(source, target.clone());
        assert!(matches!(
            resource.current_state().unwrap(),
            ResourceState::Incorrect { ref current } if current.contains("directory")
        ));
        resource.apply().unwrap();
        assert_eq!(resource.current_state().unwrap(), ResourceState::Correct);
    }
}
