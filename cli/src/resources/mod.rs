//! Idempotent placement primitives (check + apply pattern).
pub mod copy;
pub mod helpers;
pub mod link;
pub mod touch;

use anyhow::Result;

use crate::config::modes::Mode;
use crate::plan::Operation;

pub use copy::CopyResource;
pub use link::LinkResource;
pub use touch::TouchResource;

/// Minimal interface for resources that can be described and applied.
pub trait Applicable {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Apply the resource change.
    ///
    /// This method should:
    /// - Create parent directories if needed
    /// - Replace whatever is at the destination
    /// - Return the appropriate `ResourceChange` result
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be applied due to I/O failures,
    /// permission issues, or a vanished source.
    fn apply(&self) -> Result<ResourceChange>;
}

/// State of a destination relative to what the plan wants there.
///
/// # Examples
///
/// ```
/// use dotter_cli::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let wrong = ResourceState::Incorrect { current: "points to /other".into() };
///
/// assert_ne!(missing, ResourceState::Correct);
/// assert!(matches!(wrong, ResourceState::Incorrect { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Nothing exists at the destination.
    Missing,
    /// The destination already matches.
    Correct,
    /// Something else exists at the destination.
    Incorrect {
        /// What is there now.
        current: String,
    },
    /// The operation cannot be applied (e.g. the source vanished).
    Invalid {
        /// Reason why the resource cannot be applied.
        reason: String,
    },
}

/// Result of applying a resource change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Resource was created or updated.
    Applied,
    /// Resource was already correct (no change needed).
    AlreadyCorrect,
    /// Resource was skipped.
    Skipped {
        /// Reason why the resource was skipped.
        reason: String,
    },
}

/// A resource that can inspect its own destination.
pub trait Resource: Applicable {
    /// Check the current state of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined due to I/O failures.
    fn current_state(&self) -> Result<ResourceState>;

    /// Determine if the resource needs to be changed.
    ///
    /// # Errors
    ///
    /// Propagates errors from `current_state()`.
    fn needs_change(&self) -> Result<bool> {
        Ok(matches!(
            self.current_state()?,
            ResourceState::Missing | ResourceState::Incorrect { .. }
        ))
    }
}

/// The resource that carries out `operation`, or `None` for `rlink`, which
/// is a traversal mode and never placed as a unit.
#[must_use]
pub fn for_operation(operation: &Operation) -> Option<Box<dyn Resource>> {
    let source = operation.source.clone();
    let destination = operation.destination.clone();
    match operation.mode {
        Mode::Copy => Some(Box::new(CopyResource::new(source, destination))),
        Mode::Link => Some(Box::new(LinkResource::new(source, destination))),
        Mode::Touch => Some(Box::new(TouchResource::new(source, destination))),
        Mode::Rlink => None,
    }
}
