//! Closed option values recognised in `dot.json` fragments.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operation applied to a matched entity (`dir-mode`).
///
/// # Examples
///
/// ```
/// use dotter_cli::config::modes::Mode;
///
/// let mode: Mode = serde_json::from_str("\"rlink\"").unwrap();
/// assert_eq!(mode, Mode::Rlink);
/// assert!(!mode.claims_subtree());
/// assert!(Mode::Link.claims_subtree());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Full copy of the entity.
    Copy,
    /// One symlink for the whole entity.
    Link,
    /// Every file below the entity gets its own symlink.
    Rlink,
    /// Copy only when the destination does not exist yet.
    Touch,
}

impl Mode {
    /// All modes in output order.
    pub const ALL: [Self; 4] = [Self::Copy, Self::Link, Self::Rlink, Self::Touch];

    /// Name used in configuration and in plan output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::Link => "link",
            Self::Rlink => "rlink",
            Self::Touch => "touch",
        }
    }

    /// Whether an entity in this mode is handled as one unit, making its
    /// descendants redundant.
    #[must_use]
    pub const fn claims_subtree(self) -> bool {
        !matches!(self, Self::Rlink)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Placement of the topic directory (`copy-mode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyMode {
    /// The topic directory itself lands under the output root.
    Id,
    /// The topic's contents are hoisted directly under the output root.
    Root,
}

/// Dot prefixing of destination names (`dot-mode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DotMode {
    /// Never prepend a dot.
    #[serde(rename = "no_dot")]
    NoDot,
    /// Prepend a dot to the first component below the output root.
    #[serde(rename = "top_level")]
    TopLevel,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn mode_round_trips_through_names() {
        for mode in Mode::ALL {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{}\"", mode.as_str()));
        }
    }

    #[test]
    fn only_rlink_descends() {
        let claiming: Vec<Mode> = Mode::ALL
            .into_iter()
            .filter(|m| m.claims_subtree())
            .collect();
        assert_eq!(claiming, vec![Mode::Copy, Mode::Link, Mode::Touch]);
    }

    #[test]
    fn dot_mode_uses_snake_case_names() {
        let top: DotMode = serde_json::from_str("\"top_level\"").unwrap();
        let none: DotMode = serde_json::from_str("\"no_dot\"").unwrap();
        assert_eq!(top, DotMode::TopLevel);
        assert_eq!(none, DotMode::NoDot);
    }

    #[test]
    fn unknown_copy_mode_is_rejected() {
        assert!(serde_json::from_str::<CopyMode>("\"sideways\"").is_err());
    }
}
