//! Configuration: tool settings and the layered `dot.json` schema.
//!
//! - [`Settings`]: where the configuration tree and the output root live
//! - [`fragment`]: one `dot.json` layer and the [`ConfigStack`](fragment::ConfigStack)
//! - [`effective`]: a fully merged layer with defaults applied
//! - [`ignore`]: glob matching for the `ignore` option
pub mod effective;
pub mod fragment;
pub mod ignore;
pub mod modes;

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Name of the configuration fragment at category and directory level.
pub const CONF_FILE_NAME: &str = "dot.json";

/// Environment variable overriding the configuration directory.
pub const CONFIG_ROOT_ENV: &str = "DOTTER_CONFIG_ROOT";

/// Environment variable overriding the output root.
pub const OUTPUT_ROOT_ENV: &str = "DOTTER_OUTPUT_ROOT";

/// Category used when none is given on the command line.
pub const DEFAULT_CATEGORY: &str = "common";

/// Upper bound on repeated variable expansion of a single path.
const MAX_EXPANSIONS: usize = 8;

/// Resolved locations for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory holding the categories (`<conf_dir>/<category>/<topic>`).
    pub conf_dir: PathBuf,
    /// Directory the destinations are placed under.
    pub root_dir: PathBuf,
}

impl Settings {
    /// Resolve settings from optional command-line overrides.
    ///
    /// Missing overrides fall back to [`default_conf_dir`] and
    /// [`default_root_dir`]. Both values are expanded (`~`, `$VAR`,
    /// `${VAR}`) and must name existing directories.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DirNotFound`] if either directory is missing.
    pub fn resolve(conf_dir: Option<&Path>, root_dir: Option<&Path>) -> Result<Self, ConfigError> {
        let conf_dir = conf_dir.map_or_else(default_conf_dir, expand_path_buf);
        let root_dir = root_dir.map_or_else(default_root_dir, expand_path_buf);
        Self::new(conf_dir, root_dir)
    }

    /// Build settings from already-expanded paths.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DirNotFound`] if either directory is missing.
    pub fn new(conf_dir: PathBuf, root_dir: PathBuf) -> Result<Self, ConfigError> {
        if !conf_dir.is_dir() {
            return Err(ConfigError::DirNotFound {
                kind: "Configuration dir",
                path: conf_dir,
            });
        }
        if !root_dir.is_dir() {
            return Err(ConfigError::DirNotFound {
                kind: "Root dir",
                path: root_dir,
            });
        }
        Ok(Self { conf_dir, root_dir })
    }

    /// Directory of `category` under the configuration directory.
    #[must_use]
    pub fn category_dir(&self, category: &str) -> PathBuf {
        self.conf_dir.join(category)
    }
}

/// Default configuration directory: `$DOTTER_CONFIG_ROOT`, else
/// `$HOME/.config/dotter`.
#[must_use]
pub fn default_conf_dir() -> PathBuf {
    std::env::var(CONFIG_ROOT_ENV).map_or_else(
        |_| expand_path("${HOME}/.config/dotter"),
        |raw| expand_path(&raw),
    )
}

/// Default output root: `$DOTTER_OUTPUT_ROOT`, else `$HOME`.
#[must_use]
pub fn default_root_dir() -> PathBuf {
    std::env::var(OUTPUT_ROOT_ENV).map_or_else(|_| expand_path("${HOME}"), |raw| expand_path(&raw))
}

/// Expand `~` and environment variables in `raw` until nothing changes.
#[must_use]
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(expand_with(raw, &|name| std::env::var(name).ok()))
}

fn expand_path_buf(path: &Path) -> PathBuf {
    expand_path(&path.to_string_lossy())
}

/// Expand with an explicit variable lookup; unknown variables are kept
/// verbatim.
fn expand_with(raw: &str, lookup: &dyn Fn(&str) -> Option<String>) -> String {
    let mut current = raw.to_string();
    for _ in 0..MAX_EXPANSIONS {
        let next = expand_once(&current, lookup);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn expand_once(raw: &str, lookup: &dyn Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    if let Some(tail) = raw.strip_prefix('~')
        && (tail.is_empty() || tail.starts_with('/'))
        && let Some(home) = lookup("HOME")
    {
        out.push_str(&home);
        rest = tail;
    }

    while let Some(pos) = rest.find('$') {
        let (head, tail) = rest.split_at(pos);
        out.push_str(head);
        let tail = tail.get(1..).unwrap_or_default();
        match variable_name(tail).and_then(|(name, len)| lookup(name).map(|v| (v, len))) {
            Some((value, len)) => {
                out.push_str(&value);
                rest = tail.get(len..).unwrap_or_default();
            }
            None => {
                out.push('$');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Parse the variable name following a `$`; returns the name and the number
/// of bytes it occupies (braces included).
fn variable_name(s: &str) -> Option<(&str, usize)> {
    if let Some(braced) = s.strip_prefix('{') {
        let end = braced.find('}')?;
        let name = braced.get(..end)?;
        return (!name.is_empty()).then_some((name, end + 2));
    }
    let end = s
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(s.len());
    let name = s.get(..end)?;
    (!name.is_empty()).then_some((name, end))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "HOME" => Some("/home/user".to_string()),
            "XDG" => Some("$HOME/.config".to_string()),
            _ => None,
        }
    }

    #[test]
    fn expands_tilde_prefix() {
        assert_eq!(expand_with("~/dots", &lookup), "/home/user/dots");
        assert_eq!(expand_with("~", &lookup), "/home/user");
    }

    #[test]
    fn tilde_inside_name_is_literal() {
        assert_eq!(expand_with("~other/dots", &lookup), "~other/dots");
        assert_eq!(expand_with("/a/~b", &lookup), "/a/~b");
    }

    #[test]
    fn expands_plain_and_braced_variables() {
        assert_eq!(expand_with("$HOME/x", &lookup), "/home/user/x");
        assert_eq!(expand_with("${HOME}x", &lookup), "/home/userx");
    }

    #[test]
    fn expands_until_fixpoint() {
        assert_eq!(expand_with("${XDG}/dotter", &lookup), "/home/user/.config/dotter");
    }

    #[test]
    fn unknown_variables_are_kept() {
        assert_eq!(expand_with("$NOPE/a", &lookup), "$NOPE/a");
        assert_eq!(expand_with("${NOPE}", &lookup), "${NOPE}");
        assert_eq!(expand_with("cost$", &lookup), "cost$");
        assert_eq!(expand_with("${unclosed", &lookup), "${unclosed");
    }

    #[test]
    fn settings_reject_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");

        let err = Settings::new(missing.clone(), dir.path().to_path_buf()).unwrap_err();
        assert!(matches!(err, ConfigError::DirNotFound { kind: "Configuration dir", .. }));

        let err = Settings::new(dir.path().to_path_buf(), missing).unwrap_err();
        assert!(matches!(err, ConfigError::DirNotFound { kind: "Root dir", .. }));
    }

    #[test]
    fn settings_resolve_explicit_paths() {
        let conf = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let settings = Settings::resolve(Some(conf.path()), Some(root.path())).unwrap();
        assert_eq!(settings.conf_dir, conf.path());
        assert_eq!(settings.category_dir("common"), conf.path().join("common"));
    }
}
