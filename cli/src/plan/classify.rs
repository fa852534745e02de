//! Mode and destination of a single entry.
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::resolver::Resolver;
use crate::config::effective::EffectiveConfig;
use crate::config::modes::{CopyMode, DotMode, Mode};
use crate::error::{ConfigError, PlanError};

/// The outcome of classifying one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Operation mode.
    pub mode: Mode,
    /// Absolute source path.
    pub source: PathBuf,
    /// Absolute destination path.
    pub destination: PathBuf,
}

/// Topic-scoped placement rules: where a topic's entries land.
///
/// `copy-mode` and `dot-mode` describe how the topic as a whole is placed,
/// so they are fixed from the topic's configuration; `dir-mode` comes from
/// each entry's own configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    topic: String,
    topic_dir: PathBuf,
    root: PathBuf,
    copy_mode: CopyMode,
    dot_mode: DotMode,
}

impl Placement {
    /// Placement for `topic` given its effective configuration.
    #[must_use]
    pub fn new(topic: &str, topic_config: &EffectiveConfig) -> Self {
        Self {
            topic: topic.to_string(),
            topic_dir: topic_config.category_path.join(topic),
            root: topic_config.root_path.clone(),
            copy_mode: topic_config.copy_mode,
            dot_mode: topic_config.dot_mode,
        }
    }

    /// Destination of `source`, which must lie under the topic directory.
    ///
    /// # Examples
    ///
    /// ```
    /// use dotter_cli::config::effective::EffectiveConfig;
    /// use dotter_cli::config::fragment::Fragment;
    /// use dotter_cli::plan::Placement;
    /// use std::path::Path;
    ///
    /// let fragment = Fragment::defaults()
    ///     .merge(&Fragment::reserved(Path::new("/home/u"), Path::new("/conf/common")));
    /// let config = EffectiveConfig::from_fragment(fragment).unwrap();
    /// let placement = Placement::new("bash", &config);
    /// assert_eq!(
    ///     placement.destination(Path::new("/conf/common/bash/.bashrc")),
    ///     Path::new("/home/u/.bashrc"),
    /// );
    /// ```
    #[must_use]
    pub fn destination(&self, source: &Path) -> PathBuf {
        let relative = source.strip_prefix(&self.topic_dir).unwrap_or(source);

        let mut components: Vec<OsString> = Vec::new();
        if self.copy_mode == CopyMode::Id {
            components.push(OsString::from(&self.topic));
        }
        components.extend(relative.iter().map(ToOwned::to_owned));

        if self.dot_mode == DotMode::TopLevel
            && let Some(first) = components.first_mut()
            && !first.as_encoded_bytes().starts_with(b".")
        {
            let mut dotted = OsString::from(".");
            dotted.push(&*first);
            *first = dotted;
        }

        let mut destination = self.root.clone();
        destination.extend(components);
        destination
    }

    /// Mode of `source` given the mode its configuration asks for.
    ///
    /// Files under `rlink` get individual links. A topic directory whose
    /// contents are hoisted is never placed itself, so it descends.
    #[must_use]
    pub fn mode(&self, source: &Path, configured: Mode, is_dir: bool) -> Mode {
        match (is_dir, configured) {
            (true, _) if source == self.topic_dir && self.copy_mode == CopyMode::Root => Mode::Rlink,
            (true, mode) => mode,
            (false, Mode::Rlink) => Mode::Link,
            (false, mode) => mode,
        }
    }

    /// Classify `source`.
    ///
    /// `config` is the entry's own configuration for directories and the
    /// containing directory's for files.
    #[must_use]
    pub fn classify(&self, source: &Path, config: &EffectiveConfig, is_dir: bool) -> Classification {
        Classification {
            mode: self.mode(source, config.dir_mode, is_dir),
            source: source.to_path_buf(),
            destination: self.destination(source),
        }
    }
}

/// Classify an arbitrary entry of the category, resolving configuration
/// from the category root.
///
/// # Errors
///
/// Returns [`PlanError::Io`] if the entry cannot be inspected, or a
/// configuration error if it lies outside every topic or an override on its
/// path is broken.
pub fn classify(resolver: &Resolver, entry: &Path) -> Result<Classification, PlanError> {
    let metadata = std::fs::symlink_metadata(entry).map_err(|source| PlanError::Io {
        path: entry.to_path_buf(),
        source,
    })?;
    let is_dir = metadata.is_dir();

    let outside = || ConfigError::OutsideCategory {
        path: entry.to_path_buf(),
        category: resolver.category_dir().to_path_buf(),
    };
    let relative = entry
        .strip_prefix(resolver.category_dir())
        .map_err(|_| outside())?;
    let topic = relative
        .iter()
        .next()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(outside)?;
    let topic_dir = resolver.topic_dir(&topic);
    if !topic_dir.is_dir() {
        return Err(outside().into());
    }

    let placement = Placement::new(&topic, &resolver.resolve(&topic_dir)?);
    let config_dir = if is_dir {
        entry
    } else {
        entry.parent().ok_or_else(outside)?
    };
    let config = resolver.resolve(config_dir)?;
    Ok(placement.classify(entry, &config, is_dir))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::fragment::Fragment;
    use std::fs;

    fn config(text: &str) -> EffectiveConfig {
        let fragment = Fragment::defaults()
            .merge(&Fragment::reserved(Path::new("/home/u"), Path::new("/conf/common")))
            .merge(&Fragment::parse(text, Path::new("dot.json")).unwrap());
        EffectiveConfig::from_fragment(fragment).unwrap()
    }

    #[test]
    fn dot_mode_top_level_prefixes_topic_name() {
        let c = config(r#"{"copy-mode": "id", "dot-mode": "top_level"}"#);
        let p = Placement::new("vimrc", &c);
        assert_eq!(p.destination(Path::new("/conf/common/vimrc")), Path::new("/home/u/.vimrc"));
        assert_eq!(
            p.destination(Path::new("/conf/common/vimrc/colors/x.vim")),
            Path::new("/home/u/.vimrc/colors/x.vim")
        );
    }

    #[test]
    fn dot_mode_no_dot_keeps_name() {
        let c = config(r#"{"copy-mode": "id", "dot-mode": "no_dot"}"#);
        let p = Placement::new("vimrc", &c);
        assert_eq!(p.destination(Path::new("/conf/common/vimrc")), Path::new("/home/u/vimrc"));
    }

    #[test]
    fn dot_is_not_doubled() {
        let c = config(r#"{"dot-mode": "top_level"}"#);
        let p = Placement::new("bash", &c);
        assert_eq!(
            p.destination(Path::new("/conf/common/bash/.bashrc")),
            Path::new("/home/u/.bashrc")
        );
        assert_eq!(
            p.destination(Path::new("/conf/common/bash/profile")),
            Path::new("/home/u/.profile")
        );
    }

    #[test]
    fn copy_mode_root_collapses_topic_dir() {
        let c = config(r#"{"copy-mode": "root", "dir-mode": "rlink"}"#);
        let p = Placement::new("bash", &c);
        assert_eq!(
            p.destination(Path::new("/conf/common/bash/.bashrc")),
            Path::new("/home/u/.bashrc")
        );
        assert_eq!(p.destination(Path::new("/conf/common/bash")), Path::new("/home/u"));
    }

    #[test]
    fn files_under_rlink_are_linked() {
        let c = config(r#"{"dir-mode": "rlink"}"#);
        let p = Placement::new("git", &c);
        let file = p.classify(Path::new("/conf/common/git/.gitconfig"), &c, false);
        assert_eq!(file.mode, Mode::Link);
        let dir = p.classify(Path::new("/conf/common/git/hooks"), &c, true);
        assert_eq!(dir.mode, Mode::Rlink);
    }

    #[test]
    fn hoisted_topic_root_always_descends() {
        let c = config(r#"{"copy-mode": "root", "dir-mode": "copy"}"#);
        let p = Placement::new("bin", &c);
        assert_eq!(p.mode(Path::new("/conf/common/bin"), Mode::Copy, true), Mode::Rlink);
        assert_eq!(p.mode(Path::new("/conf/common/bin/tool"), Mode::Copy, false), Mode::Copy);
    }

    #[test]
    fn id_topic_root_takes_configured_mode() {
        let c = config(r#"{"copy-mode": "id", "dir-mode": "copy"}"#);
        let p = Placement::new("vim", &c);
        let root = p.classify(Path::new("/conf/common/vim"), &c, true);
        assert_eq!(root.mode, Mode::Copy);
        assert_eq!(root.destination, Path::new("/home/u/vim"));
    }

    #[test]
    fn classify_resolves_from_disk() {
        let conf = tempfile::tempdir().unwrap();
        let category = conf.path().join("common");
        fs::create_dir_all(category.join("vim/colors")).unwrap();
        fs::write(category.join("vim/colors/dark.vim"), "").unwrap();
        fs::write(
            category.join("vim/dot.json"),
            r#"{"copy-mode": "id", "dot-mode": "top_level"}"#,
        )
        .unwrap();
        fs::write(category.join("vim/colors/dot.json"), r#"{"dir-mode": "touch"}"#).unwrap();

        let fragment = Fragment::defaults().merge(&Fragment::reserved(Path::new("/home/u"), &category));
        let resolver = Resolver::new(EffectiveConfig::from_fragment(fragment).unwrap());

        let c = classify(&resolver, &category.join("vim/colors/dark.vim")).unwrap();
        assert_eq!(c.mode, Mode::Touch);
        assert_eq!(c.destination, Path::new("/home/u/.vim/colors/dark.vim"));

        let err = classify(&resolver, &category.join("vim/missing")).unwrap_err();
        assert!(matches!(err, PlanError::Io { .. }));
    }
}
