// Shared helpers for integration tests.
//
// Provides a pair of temporary directories (configuration tree and output
// root) with a small builder, so each test describes only the files it
// cares about.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use dotter_cli::apply::Prompt;
use dotter_cli::cli::GlobalOpts;
use dotter_cli::config::Settings;

/// An isolated configuration tree and output root, both backed by
/// [`tempfile::TempDir`] and deleted when dropped.
pub struct Fixture {
    /// Configuration directory holding the categories.
    pub conf: tempfile::TempDir,
    /// Output root destinations are placed under.
    pub root: tempfile::TempDir,
}

impl Fixture {
    /// Create empty configuration and root directories.
    pub fn new() -> Self {
        Self {
            conf: tempfile::tempdir().expect("create conf dir"),
            root: tempfile::tempdir().expect("create root dir"),
        }
    }

    /// Write `content` to `relative` under the configuration directory,
    /// creating parent directories.
    pub fn file(self, relative: &str, content: &str) -> Self {
        let path = self.conf.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(&path, content).expect("write conf file");
        self
    }

    /// Create an empty directory under the configuration directory.
    pub fn dir(self, relative: &str) -> Self {
        std::fs::create_dir_all(self.conf.path().join(relative)).expect("create conf dir");
        self
    }

    /// Absolute path under the configuration directory.
    pub fn src(&self, relative: &str) -> PathBuf {
        self.conf.path().join(relative)
    }

    /// Absolute path under the output root.
    pub fn dst(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    /// Settings pointing at this fixture.
    pub fn settings(&self) -> Settings {
        Settings::new(self.conf.path().to_path_buf(), self.root.path().to_path_buf())
            .expect("fixture settings")
    }

    /// Global options pointing at this fixture.
    pub fn global(&self) -> GlobalOpts {
        GlobalOpts {
            root: Some(self.root.path().to_path_buf()),
            conf_dir: Some(self.conf.path().to_path_buf()),
        }
    }

    /// Replace both temporary prefixes in `text` with `<conf>` and `<root>`.
    pub fn normalize(&self, text: &str) -> String {
        text.replace(&path_str(self.conf.path()), "<conf>")
            .replace(&path_str(self.root.path()), "<root>")
    }
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// A [`Prompt`] that always gives the same answer and remembers the
/// questions it was asked.
pub struct FixedPrompt {
    answer: bool,
    pub asked: RefCell<Vec<String>>,
}

impl FixedPrompt {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            asked: RefCell::new(Vec::new()),
        }
    }
}

impl Prompt for FixedPrompt {
    fn confirm(&self, question: &str) -> bool {
        self.asked.borrow_mut().push(question.to_string());
        self.answer
    }
}
