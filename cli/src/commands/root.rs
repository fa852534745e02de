//! Command: print the configuration directory.
use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;

use crate::cli::GlobalOpts;
use crate::config::{default_conf_dir, expand_path};

/// Best guess for the configuration directory; it need not exist.
#[must_use]
pub fn conf_dir(global: &GlobalOpts) -> PathBuf {
    global.conf_dir.as_ref().map_or_else(default_conf_dir, |dir| {
        expand_path(&dir.to_string_lossy())
    })
}

/// Print the configuration directory.
///
/// # Errors
///
/// Returns an error if `out` cannot be written.
pub fn run(global: &GlobalOpts, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}", conf_dir(global).display())?;
    Ok(())
}
