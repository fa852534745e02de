//! Top-level subcommand orchestration.
pub mod config;
pub mod link;
pub mod query;
pub mod root;
pub mod version;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::config::Settings;

/// Resolve the configuration directory and output root for a command.
///
/// # Errors
///
/// Returns an error if either directory does not exist.
pub fn settings(global: &GlobalOpts) -> Result<Settings> {
    Ok(Settings::resolve(
        global.conf_dir.as_deref(),
        global.root.as_deref(),
    )?)
}
