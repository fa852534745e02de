//! Command-line interface definitions.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_CATEGORY;

/// Top-level CLI entry point for the dotfile placement engine.
#[derive(Parser, Debug)]
#[command(
    name = "dotter",
    about = "Place dotfiles from a layered configuration tree",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Output root the destinations are placed under [env: DOTTER_OUTPUT_ROOT]
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Configuration directory holding the categories [env: DOTTER_CONFIG_ROOT]
    #[arg(long = "conf-dir", global = true)]
    pub conf_dir: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Place the topics of a category
    Link(LinkOpts),
    /// Print the plan as JSON
    Query(QueryOpts),
    /// Print the configuration directory
    Root,
    /// Print a reference dot.json
    Config,
    /// Print version information
    Version,
}

impl Command {
    /// Subcommand name, used for the log file name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Link(_) => "link",
            Self::Query(_) => "query",
            Self::Root => "root",
            Self::Config => "config",
            Self::Version => "version",
        }
    }
}

/// Options for the `link` subcommand.
#[derive(Args, Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct LinkOpts {
    /// Category to place
    #[arg(short, long, default_value = DEFAULT_CATEGORY)]
    pub category: String,

    /// Only this topic
    #[arg(short, long)]
    pub topic: Option<String>,

    /// Replace conflicting destinations after confirmation
    #[arg(short, long)]
    pub force: bool,

    /// Preview changes without applying
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Move conflicting destinations to <destination>.backup
    #[arg(short, long)]
    pub backup: bool,
}

/// Options for the `query` subcommand.
#[derive(Args, Debug, Clone)]
pub struct QueryOpts {
    /// What to print.
    #[command(subcommand)]
    pub action: QueryAction,

    /// Only this category (default: every category)
    #[arg(short, long, global = true)]
    pub category: Option<String>,

    /// Only this topic
    #[arg(short, long, global = true)]
    pub topic: Option<String>,
}

/// What `query` prints.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryAction {
    /// Topics per category
    List,
    /// Destinations per topic
    ListTarget,
    /// Sources per topic
    ListSource,
    /// Every operation per topic
    ListAll,
    /// Operations whose destination is not yet in place
    ListDiff,
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_link_defaults() {
        let cli = Cli::parse_from(["dotter", "link"]);
        let Command::Link(opts) = cli.command else {
            panic!("expected link");
        };
        assert_eq!(opts.category, "common");
        assert!(opts.topic.is_none());
        assert!(!opts.force && !opts.dry_run && !opts.backup);
    }

    #[test]
    fn parse_link_short_flags() {
        let cli = Cli::parse_from(["dotter", "link", "-c", "work", "-t", "vim", "-f", "-d", "-b"]);
        let Command::Link(opts) = cli.command else {
            panic!("expected link");
        };
        assert_eq!(opts.category, "work");
        assert_eq!(opts.topic.as_deref(), Some("vim"));
        assert!(opts.force && opts.dry_run && opts.backup);
    }

    #[test]
    fn parse_query_actions() {
        for (arg, action) in [
            ("list", QueryAction::List),
            ("list-target", QueryAction::ListTarget),
            ("list-source", QueryAction::ListSource),
            ("list-all", QueryAction::ListAll),
            ("list-diff", QueryAction::ListDiff),
        ] {
            let cli = Cli::parse_from(["dotter", "query", arg]);
            let Command::Query(opts) = cli.command else {
                panic!("expected query");
            };
            assert_eq!(opts.action, action);
            assert!(opts.category.is_none());
        }
    }

    #[test]
    fn parse_query_category_after_action() {
        let cli = Cli::parse_from(["dotter", "query", "list-all", "-c", "common", "-t", "git"]);
        let Command::Query(opts) = cli.command else {
            panic!("expected query");
        };
        assert_eq!(opts.category.as_deref(), Some("common"));
        assert_eq!(opts.topic.as_deref(), Some("git"));
    }

    #[test]
    fn parse_global_paths() {
        let cli = Cli::parse_from(["dotter", "root", "--conf-dir", "/c", "--root", "/r", "-v"]);
        assert_eq!(cli.global.conf_dir, Some(PathBuf::from("/c")));
        assert_eq!(cli.global.root, Some(PathBuf::from("/r")));
        assert!(cli.verbose);
        assert_eq!(cli.command.name(), "root");
    }

    #[test]
    fn parse_config_and_version() {
        assert!(matches!(
            Cli::parse_from(["dotter", "config"]).command,
            Command::Config
        ));
        assert!(matches!(
            Cli::parse_from(["dotter", "version"]).command,
            Command::Version
        ));
    }
}
