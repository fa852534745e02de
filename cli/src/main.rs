//! `dotter` binary: parse arguments, install logging and dispatch a command.

use anyhow::Result;
use clap::Parser;

use dotter_cli::apply::StdinPrompt;
use dotter_cli::cli::{Cli, Command};
use dotter_cli::commands;
use dotter_cli::logging::{Logger, init_subscriber};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    let name = args.command.name();
    init_subscriber(args.verbose, name);
    let log = Logger::new(name);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match &args.command {
        Command::Link(opts) => commands::link::run(&args.global, opts, &StdinPrompt, &log),
        Command::Query(opts) => commands::query::run(&args.global, opts, &mut out),
        Command::Root => commands::root::run(&args.global, &mut out),
        Command::Config => commands::config::run(&mut out),
        Command::Version => commands::version::run(&mut out),
    }
}
