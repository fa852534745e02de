//! Dotfile placement engine.
//!
//! A configuration directory holds categories, each category holds topics,
//! and every file or directory in a topic is placed under an output root by
//! copying, linking, recursive linking or touching. Which mode applies, and
//! where the destination lands, is decided by `dot.json` files layered from
//! built-in defaults down to the directory being placed.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: settings, `dot.json` fragments and their layering
//! - **[`plan`]**: walk a category and produce per-topic operations
//! - **[`resources`]**: idempotent `check + apply` primitives (copy, link, touch)
//! - **[`apply`]**: drive resources for a plan, with dry-run and conflict handling
//! - **[`commands`]**: top-level subcommand orchestration (`link`, `query`, …)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod apply;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod plan;
pub mod resources;
