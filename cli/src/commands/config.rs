//! Command: print a reference `dot.json`.
use anyhow::Result;
use serde_json::{Value, json};
use std::io::Write;

/// A documented sample category configuration.
///
/// Every key is valid input: option documentation lives under the
/// pass-through `reference` key and each `dirconf` entry carries a
/// `comment`.
#[must_use]
pub fn reference() -> Value {
    json!({
        "reference": {
            "copy-mode": {
                "id": "the topic directory itself ends up in the root.",
                "root": "the contents of the topic directory end up in the root.",
            },
            "dir-mode": {
                "copy": "the entity is copied.",
                "link": "the entity is linked as is.",
                "rlink": "the entity is linked recursively, each file gets its own link.",
                "touch": "the entity is copied only if the destination does not exist.",
            },
            "dot-mode": {
                "no_dot": "names are kept as they are.",
                "top_level": "a dot is prepended to the topmost level only.",
            },
        },
        "copy-mode": "root",
        "dir-mode": "rlink",
        "dot-mode": "no_dot",
        "dirconf": {
            "dirname0": {
                "comment": "by default the contents are linked recursively, without a dot",
            },
            "dirname1": {
                "comment": "the directory is linked as a whole, with a dot prepended",
                "copy-mode": "id",
                "dir-mode": "link",
                "dot-mode": "top_level",
            },
            "dirname2": {
                "comment": "the directory is copied, without a dot prepended",
                "copy-mode": "id",
                "dir-mode": "copy",
            },
            "dirname3": {
                "comment": "files are created once and then left alone",
                "dir-mode": "touch",
            },
        },
        "ignore": [".DS_Store", "__pycache__/*", "*.swp"],
    })
}

/// Print the reference configuration as pretty JSON.
///
/// # Errors
///
/// Returns an error if `out` cannot be written.
pub fn run(out: &mut impl Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, &reference())?;
    writeln!(out)?;
    Ok(())
}
