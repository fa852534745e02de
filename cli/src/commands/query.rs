//! Command: print the plan as JSON.
use anyhow::Result;
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::Path;

use crate::cli::{GlobalOpts, QueryAction, QueryOpts};
use crate::config::Settings;
use crate::config::modes::Mode;
use crate::plan::{CategoryProcessor, Operation, OperationSet, categories};
use crate::resources::{ResourceState, for_operation};

/// One `list-all` / `list-diff` entry.
#[derive(Debug, Serialize)]
struct Entry<'a> {
    src: &'a Path,
    dst: &'a Path,
    mode: Mode,
}

/// Render `action` for the selected categories and topic.
///
/// Without a category every category is included; a topic then selects the
/// categories that contain it.
///
/// # Errors
///
/// Returns a planning error for an unknown category or topic, or a broken
/// `dot.json`.
pub fn render(
    settings: &Settings,
    action: QueryAction,
    category: Option<&str>,
    topic: Option<&str>,
) -> Result<Value> {
    let names = match category {
        Some(name) => vec![name.to_string()],
        None => categories(&settings.conf_dir)?,
    };

    let mut output = Map::new();
    for name in names {
        let processor = CategoryProcessor::load(settings, &name)?;
        if category.is_none()
            && let Some(wanted) = topic
            && !processor.topics()?.iter().any(|t| t == wanted)
        {
            continue;
        }

        let value = if action == QueryAction::List {
            let topics: Vec<String> = match topic {
                Some(wanted) => {
                    processor.process(Some(wanted))?;
                    vec![wanted.to_string()]
                }
                None => processor.topics()?,
            };
            Value::from(topics)
        } else {
            let plan = processor.process(topic)?;
            let mut topics = Map::new();
            for (topic_name, operations) in &plan {
                topics.insert(topic_name.clone(), render_topic(action, operations)?);
            }
            Value::Object(topics)
        };
        output.insert(name, value);
    }
    Ok(Value::Object(output))
}

fn render_topic(action: QueryAction, operations: &OperationSet) -> Result<Value> {
    let ops: Vec<Operation> = operations.iter().collect();
    let value = match action {
        QueryAction::List => Value::Null,
        QueryAction::ListTarget => serde_json::to_value(
            ops.iter().map(|op| &op.destination).collect::<Vec<_>>(),
        )?,
        QueryAction::ListSource => {
            serde_json::to_value(ops.iter().map(|op| &op.source).collect::<Vec<_>>())?
        }
        QueryAction::ListAll => serde_json::to_value(ops.iter().map(entry).collect::<Vec<_>>())?,
        QueryAction::ListDiff => serde_json::to_value(
            ops.iter()
                .filter(|op| !is_in_place(op))
                .map(entry)
                .collect::<Vec<_>>(),
        )?,
    };
    Ok(value)
}

fn entry(op: &Operation) -> Entry<'_> {
    Entry {
        src: &op.source,
        dst: &op.destination,
        mode: op.mode,
    }
}

fn is_in_place(op: &Operation) -> bool {
    for_operation(op).is_none_or(|resource| {
        matches!(resource.current_state(), Ok(ResourceState::Correct))
    })
}

/// Run the query command, writing pretty JSON to `out`.
///
/// # Errors
///
/// Returns an error if settings or planning fail, or `out` cannot be written.
pub fn run(global: &GlobalOpts, opts: &QueryOpts, out: &mut impl Write) -> Result<()> {
    let settings = super::settings(global)?;
    let value = render(
        &settings,
        opts.action,
        opts.category.as_deref(),
        opts.topic.as_deref(),
    )?;
    serde_json::to_writer_pretty(&mut *out, &value)?;
    writeln!(out)?;
    Ok(())
}
