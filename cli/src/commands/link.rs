//! Command: plan a category and place its topics.
use anyhow::Result;

use crate::apply::{Applier, ApplyOptions, ApplyStats, Prompt};
use crate::cli::{GlobalOpts, LinkOpts};
use crate::logging::Logger;
use crate::plan::{CategoryProcessor, OperationSet};

/// Run the link command.
///
/// The whole category is planned before anything is written, so an unknown
/// topic or a broken `dot.json` aborts without side effects.
///
/// # Errors
///
/// Returns an error if settings or planning fail, or if any topic recorded
/// a failed operation.
pub fn run(global: &GlobalOpts, opts: &LinkOpts, prompt: &dyn Prompt, log: &Logger) -> Result<()> {
    let settings = super::settings(global)?;
    log.debug(&format!("conf dir: {}", settings.conf_dir.display()));
    log.debug(&format!("root dir: {}", settings.root_dir.display()));

    log.stage(&format!("Planning {}", opts.category));
    let processor = CategoryProcessor::load(&settings, &opts.category)?;
    let plan = processor.process(opts.topic.as_deref())?;
    log.info(&format!(
        "{} topic(s), {} operation(s)",
        plan.len(),
        plan.values().map(OperationSet::len).sum::<usize>()
    ));

    let options = ApplyOptions {
        dry_run: opts.dry_run,
        force: opts.force,
        backup: opts.backup,
    };
    let applier = Applier::new(options, prompt, log);
    let mut total = ApplyStats::default();
    for (topic, operations) in &plan {
        let name = format!("{}/{topic}", processor.name());
        log.stage(&name);
        total += applier.apply_topic(&name, operations);
    }
    log.debug(&format!("totals: {}", total.summary()));

    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} topic(s) failed");
    }
    Ok(())
}
