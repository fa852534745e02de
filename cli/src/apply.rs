//! Execution of a planned [`OperationSet`] against the filesystem.
//!
//! Every operation is checked before anything is written. Destinations that
//! already match are left alone, conflicts are resolved according to
//! `--backup` and `--force`, and `--dry-run` only reports.
use std::io::{BufRead as _, Write as _};
use std::ops::AddAssign;

use crate::logging::{Log, TopicStatus};
use crate::plan::{Operation, OperationSet};
use crate::resources::helpers::fs::backup;
use crate::resources::{Resource, ResourceChange, ResourceState, for_operation};

/// Asks the user a yes/no question.
pub trait Prompt {
    /// Return `true` if the user agreed.
    fn confirm(&self, question: &str) -> bool;
}

/// Prompt on stderr, answer read from stdin. Anything but `y`/`yes` is no.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn confirm(&self, question: &str) -> bool {
        let mut stderr = std::io::stderr().lock();
        if write!(stderr, "{question} [y/N] ")
            .and_then(|()| stderr.flush())
            .is_err()
        {
            return false;
        }
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_yes(&answer)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Flags controlling how conflicts are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ApplyOptions {
    /// Report only; never mutate or prompt.
    pub dry_run: bool,
    /// Replace conflicting destinations after confirmation.
    pub force: bool,
    /// Move conflicting destinations to `<destination>.backup` first.
    pub backup: bool,
}

/// What happened to one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Placed (or would be, under dry-run).
    Changed,
    /// Destination already matched.
    AlreadyOk,
    /// Left alone: conflict without resolution, declined, or invalid.
    Skipped,
    /// An error occurred.
    Failed,
}

/// Outcome counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyStats {
    /// Operations placed (or that would be).
    pub changed: usize,
    /// Operations already in place.
    pub already_ok: usize,
    /// Operations left alone.
    pub skipped: usize,
    /// Operations that failed.
    pub failed: usize,
}

impl ApplyStats {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Changed => self.changed += 1,
            Outcome::AlreadyOk => self.already_ok += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed => self.failed += 1,
        }
    }

    /// Total operations seen.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.changed + self.already_ok + self.skipped + self.failed
    }

    /// One-line description, e.g. `2 changed, 5 ok, 1 skipped`.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![
            format!("{} changed", self.changed),
            format!("{} ok", self.already_ok),
        ];
        if self.skipped > 0 {
            parts.push(format!("{} skipped", self.skipped));
        }
        if self.failed > 0 {
            parts.push(format!("{} failed", self.failed));
        }
        parts.join(", ")
    }
}

impl AddAssign for ApplyStats {
    fn add_assign(&mut self, other: Self) {
        self.changed += other.changed;
        self.already_ok += other.already_ok;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Applies operations one by one, in plan order.
pub struct Applier<'a> {
    options: ApplyOptions,
    prompt: &'a dyn Prompt,
    log: &'a dyn Log,
}

impl std::fmt::Debug for Applier<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Applier")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<'a> Applier<'a> {
    /// Create an applier.
    #[must_use]
    pub const fn new(options: ApplyOptions, prompt: &'a dyn Prompt, log: &'a dyn Log) -> Self {
        Self {
            options,
            prompt,
            log,
        }
    }

    /// Apply every operation of one topic and record the topic in the summary.
    pub fn apply_topic(&self, name: &str, operations: &OperationSet) -> ApplyStats {
        let stats = self.apply_set(operations);
        let status = if stats.failed > 0 {
            TopicStatus::Failed
        } else if self.options.dry_run {
            TopicStatus::DryRun
        } else if stats.skipped > 0 {
            TopicStatus::Skipped
        } else {
            TopicStatus::Ok
        };
        self.log.record_topic(name, status, Some(&stats.summary()));
        stats
    }

    /// Apply every operation in `operations`.
    pub fn apply_set(&self, operations: &OperationSet) -> ApplyStats {
        let mut stats = ApplyStats::default();
        for operation in operations.iter() {
            stats.record(self.apply(&operation));
        }
        stats
    }

    /// Apply one operation.
    pub fn apply(&self, operation: &Operation) -> Outcome {
        let Some(resource) = for_operation(operation) else {
            self.log.debug(&format!(
                "not placing rlink directory {}",
                operation.source.display()
            ));
            return Outcome::Skipped;
        };
        let description = resource.description();
        let state = match resource.current_state() {
            Ok(state) => state,
            Err(e) => {
                self.log.error(&format!("{description}: {e:#}"));
                return Outcome::Failed;
            }
        };
        match state {
            ResourceState::Correct => {
                self.log.debug(&format!("ok: {description}"));
                Outcome::AlreadyOk
            }
            ResourceState::Invalid { reason } => {
                self.log.warn(&format!("skipping {description}: {reason}"));
                Outcome::Skipped
            }
            ResourceState::Missing => {
                if self.options.dry_run {
                    self.log
                        .dry_run(&format!("would {} {description}", operation.mode));
                    return Outcome::Changed;
                }
                self.run(operation, resource.as_ref())
            }
            ResourceState::Incorrect { current } => {
                self.resolve_conflict(operation, resource.as_ref(), &current)
            }
        }
    }

    fn resolve_conflict(
        &self,
        operation: &Operation,
        resource: &dyn Resource,
        current: &str,
    ) -> Outcome {
        let destination = operation.destination.display();
        if self.options.backup {
            if self.options.dry_run {
                self.log.dry_run(&format!(
                    "would back up {destination} ({current}) and {} {}",
                    operation.mode,
                    resource.description()
                ));
                return Outcome::Changed;
            }
            match backup(&operation.destination) {
                Ok(moved) => self
                    .log
                    .info(&format!("backed up {destination} to {}", moved.display())),
                Err(e) => {
                    self.log.error(&format!("backup of {destination}: {e:#}"));
                    return Outcome::Failed;
                }
            }
            return self.run(operation, resource);
        }
        if self.options.force {
            if self.options.dry_run {
                self.log.dry_run(&format!(
                    "would ask to replace {destination} ({current})"
                ));
                return Outcome::Changed;
            }
            let question = format!(
                "Replace {destination} with {}?",
                operation.source.display()
            );
            if !self.prompt.confirm(&question) {
                self.log.info(&format!("kept {destination}"));
                return Outcome::Skipped;
            }
            return self.run(operation, resource);
        }
        self.log.warn(&format!(
            "skipping {destination}: {current} (use --force or --backup)"
        ));
        Outcome::Skipped
    }

    fn run(&self, operation: &Operation, resource: &dyn Resource) -> Outcome {
        match resource.apply() {
            Ok(ResourceChange::Applied) => {
                self.log
                    .info(&format!("{} {}", operation.mode, resource.description()));
                Outcome::Changed
            }
            Ok(ResourceChange::AlreadyCorrect) => Outcome::AlreadyOk,
            Ok(ResourceChange::Skipped { reason }) => {
                self.log
                    .warn(&format!("skipping {}: {reason}", resource.description()));
                Outcome::Skipped
            }
            Err(e) => {
                self.log
                    .error(&format!("{}: {e:#}", resource.description()));
                Outcome::Failed
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::modes::Mode;
    use std::cell::Cell;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryLog {
        lines: Mutex<Vec<String>>,
        topics: Mutex<Vec<(String, TopicStatus)>>,
    }

    impl MemoryLog {
        fn push(&self, level: &str, msg: &str) {
            self.lines.lock().unwrap().push(format!("{level} {msg}"));
        }

        fn contains(&self, needle: &str) -> bool {
            self.lines.lock().unwrap().iter().any(|l| l.contains(needle))
        }
    }

    impl Log for MemoryLog {
        fn stage(&self, msg: &str) {
            self.push("stage", msg);
        }
        fn info(&self, msg: &str) {
            self.push("info", msg);
        }
        fn debug(&self, msg: &str) {
            self.push("debug", msg);
        }
        fn warn(&self, msg: &str) {
            self.push("warn", msg);
        }
        fn error(&self, msg: &str) {
            self.push("error", msg);
        }
        fn dry_run(&self, msg: &str) {
            self.push("dry_run", msg);
        }
        fn record_topic(&self, name: &str, status: TopicStatus, _message: Option<&str>) {
            self.topics.lock().unwrap().push((name.to_string(), status));
        }
    }

    struct FixedPrompt {
        answer: bool,
        asked: Cell<usize>,
    }

    impl FixedPrompt {
        const fn new(answer: bool) -> Self {
            Self {
                answer,
                asked: Cell::new(0),
            }
        }
    }

    impl Prompt for FixedPrompt {
        fn confirm(&self, _question: &str) -> bool {
            self.asked.set(self.asked.get() + 1);
            self.answer
        }
    }

    struct Fixture {
        dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            std::fs::create_dir_all(dir.path().join("conf")).unwrap();
            std::fs::create_dir_all(dir.path().join("home")).unwrap();
            std::fs::write(dir.path().join("conf/bashrc"), "source").unwrap();
            Self { dir }
        }

        fn source(&self) -> PathBuf {
            self.dir.path().join("conf/bashrc")
        }

        fn destination(&self) -> PathBuf {
            self.dir.path().join("home/.bashrc")
        }

        fn op(&self, mode: Mode) -> Operation {
            Operation::new(mode, self.source(), self.destination())
        }
    }

    fn options(dry_run: bool, force: bool, backup: bool) -> ApplyOptions {
        ApplyOptions {
            dry_run,
            force,
            backup,
        }
    }

    fn is_link_to(path: &Path, target: &Path) -> bool {
        std::fs::read_link(path).is_ok_and(|t| t == target)
    }

    #[test]
    fn missing_destination_is_placed_then_ok() {
        let fx = Fixture::new();
        let log = MemoryLog::default();
        let prompt = FixedPrompt::new(false);
        let applier = Applier::new(ApplyOptions::default(), &prompt, &log);

        assert_eq!(applier.apply(&fx.op(Mode::Link)), Outcome::Changed);
        assert!(is_link_to(&fx.destination(), &fx.source()));
        assert_eq!(applier.apply(&fx.op(Mode::Link)), Outcome::AlreadyOk);
    }

    #[test]
    fn dry_run_never_mutates() {
        let fx = Fixture::new();
        std::fs::write(fx.destination(), "local").unwrap();
        let log = MemoryLog::default();
        let prompt = FixedPrompt::new(true);
        let applier = Applier::new(options(true, true, false), &prompt, &log);

        assert_eq!(applier.apply(&fx.op(Mode::Copy)), Outcome::Changed);
        assert_eq!(std::fs::read_to_string(fx.destination()).unwrap(), "local");
        assert_eq!(prompt.asked.get(), 0);
        assert!(log.contains("dry_run would ask to replace"));
    }

    #[test]
    fn conflict_without_flags_is_skipped() {
        let fx = Fixture::new();
        std::fs::write(fx.destination(), "local").unwrap();
        let log = MemoryLog::default();
        let prompt = FixedPrompt::new(true);
        let applier = Applier::new(ApplyOptions::default(), &prompt, &log);

        assert_eq!(applier.apply(&fx.op(Mode::Link)), Outcome::Skipped);
        assert_eq!(std::fs::read_to_string(fx.destination()).unwrap(), "local");
        assert!(log.contains("use --force or --backup"));
    }

    #[test]
    fn backup_moves_destination_aside() {
        let fx = Fixture::new();
        std::fs::write(fx.destination(), "local").unwrap();
        let log = MemoryLog::default();
        let prompt = FixedPrompt::new(false);
        let applier = Applier::new(options(false, false, true), &prompt, &log);

        assert_eq!(applier.apply(&fx.op(Mode::Link)), Outcome::Changed);
        assert!(is_link_to(&fx.destination(), &fx.source()));
        let backup = fx.dir.path().join("home/.bashrc.backup");
        assert_eq!(std::fs::read_to_string(backup).unwrap(), "local");
        assert_eq!(prompt.asked.get(), 0);
    }

    #[test]
    fn force_asks_and_respects_answer() {
        let fx = Fixture::new();
        std::fs::write(fx.destination(), "local").unwrap();
        let log = MemoryLog::default();

        let no = FixedPrompt::new(false);
        let applier = Applier::new(options(false, true, false), &no, &log);
        assert_eq!(applier.apply(&fx.op(Mode::Copy)), Outcome::Skipped);
        assert_eq!(no.asked.get(), 1);
        assert_eq!(std::fs::read_to_string(fx.destination()).unwrap(), "local");

        let yes = FixedPrompt::new(true);
        let applier = Applier::new(options(false, true, false), &yes, &log);
        assert_eq!(applier.apply(&fx.op(Mode::Copy)), Outcome::Changed);
        assert_eq!(std::fs::read_to_string(fx.destination()).unwrap(), "source");
    }

    #[test]
    fn touch_leaves_existing_destination() {
        let fx = Fixture::new();
        std::fs::write(fx.destination(), "local").unwrap();
        let log = MemoryLog::default();
        let prompt = FixedPrompt::new(true);
        let applier = Applier::new(options(false, true, true), &prompt, &log);
        assert_eq!(applier.apply(&fx.op(Mode::Touch)), Outcome::AlreadyOk);
        assert_eq!(std::fs::read_to_string(fx.destination()).unwrap(), "local");
    }

    #[test]
    fn vanished_source_and_rlink_are_skipped() {
        let fx = Fixture::new();
        let log = MemoryLog::default();
        let prompt = FixedPrompt::new(true);
        let applier = Applier::new(ApplyOptions::default(), &prompt, &log);

        let gone = Operation::new(
            Mode::Link,
            fx.dir.path().join("conf/gone"),
            fx.destination(),
        );
        assert_eq!(applier.apply(&gone), Outcome::Skipped);
        assert_eq!(applier.apply(&fx.op(Mode::Rlink)), Outcome::Skipped);
        assert!(!fx.destination().exists());
    }

    #[test]
    fn apply_topic_records_status_and_stats() {
        let fx = Fixture::new();
        let log = MemoryLog::default();
        let prompt = FixedPrompt::new(false);
        let mut ops = OperationSet::default();
        ops.insert(Mode::Link, fx.source(), fx.destination());
        ops.insert(
            Mode::Copy,
            fx.source(),
            fx.dir.path().join("home/.bashrc.copy"),
        );

        let applier = Applier::new(ApplyOptions::default(), &prompt, &log);
        let stats = applier.apply_topic("common/bash", &ops);
        assert_eq!(stats.changed, 2);
        assert_eq!(stats.total(), 2);

        let mut total = stats;
        total += applier.apply_topic("common/bash", &ops);
        assert_eq!(total.already_ok, 2);
        assert_eq!(total.summary(), "2 changed, 2 ok");

        let topics = log.topics.lock().unwrap();
        assert_eq!(topics.len(), 2);
        assert!(topics.iter().all(|(_, s)| *s == TopicStatus::Ok));
    }

    #[test]
    fn yes_answers() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("nope"));
    }
}
