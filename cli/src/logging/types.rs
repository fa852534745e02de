//! Core logging types: topic entries, status, and the [`Log`] trait.

/// Per-topic result for summary reporting.
#[derive(Debug, Clone)]
pub struct TopicEntry {
    /// `category/topic`.
    pub name: String,
    /// Final status of the topic.
    pub status: TopicStatus,
    /// Optional detail message (e.g. operation counts or error description).
    pub message: Option<String>,
}

/// Status of a processed topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicStatus {
    /// Every operation is in place.
    Ok,
    /// Some operations were skipped (conflicts or vanished sources).
    Skipped,
    /// Topic was planned in dry-run mode; nothing was changed.
    DryRun,
    /// At least one operation failed.
    Failed,
}

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) is the console and file backend;
/// tests substitute an in-memory implementation to assert on messages.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record a topic result for the summary.
    fn record_topic(&self, name: &str, status: TopicStatus, message: Option<&str>);
}
