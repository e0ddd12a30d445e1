//! Per-entry outcomes of multi-entry operations
//!
//! A single bad entry never aborts an import. Whatever happened to it is
//! reported here instead, and the operation moves on.

use std::fmt;
use std::io::Write;

/// What happened to one entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Added,
    Duplicate,
    Warning,
    Error,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Added => "added",
            OutcomeKind::Duplicate => "skip",
            OutcomeKind::Warning => "warn",
            OutcomeKind::Error => "error",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reported outcome for one entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub kind: OutcomeKind,
    /// Short identifying prefix (id prefix or file path)
    pub subject: String,
    pub message: String,
}

impl Outcome {
    pub fn new(kind: OutcomeKind, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Outcome {
            kind,
            subject: subject.into(),
            message: message.into(),
        }
    }

    pub fn added(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::Added, subject, message)
    }

    pub fn duplicate(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::Duplicate, subject, message)
    }

    pub fn warning(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::Warning, subject, message)
    }

    pub fn error(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::Error, subject, message)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]\t{}\t{}", self.kind, self.subject, self.message)
    }
}

/// Receiver of per-entry outcomes
pub trait OutcomeSink {
    fn report(&mut self, outcome: Outcome);
}

/// Collects outcomes in memory
impl OutcomeSink for Vec<Outcome> {
    fn report(&mut self, outcome: Outcome) {
        self.push(outcome);
    }
}

impl<S: OutcomeSink + ?Sized> OutcomeSink for &mut S {
    fn report(&mut self, outcome: Outcome) {
        (**self).report(outcome);
    }
}

/// Writes one tab-separated line per outcome
pub struct LineSink<W: Write> {
    writer: W,
}

impl<W: Write> LineSink<W> {
    pub fn new(writer: W) -> Self {
        LineSink { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutcomeSink for LineSink<W> {
    fn report(&mut self, outcome: Outcome) {
        // Status lines are best effort; the outcome is also traced
        if let Err(e) = writeln!(self.writer, "{}", outcome) {
            tracing::warn!(error = %e, "failed to write status line");
        }
    }
}
