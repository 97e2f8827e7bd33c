//! Reporting of soft failures while interpreting git output.
//!
//! Conditions that degrade the result without failing the call (an oversized
//! status buffer, an empty log on exit code 128, an unknown name-status letter) are handed to
//! a [`DiagnosticSink`]. Parsers receive the sink as an argument, so nothing
//! here relies on global state.

use std::sync::Mutex;

/// A soft failure observed while running git or parsing its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The status output exceeded the configured limit and was not parsed.
    OversizedStatus { size: usize, limit: usize },
    /// `git <command>` exited with 128: HEAD has no commits yet or the
    /// requested revision does not resolve. No commits are returned.
    EmptyLog { command: String },
    /// A name-status letter that has no mapping was read as `Modified`.
    UnknownNameStatus { code: String, path: String },
}

/// Receives [`Diagnostic`] events.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::OversizedStatus { size, limit } => {
                tracing::warn!(size, limit, "git status output too large, skipping parse");
            }
            Diagnostic::EmptyLog { command } => {
                tracing::debug!(
                    %command,
                    "git exited with 128 (unborn HEAD or unknown revision), returning no commits"
                );
            }
            Diagnostic::UnknownNameStatus { code, path } => {
                tracing::warn!(%code, %path, "unknown name-status code, treating as modified");
            }
        }
    }
}

/// Keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> MemorySink {
        MemorySink::default()
    }

    /// Returns a copy of the events recorded so far.
    pub fn events(&self) -> Vec<Diagnostic> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DiagnosticSink for MemorySink {
    fn report(&self, diagnostic: Diagnostic) {
        match self.events.lock() {
            Ok(mut events) => events.push(diagnostic),
            Err(poisoned) => poisoned.into_inner().push(diagnostic),
        }
    }
}
