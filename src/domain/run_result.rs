//! Per-run outcome record.
//!
//! One `RunResult` is produced per iteration and appended to the batch in
//! execution order. Results are never modified once built.

use chrono::{DateTime, Local};
use std::time::Duration;

/// Number of diagnostic lines kept in a failure excerpt
pub const EXCERPT_LINES: usize = 3;

/// Outcome of a single run of the target
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    /// 1-based position in the batch
    pub index: u32,
    /// True iff the target exited with status 0
    pub succeeded: bool,
    /// Exit code, when the process exited normally
    pub exit_code: Option<i32>,
    /// First lines of the diagnostic, newlines collapsed to spaces
    pub excerpt: Option<String>,
    /// Full captured diagnostic text (failures only)
    pub diagnostic: Option<String>,
    /// Wall-clock time the run was launched
    pub started_at: DateTime<Local>,
    /// How long the run took
    pub duration: Duration,
}

impl RunResult {
    /// Record a run that exited with status 0
    pub fn success(index: u32, started_at: DateTime<Local>, duration: Duration) -> Self {
        Self {
            index,
            succeeded: true,
            exit_code: Some(0),
            excerpt: None,
            diagnostic: None,
            started_at,
            duration,
        }
    }

    /// Record a failed run along with whatever diagnostic text it produced
    pub fn failure(
        index: u32,
        exit_code: Option<i32>,
        diagnostic: impl Into<String>,
        started_at: DateTime<Local>,
        duration: Duration,
    ) -> Self {
        let diagnostic = diagnostic.into();
        Self {
            index,
            succeeded: false,
            exit_code,
            excerpt: excerpt(&diagnostic),
            diagnostic: Some(diagnostic),
            started_at,
            duration,
        }
    }
}

/// Collapse the first [`EXCERPT_LINES`] lines of `diagnostic` into one line.
///
/// Returns `None` when there is nothing but whitespace to show.
pub fn excerpt(diagnostic: &str) -> Option<String> {
    let collapsed = diagnostic
        .lines()
        .take(EXCERPT_LINES)
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join(" ");
    let collapsed = collapsed.trim();
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.to_string())
    }
}
