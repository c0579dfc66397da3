//! User-facing batch output: live progress lines, the per-run ledger and the
//! final summary.

use crate::domain::{RunResult, RunSummary};
use crate::style::{Level, band_level, paint};
use chrono::{DateTime, Local};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

/// Ledger time format
const CLOCK_FORMAT: &str = "%H:%M:%S";

/// One line reported as soon as a run finishes.
pub fn progress_line(result: &RunResult, total: u32) -> String {
    let position = format!("[{}/{}]", result.index, total);
    if result.succeeded {
        format!(
            "{} {} ({})",
            position,
            paint(&format!("run {} succeeded", result.index), Level::Success),
            format_duration(result.duration)
        )
    } else {
        let detail = match result.exit_code {
            Some(code) => format!("exit {}, {}", code, format_duration(result.duration)),
            None => format_duration(result.duration),
        };
        format!(
            "{} {} ({})",
            position,
            paint(&format!("run {} failed", result.index), Level::Failure),
            detail
        )
    }
}

/// Seconds with one decimal, e.g. `2.4s`
pub fn format_duration(duration: Duration) -> String {
    format!("{:.1}s", duration.as_secs_f64())
}

/// Batch timing and context shown alongside the summary
#[derive(Debug, Clone)]
pub struct BatchContext<'a> {
    pub started_at: DateTime<Local>,
    pub elapsed: Duration,
    pub failure_log: Option<&'a Path>,
    pub interrupted: bool,
}

/// Write the per-run ledger followed by the summary.
pub fn write_report<W: Write>(out: &mut W, results: &[RunResult], context: &BatchContext<'_>) -> io::Result<()> {
    write_ledger(out, results)?;
    writeln!(out)?;
    write_summary(out, &RunSummary::from_results(results), context)
}

/// Table of every run in execution order.
pub fn write_ledger<W: Write>(out: &mut W, results: &[RunResult]) -> io::Result<()> {
    writeln!(out, "{}", paint("Runs", Level::Info))?;
    writeln!(out, "  {:>5}  {:<8}  {:>5}  {:>8}  {}", "#", "status", "exit", "time", "started")?;
    for result in results {
        let status = if result.succeeded { "ok" } else { "FAILED" };
        let exit = result.exit_code.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string());
        let row = format!(
            "  {:>5}  {:<8}  {:>5}  {:>8}  {}",
            result.index,
            status,
            exit,
            format_duration(result.duration),
            result.started_at.format(CLOCK_FORMAT)
        );
        let level = if result.succeeded { Level::Success } else { Level::Failure };
        writeln!(out, "{}", paint(&row, level))?;
    }
    Ok(())
}

/// Counts, failure excerpts, log location and banded success rate.
pub fn write_summary<W: Write>(out: &mut W, summary: &RunSummary<'_>, context: &BatchContext<'_>) -> io::Result<()> {
    let title = if context.interrupted {
        paint("Summary (interrupted, partial results)", Level::Warning)
    } else {
        paint("Summary", Level::Info)
    };
    writeln!(out, "{}", title)?;
    writeln!(out, "  Started:   {}", context.started_at.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out, "  Elapsed:   {}", format_duration(context.elapsed))?;
    writeln!(out, "  Total:     {}", summary.total)?;
    writeln!(out, "  Succeeded: {}", paint(&summary.success_count.to_string(), Level::Success))?;
    writeln!(out, "  Failed:    {}", paint(&summary.failure_count.to_string(), Level::Failure))?;

    if summary.has_failures() {
        writeln!(out)?;
        writeln!(out, "{}", paint("Failures", Level::Failure))?;
        for failure in &summary.failures {
            let excerpt = failure.excerpt.as_deref().unwrap_or("(no error output)");
            writeln!(out, "  run {}: {}", failure.index, excerpt)?;
        }
        if let Some(path) = context.failure_log {
            writeln!(out, "  Full diagnostics: {}", path.display())?;
        }
    }

    let band = summary.band();
    writeln!(out)?;
    writeln!(
        out,
        "Success rate: {}",
        paint(&format!("{}% ({})", summary.success_rate_percent, band), band_level(band))
    )?;
    Ok(())
}
