//! Execution loop: run the task `count` times, one after another.
//!
//! A failed run is recorded and logged, never raised; the loop always moves on
//! to the next iteration. Only the shutdown future (Ctrl-C in the binary) can
//! stop it early.

use crate::domain::{RunRequest, RunResult};
use crate::error::Result;
use crate::failure_log::FailureLog;
use crate::process::{TaskCommand, TaskInvoker};
use crate::report::progress_line;
use chrono::{DateTime, Local};
use log::{info, warn};
use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Default pause between runs
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

/// Results of one batch
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// One entry per completed run, in execution order
    pub results: Vec<RunResult>,
    /// True if the shutdown future fired before every run completed
    pub interrupted: bool,
    pub started_at: DateTime<Local>,
    pub elapsed: Duration,
}

/// Sequential batch runner over any [`TaskInvoker`]
pub struct ExecutionLoop<I: TaskInvoker> {
    invoker: I,
    command: TaskCommand,
    failure_log: PathBuf,
    delay: Duration,
}

impl<I: TaskInvoker> ExecutionLoop<I> {
    pub fn new(invoker: I, command: TaskCommand, failure_log: impl Into<PathBuf>) -> Self {
        Self {
            invoker,
            command,
            failure_log: failure_log.into(),
            delay: DEFAULT_DELAY,
        }
    }

    /// Set the fixed pause between runs
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Run the batch, writing a progress line per run to `progress`.
    ///
    /// The failure log is truncated before the first run. Stops early, with
    /// the in-flight run discarded, if `shutdown` resolves.
    pub async fn run<W, F>(&self, request: &RunRequest, progress: &mut W, shutdown: F) -> Result<BatchOutcome>
    where
        W: Write,
        F: Future<Output = ()>,
    {
        let total = request.count();
        let mut failure_log = FailureLog::create(&self.failure_log)?;
        let mut results = Vec::with_capacity(total as usize);
        let mut interrupted = false;
        let started_at = Local::now();
        let clock = Instant::now();

        info!("Starting batch of {} runs of {}", total, self.command.display());
        tokio::pin!(shutdown);

        for index in 1..=total {
            let run_started_at = Local::now();
            let run_clock = Instant::now();

            // Shutdown is polled first so a pending interrupt never starts another run
            let invocation = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    warn!("Interrupted during run {}", index);
                    interrupted = true;
                    break;
                }
                invocation = self.invoker.invoke(&self.command) => invocation,
            };
            let duration = run_clock.elapsed();

            let result = if invocation.succeeded() {
                RunResult::success(index, run_started_at, duration)
            } else {
                let diagnostic = invocation.diagnostic();
                warn!("Run {} failed: {:?}", index, invocation.outcome);
                if let Err(e) = failure_log.append(index, Local::now(), &diagnostic) {
                    warn!("Failed to write failure log {}: {}", failure_log.path().display(), e);
                }
                RunResult::failure(index, invocation.exit_code(), diagnostic, run_started_at, duration)
            };

            writeln!(progress, "{}", progress_line(&result, total))?;
            progress.flush()?;
            results.push(result);

            if index < total {
                tokio::select! {
                    biased;
                    _ = &mut shutdown => {
                        warn!("Interrupted after run {}", index);
                        interrupted = true;
                        break;
                    }
                    _ = tokio::time::sleep(self.delay) => {}
                }
            }
        }

        let elapsed = clock.elapsed();
        info!(
            "Batch finished: {} of {} runs recorded in {:?}",
            results.len(),
            total,
            elapsed
        );

        Ok(BatchOutcome {
            results,
            interrupted,
            started_at,
            elapsed,
        })
    }
}
