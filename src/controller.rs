//! The whole run-loop flow: preflight, count, confirmation, batch, report.

use crate::config::Config;
use crate::confirm::{Decision, confirm};
use crate::domain::{RunRequest, RunSummary};
use crate::error::{RepeatrError, Result};
use crate::preflight::{check_target, resolve_runtime};
use crate::process::{OutputSink, ProcessInvoker, TaskCommand, TaskInvoker};
use crate::report::{BatchContext, write_report};
use crate::runner::ExecutionLoop;
use crate::validation::{prompt_count, require_count};
use log::info;
use std::future::Future;
use std::io::{BufRead, Write};

/// Exit code after an interrupted batch (128 + SIGINT)
pub const EXIT_INTERRUPTED: i32 = 130;

/// How a batch that reached the report ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Every requested run finished
    Finished { failures: u32 },
    /// Stopped early by the shutdown signal
    Interrupted,
}

impl Completion {
    /// Process exit code. Failed runs only affect it under `strict_exit`.
    pub fn exit_code(&self, strict_exit: bool) -> i32 {
        match self {
            Completion::Interrupted => EXIT_INTERRUPTED,
            Completion::Finished { failures } if strict_exit && *failures > 0 => 1,
            Completion::Finished { .. } => 0,
        }
    }
}

/// Answers supplied up front instead of interactively
#[derive(Debug, Clone, Copy, Default)]
pub struct Preanswers {
    pub count: Option<u32>,
    pub assume_yes: bool,
}

/// Drives one invocation from preflight to summary
pub struct Controller {
    config: Config,
    preanswers: Preanswers,
}

impl Controller {
    pub fn new(config: Config, preanswers: Preanswers) -> Self {
        Self { config, preanswers }
    }

    /// Run with the real process invoker: stdout streamed, stderr captured.
    pub async fn run<R, W, F>(&self, input: &mut R, output: &mut W, shutdown: F) -> Result<Completion>
    where
        R: BufRead,
        W: Write,
        F: Future<Output = ()>,
    {
        let invoker = ProcessInvoker::new()
            .stdout(OutputSink::Inherit)
            .stderr(OutputSink::Capture)
            .timeout(self.config.timeout());
        self.run_with(invoker, input, output, shutdown).await
    }

    /// Run with any invoker. Fatal errors return before the target is invoked.
    pub async fn run_with<I, R, W, F>(&self, invoker: I, input: &mut R, output: &mut W, shutdown: F) -> Result<Completion>
    where
        I: TaskInvoker,
        R: BufRead,
        W: Write,
        F: Future<Output = ()>,
    {
        let command = self.preflight()?;
        let request = self.resolve_count(input, output)?;

        if !self.preanswers.assume_yes && confirm(input, output, &request, &command.display())? == Decision::Decline {
            info!("User declined batch of {}", request.count());
            return Err(RepeatrError::Declined);
        }

        let batch = ExecutionLoop::new(invoker, command, &self.config.failure_log).delay(self.config.delay());
        let outcome = batch.run(&request, output, shutdown).await?;

        let summary = RunSummary::from_results(&outcome.results);
        let context = BatchContext {
            started_at: outcome.started_at,
            elapsed: outcome.elapsed,
            failure_log: Some(&self.config.failure_log),
            interrupted: outcome.interrupted,
        };
        writeln!(output)?;
        write_report(output, &outcome.results, &context)?;
        output.flush()?;

        info!(
            "Reported {} runs: {} succeeded, {} failed ({}%)",
            summary.total, summary.success_count, summary.failure_count, summary.success_rate_percent
        );

        if outcome.interrupted {
            Ok(Completion::Interrupted)
        } else {
            Ok(Completion::Finished {
                failures: summary.failure_count,
            })
        }
    }

    fn preflight(&self) -> Result<TaskCommand> {
        let runtime = resolve_runtime(&self.config.runtime)?;
        check_target(&self.config.target)?;
        Ok(TaskCommand::new(runtime).arg(&self.config.target))
    }

    fn resolve_count<R: BufRead, W: Write>(&self, input: &mut R, output: &mut W) -> Result<RunRequest> {
        match self.preanswers.count {
            Some(count) => require_count(count, self.config.max_count),
            None => prompt_count(input, output, self.config.max_count),
        }
    }
}
