//! Process invocation for the task program.
//!
//! The task's stdout and stderr are routed independently: each can pass
//! through to the controller's own stream, be captured, or be discarded.
//! Captured streams go to an anonymous temporary file that the OS removes as
//! soon as the last handle is dropped, so nothing is left behind on any path.
//!
//! On unix the task runs in its own process group. A timeout or an abandoned
//! run kills the whole group, so processes the task forked die with it.

use async_trait::async_trait;
use log::{debug, warn};
use std::ffi::OsString;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// Where one output stream of the child goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSink {
    /// Pass through to the controller's stream
    Inherit,
    /// Collect into a scoped buffer returned with the invocation
    Capture,
    /// Discard
    Null,
}

/// The program to run and its fixed arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl TaskCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append an argument
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Human-readable form for prompts and logs
    pub fn display(&self) -> String {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.args.iter().map(|a| a.to_string_lossy().into_owned()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How the child process ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Exited normally with this code
    Exited(i32),
    /// Killed by a signal (description from the OS)
    Signaled(String),
    /// The process could not be started
    LaunchFailed(String),
    /// Killed after exceeding the per-run timeout
    TimedOut(Duration),
}

/// Everything observed from one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub outcome: ExitOutcome,
    /// Captured stdout, empty unless the stdout sink was `Capture`
    pub stdout: String,
    /// Captured stderr, empty unless the stderr sink was `Capture`
    pub stderr: String,
}

impl Invocation {
    pub fn launch_failed(message: impl Into<String>) -> Self {
        Self {
            outcome: ExitOutcome::LaunchFailed(message.into()),
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    /// True iff the process exited with status 0
    pub fn succeeded(&self) -> bool {
        self.outcome == ExitOutcome::Exited(0)
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self.outcome {
            ExitOutcome::Exited(code) => Some(code),
            _ => None,
        }
    }

    /// Full diagnostic text for a failed invocation
    pub fn diagnostic(&self) -> String {
        match &self.outcome {
            ExitOutcome::Exited(_) => self.stderr.clone(),
            ExitOutcome::LaunchFailed(message) => format!("failed to launch: {}", message),
            ExitOutcome::Signaled(description) => with_notice(&self.stderr, &format!("[terminated by {}]", description)),
            ExitOutcome::TimedOut(limit) => {
                with_notice(&self.stderr, &format!("[timed out after {}ms]", limit.as_millis()))
            }
        }
    }
}

fn with_notice(stderr: &str, notice: &str) -> String {
    if stderr.trim().is_empty() {
        notice.to_string()
    } else {
        format!("{}\n{}", stderr.trim_end(), notice)
    }
}

/// Runs a task command once. Never fails: every problem is an `ExitOutcome`.
#[async_trait]
pub trait TaskInvoker: Send + Sync {
    async fn invoke(&self, command: &TaskCommand) -> Invocation;
}

/// Invoker backed by real child processes
#[derive(Debug, Clone)]
pub struct ProcessInvoker {
    stdout: OutputSink,
    stderr: OutputSink,
    timeout: Option<Duration>,
}

impl Default for ProcessInvoker {
    /// Stream stdout live, capture stderr, no timeout
    fn default() -> Self {
        Self {
            stdout: OutputSink::Inherit,
            stderr: OutputSink::Capture,
            timeout: None,
        }
    }
}

impl ProcessInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stdout(mut self, sink: OutputSink) -> Self {
        self.stdout = sink;
        self
    }

    pub fn stderr(mut self, sink: OutputSink) -> Self {
        self.stderr = sink;
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run(&self, command: &TaskCommand) -> std::io::Result<Invocation> {
        let (stdout_stdio, stdout_buf) = prepare(self.stdout)?;
        let (stderr_stdio, stderr_buf) = prepare(self.stderr)?;

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(stdout_stdio)
            .stderr(stderr_stdio)
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => return Ok(Invocation::launch_failed(e.to_string())),
        };
        debug!("Spawned {} (pid {:?})", command.display(), child.id());
        let mut group = GroupKill::new(child.id());

        let outcome = match self.timeout {
            Some(limit) => {
                let waited = tokio::time::timeout(limit, child.wait()).await;
                match waited {
                    Ok(status) => classify(status?),
                    Err(_) => {
                        warn!("{} exceeded {}ms, killing it", command.display(), limit.as_millis());
                        group.kill_now();
                        child.kill().await?;
                        ExitOutcome::TimedOut(limit)
                    }
                }
            }
            None => classify(child.wait().await?),
        };
        group.disarm();

        Ok(Invocation {
            outcome,
            stdout: drain(stdout_buf)?,
            stderr: drain(stderr_buf)?,
        })
    }
}

#[async_trait]
impl TaskInvoker for ProcessInvoker {
    async fn invoke(&self, command: &TaskCommand) -> Invocation {
        match self.run(command).await {
            Ok(invocation) => invocation,
            Err(e) => Invocation::launch_failed(e.to_string()),
        }
    }
}

/// Kills the child's process group when dropped while armed.
///
/// Covers a run future dropped mid-flight (interrupt); `kill_on_drop` alone
/// only reaches the direct child.
struct GroupKill {
    pgid: Option<u32>,
}

impl GroupKill {
    fn new(pid: Option<u32>) -> Self {
        Self { pgid: pid }
    }

    fn kill_now(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            kill_group(pgid);
        }
    }

    /// The task exited on its own; leave any background processes alone
    fn disarm(&mut self) {
        self.pgid = None;
    }
}

impl Drop for GroupKill {
    fn drop(&mut self) {
        self.kill_now();
    }
}

#[cfg(unix)]
fn kill_group(pgid: u32) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    if let Err(e) = killpg(Pid::from_raw(pgid as i32), Signal::SIGKILL) {
        debug!("killpg({}) failed: {}", pgid, e);
    }
}

#[cfg(not(unix))]
fn kill_group(_pgid: u32) {}

fn prepare(sink: OutputSink) -> std::io::Result<(Stdio, Option<File>)> {
    match sink {
        OutputSink::Inherit => Ok((Stdio::inherit(), None)),
        OutputSink::Null => Ok((Stdio::null(), None)),
        OutputSink::Capture => {
            let buffer = tempfile::tempfile()?;
            let handle = buffer.try_clone()?;
            Ok((Stdio::from(handle), Some(buffer)))
        }
    }
}

fn drain(buffer: Option<File>) -> std::io::Result<String> {
    let Some(mut file) = buffer else {
        return Ok(String::new());
    };
    file.seek(SeekFrom::Start(0))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn classify(status: ExitStatus) -> ExitOutcome {
    match status.code() {
        Some(code) => ExitOutcome::Exited(code),
        None => ExitOutcome::Signaled(status.to_string()),
    }
}
