//! CLI argument definitions using clap.

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// Repeatr - run a task program N times in sequence and report its success rate
#[derive(Parser, Debug)]
#[command(name = "repeatr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Number of runs (skips the count prompt)
    #[arg(short = 'n', long)]
    pub count: Option<u32>,

    /// Start without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Task artifact to run
    #[arg(short, long)]
    pub target: Option<PathBuf>,

    /// Program used to launch the target
    #[arg(short, long)]
    pub runtime: Option<String>,

    /// Pause between runs in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Kill a run after this many milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Where failure diagnostics are written
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Overlay flags given on the command line onto the loaded config
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(target) = &self.target {
            config.target = target.clone();
        }
        if let Some(runtime) = &self.runtime {
            config.runtime = runtime.clone();
        }
        if let Some(delay_ms) = self.delay_ms {
            config.delay_ms = delay_ms;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = Some(timeout_ms);
        }
        if let Some(log_file) = &self.log_file {
            config.failure_log = log_file.clone();
        }
    }
}
