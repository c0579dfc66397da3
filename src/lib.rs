//! Repeatr - run a task program a fixed number of times and report how often
//! it succeeded.
//!
//! The controller validates a run count, asks for confirmation, runs the task
//! strictly sequentially while capturing its stderr, writes a failure log and
//! prints a summary with the success rate.

pub mod cli;
pub mod config;
pub mod confirm;
pub mod controller;
pub mod domain;
pub mod error;
pub mod failure_log;
pub mod preflight;
pub mod process;
pub mod report;
pub mod runner;
pub mod style;
pub mod validation;

pub use error::{RepeatrError, Result};
