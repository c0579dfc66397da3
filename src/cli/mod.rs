//! CLI module for repeatr - command-line interface.
//!
//! With no flags the whole flow is interactive; every flag only pre-answers a
//! prompt or overrides a config value.

pub mod args;

pub use args::Cli;
