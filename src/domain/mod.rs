//! Domain types for repeatr
//!
//! - RunRequest: a validated number of runs
//! - RunResult: the recorded outcome of one run
//! - RunSummary: counts and success rate derived from a batch of results

pub mod request;
pub mod run_result;
pub mod summary;

pub use request::{DEFAULT_MAX_COUNT, RunRequest};
pub use run_result::{EXCERPT_LINES, RunResult, excerpt};
pub use summary::{RateBand, RunSummary};
