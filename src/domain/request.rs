//! Run request type.

/// Upper bound on runs per batch unless the config raises or lowers it.
pub const DEFAULT_MAX_COUNT: u32 = 100;

/// A validated request to run the target `count` times.
///
/// Only obtainable through [`RunRequest::try_new`], so `count` is always
/// at least 1 and never above the bound it was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunRequest {
    count: u32,
}

impl RunRequest {
    /// Build a request if `count` lies in `1..=max`.
    pub fn try_new(count: u32, max: u32) -> Option<Self> {
        (1..=max).contains(&count).then_some(Self { count })
    }

    /// Number of runs requested
    pub fn count(&self) -> u32 {
        self.count
    }
}
