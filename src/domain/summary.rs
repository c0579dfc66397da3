//! Batch summary derived from the ordered run results.

use super::RunResult;

/// Qualitative band for a success rate. The thresholds are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateBand {
    /// Every run succeeded
    Perfect,
    /// At least 80% but not all
    Good,
    /// Below 80%
    NeedsAttention,
}

impl RateBand {
    /// Lowest rate that still counts as good
    pub const GOOD_THRESHOLD: u32 = 80;

    /// Band for a percentage
    pub fn from_percent(percent: u32) -> Self {
        if percent >= 100 {
            RateBand::Perfect
        } else if percent >= Self::GOOD_THRESHOLD {
            RateBand::Good
        } else {
            RateBand::NeedsAttention
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RateBand::Perfect => "perfect",
            RateBand::Good => "good",
            RateBand::NeedsAttention => "needs attention",
        }
    }
}

impl std::fmt::Display for RateBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Aggregate view over a batch. Borrowed, never stored.
#[derive(Debug, Clone)]
pub struct RunSummary<'a> {
    pub total: u32,
    pub success_count: u32,
    pub failure_count: u32,
    /// floor(success_count * 100 / total)
    pub success_rate_percent: u32,
    /// Failed runs in execution order
    pub failures: Vec<&'a RunResult>,
}

impl<'a> RunSummary<'a> {
    pub fn from_results(results: &'a [RunResult]) -> Self {
        let failures: Vec<&RunResult> = results.iter().filter(|r| !r.succeeded).collect();
        let total = results.len() as u32;
        let failure_count = failures.len() as u32;
        let success_count = total - failure_count;
        let success_rate_percent = if total == 0 {
            0
        } else {
            success_count * 100 / total
        };

        Self {
            total,
            success_count,
            failure_count,
            success_rate_percent,
            failures,
        }
    }

    pub fn band(&self) -> RateBand {
        RateBand::from_percent(self.success_rate_percent)
    }

    pub fn has_failures(&self) -> bool {
        self.failure_count > 0
    }
}
