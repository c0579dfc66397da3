//! Terminal styling for user-facing output.
//!
//! Pure functions from (message, level) to styled text. Whether colour is
//! emitted at all is decided by `colored` (NO_COLOR, tty detection) or by
//! [`disable_color`].

use colored::{ColoredString, Colorize};

/// How a message should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Failure,
    /// Precondition errors that end the invocation
    Fatal,
}

/// Style `message` for `level`.
pub fn paint(message: &str, level: Level) -> ColoredString {
    match level {
        Level::Info => message.cyan(),
        Level::Success => message.green(),
        Level::Warning => message.yellow(),
        Level::Failure => message.red(),
        Level::Fatal => message.red().bold(),
    }
}

/// Level used for a success-rate band
pub fn band_level(band: crate::domain::RateBand) -> Level {
    use crate::domain::RateBand;
    match band {
        RateBand::Perfect => Level::Success,
        RateBand::Good => Level::Warning,
        RateBand::NeedsAttention => Level::Failure,
    }
}

/// Turn colour off for the rest of the process.
pub fn disable_color() {
    colored::control::set_override(false);
}
