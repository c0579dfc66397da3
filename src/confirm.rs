//! Confirmation gate shown before a batch starts.

use crate::domain::RunRequest;
use crate::error::Result;
use crate::style::{Level, paint};
use std::io::{BufRead, Write};

/// The user's answer to the confirmation prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Decline,
}

/// `y` or `yes` in any case. Everything else, empty included, declines.
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// Show what is about to run and read one line of confirmation.
///
/// End of input is treated as a decline.
pub fn confirm<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    request: &RunRequest,
    target: &str,
) -> Result<Decision> {
    writeln!(
        output,
        "{} {} {} of {}",
        paint("About to run", Level::Info),
        request.count(),
        if request.count() == 1 { "time" } else { "times" },
        paint(target, Level::Warning)
    )?;
    write!(output, "Proceed? [y/N] ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        writeln!(output)?;
        return Ok(Decision::Decline);
    }

    if is_affirmative(&line) {
        Ok(Decision::Accept)
    } else {
        Ok(Decision::Decline)
    }
}
