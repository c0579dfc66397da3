//! Run-count validation.
//!
//! `validate_count` is a pure check returning a tagged result; the prompting
//! loop in `prompt_count` owns all the IO and keeps asking until the answer is
//! valid.

use crate::domain::RunRequest;
use crate::error::{RepeatrError, Result};
use crate::style::{Level, paint};
use log::debug;
use std::io::{BufRead, Write};

/// Outcome of checking one raw answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountValidation {
    Valid(RunRequest),
    Invalid(String),
}

/// Check raw user text against the unsigned-integer pattern and `1..=max`.
pub fn validate_count(raw: &str, max: u32) -> CountValidation {
    let text = raw.trim();

    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return CountValidation::Invalid(format!("'{}' is not a whole number", text));
    }

    // Digits only, so the only possible parse error is overflow.
    let count = match text.parse::<u32>() {
        Ok(n) => n,
        Err(_) => return CountValidation::Invalid(out_of_range(max)),
    };

    match RunRequest::try_new(count, max) {
        Some(request) => CountValidation::Valid(request),
        None => CountValidation::Invalid(out_of_range(max)),
    }
}

fn out_of_range(max: u32) -> String {
    format!("count must be between 1 and {}", max)
}

/// Ask for a run count until a valid one is given.
///
/// Returns `InputClosed` if the input ends first.
pub fn prompt_count<R: BufRead, W: Write>(input: &mut R, output: &mut W, max: u32) -> Result<RunRequest> {
    loop {
        write!(output, "How many runs (1-{})? ", max)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Err(RepeatrError::InputClosed);
        }

        match validate_count(&line, max) {
            CountValidation::Valid(request) => {
                debug!("Accepted run count {}", request.count());
                return Ok(request);
            }
            CountValidation::Invalid(reason) => {
                debug!("Rejected run count {:?}: {}", line.trim(), reason);
                writeln!(output, "{}", paint(&format!("Invalid input: {}", reason), Level::Warning))?;
            }
        }
    }
}

/// Validate a count given up front (e.g. `--count`). No re-prompt possible.
pub fn require_count(count: u32, max: u32) -> Result<RunRequest> {
    RunRequest::try_new(count, max).ok_or_else(|| RepeatrError::InvalidCount(out_of_range(max)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn valid(raw: &str) -> Option<u32> {
        match validate_count(raw, 100) {
            CountValidation::Valid(r) => Some(r.count()),
            CountValidation::Invalid(_) => None,
        }
    }

    #[test]
    fn test_accepts_range() {
        assert_eq!(valid("1"), Some(1));
        assert_eq!(valid("42\n"), Some(42));
        assert_eq!(valid(" 100 "), Some(100));
        assert_eq!(valid("007"), Some(7));
    }

    #[test]
    fn test_rejects_non_numeric() {
        for raw in ["", "\n", "abc", "-5", "+5", "3.5", "1e2", "5 runs", "٣"] {
            assert_eq!(valid(raw), None, "accepted {:?}", raw);
        }
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert_eq!(valid("0"), None);
        assert_eq!(valid("101"), None);
        assert_eq!(valid("99999999999999999999"), None);
    }

    #[test]
    fn test_invalid_reason_mentions_bound() {
        match validate_count("500", 100) {
            CountValidation::Invalid(reason) => assert!(reason.contains("between 1 and 100")),
            CountValidation::Valid(_) => panic!("500 should be rejected"),
        }
    }

    #[test]
    fn test_prompt_reprompts_until_valid() {
        let mut input = Cursor::new("abc\n0\n101\n-3\n\n7\n");
        let mut output = Vec::new();
        let request = prompt_count(&mut input, &mut output, 100).unwrap();
        assert_eq!(request.count(), 7);

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.matches("How many runs").count(), 6);
        assert_eq!(text.matches("Invalid input").count(), 5);
    }

    #[test]
    fn test_prompt_input_closed() {
        let mut input = Cursor::new("nope\n");
        let mut output = Vec::new();
        let err = prompt_count(&mut input, &mut output, 100).unwrap_err();
        assert!(matches!(err, RepeatrError::InputClosed));
    }

    #[test]
    fn test_require_count() {
        assert_eq!(require_count(3, 100).unwrap().count(), 3);
        assert!(matches!(require_count(0, 100), Err(RepeatrError::InvalidCount(_))));
        assert!(matches!(require_count(11, 10), Err(RepeatrError::InvalidCount(_))));
    }
}
