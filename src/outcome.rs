//! The result of a single check.

use std::fmt;

use crate::format::Render;
use crate::policy::Equality;

/// Pass/fail result of one check together with its rendered values.
///
/// Lives only for the duration of one [`Aggregator::record`] call.
///
/// [`Aggregator::record`]: crate::aggregator::Aggregator::record
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestOutcome {
    /// Whether the comparison succeeded.
    pub passed: bool,
    /// Quoted rendering of the expected value.
    pub expected: String,
    /// Quoted rendering of the actual value.
    pub actual: String,
    /// Optional caller message, shown on failure.
    pub message: Option<String>,
}

impl TestOutcome {
    /// Compare `actual` against `expected` and render both.
    pub fn evaluate<T>(expected: &T, actual: &T, message: Option<&str>) -> Self
    where
        T: Equality + Render + ?Sized,
    {
        Self {
            passed: T::equals(expected, actual),
            expected: expected.render(),
            actual: actual.render(),
            message: message.map(str::to_owned),
        }
    }
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed {
            return write!(
                f,
                "Test successful! Expected value == actual value (={})",
                self.expected
            );
        }
        write!(
            f,
            "Error in test: expected value {}, but actual value was {}",
            self.expected, self.actual
        )?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_line_shows_expected_value() {
        let outcome = TestOutcome::evaluate(&1, &1, None);
        assert!(outcome.passed);
        assert_eq!(
            outcome.to_string(),
            "Test successful! Expected value == actual value (=\"1\")"
        );
    }

    #[test]
    fn fail_line_shows_both_values() {
        let outcome = TestOutcome::evaluate(&1.0_f64, &1.5, None);
        assert!(!outcome.passed);
        assert_eq!(
            outcome.to_string(),
            "Error in test: expected value \"1\", but actual value was \"1.5\""
        );
    }

    #[test]
    fn fail_line_appends_message() {
        let outcome = TestOutcome::evaluate(&"cde", &"abc", Some("Error message"));
        assert_eq!(
            outcome.to_string(),
            "Error in test: expected value \"cde\", but actual value was \"abc\": Error message"
        );
    }

    #[test]
    fn pass_line_omits_message() {
        let outcome = TestOutcome::evaluate(&1.0_f64, &1.0, Some("one is one"));
        assert!(outcome.passed);
        assert!(!outcome.to_string().contains("one is one"));
    }
}
