//! The `check` entry points.
//!
//! `check(actual, expected)` converts `expected` into the type of `actual`
//! through [`Into`], which std only implements for lossless conversions. An
//! integer literal can be checked against an `f64` (`i32 → f64`) and a `&str`
//! against a `String`, but an `f64` expected value against an `i32` actual
//! does not compile:
//!
//! ```compile_fail
//! tally::check(1_i32, 1.5_f64);
//! ```
//!
//! Every entry point returns whether the check passed. Failures never panic
//! or return an error; they are printed and counted.

use std::panic::{self, AssertUnwindSafe};

use crate::aggregator::{self, Aggregator};
use crate::error::TallyError;
use crate::format::Render;
use crate::outcome::TestOutcome;
use crate::policy::Equality;

/// A value that can take part in a check: it has an equality policy and a
/// rendering.
pub trait Checkable: Equality + Render {}

impl<T: Equality + Render + ?Sized> Checkable for T {}

impl Aggregator {
    /// Check that `actual` equals `expected` (after widening `expected`).
    pub fn check<A, E>(&self, actual: A, expected: E) -> bool
    where
        A: Checkable,
        E: Into<A>,
    {
        self.check_outcome(TestOutcome::evaluate(&expected.into(), &actual, None))
    }

    /// Like [`check`](Self::check), with `message` appended to a failure line.
    pub fn check_with<A, E>(&self, actual: A, expected: E, message: &str) -> bool
    where
        A: Checkable,
        E: Into<A>,
    {
        self.check_outcome(TestOutcome::evaluate(
            &expected.into(),
            &actual,
            Some(message),
        ))
    }

    /// Check that `value` is `true`.
    pub fn check_true(&self, value: bool) -> bool {
        self.check(value, true)
    }

    /// Check that `body` panics. The panic is contained.
    pub fn check_panics<F: FnOnce()>(&self, body: F) -> bool {
        let panicked = panic::catch_unwind(AssertUnwindSafe(body)).is_err();
        self.check_with(panicked, true, "expected a panic")
    }

    /// Check that `body` returns without panicking. A panic is contained.
    pub fn check_no_panic<F: FnOnce()>(&self, body: F) -> bool {
        let panicked = panic::catch_unwind(AssertUnwindSafe(body)).is_err();
        self.check_with(panicked, false, "unexpected panic")
    }

    pub(crate) fn check_outcome(&self, outcome: TestOutcome) -> bool {
        match self.record(&outcome) {
            Ok(()) => {}
            Err(TallyError::Finalized) => {
                tracing::warn!(line = %outcome, "check ignored: summary already printed");
            }
            Err(err) => tracing::error!(%err, "failed to report check"),
        }
        outcome.passed
    }
}

/// Check that `actual` equals `expected` on the global aggregator.
pub fn check<A, E>(actual: A, expected: E) -> bool
where
    A: Checkable,
    E: Into<A>,
{
    aggregator::global().check(actual, expected)
}

/// Check with a message appended to the failure line.
pub fn check_with<A, E>(actual: A, expected: E, message: &str) -> bool
where
    A: Checkable,
    E: Into<A>,
{
    aggregator::global().check_with(actual, expected, message)
}

/// Check that `value` is `true`. Same as `check(value, true)`.
pub fn check_true(value: bool) -> bool {
    aggregator::global().check_true(value)
}

/// Check that `body` panics.
pub fn check_panics<F: FnOnce()>(body: F) -> bool {
    aggregator::global().check_panics(body)
}

/// Check that `body` does not panic.
pub fn check_no_panic<F: FnOnce()>(body: F) -> bool {
    aggregator::global().check_no_panic(body)
}

// ---------------------------------------------------------------------------
// Macros
// ---------------------------------------------------------------------------

/// Record a check on the global aggregator.
///
/// - `check!(value)` checks a `bool` is `true`.
/// - `check!(actual, expected)` checks equality.
/// - `check!(actual, expected, "fmt", args..)` appends a message on failure.
/// - `check!(actual, expected, message)` does the same with a `&str` or
///   `String` value.
///
/// Evaluates to `true` if the check passed.
#[macro_export]
macro_rules! check {
    ($value:expr $(,)?) => {
        $crate::check_true($value)
    };
    ($actual:expr, $expected:expr $(,)?) => {
        $crate::check($actual, $expected)
    };
    ($actual:expr, $expected:expr, $fmt:literal $($args:tt)*) => {
        $crate::check_with($actual, $expected, &::std::format!($fmt $($args)*))
    };
    ($actual:expr, $expected:expr, $message:expr $(,)?) => {
        $crate::check_with($actual, $expected, &$message)
    };
}

/// Make a type checkable through its `PartialEq` and `Display` impls.
///
/// ```
/// use std::fmt;
///
/// #[derive(PartialEq)]
/// struct Point(i32, i32);
///
/// impl fmt::Display for Point {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "({}, {})", self.0, self.1)
///     }
/// }
///
/// tally::checkable!(Point);
/// assert!(tally::check(Point(1, 2), Point(1, 2)));
/// ```
#[macro_export]
macro_rules! checkable {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::policy::Equality for $ty {
                fn equals(expected: &Self, actual: &Self) -> bool {
                    expected == actual
                }
            }

            impl $crate::format::Render for $ty {
                fn render(&self) -> ::std::string::String {
                    $crate::format::quote(self)
                }
            }
        )+
    };
}

/// Make a fieldless enum checkable; it renders as its underlying value.
///
/// ```
/// #[derive(Clone, Copy, PartialEq)]
/// #[repr(u8)]
/// enum Color { Red = 1, Green = 2 }
///
/// tally::checkable_enum!(Color as u8);
/// assert!(!tally::check(Color::Red, Color::Green));
/// ```
#[macro_export]
macro_rules! checkable_enum {
    ($($ty:ty as $repr:ty),+ $(,)?) => {
        $(
            impl $crate::policy::Equality for $ty {
                fn equals(expected: &Self, actual: &Self) -> bool {
                    expected == actual
                }
            }

            impl $crate::format::Render for $ty {
                fn render(&self) -> ::std::string::String {
                    $crate::format::quote(*self as $repr)
                }
            }
        )+
    };
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
