//! Equality policy used by every check.
//!
//! Most types compare with their own `==`. `f64` and `f32` compare within an
//! absolute [`TOLERANCE`], and `bool` compares by identity.

use std::borrow::Cow;

/// Maximum absolute difference (exclusive) for floating-point equality.
///
/// Some older documentation quotes `1e-8`; the implemented value is `1e-4`.
pub const TOLERANCE: f64 = 1e-4;

/// Decides whether an actual value matches the expected one.
pub trait Equality {
    /// `true` if `actual` counts as equal to `expected`.
    fn equals(expected: &Self, actual: &Self) -> bool;
}

/// `true` iff `|actual - expected| < TOLERANCE`, or the values are identical.
///
/// Identical infinities compare equal; NaN never does.
#[must_use]
pub fn within_tolerance(expected: f64, actual: f64) -> bool {
    #[allow(clippy::float_cmp)]
    let identical = expected == actual;
    identical || (actual - expected).abs() < TOLERANCE
}

macro_rules! exact_equality {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Equality for $ty {
                fn equals(expected: &Self, actual: &Self) -> bool {
                    expected == actual
                }
            }
        )*
    };
}

exact_equality!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, char, str, String, bool,
);

impl Equality for f64 {
    fn equals(expected: &Self, actual: &Self) -> bool {
        within_tolerance(*expected, *actual)
    }
}

impl Equality for f32 {
    fn equals(expected: &Self, actual: &Self) -> bool {
        #[allow(clippy::float_cmp)]
        let identical = expected == actual;
        // The difference is taken in single precision, then widened.
        identical || f64::from((actual - expected).abs()) < TOLERANCE
    }
}

impl Equality for Box<str> {
    fn equals(expected: &Self, actual: &Self) -> bool {
        expected == actual
    }
}

impl Equality for Cow<'_, str> {
    fn equals(expected: &Self, actual: &Self) -> bool {
        expected == actual
    }
}

impl<T: Equality + ?Sized> Equality for &T {
    fn equals(expected: &Self, actual: &Self) -> bool {
        T::equals(*expected, *actual)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
