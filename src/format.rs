//! Human-readable rendering of checked values.
//!
//! Every value that appears in a result line is rendered through [`Render`]
//! and wrapped in double quotes. Floating-point values use 10 significant
//! digits in the style of a C++ stream with `setprecision(10)`, which is
//! independent of the tolerance used to compare them.

use std::borrow::Cow;
use std::fmt::Display;

/// Number of significant digits used for floating-point output.
pub const SIGNIFICANT_DIGITS: usize = 10;

/// Renders a value as a quoted string for a result line.
pub trait Render {
    /// Quoted representation, e.g. `"1"`, `"true"`, `"abc"`.
    fn render(&self) -> String;
}

/// Wrap anything displayable in double quotes.
pub fn quote(body: impl Display) -> String {
    format!("\"{body}\"")
}

/// Format `value` with `digits` significant digits, `%g`-style.
///
/// Fixed notation is used unless the decimal exponent is below -4 or at
/// least `digits`; trailing zeros (and a trailing point) are dropped.
#[must_use]
pub fn significant(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "nan".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_owned();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_owned();
    }

    let digits = digits.max(1);
    // Rounding to `digits` first fixes the exponent, so 9.99999999999
    // correctly becomes 10 rather than 9.999999999.
    let scientific = format!("{:.*e}", digits - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let max_exponent = i32::try_from(digits).unwrap_or(i32::MAX);

    if exponent < -4 || exponent >= max_exponent {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{sign}{:02}",
            strip_trailing_zeros(mantissa),
            exponent.unsigned_abs()
        )
    } else {
        let precision = usize::try_from(max_exponent - 1 - exponent).unwrap_or(0);
        strip_trailing_zeros(&format!("{value:.precision$}")).to_owned()
    }
}

fn strip_trailing_zeros(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

// ---------------------------------------------------------------------------
// Built-in impls
// ---------------------------------------------------------------------------

macro_rules! render_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Render for $ty {
                fn render(&self) -> String {
                    quote(self)
                }
            }
        )*
    };
}

render_display!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, char, str, String,
);

impl Render for bool {
    fn render(&self) -> String {
        if *self { "\"true\"" } else { "\"false\"" }.to_owned()
    }
}

impl Render for f64 {
    fn render(&self) -> String {
        quote(significant(*self, SIGNIFICANT_DIGITS))
    }
}

impl Render for f32 {
    fn render(&self) -> String {
        quote(significant(f64::from(*self), SIGNIFICANT_DIGITS))
    }
}

impl Render for Box<str> {
    fn render(&self) -> String {
        quote(self)
    }
}

impl Render for Cow<'_, str> {
    fn render(&self) -> String {
        quote(self)
    }
}

impl<T: Render + ?Sized> Render for &T {
    fn render(&self) -> String {
        T::render(*self)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
