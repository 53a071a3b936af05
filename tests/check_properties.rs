//! Behavioural properties of single checks: equality policy, tolerance
//! boundary, rendering in result lines, and counter bookkeeping.

mod common;

use proptest::prelude::*;

use common::isolated;
use tally::Summary;

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn equal_ints_pass_and_render_plainly() {
    let (agg, out) = isolated();
    assert!(agg.check(1, 1));
    assert!(out.contents().contains("(=\"1\")"));
}

#[test]
fn double_against_int_outside_tolerance_fails() {
    let (agg, out) = isolated();
    assert!(!agg.check(1.5, 1));
    assert!(
        out.contents()
            .contains("expected value \"1\", but actual value was \"1.5\"")
    );
}

#[test]
fn string_mismatch_carries_message() {
    let (agg, out) = isolated();
    assert!(!agg.check_with("abc", "cde", "Error message"));
    let line = out.lines().pop().unwrap();
    assert!(line.starts_with("Error in test:"));
    assert!(line.ends_with("Error message"));
}

#[test]
fn text_equals_itself() {
    let (agg, _out) = isolated();
    assert!(agg.check("abc", "abc"));
}

#[test]
fn int_literal_widens_against_double() {
    let (agg, out) = isolated();
    assert!(agg.check(1.0, 1));
    assert!(out.contents().contains("(=\"1\")"));
}

#[test]
fn boolean_sugar_matches_explicit_form() {
    let (sugar, sugar_out) = isolated();
    let (explicit, explicit_out) = isolated();

    assert_eq!(sugar.check_true(true), explicit.check(true, true));
    assert_eq!(sugar.check_true(false), explicit.check(false, true));
    assert_eq!(sugar.snapshot(), explicit.snapshot());
    assert_eq!(sugar_out.contents(), explicit_out.contents());
}

#[test]
fn tolerance_boundary() {
    let (agg, _out) = isolated();
    assert!(!agg.check(1e-4, 0.0), "difference of exactly 1e-4 must fail");
    assert!(agg.check(9.9e-5, 0.0));
    assert!(!agg.check(0.0, 1e-4));
    assert!(agg.check(-9.9e-5, 0.0));
    assert_eq!(agg.snapshot(), Summary { total: 4, failed: 2 });
}

#[test]
fn floats_print_with_ten_significant_digits() {
    let (agg, out) = isolated();
    agg.check(std::f64::consts::E, 0);
    assert!(out.contents().contains("\"2.718281828\""), "{}", out.contents());
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn prop_ints_are_reflexive(x in any::<i64>()) {
        let (agg, _out) = isolated();
        prop_assert!(agg.check(x, x));
    }

    #[test]
    fn prop_strings_are_reflexive(s in ".*") {
        let (agg, _out) = isolated();
        prop_assert!(agg.check(s.clone(), s));
    }

    #[test]
    fn prop_finite_doubles_are_reflexive(x in any::<f64>().prop_filter("finite", |x| x.is_finite())) {
        let (agg, _out) = isolated();
        prop_assert!(agg.check(x, x));
    }

    #[test]
    fn prop_small_offsets_pass(base in -1000.0_f64..1000.0, offset in -9.0e-5_f64..9.0e-5) {
        let (agg, _out) = isolated();
        prop_assert!(agg.check(base + offset, base));
    }

    #[test]
    fn prop_large_offsets_fail(base in -1000.0_f64..1000.0, offset in 1.1e-4_f64..1.0e3) {
        let (agg, _out) = isolated();
        prop_assert!(!agg.check(base + offset, base));
        prop_assert!(!agg.check(base - offset, base));
    }

    #[test]
    fn prop_counts_track_outcomes(pairs in proptest::collection::vec((0_u8..4, 0_u8..4), 0..64)) {
        let (agg, out) = isolated();
        for (actual, expected) in &pairs {
            agg.check(*actual, *expected);
        }
        let failed = pairs.iter().filter(|(a, e)| a != e).count() as u64;
        prop_assert_eq!(agg.snapshot(), Summary { total: pairs.len() as u64, failed });
        prop_assert_eq!(out.lines().len(), pairs.len());
    }
}
