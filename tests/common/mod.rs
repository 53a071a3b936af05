//! Shared helpers for tally integration tests.
//!
//! Every test gets its own in-memory aggregator so tests running in parallel
//! never share counters or output.

#![allow(dead_code)]

use tally::aggregator::{Aggregator, Capture, ReportOptions};

/// Aggregator writing into memory, printing passes but no instance counters.
pub fn isolated() -> (Aggregator, Capture) {
    Aggregator::capture(ReportOptions {
        show_passes: true,
        instance_counts: false,
    })
}

/// Shape of one printed result line.
#[derive(Debug, PartialEq, Eq)]
pub enum LineKind {
    Pass,
    Fail,
}

/// Classify a result line; `None` means the line is corrupted.
pub fn classify(line: &str) -> Option<LineKind> {
    if let Some(rest) = line.strip_prefix("Test successful! Expected value == actual value (=\"") {
        return rest.ends_with("\")").then_some(LineKind::Pass);
    }
    let rest = line.strip_prefix("Error in test: expected value \"")?;
    let (_expected, rest) = rest.split_once("\", but actual value was \"")?;
    (rest.ends_with('"') || rest.contains("\": ")).then_some(LineKind::Fail)
}
