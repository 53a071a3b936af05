//! Demonstrations driven by the `tally` binary.

use std::panic;

use anyhow::{Context, Result, ensure};
use tally::{Tracked, check, check_no_panic, check_panics, check_true, check_with};

/// Tree node whose instances are counted.
#[derive(Clone, Default)]
struct Node {
    _tracked: Tracked<Self>,
}

fn does_panic() {
    panic!("oh oh");
}

const fn does_not_panic() {}

pub fn run() {
    // The default hook would print a backtrace note for every contained panic.
    let hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));

    println!("These checks should all be true: ");
    check_true(true);
    check(1, 1);
    check_with(1., 1, "one is one");
    check(String::from("abc"), "abc");
    check_panics(does_panic);
    check_no_panic(does_not_panic);

    println!("\n\nThese checks should all be false");
    check_true(false);
    check("abc", "cde");
    check(1.5, 1);
    check_with(1, 2, "Error message");
    check_panics(does_not_panic);

    panic::set_hook(hook);

    let root = Node::default();
    let children = vec![root.clone(), root.clone()];
    drop(children);
    // Never dropped: reported as a remaining object at the end.
    std::mem::forget(root);
}

pub fn stress(threads: usize, checks: usize, fail_every: usize) -> Result<()> {
    let planned = threads
        .checked_mul(checks)
        .and_then(|n| u64::try_from(n).ok())
        .with_context(|| format!("{threads} threads x {checks} checks is too many to count"))?;
    let aggregator = tally::aggregator::global();
    let before = aggregator.snapshot();

    std::thread::scope(|scope| {
        for worker in 0..threads {
            scope.spawn(move || {
                for i in 0..checks {
                    let failing = fail_every != 0 && (i + 1) % fail_every == 0;
                    let expected = if failing { i + 1 } else { i };
                    check_with(i, expected, &format!("worker {worker}"));
                }
            });
        }
    });

    let after = aggregator.snapshot();
    let recorded = after.total - before.total;
    tracing::info!(threads, checks, recorded, failed = after.failed - before.failed, "stress run finished");
    ensure!(
        recorded == planned,
        "lost check updates: recorded {recorded}, expected {planned}"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stress_rejects_a_plan_too_large_to_count() {
        let err = stress(usize::MAX, 2, 0).unwrap_err();
        assert!(err.to_string().contains("too many to count"), "{err}");
    }

    #[test]
    fn stress_counts_every_check() {
        stress(4, 50, 7).unwrap();
    }
}
