//! Named blocks of checks, run explicitly by the host program.
//!
//! Blocks are plain `fn(&Aggregator)` items registered at a point the host
//! controls (typically the top of `main`) and run in registration order by
//! [`run_registered`]. Nothing runs before `main`, so there is no dependence
//! on initialization order across modules or crates. A block records its
//! checks on the aggregator it is handed, the same one that records its panic.
//!
//! ```no_run
//! use tally::Aggregator;
//!
//! fn arithmetic(agg: &Aggregator) {
//!     agg.check(1 + 1, 2);
//! }
//!
//! fn strings(agg: &Aggregator) {
//!     agg.check(String::from("Hi"), "Hi");
//! }
//!
//! let _summary = tally::init();
//! tally::register_blocks!(arithmetic, strings);
//! tally::run_registered();
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::aggregator::{self, Aggregator};
use crate::outcome::TestOutcome;

/// Signature of a check block.
pub type BlockFn = fn(&Aggregator);

/// One registered block.
#[derive(Clone, Copy, Debug)]
pub struct CheckBlock {
    /// Block name, used in logs and in the panic message.
    pub name: &'static str,
    /// The checks to run.
    pub body: BlockFn,
}

/// Ordered list of blocks waiting to run.
#[derive(Debug, Default)]
pub struct Registry {
    blocks: Mutex<Vec<CheckBlock>>,
}

impl Registry {
    /// An empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            blocks: Mutex::new(Vec::new()),
        }
    }

    /// Append a block. Blocks run in the order they were registered.
    pub fn register(&self, name: &'static str, body: BlockFn) {
        self.lock().push(CheckBlock { name, body });
        tracing::debug!(block = name, "check block registered");
    }

    /// Names of blocks that have not run yet.
    pub fn pending(&self) -> Vec<&'static str> {
        self.lock().iter().map(|block| block.name).collect()
    }

    /// Run and remove every pending block against `aggregator`.
    ///
    /// A block that panics counts as one failed check; the remaining blocks
    /// still run. Returns the number of blocks run.
    pub fn run(&self, aggregator: &Aggregator) -> usize {
        // Drain first so blocks can register further blocks without deadlock.
        let blocks = std::mem::take(&mut *self.lock());
        for block in &blocks {
            let span = tracing::info_span!("check_block", name = block.name);
            let _entered = span.enter();
            let before = aggregator.snapshot();

            let body = block.body;
            if panic::catch_unwind(AssertUnwindSafe(|| body(aggregator))).is_err() {
                tracing::error!(block = block.name, "check block panicked");
                let message = format!("check block '{}' panicked", block.name);
                aggregator.check_outcome(TestOutcome::evaluate(
                    &true,
                    &false,
                    Some(&message),
                ));
            }

            let after = aggregator.snapshot();
            tracing::debug!(
                checks = after.total.saturating_sub(before.total),
                failed = after.failed.saturating_sub(before.failed),
                "check block finished"
            );
        }
        blocks.len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CheckBlock>> {
        self.blocks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

static GLOBAL: Registry = Registry::new();

/// The process-wide registry.
pub fn global() -> &'static Registry {
    &GLOBAL
}

/// Register a block on the process-wide registry.
pub fn register(name: &'static str, body: BlockFn) {
    GLOBAL.register(name, body);
}

/// Run every block registered on the process-wide registry against the
/// global aggregator. Returns the number of blocks run.
pub fn run_registered() -> usize {
    GLOBAL.run(aggregator::global())
}

/// Register functions as named check blocks, using each function's name.
///
/// `register_blocks!(a, b)` is `register("a", a); register("b", b);`.
#[macro_export]
macro_rules! register_blocks {
    ($($block:path),+ $(,)?) => {
        $(
            $crate::registry::register(::std::stringify!($block), $block);
        )+
    };
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
