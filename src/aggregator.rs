//! Process-wide tally of check outcomes.
//!
//! The [`Aggregator`] prints one line per recorded outcome and keeps the
//! executed/failed counters. Printing and counting happen inside one critical
//! section, so concurrent checks never interleave partial lines and never lose
//! an update. The summary block is printed exactly once by [`Aggregator::finish`].
//!
//! Lifecycle: created lazily on first use (`Active`), finalized by `finish`.
//! Recording after finalization is rejected with [`TallyError::Finalized`].

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

use crate::counter;
use crate::error::TallyError;
use crate::outcome::TestOutcome;

/// Separator line printed above the summary.
pub const SUMMARY_RULE: &str = "--------------------------------------";

// ---------------------------------------------------------------------------
// ReportOptions
// ---------------------------------------------------------------------------

/// Runtime switches for what the aggregator prints.
///
/// Counters are updated regardless of these settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReportOptions {
    /// Print a line for passing checks.
    pub show_passes: bool,
    /// Print instance-counter reports before the summary.
    pub instance_counts: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            show_passes: true,
            instance_counts: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Snapshot of the aggregate counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Number of recorded checks.
    pub total: u64,
    /// Number of recorded checks that failed. Never exceeds `total`.
    pub failed: u64,
}

impl Summary {
    /// Number of recorded checks that passed.
    #[must_use]
    pub const fn passed(&self) -> u64 {
        self.total - self.failed
    }

    /// `true` when no recorded check failed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{SUMMARY_RULE}")?;
        writeln!(f, "Test summary:")?;
        writeln!(f, "Executed tests: {}", self.total)?;
        write!(f, "Failed tests: {}", self.failed)
    }
}

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

struct Sink {
    out: Box<dyn Write + Send>,
    options: ReportOptions,
}

/// Records check outcomes and prints the final summary.
pub struct Aggregator {
    // Both counters are only written while `sink` is held. `total` is bumped
    // before `failed`, so a reader that loads `failed` first sees failed <= total.
    total: AtomicU64,
    failed: AtomicU64,
    finished: AtomicBool,
    sink: Mutex<Sink>,
}

impl fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aggregator")
            .field("summary", &self.snapshot())
            .field("finished", &self.is_finished())
            .finish_non_exhaustive()
    }
}

impl Aggregator {
    /// Create an aggregator writing to `out`.
    pub fn new(out: Box<dyn Write + Send>, options: ReportOptions) -> Self {
        Self {
            total: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            finished: AtomicBool::new(false),
            sink: Mutex::new(Sink { out, options }),
        }
    }

    /// Create an aggregator writing to standard output.
    #[must_use]
    pub fn stdout(options: ReportOptions) -> Self {
        Self::new(Box::new(io::stdout()), options)
    }

    /// Create an aggregator writing into memory, plus a handle to read it.
    #[must_use]
    pub fn capture(options: ReportOptions) -> (Self, Capture) {
        let capture = Capture::default();
        (Self::new(Box::new(capture.clone()), options), capture)
    }

    /// Replace the report options.
    pub fn set_options(&self, options: ReportOptions) {
        self.lock_sink().options = options;
    }

    /// Current report options.
    pub fn options(&self) -> ReportOptions {
        self.lock_sink().options
    }

    /// Print the line for `outcome` and count it.
    ///
    /// The outcome is counted even if writing the line fails.
    ///
    /// # Errors
    /// [`TallyError::Finalized`] after [`finish`](Self::finish) (nothing is
    /// printed or counted), or [`TallyError::Io`] if the line could not be
    /// written.
    pub fn record(&self, outcome: &TestOutcome) -> Result<(), TallyError> {
        let mut sink = self.lock_sink();
        if self.finished.load(Ordering::Acquire) {
            return Err(TallyError::Finalized);
        }

        let written = if outcome.passed && !sink.options.show_passes {
            Ok(())
        } else {
            writeln!(sink.out, "{outcome}").and_then(|()| sink.out.flush())
        };
        self.total.fetch_add(1, Ordering::Release);
        if !outcome.passed {
            self.failed.fetch_add(1, Ordering::Release);
        }
        drop(sink);

        tracing::debug!(
            passed = outcome.passed,
            expected = %outcome.expected,
            actual = %outcome.actual,
            "check recorded"
        );
        written.map_err(TallyError::from)
    }

    /// Current counters, read without taking the lock.
    pub fn snapshot(&self) -> Summary {
        let failed = self.failed.load(Ordering::Acquire);
        let total = self.total.load(Ordering::Acquire);
        Summary { total, failed }
    }

    /// Whether [`finish`](Self::finish) has run.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Print instance-counter reports (if enabled) and the summary block.
    ///
    /// Must be called once, after the last check.
    ///
    /// # Errors
    /// [`TallyError::AlreadyFinished`] on a second call, or
    /// [`TallyError::Io`] if the report could not be written.
    pub fn finish(&self) -> Result<Summary, TallyError> {
        let mut sink = self.lock_sink();
        if self.finished.swap(true, Ordering::AcqRel) {
            return Err(TallyError::AlreadyFinished);
        }
        let summary = self.snapshot();

        if sink.options.instance_counts {
            for snapshot in counter::counters() {
                writeln!(sink.out, "{snapshot}")?;
            }
        }
        writeln!(sink.out)?;
        writeln!(sink.out, "{summary}")?;
        sink.out.flush()?;
        drop(sink);

        tracing::info!(
            total = summary.total,
            failed = summary.failed,
            "check summary printed"
        );
        Ok(summary)
    }

    fn lock_sink(&self) -> MutexGuard<'_, Sink> {
        // A panic elsewhere while holding the lock cannot leave a partial
        // counter update behind, so a poisoned lock is still usable.
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// Global instance
// ---------------------------------------------------------------------------

static GLOBAL: LazyLock<Aggregator> = LazyLock::new(|| Aggregator::stdout(ReportOptions::default()));

/// The process-wide aggregator used by the free `check*` functions.
pub fn global() -> &'static Aggregator {
    &GLOBAL
}

// ---------------------------------------------------------------------------
// Capture
// ---------------------------------------------------------------------------

/// In-memory report stream shared between an aggregator and its reader.
#[derive(Clone, Debug, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    /// Everything written so far.
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Written lines, without terminators.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
