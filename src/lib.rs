//! Ad hoc equality checks for any program.
//!
//! Each check compares an actual value against an expected one, prints a
//! result line to standard output and updates process-wide pass/fail counters.
//! The host program prints the summary once, at the end:
//!
//! ```no_run
//! fn main() {
//!     let _summary = tally::init();
//!
//!     tally::check!(1, 1);
//!     tally::check!(0.1 + 0.2, 0.3);
//!     tally::check!(String::from("Hi"), "Hi");
//!     tally::check!(2 + 2 == 4);
//! } // summary printed when `_summary` drops
//! ```
//!
//! Floating-point values compare within an absolute tolerance of `1e-4`.
//! Types can also opt into instance counting with a [`Tracked`] field, which
//! reports live and total instance counts alongside the summary.
//!
//! Counters are local to the process. Separate processes (for example MPI
//! ranks) each print their own lines and summary; nothing is merged.

use std::path::Path;

pub mod aggregator;
pub mod check;
pub mod config;
pub mod counter;
pub mod error;
pub mod format;
pub mod outcome;
pub mod policy;
pub mod registry;
pub mod telemetry;

pub use aggregator::{Aggregator, ReportOptions, Summary};
pub use check::{Checkable, check, check_no_panic, check_panics, check_true, check_with};
pub use counter::{Tracked, counters, instances};
pub use error::TallyError;
pub use registry::{register, run_registered};

/// Guard that prints the summary of the global aggregator when dropped.
///
/// Hold it in `main()` until every check has run. Use [`finish`] instead
/// when the summary itself is needed.
#[derive(Debug)]
#[must_use = "the summary is printed when the guard is dropped"]
pub struct FinishGuard {
    _private: (),
}

impl Drop for FinishGuard {
    fn drop(&mut self) {
        match aggregator::global().finish() {
            Ok(_) | Err(TallyError::AlreadyFinished) => {}
            Err(err) => tracing::error!(%err, "failed to print check summary"),
        }
    }
}

/// Start checking with default options; the summary prints when the guard drops.
pub fn init() -> FinishGuard {
    init_with(ReportOptions::default())
}

/// Start checking with explicit report options.
pub fn init_with(options: ReportOptions) -> FinishGuard {
    aggregator::global().set_options(options);
    FinishGuard { _private: () }
}

/// Load the report configuration and start checking with its options.
///
/// `config_path` wins over `$TALLY_CONFIG` and `./tally.toml`; a missing file
/// means defaults. Returns the loaded configuration with the summary guard.
///
/// # Errors
/// [`TallyError::Config`] if the file cannot be read or parsed. The global
/// aggregator is left untouched in that case.
pub fn init_from_config(
    config_path: Option<&Path>,
) -> Result<(config::TallyConfig, FinishGuard), TallyError> {
    let config = config::TallyConfig::discover(config_path)?;
    let guard = init_with(config.report.options());
    Ok((config, guard))
}

/// Print instance-counter reports and the summary of the global aggregator.
///
/// # Errors
/// [`TallyError::AlreadyFinished`] if the summary was already printed, or
/// [`TallyError::Io`] if standard output could not be written.
pub fn finish() -> Result<Summary, TallyError> {
    aggregator::global().finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_surfaces_as_tally_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tally.toml");
        std::fs::write(&path, "[report]\nshow_everything = true\n").unwrap();

        match init_from_config(Some(&path)) {
            Err(TallyError::Config { path: reported, detail }) => {
                assert_eq!(reported, path);
                assert!(detail.contains("show_everything"), "{detail}");
            }
            Err(other) => panic!("expected Config, got {other:?}"),
            Ok(_) => panic!("invalid config accepted"),
        }
    }
}
