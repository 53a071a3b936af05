//! Diagnostic logging initialization.
//!
//! The check report itself always goes to standard output. This module only
//! wires up `tracing` diagnostics (per-check debug events, lifecycle misuse
//! warnings, block spans), controlled by `TALLY_LOG`:
//! - unset or empty → no subscriber (tracing disabled, zero overhead)
//! - `"stderr"` → JSON events to stderr
//! - `"text"` → human-readable events to stderr
//!
//! The level filter comes from `RUST_LOG` (default `info`).

use tracing_subscriber::EnvFilter;

/// Environment variable selecting the diagnostic output.
pub const LOG_ENV: &str = "TALLY_LOG";

/// Where diagnostics go.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogTarget {
    /// No subscriber is installed.
    Off,
    /// JSON events on stderr.
    Json,
    /// Human-readable events on stderr.
    Text,
}

impl LogTarget {
    /// Interpret a `TALLY_LOG` value.
    #[must_use]
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Self::Off,
            Some("stderr" | "json") => Self::Json,
            Some("text") => Self::Text,
            Some(other) => {
                eprintln!("warning: unknown {LOG_ENV} value '{other}', logging disabled");
                Self::Off
            }
        }
    }
}

/// Opaque guard returned by [`init`]. Hold it in `main()` until exit.
#[derive(Debug)]
pub struct TelemetryGuard {
    target: LogTarget,
}

impl TelemetryGuard {
    /// The target that was installed.
    #[must_use]
    pub const fn target(&self) -> LogTarget {
        self.target
    }
}

/// Initialize diagnostics based on `TALLY_LOG`.
#[must_use]
pub fn init() -> TelemetryGuard {
    let value = std::env::var(LOG_ENV).ok();
    let target = LogTarget::from_env_value(value.as_deref());
    match target {
        LogTarget::Off => {}
        LogTarget::Json => init_json(),
        LogTarget::Text => init_text(),
    }
    TelemetryGuard { target }
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// JSON events to stderr via tracing-subscriber's JSON formatter.
fn init_json() {
    use tracing_subscriber::layer::SubscriberExt as _;
    use tracing_subscriber::util::SubscriberInitExt as _;

    let installed = tracing_subscriber::registry()
        .with(filter())
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE),
        )
        .try_init();
    if let Err(e) = installed {
        eprintln!("warning: could not install log subscriber: {e}");
    }
}

fn init_text() {
    use tracing_subscriber::layer::SubscriberExt as _;
    use tracing_subscriber::util::SubscriberInitExt as _;

    let installed = tracing_subscriber::registry()
        .with(filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
    if let Err(e) = installed {
        eprintln!("warning: could not install log subscriber: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_or_empty_is_off() {
        assert_eq!(LogTarget::from_env_value(None), LogTarget::Off);
        assert_eq!(LogTarget::from_env_value(Some("")), LogTarget::Off);
        assert_eq!(LogTarget::from_env_value(Some("  ")), LogTarget::Off);
    }

    #[test]
    fn known_targets() {
        assert_eq!(LogTarget::from_env_value(Some("stderr")), LogTarget::Json);
        assert_eq!(LogTarget::from_env_value(Some("json")), LogTarget::Json);
        assert_eq!(LogTarget::from_env_value(Some("text")), LogTarget::Text);
    }

    #[test]
    fn unknown_target_disables_logging() {
        assert_eq!(LogTarget::from_env_value(Some("otlp")), LogTarget::Off);
    }
}
