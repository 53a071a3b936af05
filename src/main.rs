use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod demo;

/// Ad hoc equality checks with a teardown summary
///
/// Runs the bundled demonstrations of the tally library. Each check prints
/// one result line; the summary block is printed once at the end.
///
/// CONFIGURATION:
///
///   tally.toml in the working directory, or the file named by
///   TALLY_CONFIG, or --config. Missing file means defaults.
///
/// DIAGNOSTICS:
///
///   TALLY_LOG=text|stderr enables tracing output on stderr,
///   filtered by RUST_LOG (default: info).
#[derive(Parser)]
#[command(name = "tally")]
#[command(version, about)]
#[command(propagate_version = true)]
#[command(after_help = "See 'tally <command> --help' for more information on a specific command.")]
struct Cli {
    /// Configuration file (overrides TALLY_CONFIG and ./tally.toml)
    #[arg(long, global = true, env = "TALLY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the demonstration checks
    ///
    /// A group of checks that should all pass, then a group that should all
    /// fail, plus an instance-counting example that leaks one object.
    Demo,

    /// Hammer the aggregator from several threads
    ///
    /// Verifies that every check is counted exactly once.
    Stress {
        /// Number of worker threads
        #[arg(long, default_value_t = 8)]
        threads: usize,

        /// Checks issued per thread
        #[arg(long, default_value_t = 1000)]
        checks: usize,

        /// Make every Nth check fail (0 = none)
        #[arg(long, default_value_t = 0)]
        fail_every: usize,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let telemetry = tally::telemetry::init();
    tracing::debug!(log_target = ?telemetry.target(), "tally starting");

    let (config, _summary_guard) = tally::init_from_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Demo => demo::run(),
        Commands::Stress {
            threads,
            checks,
            fail_every,
        } => demo::stress(threads, checks, fail_every)?,
    }

    let summary = tally::finish()?;
    if config.report.exit_on_failure && !summary.is_success() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
