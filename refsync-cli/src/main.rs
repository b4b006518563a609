//! refsync: reconcile stored channel/category references with the reference API.
//!
//! # Usage
//!
//! ```text
//! refsync sync [--batch-size <N>] [--base-url <URL>] [--dry-run] [--json]
//! refsync cc   …                                     (alias of `sync`)
//! refsync records list [--status published|unpublished] [--json]
//! refsync records add <id> (--channel <value> | --category <value>) [--unpublished]
//! ```
//!
//! The API base URL is read from `$THIRD_PARTY_BASE_URL` unless `--base-url`
//! is given. Records live under `~/.refsync/records/`.

mod commands;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{records::RecordsCommand, sync::SyncArgs};
use refsync_core::RecordStatus;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "refsync",
    version,
    about = "Synchronize stored channel/category references with the reference API",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Re-resolve every published record, rename drifted references and
    /// unpublish records whose reference is gone.
    #[command(visible_alias = "cc")]
    Sync(SyncArgs),

    /// Inspect or seed stored records.
    Records {
        #[command(subcommand)]
        command: RecordsCommand,
    },
}

// ---------------------------------------------------------------------------
// Shared RecordStatus argument: parsed from CLI strings, converts to core type
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse `RecordStatus` from CLI args.
#[derive(Debug, Clone, Copy)]
pub struct StatusArg(pub RecordStatus);

impl FromStr for StatusArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "published" => Ok(Self(RecordStatus::Published)),
            "unpublished" => Ok(Self(RecordStatus::Unpublished)),
            other => Err(format!(
                "unknown status '{other}'; expected: published, unpublished"
            )),
        }
    }
}

impl fmt::Display for StatusArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<StatusArg> for RecordStatus {
    fn from(s: StatusArg) -> Self {
        s.0
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Records { command } => commands::records::run(command),
    }
}

/// Leveled log output goes to stderr; stdout carries the operator-facing lines.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
