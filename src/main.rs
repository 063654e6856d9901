//! # History Harness CLI (`hist`)
//!
//! Thin binary over the collection core. It parses arguments, loads the
//! configuration, and hands off to the coordinator; none of the
//! watermark/diff logic lives here.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `hist run` | Execute one collection run across all backends |
//! | `hist sources` | List backends and whether their probe locations exist |
//!
//! ## Examples
//!
//! ```bash
//! # One collection run with defaults (first run scans everything)
//! hist run
//!
//! # Same, plus per-source JSON diff dumps under out/dev
//! hist run --dev
//!
//! # Non-default config
//! hist run --config ./config/hist.toml
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use history_harness::config;
use history_harness::coordinator;
use history_harness::sources;

/// History Harness: incremental, fault-isolated collection of browsing
/// history from local browser databases.
#[derive(Parser)]
#[command(
    name = "hist",
    about = "Incremental collection of browsing history from local browser databases",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Optional; when the file does not exist, built-in per-OS defaults
    /// apply.
    #[arg(long, global = true, default_value = "./config/hist.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute one collection run across all backends.
    ///
    /// Prints the machine-readable run summary as JSON on stdout; warnings
    /// go to stderr.
    Run {
        /// Also dump the exact rows found this run under `<out>/dev`.
        #[arg(long)]
        dev: bool,
    },

    /// List backends and whether their probe locations exist.
    Sources,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Run { dev } => {
            if dev {
                config.output.dev_json = true;
            }
            let summary = coordinator::run(&config).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Sources => sources::list_sources(&config),
    }

    Ok(())
}
