//! CLI for the batchsave media transfer engine.

mod commands;

use anyhow::Result;
use batchsave_core::config;
use batchsave_core::network::NetworkQuality;
use batchsave_core::Strategy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_checksum, run_manifest, run_strategy, RunArgs};

/// Top-level CLI for batchsave.
#[derive(Debug, Parser)]
#[command(name = "batchsave")]
#[command(about = "batchsave: fetch many media files and save them as one archive or one by one", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Transfer every unit listed in a JSON manifest.
    Run {
        /// Path to the manifest ({ job_name, base_url?, units: [{ source_key, display_name }] }).
        manifest: PathBuf,
        /// Directory to save into (default: current directory).
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
        /// Job name override; names the archive.
        #[arg(long)]
        name: Option<String>,
        /// Base URL that source keys are joined onto (overrides the manifest).
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,
        /// Network quality hint: 4g, 3g, 2g, slow-2g or unknown (default: from config).
        #[arg(long, value_name = "QUALITY")]
        network: Option<NetworkQuality>,
        /// Client user agent used to pick the strategy.
        #[arg(long)]
        user_agent: Option<String>,
        /// Client viewport width in CSS pixels used to pick the strategy.
        #[arg(long, value_name = "PX")]
        viewport_width: Option<u32>,
        /// Force a strategy (archive or sequential) instead of detecting it.
        #[arg(long)]
        strategy: Option<Strategy>,
        /// Abort on the first unit that fails after retries.
        #[arg(long)]
        fail_fast: bool,
        /// Replace existing files instead of saving numbered copies.
        #[arg(long)]
        overwrite: bool,
    },

    /// Print the strategy that would be used for the given client hints.
    Strategy {
        #[arg(long)]
        user_agent: Option<String>,
        #[arg(long, value_name = "PX")]
        viewport_width: Option<u32>,
    },

    /// Compute SHA-256 of a file (e.g. a saved archive).
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Run {
                manifest,
                out_dir,
                name,
                base_url,
                network,
                user_agent,
                viewport_width,
                strategy,
                fail_fast,
                overwrite,
            } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                let out_dir = match out_dir {
                    Some(dir) => dir,
                    None => std::env::current_dir()?,
                };
                let args = RunArgs {
                    manifest,
                    out_dir,
                    name,
                    base_url,
                    network,
                    user_agent,
                    viewport_width,
                    strategy,
                    fail_fast,
                    overwrite,
                };
                run_manifest(&cfg, args).await?;
            }
            CliCommand::Strategy {
                user_agent,
                viewport_width,
            } => run_strategy(user_agent, viewport_width),
            CliCommand::Checksum { path } => run_checksum(&path)?,
        }

        Ok(())
    }
}
