//! CLI for the assetcache resume cache.

mod commands;

use anyhow::Result;
use assetcache_core::config;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use commands::{run_checksum, run_clear, run_download, run_preload, run_status};

/// Top-level CLI for the assetcache resume cache.
#[derive(Debug, Parser)]
#[command(name = "assetcache")]
#[command(about = "Cached, coalesced download of a static resume asset", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download the asset, from cache when possible, and save it to a file.
    Download {
        /// Name of the saved file (defaults to `default_filename` from config).
        filename: Option<String>,

        /// Directory to save into (default: current directory).
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Warm the persistent cache so later downloads skip the network.
    Preload,

    /// Remove the asset from the persistent cache.
    Clear,

    /// Show what the persistent cache holds.
    Status,

    /// Compute SHA-256 of a file (e.g. after download).
    Checksum {
        /// Path to the file.
        path: String,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Download {
                filename,
                output_dir,
            } => {
                let dir = match output_dir {
                    Some(dir) => dir,
                    None => std::env::current_dir()?,
                };
                run_download(&cfg, filename.as_deref(), &dir).await?;
            }
            CliCommand::Preload => run_preload(&cfg).await?,
            CliCommand::Clear => run_clear(&cfg).await?,
            CliCommand::Status => run_status(&cfg).await?,
            CliCommand::Checksum { path } => run_checksum(&cfg, Path::new(&path)).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
