//! Tracing setup for the CLI.
//!
//! Events go to `assetcache.log` under the XDG state dir, or to stderr when
//! that file cannot be opened. The filter comes from `ASSETCACHE_LOG`, then
//! `RUST_LOG`, then a built-in default.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use crate::config;

const LOG_FILE: &str = "assetcache.log";
const FILTER_ENV: &str = "ASSETCACHE_LOG";
const DEFAULT_FILTER: &str = "info,assetcache=debug,assetcache_core=debug";

/// Where `init_logging` appends.
pub fn log_path() -> Result<PathBuf> {
    Ok(config::state_dir()?.join(LOG_FILE))
}

/// Append plain-text events to the state-dir log file. Returns the file path.
/// Errors leave no subscriber installed so the caller can use `init_logging_stderr`.
pub fn init_logging() -> Result<PathBuf> {
    let path = log_path()?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open {}", path.display()))?;

    install(Mutex::new(file))?;
    tracing::info!("assetcache logging to {}", path.display());
    Ok(path)
}

/// Stderr-only logging. Does nothing if a subscriber is already installed.
pub fn init_logging_stderr() {
    let _ = install(std::io::stderr);
}

fn install<W>(writer: W) -> Result<()>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install tracing subscriber: {}", e))
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(FILTER_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }

    #[test]
    fn log_file_lives_in_state_dir() {
        let path = log_path().unwrap();
        assert_eq!(path.file_name().unwrap(), LOG_FILE);
        assert_eq!(path.parent().unwrap(), config::state_dir().unwrap());
    }
}
