use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for linear backoff (attempt N waits N * base).
    pub base_delay_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 1.0,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_secs_f64(self.base_delay_secs.max(0.0)),
        }
    }
}

/// Persistent cache location (optional section in config.toml).
///
/// Bumping `schema_version` drops and recreates the object store on next open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// When false, only the in-memory layer is used.
    pub enabled: bool,
    /// Database name; the file is `<database>.db` under the XDG state dir.
    pub database: String,
    /// Object store (table) holding the asset.
    pub object_store: String,
    /// Fixed key of the asset entry.
    pub key: String,
    pub schema_version: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            database: "portfolio_cache".to_string(),
            object_store: "pdf_cache".to_string(),
            key: "resume_pdf".to_string(),
            schema_version: 1,
        }
    }
}

/// How a background preload schedules its network fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreloadMode {
    /// Yield to already-queued work before fetching.
    #[default]
    Idle,
    /// Wait `delay_ms` before fetching.
    Deferred,
}

/// Preload timing (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreloadConfig {
    pub mode: PreloadMode,
    pub delay_ms: u64,
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            mode: PreloadMode::Idle,
            delay_ms: 100,
        }
    }
}

/// Global configuration loaded from `~/.config/assetcache/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetCacheConfig {
    /// Static URL of the asset. Also the direct-link fallback target.
    pub url: String,
    /// Content type assumed when the server does not send one.
    pub content_type: String,
    /// Filename used by `download` when none is given.
    pub default_filename: String,
    /// Per-attempt network timeout in seconds.
    pub timeout_secs: u64,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Optional persistent store settings; if missing, built-in defaults are used.
    #[serde(default)]
    pub store: Option<StoreConfig>,
    /// Optional preload timing; if missing, built-in defaults are used.
    #[serde(default)]
    pub preload: Option<PreloadConfig>,
}

impl Default for AssetCacheConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:3000/resume.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            default_filename: "resume.pdf".to_string(),
            timeout_secs: 30,
            retry: None,
            store: None,
            preload: None,
        }
    }
}

impl AssetCacheConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.clone().unwrap_or_default().policy()
    }

    pub fn store_config(&self) -> StoreConfig {
        self.store.clone().unwrap_or_default()
    }

    pub fn preload_config(&self) -> PreloadConfig {
        self.preload.clone().unwrap_or_default()
    }

    /// Reject settings that cannot work before anything touches the network or disk.
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.url).with_context(|| format!("invalid url: {}", self.url))?;
        if !matches!(parsed.scheme(), "http" | "https" | "file") {
            anyhow::bail!("unsupported url scheme: {}", parsed.scheme());
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be at least 1");
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("assetcache")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// XDG state directory holding the log file and the persistent cache database.
pub fn state_dir() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("assetcache")?;
    Ok(xdg_dirs.get_state_home())
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<AssetCacheConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = AssetCacheConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: AssetCacheConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
