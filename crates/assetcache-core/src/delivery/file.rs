//! Delivery into a local directory with atomic finalize.
//!
//! Both paths write `<name>.part` first and rename it into place, so a
//! half-written file never appears under the final name.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::sanitize::sanitize_filename;
use super::Delivery;
use crate::asset::Asset;

/// Path for the temp file: appends `.part` to the final path (e.g. `cv.pdf` → `cv.pdf.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(".part");
    PathBuf::from(o)
}

/// Saves delivered assets into `dir`.
#[derive(Debug, Clone)]
pub struct FileDelivery {
    dir: PathBuf,
    timeout: Duration,
}

impl FileDelivery {
    /// `timeout` bounds the uncached direct-link download.
    pub fn new(dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            dir: dir.into(),
            timeout,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn final_path(&self, filename: &str) -> PathBuf {
        self.dir.join(sanitize_filename(filename))
    }
}

#[async_trait]
impl Delivery for FileDelivery {
    async fn save(&self, asset: &Asset, filename: &str) -> Result<PathBuf> {
        let final_path = self.final_path(filename);
        let len = asset.len();
        let asset = asset.clone();
        let out = final_path.clone();
        tokio::task::spawn_blocking(move || write_atomic(&out, asset.content()))
            .await
            .context("save task failed")??;
        tracing::info!("saved {} bytes to {}", len, final_path.display());
        Ok(final_path)
    }

    async fn direct_link(&self, url: &str, filename: &str) -> Option<PathBuf> {
        let final_path = self.final_path(filename);
        let url_owned = url.to_string();
        let out = final_path.clone();
        let timeout = self.timeout;
        let res = tokio::task::spawn_blocking(move || download_direct(&url_owned, &out, timeout))
            .await
            .context("direct download task failed")
            .and_then(|r| r);
        match res {
            Ok(bytes) => {
                tracing::info!("direct download of {} wrote {} bytes to {}", url, bytes, final_path.display());
                Some(final_path)
            }
            Err(e) => {
                tracing::error!("direct download of {} failed: {:#}", url, e);
                None
            }
        }
    }
}

/// Write `data` to `<final>.part`, sync, then rename over `final_path`.
fn write_atomic(final_path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = final_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    let tp = temp_path(final_path);
    let mut f = File::create(&tp).with_context(|| format!("create {}", tp.display()))?;
    f.write_all(data).with_context(|| format!("write {}", tp.display()))?;
    f.sync_all().context("sync failed")?;
    drop(f);
    finalize(&tp, final_path)
}

fn finalize(temp: &Path, final_path: &Path) -> Result<()> {
    std::fs::rename(temp, final_path).with_context(|| {
        format!("failed to rename {} to {}", temp.display(), final_path.display())
    })
}

/// Plain GET of `url` streamed into `<final>.part`, renamed on success. Returns bytes written.
fn download_direct(url: &str, final_path: &Path, timeout: Duration) -> Result<u64> {
    if let Some(parent) = final_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    let mut easy = curl::easy::Easy::new();
    easy.url(url).context("invalid URL")?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.timeout(timeout)?;

    // Only touch the disk once the handle is ready; every later failure removes the file.
    let tp = temp_path(final_path);
    let mut file = File::create(&tp).with_context(|| format!("create {}", tp.display()))?;
    let mut written = 0u64;
    let mut write_err: Option<std::io::Error> = None;

    let performed = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match file.write_all(data) {
            Ok(()) => {
                written += data.len() as u64;
                Ok(data.len())
            }
            Err(e) => {
                write_err = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        transfer.perform()
    };

    let checked = check_transfer(&mut easy, performed, write_err, url)
        .and_then(|()| file.sync_all().context("sync failed"));
    drop(file);
    match checked {
        Ok(()) => {
            finalize(&tp, final_path)?;
            Ok(written)
        }
        Err(e) => {
            let _ = std::fs::remove_file(&tp);
            Err(e)
        }
    }
}

fn check_transfer(
    easy: &mut curl::easy::Easy,
    performed: Result<(), curl::Error>,
    write_err: Option<std::io::Error>,
    url: &str,
) -> Result<()> {
    if let Some(e) = write_err {
        return Err(e).context("write failed");
    }
    performed.context("GET request failed")?;
    let code = easy.response_code().context("no response code")?;
    if code != 0 && !(200..300).contains(&code) {
        anyhow::bail!("GET {} returned HTTP {}", url, code);
    }
    Ok(())
}
