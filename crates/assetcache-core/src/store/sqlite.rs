//! SQLite-backed persistent cache (sqlx).
//!
//! Layout: database file `<database>.db`, one table named after the object
//! store, one row under the configured key. The schema version lives in
//! `PRAGMA user_version`; a mismatch drops and recreates the table.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Row, Sqlite};

use super::{PersistentStore, StoreError, StoredEntry};
use crate::asset::Asset;
use crate::config::{self, StoreConfig};

/// Percent-encode a path for use in a sqlite:// URI so spaces and special chars don't break parsing.
fn path_to_sqlite_uri(path: &Path) -> String {
    let s = path.to_string_lossy();
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            '&' => out.push_str("%26"),
            c => out.push(c),
        }
    }
    format!("sqlite://{}", out)
}

/// Names end up in SQL text and file names: ASCII letters, digits and `_`, not starting with a digit.
fn validate_name(name: &str) -> Result<(), StoreError> {
    let mut chars = name.chars();
    let ok = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidName(name.to_string()))
    }
}

/// Handle to the SQLite cache database.
///
/// The default file lives under the XDG state directory:
/// `~/.local/state/assetcache/<database>.db`.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
    table: String,
    key: String,
    schema_version: u32,
}

impl SqliteStore {
    /// Open (or create) the store in the XDG state directory.
    pub async fn open_default(cfg: &StoreConfig) -> Result<Self, StoreError> {
        validate_name(&cfg.database)?;
        let state_dir = config::state_dir().map_err(|e| StoreError::Other(e.to_string()))?;
        Self::open_at(state_dir.join(format!("{}.db", cfg.database)), cfg).await
    }

    /// Open (or create) the store at a specific path. Creates parent dirs if needed.
    pub async fn open_at(path: impl AsRef<Path>, cfg: &StoreConfig) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let uri = path_to_sqlite_uri(path) + "?mode=rwc";
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect(&uri)
            .await?;
        Self::with_pool(pool, cfg).await
    }

    async fn with_pool(pool: Pool<Sqlite>, cfg: &StoreConfig) -> Result<Self, StoreError> {
        validate_name(&cfg.object_store)?;
        let store = SqliteStore {
            pool,
            table: cfg.object_store.clone(),
            key: cfg.key.clone(),
            schema_version: cfg.schema_version,
        };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        let row = sqlx::query("PRAGMA user_version")
            .fetch_one(&self.pool)
            .await?;
        let current: i64 = row.try_get(0)?;

        if current != i64::from(self.schema_version) {
            if current != 0 {
                tracing::info!(
                    from = current,
                    to = self.schema_version,
                    "cache schema version changed, recreating {}",
                    self.table
                );
            }
            sqlx::query(&format!(r#"DROP TABLE IF EXISTS "{}""#, self.table))
                .execute(&self.pool)
                .await?;
            // PRAGMA does not take bind parameters.
            sqlx::query(&format!("PRAGMA user_version = {}", self.schema_version))
                .execute(&self.pool)
                .await?;
        }

        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS "{}" (
                key TEXT PRIMARY KEY,
                content BLOB NOT NULL,
                content_type TEXT NOT NULL,
                stored_at INTEGER NOT NULL
            );
            "#,
            self.table
        ))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl PersistentStore for SqliteStore {
    async fn get(&self) -> Result<Option<StoredEntry>, StoreError> {
        let row = sqlx::query(&format!(
            r#"SELECT content, content_type, stored_at FROM "{}" WHERE key = ?1"#,
            self.table
        ))
        .bind(&self.key)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let content: Vec<u8> = row.try_get("content")?;
        let content_type: String = row.try_get("content_type")?;
        let stored_at: i64 = row.try_get("stored_at")?;
        Ok(Some(StoredEntry {
            asset: Asset::new(content, content_type),
            stored_at,
        }))
    }

    async fn put(&self, asset: &Asset) -> Result<(), StoreError> {
        sqlx::query(&format!(
            r#"
            INSERT INTO "{}" (key, content, content_type, stored_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(key) DO UPDATE SET
                content = excluded.content,
                content_type = excluded.content_type,
                stored_at = excluded.stored_at
            "#,
            self.table
        ))
        .bind(&self.key)
        .bind(asset.content())
        .bind(asset.content_type())
        .bind(unix_timestamp())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self) -> Result<(), StoreError> {
        sqlx::query(&format!(r#"DELETE FROM "{}" WHERE key = ?1"#, self.table))
            .bind(&self.key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
