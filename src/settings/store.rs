use std::path::Path;
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AstroError, Result};
use crate::settings::migrations::run_migrations;

/// Well-known setting keys.
pub mod keys {
    pub const THEME: &str = "theme";
    pub const LANGUAGE: &str = "language";
    pub const TIMEZONE: &str = "timezone";
    pub const DATE_FORMAT: &str = "date_format";
    pub const TIME_FORMAT: &str = "time_format";
    pub const RECENT_FILES: &str = "recent_files";
}

/// Values written by [`SettingsStore::seed_defaults`].
pub fn default_settings() -> Vec<(&'static str, Value)> {
    vec![
        (keys::THEME, Value::from("light")),
        (keys::LANGUAGE, Value::from("en")),
        (keys::TIMEZONE, Value::from("+05:30")),
        (keys::DATE_FORMAT, Value::from("%d-%m-%Y")),
        (keys::TIME_FORMAT, Value::from("%H:%M:%S")),
        (keys::RECENT_FILES, Value::Array(Vec::new())),
    ]
}

/// One row of the change log. `value` is the current value of the key,
/// `None` once the key has been removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingChange {
    pub id: i64,
    pub key: String,
    pub value: Option<Value>,
    pub changed_at: String,
}

/// Persistent application settings in SQLite.
pub struct SettingsStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SettingsStore {
    const POOL_SIZE: u32 = 4;

    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
            conn.execute_batch(
                r#"
                PRAGMA journal_mode = WAL;
                PRAGMA synchronous = NORMAL;
                PRAGMA foreign_keys = ON;
                PRAGMA busy_timeout = 5000;
                "#,
            )
        });
        let pool = Pool::builder()
            .max_size(Self::POOL_SIZE)
            .connection_timeout(Duration::from_secs(10))
            .build(manager)?;

        run_migrations(&*pool.get()?)?;
        tracing::debug!("settings store opened at {}", db_path.display());
        Ok(Self { pool })
    }

    /// Raw JSON value of `key`.
    pub fn get_value(&self, key: &str) -> Result<Option<Value>> {
        let conn = self.pool.get()?;
        let raw: Option<String> = conn
            .query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        raw.map(|text| serde_json::from_str(&text).map_err(AstroError::from))
            .transpose()
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_value(key)? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| AstroError::Settings(format!("setting '{}' has unexpected type: {}", key, e))),
            None => Ok(None),
        }
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T> {
        Ok(self.get(key)?.unwrap_or(default))
    }

    /// Inserts or updates `key`. Unchanged values leave the change log alone.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        if key.trim().is_empty() {
            return Err(AstroError::Settings("setting key must not be empty".into()));
        }
        let json = serde_json::to_string(value)?;
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
             WHERE settings.value IS NOT excluded.value",
            params![key, json],
        )?;
        tracing::debug!("setting '{}' = {}", key, json);
        Ok(())
    }

    /// Removes `key`; returns whether it existed.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let conn = self.pool.get()?;
        let removed = conn.execute("DELETE FROM settings WHERE key = ?1", [key])?;
        Ok(removed > 0)
    }

    /// All settings, ordered by key.
    pub fn list(&self) -> Result<Vec<(String, Value)>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare("SELECT key, value FROM settings ORDER BY key")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut settings = Vec::new();
        for row in rows {
            let (key, raw) = row?;
            settings.push((key, serde_json::from_str(&raw)?));
        }
        Ok(settings)
    }

    /// Writes every default that is not already present. Returns how many
    /// were inserted.
    pub fn seed_defaults(&self) -> Result<usize> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let mut inserted = 0;
        for (key, value) in default_settings() {
            inserted += tx.execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2) ON CONFLICT(key) DO NOTHING",
                params![key, serde_json::to_string(&value)?],
            )?;
        }
        tx.commit()?;
        if inserted > 0 {
            tracing::info!("seeded {} default settings", inserted);
        }
        Ok(inserted)
    }

    /// Id of the newest change-log row, 0 when empty.
    pub fn latest_change_id(&self) -> Result<i64> {
        let conn = self.pool.get()?;
        let id: Option<i64> = conn.query_row("SELECT MAX(id) FROM setting_changes", [], |row| row.get(0))?;
        Ok(id.unwrap_or(0))
    }

    /// Change-log rows newer than `after_id`, oldest first.
    pub fn changes_since(&self, after_id: i64) -> Result<Vec<SettingChange>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT c.id, c.key, s.value, c.changed_at
             FROM setting_changes c
             LEFT JOIN settings s ON s.key = c.key
             WHERE c.id > ?1
             ORDER BY c.id",
        )?;
        let rows = stmt.query_map([after_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut changes = Vec::new();
        for row in rows {
            let (id, key, raw, changed_at) = row?;
            let value = raw.map(|text| serde_json::from_str(&text)).transpose()?;
            changes.push(SettingChange {
                id,
                key,
                value,
                changed_at,
            });
        }
        Ok(changes)
    }
}
