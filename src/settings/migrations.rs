//! Versioned migrations for the settings database.
//!
//! The applied version lives in the `meta` table under `schema_version`.
//! Each migration runs exactly once.

use rusqlite::{Connection, OptionalExtension};

use crate::error::{AstroError, Result};

/// Current schema version. Increment when adding new migrations.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

type MigrationFn = fn(&Connection) -> Result<()>;

/// All migrations in order. Index + 1 = version number.
const MIGRATIONS: &[MigrationFn] = &[migration_v1_settings, migration_v2_change_log];

/// Runs all pending migrations.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;
    if current_version > CURRENT_SCHEMA_VERSION {
        return Err(AstroError::Settings(format!(
            "settings schema version {} is newer than this binary ({})",
            current_version, CURRENT_SCHEMA_VERSION
        )));
    }

    for (idx, migration) in MIGRATIONS.iter().enumerate() {
        let version = (idx + 1) as u32;
        if version > current_version {
            let tx = conn.unchecked_transaction()?;
            migration(&tx)?;
            set_schema_version(&tx, version)?;
            tx.commit()?;
            tracing::debug!("applied settings migration v{}", version);
        }
    }

    Ok(())
}

pub fn get_schema_version(conn: &Connection) -> Result<u32> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS meta (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
        [],
    )?;

    let version: Option<String> = conn
        .query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;

    match version {
        Some(v) => v
            .parse()
            .map_err(|_| AstroError::Settings(format!("corrupt schema version: {}", v))),
        None => Ok(0),
    }
}

fn set_schema_version(conn: &Connection, version: u32) -> Result<()> {
    conn.execute(
        "INSERT INTO meta (key, value) VALUES ('schema_version', ?1)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        [version.to_string()],
    )?;
    Ok(())
}

/// v1: key/value store with JSON-encoded values.
fn migration_v1_settings(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL CHECK (json_valid(value)),
            updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );
        "#,
    )?;
    Ok(())
}

/// v2: change log filled by triggers, polled by the change listener.
fn migration_v2_change_log(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS setting_changes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            key TEXT NOT NULL,
            changed_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE TRIGGER IF NOT EXISTS settings_after_insert
        AFTER INSERT ON settings
        BEGIN
            INSERT INTO setting_changes (key) VALUES (NEW.key);
        END;

        CREATE TRIGGER IF NOT EXISTS settings_after_update
        AFTER UPDATE OF value ON settings
        WHEN OLD.value IS NOT NEW.value
        BEGIN
            INSERT INTO setting_changes (key) VALUES (NEW.key);
        END;

        CREATE TRIGGER IF NOT EXISTS settings_after_delete
        AFTER DELETE ON settings
        BEGIN
            INSERT INTO setting_changes (key) VALUES (OLD.key);
        END;
        "#,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_exists(conn: &Connection, table: &str) -> bool {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [table],
            |row| row.get::<_, i64>(0),
        )
        .unwrap()
            > 0
    }

    #[test]
    fn test_migrations_from_scratch() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
        assert!(table_exists(&conn, "settings"));
        assert!(table_exists(&conn, "setting_changes"));
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn test_triggers_log_changes() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        conn.execute("INSERT INTO settings (key, value) VALUES ('theme', '\"light\"')", [])
            .unwrap();
        conn.execute("UPDATE settings SET value = '\"dark\"' WHERE key = 'theme'", [])
            .unwrap();
        // same value: no change recorded
        conn.execute("UPDATE settings SET value = '\"dark\"' WHERE key = 'theme'", [])
            .unwrap();
        conn.execute("DELETE FROM settings WHERE key = 'theme'", []).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM setting_changes WHERE key = 'theme'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_rejects_invalid_json() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        assert!(conn
            .execute("INSERT INTO settings (key, value) VALUES ('theme', 'not json')", [])
            .is_err());
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        set_schema_version(&conn, CURRENT_SCHEMA_VERSION + 1).unwrap();
        assert!(matches!(run_migrations(&conn), Err(AstroError::Settings(_))));
    }
}
