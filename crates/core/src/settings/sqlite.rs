//! SQLite-backed settings store.

use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::{MediaServerSettings, SettingsError, SettingsStore};

/// SQLite-backed settings store holding exactly one row.
pub struct SqliteSettingsStore {
    conn: Mutex<Connection>,
}

impl SqliteSettingsStore {
    /// Open (or create) the settings table in the given database file.
    pub fn new(path: &Path) -> Result<Self, SettingsError> {
        let conn = Connection::open(path).map_err(|e| SettingsError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory settings store (useful for testing).
    pub fn in_memory() -> Result<Self, SettingsError> {
        let conn =
            Connection::open_in_memory().map_err(|e| SettingsError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), SettingsError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS media_server_settings (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                url TEXT NOT NULL,
                access_key TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| SettingsError::Database(e.to_string()))?;

        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, SettingsError> {
        self.conn
            .lock()
            .map_err(|_| SettingsError::Database("settings connection poisoned".to_string()))
    }
}

impl SettingsStore for SqliteSettingsStore {
    fn load(&self) -> Result<MediaServerSettings, SettingsError> {
        let conn = self.lock()?;

        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT url, access_key FROM media_server_settings WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| SettingsError::Database(e.to_string()))?;

        match row {
            Some((url, access_key)) => {
                let settings = MediaServerSettings::new(url, access_key);
                if settings.is_complete() {
                    Ok(settings)
                } else {
                    Err(SettingsError::NotConfigured)
                }
            }
            None => Err(SettingsError::NotConfigured),
        }
    }

    fn save(&self, settings: &MediaServerSettings) -> Result<(), SettingsError> {
        if !settings.is_complete() {
            return Err(SettingsError::Invalid(
                "url and access_key are both required".to_string(),
            ));
        }
        if !settings.url.starts_with("http://") && !settings.url.starts_with("https://") {
            return Err(SettingsError::Invalid(format!(
                "url must start with http:// or https://, got '{}'",
                settings.url
            )));
        }

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO media_server_settings (id, url, access_key, updated_at)
             VALUES (1, ?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                url = excluded.url,
                access_key = excluded.access_key,
                updated_at = excluded.updated_at",
            params![
                settings.url.trim_end_matches('/'),
                &settings.access_key,
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| SettingsError::Database(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_without_row_is_not_configured() {
        let store = SqliteSettingsStore::in_memory().unwrap();
        assert!(matches!(store.load(), Err(SettingsError::NotConfigured)));
    }

    #[test]
    fn test_save_then_load() {
        let store = SqliteSettingsStore::in_memory().unwrap();
        store
            .save(&MediaServerSettings::new("http://media.local:8096/", "key-1"))
            .unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.url, "http://media.local:8096");
        assert_eq!(loaded.access_key, "key-1");
    }

    #[test]
    fn test_save_overwrites_single_row() {
        let store = SqliteSettingsStore::in_memory().unwrap();
        store
            .save(&MediaServerSettings::new("http://a", "key-1"))
            .unwrap();
        store
            .save(&MediaServerSettings::new("https://b", "key-2"))
            .unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.url, "https://b");
        assert_eq!(loaded.access_key, "key-2");

        let conn = store.conn.lock().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM media_server_settings", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_save_rejects_incomplete_settings() {
        let store = SqliteSettingsStore::in_memory().unwrap();
        let result = store.save(&MediaServerSettings::new("http://a", ""));
        assert!(matches!(result, Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn test_save_rejects_non_http_url() {
        let store = SqliteSettingsStore::in_memory().unwrap();
        let result = store.save(&MediaServerSettings::new("ftp://a", "key"));
        assert!(matches!(result, Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn test_blank_row_is_not_configured() {
        let store = SqliteSettingsStore::in_memory().unwrap();
        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO media_server_settings (id, url, access_key, updated_at)
                 VALUES (1, 'http://a', '', '2024-01-01T00:00:00Z')",
                [],
            )
            .unwrap();
        }
        assert!(matches!(store.load(), Err(SettingsError::NotConfigured)));
    }

    #[test]
    fn test_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("settings.db");

        {
            let store = SqliteSettingsStore::new(&db_path).unwrap();
            store
                .save(&MediaServerSettings::new("http://media", "persisted"))
                .unwrap();
        }

        let store = SqliteSettingsStore::new(&db_path).unwrap();
        assert_eq!(store.load().unwrap().access_key, "persisted");
    }
}
