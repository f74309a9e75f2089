//! SQLite-backed catalog implementation.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection};

use super::{
    CatalogEntry, CatalogError, CatalogItem, CatalogSearchQuery, CatalogStats, CatalogStore,
    MediaType,
};

/// Ids per `IN (...)` clause, below SQLite's bound-parameter limit.
const LOOKUP_CHUNK_SIZE: usize = 500;

const SELECT_COLUMNS: &str = "external_item_id, media_type, title, overview, poster_ref,
    backdrop_ref, release_date, external_metadata_id, secondary_metadata_id, genres, rating,
    synced_at";

/// SQLite-backed catalog.
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    /// Create a new SQLite catalog, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, CatalogError> {
        let conn = Connection::open(path).map_err(|e| CatalogError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite catalog (useful for testing).
    pub fn in_memory() -> Result<Self, CatalogError> {
        let conn =
            Connection::open_in_memory().map_err(|e| CatalogError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CatalogError> {
        conn.execute_batch(
            r#"
            -- One row per media server item
            CREATE TABLE IF NOT EXISTS catalog_items (
                external_item_id TEXT PRIMARY KEY,
                media_type TEXT NOT NULL,
                title TEXT NOT NULL,
                overview TEXT NOT NULL DEFAULT '',
                poster_ref TEXT,
                backdrop_ref TEXT,
                release_date TEXT,
                external_metadata_id INTEGER,
                secondary_metadata_id TEXT,
                genres TEXT NOT NULL DEFAULT '[]',
                rating REAL,
                synced_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_catalog_items_metadata_id ON catalog_items(external_metadata_id);
            CREATE INDEX IF NOT EXISTS idx_catalog_items_media_type ON catalog_items(media_type);
            CREATE INDEX IF NOT EXISTS idx_catalog_items_title ON catalog_items(title);
            "#,
        )
        .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, CatalogError> {
        self.conn
            .lock()
            .map_err(|_| CatalogError::Internal("catalog connection poisoned".to_string()))
    }

    /// Convert a row (selected with `SELECT_COLUMNS`) to a CatalogEntry.
    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<CatalogEntry> {
        let media_type_str: String = row.get(1)?;
        let media_type = media_type_str.parse::<MediaType>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                1,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?;

        let genres_json: String = row.get(9)?;
        let genres: Vec<String> = serde_json::from_str(&genres_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(9, rusqlite::types::Type::Text, Box::new(e))
        })?;

        let synced_at_str: String = row.get(11)?;
        let synced_at = DateTime::parse_from_rfc3339(&synced_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    11,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;

        Ok(CatalogEntry {
            item: CatalogItem {
                external_item_id: row.get(0)?,
                media_type,
                title: row.get(2)?,
                overview: row.get(3)?,
                poster_ref: row.get(4)?,
                backdrop_ref: row.get(5)?,
                release_date: row.get(6)?,
                external_metadata_id: row.get(7)?,
                secondary_metadata_id: row.get(8)?,
                genres,
                rating: row.get(10)?,
            },
            synced_at,
        })
    }
}

impl CatalogStore for SqliteCatalog {
    fn upsert_batch(&self, items: &[CatalogItem]) -> Result<usize, CatalogError> {
        if items.is_empty() {
            return Ok(0);
        }

        let mut conn = self.lock()?;
        let now_str = Utc::now().to_rfc3339();

        let tx = conn
            .transaction()
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT INTO catalog_items (external_item_id, media_type, title, overview,
                        poster_ref, backdrop_ref, release_date, external_metadata_id,
                        secondary_metadata_id, genres, rating, synced_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                     ON CONFLICT(external_item_id) DO UPDATE SET
                        media_type = excluded.media_type,
                        title = excluded.title,
                        overview = excluded.overview,
                        poster_ref = excluded.poster_ref,
                        backdrop_ref = excluded.backdrop_ref,
                        release_date = excluded.release_date,
                        external_metadata_id = excluded.external_metadata_id,
                        secondary_metadata_id = excluded.secondary_metadata_id,
                        genres = excluded.genres,
                        rating = excluded.rating,
                        synced_at = excluded.synced_at",
                )
                .map_err(|e| CatalogError::Database(e.to_string()))?;

            for item in items {
                let genres_json = serde_json::to_string(&item.genres)
                    .map_err(|e| CatalogError::Internal(e.to_string()))?;

                stmt.execute(params![
                    &item.external_item_id,
                    item.media_type.as_str(),
                    &item.title,
                    &item.overview,
                    &item.poster_ref,
                    &item.backdrop_ref,
                    &item.release_date,
                    item.external_metadata_id,
                    &item.secondary_metadata_id,
                    genres_json,
                    item.rating,
                    &now_str,
                ])
                .map_err(|e| {
                    CatalogError::Database(format!(
                        "upsert of item {} failed: {}",
                        item.external_item_id, e
                    ))
                })?;
            }
        }

        // Dropping the transaction without commit rolls the whole batch back.
        tx.commit()
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(items.len())
    }

    fn get(&self, external_item_id: &str) -> Result<CatalogEntry, CatalogError> {
        let conn = self.lock()?;

        conn.query_row(
            &format!(
                "SELECT {} FROM catalog_items WHERE external_item_id = ?",
                SELECT_COLUMNS
            ),
            params![external_item_id],
            Self::row_to_entry,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                CatalogError::NotFound(external_item_id.to_string())
            }
            _ => CatalogError::Database(e.to_string()),
        })
    }

    fn search(&self, query: &CatalogSearchQuery) -> Result<Vec<CatalogEntry>, CatalogError> {
        let conn = self.lock()?;
        let search_pattern = format!("%{}%", escape_like(&query.query));

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM catalog_items
                 WHERE title LIKE ?1 ESCAPE '\\' AND (?2 IS NULL OR media_type = ?2)
                 ORDER BY title COLLATE NOCASE ASC
                 LIMIT ?3",
                SELECT_COLUMNS
            ))
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(
                params![
                    &search_pattern,
                    query.media_type.map(|m| m.as_str()),
                    query.limit as i64
                ],
                Self::row_to_entry,
            )
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| CatalogError::Database(e.to_string()))?);
        }
        Ok(results)
    }

    fn stats(&self) -> Result<CatalogStats, CatalogError> {
        let conn = self.lock()?;

        let (total_items, movies, series, with_metadata_id, last_synced): (
            i64,
            i64,
            i64,
            i64,
            Option<String>,
        ) = conn
            .query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(CASE WHEN media_type = 'movie' THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(CASE WHEN media_type = 'tv' THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(CASE WHEN external_metadata_id IS NOT NULL THEN 1 ELSE 0 END), 0),
                        MAX(synced_at)
                 FROM catalog_items",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
            )
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let last_synced_at = last_synced
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Ok(CatalogStats {
            total_items: total_items as u64,
            movies: movies as u64,
            series: series as u64,
            with_metadata_id: with_metadata_id as u64,
            last_synced_at,
        })
    }

    fn present_metadata_ids(&self, metadata_ids: &[i64]) -> Result<HashSet<i64>, CatalogError> {
        let mut present = HashSet::new();
        if metadata_ids.is_empty() {
            return Ok(present);
        }

        let conn = self.lock()?;

        for chunk in metadata_ids.chunks(LOOKUP_CHUNK_SIZE) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT DISTINCT external_metadata_id FROM catalog_items
                     WHERE external_metadata_id IN ({})",
                    placeholders
                ))
                .map_err(|e| CatalogError::Database(e.to_string()))?;

            let rows = stmt
                .query_map(params_from_iter(chunk.iter()), |row| row.get::<_, i64>(0))
                .map_err(|e| CatalogError::Database(e.to_string()))?;

            for row in rows {
                present.insert(row.map_err(|e| CatalogError::Database(e.to_string()))?);
            }
        }

        Ok(present)
    }
}

/// Escape `LIKE` wildcards so the query matches literally.
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
