//! SQLite-backed durable thumbnail store.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};
use tracing::{debug, info};

use crate::domain::entities::{CacheEntry, EncodedThumbnail, ImageSize, Thumbnails};
use crate::domain::errors::{StoreError, StoreResult};
use crate::domain::ports::{EvictionCandidate, ThumbnailStorePort};

/// File name of the thumbnail database.
pub const DATABASE_FILE_NAME: &str = "memoreye-image-cache.sqlite3";

/// Schema version stored in `PRAGMA user_version`.
pub const SCHEMA_VERSION: i32 = 1;

const SELECT_ENTRY: &str = "SELECT url, thumb_small, thumb_medium, thumb_large, aspect_ratio,
            width, height, timestamp, estimated_byte_size
     FROM thumbnails WHERE url = ?1";

/// Durable store keeping one row per source URL, indexed by write time.
pub struct SqliteThumbnailStore {
    conn: Arc<Mutex<Connection>>,
    db_path: Option<PathBuf>,
}

impl SqliteThumbnailStore {
    /// Opens or creates the database at `path`.
    ///
    /// # Errors
    /// Returns error if the file cannot be opened or its schema is unusable.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let db_path = path.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::unavailable(format!("failed to create cache directory: {e}"))
            })?;
        }

        let conn = Connection::open(&db_path).map_err(map_sqlite_error)?;
        let store = Self::init(conn, Some(db_path))?;

        if let Some(path) = &store.db_path {
            info!(path = %path.display(), "Thumbnail database opened");
        }
        Ok(store)
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    /// Returns error if SQLite cannot allocate the database.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory().map_err(map_sqlite_error)?;
        Self::init(conn, None)
    }

    fn init(conn: Connection, db_path: Option<PathBuf>) -> StoreResult<Self> {
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(map_sqlite_error)?;
        Self::migrate(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            db_path,
        })
    }

    fn migrate(conn: &Connection) -> StoreResult<()> {
        let version: i32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .map_err(map_sqlite_error)?;

        if version > SCHEMA_VERSION {
            return Err(StoreError::unavailable(format!(
                "database schema version {version} is newer than supported {SCHEMA_VERSION}"
            )));
        }

        if version < SCHEMA_VERSION {
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS thumbnails (
                    url                 TEXT PRIMARY KEY NOT NULL,
                    thumb_small         TEXT NOT NULL,
                    thumb_medium        TEXT NOT NULL,
                    thumb_large         TEXT NOT NULL,
                    aspect_ratio        REAL NOT NULL,
                    width               INTEGER NOT NULL,
                    height              INTEGER NOT NULL,
                    timestamp           INTEGER NOT NULL,
                    estimated_byte_size INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_thumbnails_timestamp
                    ON thumbnails(timestamp);
                PRAGMA user_version = 1;",
            )
            .map_err(map_sqlite_error)?;
            debug!(version = SCHEMA_VERSION, "Thumbnail schema initialized");
        }

        Ok(())
    }

    /// Path of the database file, or None when in memory.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Runs `f` against the connection on the blocking pool.
    async fn run<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock();
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::unavailable(format!("store task failed: {e}")))?
        .map_err(map_sqlite_error)
    }
}

impl std::fmt::Debug for SqliteThumbnailStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteThumbnailStore")
            .field("db_path", &self.db_path)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ThumbnailStorePort for SqliteThumbnailStore {
    async fn get(&self, url: &str) -> StoreResult<Option<CacheEntry>> {
        let url = url.to_string();
        self.run(move |conn| {
            conn.query_row(SELECT_ENTRY, [&url], entry_from_row)
                .optional()
        })
        .await
    }

    async fn put(&self, entry: CacheEntry) -> StoreResult<()> {
        self.run(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO thumbnails (
                    url, thumb_small, thumb_medium, thumb_large, aspect_ratio,
                    width, height, timestamp, estimated_byte_size
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    entry.url,
                    entry.thumbnails.small.as_str(),
                    entry.thumbnails.medium.as_str(),
                    entry.thumbnails.large.as_str(),
                    entry.aspect_ratio,
                    entry.size.width,
                    entry.size.height,
                    entry.timestamp,
                    i64::try_from(entry.estimated_byte_size).unwrap_or(i64::MAX),
                ],
            )
            .map(|_| ())
        })
        .await
    }

    async fn delete(&self, url: &str) -> StoreResult<()> {
        let url = url.to_string();
        self.run(move |conn| {
            conn.execute("DELETE FROM thumbnails WHERE url = ?1", [&url])
                .map(|_| ())
        })
        .await
    }

    async fn delete_many(&self, urls: &[String]) -> StoreResult<()> {
        let urls = urls.to_vec();
        self.run(move |conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare("DELETE FROM thumbnails WHERE url = ?1")?;
                for url in &urls {
                    stmt.execute([url])?;
                }
            }
            tx.commit()
        })
        .await
    }

    async fn clear(&self) -> StoreResult<()> {
        self.run(|conn| conn.execute("DELETE FROM thumbnails", []).map(|_| ()))
            .await
    }

    async fn total_size(&self) -> StoreResult<u64> {
        self.run(|conn| {
            conn.query_row(
                "SELECT COALESCE(SUM(estimated_byte_size), 0) FROM thumbnails",
                [],
                |row| row.get::<_, i64>(0),
            )
        })
        .await
        .map(|total| u64::try_from(total).unwrap_or(0))
    }

    async fn len(&self) -> StoreResult<usize> {
        self.run(|conn| {
            conn.query_row("SELECT COUNT(*) FROM thumbnails", [], |row| {
                row.get::<_, i64>(0)
            })
        })
        .await
        .map(|count| usize::try_from(count).unwrap_or(0))
    }

    async fn oldest_first(&self) -> StoreResult<Vec<EvictionCandidate>> {
        self.run(|conn| {
            let mut stmt = conn.prepare(
                "SELECT url, estimated_byte_size, timestamp
                 FROM thumbnails
                 ORDER BY timestamp ASC, url ASC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(EvictionCandidate {
                    url: row.get(0)?,
                    estimated_byte_size: u64::try_from(row.get::<_, i64>(1)?).unwrap_or(0),
                    timestamp: row.get(2)?,
                })
            })?;
            rows.collect()
        })
        .await
    }
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<CacheEntry> {
    Ok(CacheEntry {
        url: row.get(0)?,
        thumbnails: Thumbnails {
            small: EncodedThumbnail::from_data_url(row.get::<_, String>(1)?),
            medium: EncodedThumbnail::from_data_url(row.get::<_, String>(2)?),
            large: EncodedThumbnail::from_data_url(row.get::<_, String>(3)?),
        },
        aspect_ratio: row.get(4)?,
        size: ImageSize::new(row.get(5)?, row.get(6)?),
        timestamp: row.get(7)?,
        estimated_byte_size: u64::try_from(row.get::<_, i64>(8)?).unwrap_or(0),
    })
}

fn map_sqlite_error(e: rusqlite::Error) -> StoreError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _) => match err.code {
            ErrorCode::DiskFull => StoreError::quota_exceeded(e.to_string()),
            ErrorCode::DatabaseCorrupt | ErrorCode::NotADatabase => {
                StoreError::corrupt(e.to_string())
            }
            _ => StoreError::unavailable(e.to_string()),
        },
        _ => StoreError::unavailable(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::fixtures::payload_with_len;
    use tempfile::TempDir;

    fn entry(url: &str, timestamp: i64) -> CacheEntry {
        CacheEntry::new(url, payload_with_len(100), timestamp)
    }

    fn create_test_store() -> (SqliteThumbnailStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteThumbnailStore::open(temp_dir.path().join(DATABASE_FILE_NAME)).unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let (store, _temp) = create_test_store();
        let written = entry("file:///a.jpg", 42);

        store.put(written.clone()).await.unwrap();
        let read = store.get("file:///a.jpg").await.unwrap();

        assert_eq!(read, Some(written));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let (store, _temp) = create_test_store();
        assert_eq!(store.get("file:///missing.jpg").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_replaces_row() {
        let (store, _temp) = create_test_store();

        store.put(entry("u", 1)).await.unwrap();
        store
            .put(CacheEntry::new("u", payload_with_len(200), 2))
            .await
            .unwrap();

        assert_eq!(store.len().await.unwrap(), 1);
        assert_eq!(store.get("u").await.unwrap().unwrap().timestamp, 2);
        assert_eq!(store.total_size().await.unwrap(), 450);
    }

    #[tokio::test]
    async fn test_oldest_first_orders_by_timestamp() {
        let (store, _temp) = create_test_store();
        store.put(entry("c", 30)).await.unwrap();
        store.put(entry("a", 10)).await.unwrap();
        store.put(entry("b", 20)).await.unwrap();

        let urls: Vec<String> = store
            .oldest_first()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.url)
            .collect();

        assert_eq!(urls, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_delete_many_and_clear() {
        let (store, _temp) = create_test_store();
        for (i, url) in ["a", "b", "c"].into_iter().enumerate() {
            store
                .put(entry(url, i64::try_from(i).unwrap()))
                .await
                .unwrap();
        }

        store
            .delete_many(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(store.len().await.unwrap(), 1);
        assert_eq!(store.total_size().await.unwrap(), 225);

        store.delete("c").await.unwrap();
        store.delete("c").await.unwrap();
        assert_eq!(store.len().await.unwrap(), 0);

        store.put(entry("d", 4)).await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.total_size().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_data_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join(DATABASE_FILE_NAME);

        {
            let store = SqliteThumbnailStore::open(&path).unwrap();
            store.put(entry("u", 7)).await.unwrap();
        }

        let store = SqliteThumbnailStore::open(&path).unwrap();
        assert_eq!(store.path(), Some(path.as_path()));
        assert_eq!(store.get("u").await.unwrap().unwrap().timestamp, 7);
    }

    #[test]
    fn test_schema_has_version_and_timestamp_index() {
        let store = SqliteThumbnailStore::open_in_memory().unwrap();
        let conn = store.conn.lock();

        let version: i32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        let index_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master
                 WHERE type = 'index' AND name = 'idx_thumbnails_timestamp'",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(version, SCHEMA_VERSION);
        assert_eq!(index_count, 1);
    }

    #[test]
    fn test_garbage_file_fails_to_open() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(DATABASE_FILE_NAME);
        std::fs::write(&path, vec![0x5a_u8; 4096]).unwrap();

        assert!(SqliteThumbnailStore::open(&path).is_err());
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(DATABASE_FILE_NAME);
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch("PRAGMA user_version = 9;").unwrap();
        }

        let err = SqliteThumbnailStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { .. }));
    }
}
