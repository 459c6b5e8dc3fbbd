use super::schema;
use super::{check_key, BlobError, BlobResult, BlobStore};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Blob store over the `kv_store` table of a SQLite database.
pub struct SqliteBlobStore {
    conn: Connection,
}

impl SqliteBlobStore {
    /// Opens (or creates) the database file and upgrades its schema.
    pub fn open(path: impl AsRef<Path>) -> BlobResult<Self> {
        Self::connect("file", || Connection::open(path))
    }

    pub fn open_in_memory() -> BlobResult<Self> {
        Self::connect("memory", Connection::open_in_memory)
    }

    /// Adopts an open connection, upgrading its schema first.
    pub fn from_connection(mut conn: Connection) -> BlobResult<Self> {
        schema::upgrade(&mut conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// `kv_store` revision recorded in the database file.
    pub fn schema_version(&self) -> BlobResult<u32> {
        schema::stored_version(&self.conn)
    }

    fn connect(
        target: &str,
        open: impl FnOnce() -> rusqlite::Result<Connection>,
    ) -> BlobResult<Self> {
        let started_at = Instant::now();
        let opened = open().map_err(BlobError::from).and_then(|mut conn| {
            conn.busy_timeout(BUSY_TIMEOUT)?;
            let applied = schema::upgrade(&mut conn)?;
            Ok((conn, applied))
        });

        match opened {
            Ok((conn, applied)) => {
                info!(
                    "event=blob_open module=storage status=ok backend=sqlite target={target} applied={applied} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(Self { conn })
            }
            Err(err) => {
                error!(
                    "event=blob_open module=storage status=error backend=sqlite target={target} duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }
}

impl BlobStore for SqliteBlobStore {
    fn get(&self, key: &str) -> BlobResult<Option<Vec<u8>>> {
        check_key(key)?;
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &[u8]) -> BlobResult<()> {
        check_key(key)?;
        self.conn.execute(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }
}
