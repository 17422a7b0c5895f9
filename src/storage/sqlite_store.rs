use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use directories::ProjectDirs;
use rusqlite::{params, Connection};

use super::{BucketStore, Granularity, KeyValue};

const SCHEMA_VERSION: i64 = 1;

/// Sqlite-backed bucket store. The connection sits behind a mutex so the
/// trait's concurrent-read contract holds; bucket reads are point
/// lookups and never hold the lock for long.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

fn db_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "faretab").map(|d| d.data_dir().join("buckets.db"))
}

impl SqliteStore {
    pub fn open() -> Self {
        let path = db_path();
        let conn = match &path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    let _ = std::fs::create_dir_all(parent);
                }
                Connection::open(path).expect("Failed to open sqlite database")
            }
            None => Connection::open_in_memory().expect("Failed to open in-memory sqlite"),
        };

        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")
            .expect("Failed to set sqlite pragmas");

        // Bucket data is re-importable, so an outdated schema is dropped
        // and recreated rather than migrated.
        let version: i64 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap_or(0);
        if version < SCHEMA_VERSION {
            conn.execute_batch(
                "DROP TABLE IF EXISTS buckets;
                 DROP TABLE IF EXISTS user_settings;",
            )
            .expect("Failed to drop old tables");
        }

        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS buckets (
                 granularity TEXT NOT NULL,
                 key         TEXT NOT NULL,
                 value       TEXT NOT NULL,
                 PRIMARY KEY (granularity, key)
             );

             CREATE TABLE IF NOT EXISTS user_settings (
                 key   TEXT PRIMARY KEY,
                 value TEXT NOT NULL
             );

             PRAGMA user_version = {SCHEMA_VERSION};"
        ))
        .expect("Failed to initialize sqlite schema");

        Self {
            conn: Mutex::new(conn),
            path,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("sqlite connection lock poisoned"))
    }
}

impl BucketStore for SqliteStore {
    fn get(&self, granularity: Granularity, keys: &[String]) -> Result<Vec<KeyValue>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT value FROM buckets WHERE granularity = ?1 AND key = ?2")?;

        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            let value = stmt
                .query_row(params![granularity.as_str(), key], |row| {
                    row.get::<_, String>(0)
                })
                .map(Some)
                .or_else(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => Ok(None),
                    other => Err(other),
                })?;
            out.push(KeyValue {
                key: key.clone(),
                value,
            });
        }
        Ok(out)
    }

    fn put(&mut self, granularity: Granularity, kvs: Vec<KeyValue>) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for kv in kvs {
            match kv.value {
                Some(value) => {
                    tx.execute(
                        "INSERT OR REPLACE INTO buckets (granularity, key, value)
                         VALUES (?1, ?2, ?3)",
                        params![granularity.as_str(), kv.key, value],
                    )?;
                }
                None => {
                    tx.execute(
                        "DELETE FROM buckets WHERE granularity = ?1 AND key = ?2",
                        params![granularity.as_str(), kv.key],
                    )?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn get_user(&self, keys: &[String]) -> Result<Vec<KeyValue>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT value FROM user_settings WHERE key = ?1")?;

        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            let value = stmt
                .query_row(params![key], |row| row.get::<_, String>(0))
                .map(Some)
                .or_else(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => Ok(None),
                    other => Err(other),
                })?;
            out.push(KeyValue {
                key: key.clone(),
                value,
            });
        }
        Ok(out)
    }

    fn put_user(&mut self, kvs: Vec<KeyValue>) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for kv in kvs {
            match kv.value {
                Some(value) => {
                    tx.execute(
                        "INSERT OR REPLACE INTO user_settings (key, value) VALUES (?1, ?2)",
                        params![kv.key, value],
                    )?;
                }
                None => {
                    tx.execute("DELETE FROM user_settings WHERE key = ?1", params![kv.key])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        // WAL mode: writes are already persisted.
        Ok(())
    }

    fn watch_path(&self) -> Option<PathBuf> {
        self.path.as_ref().and_then(|p| p.parent().map(PathBuf::from))
    }
}
