#[cfg(not(feature = "sqlite"))]
pub mod file_store;
#[cfg(feature = "sqlite")]
pub mod sqlite_store;

use std::path::PathBuf;

use anyhow::Result;

/// Storage key under which the user's currency preference lives.
pub const CURRENCY_KEY: &str = "currency";

/// Time alignment of a bucket family. Each granularity is an independent
/// key space in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Day,
    Month,
    Year,
}

impl Granularity {
    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Month => "month",
            Granularity::Year => "year",
        }
    }

    pub const ALL: [Granularity; 3] = [Granularity::Day, Granularity::Month, Granularity::Year];
}

/// One stored entry. `value` holds the JSON-encoded bucket record, or
/// None for a key with no recorded activity.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValue {
    pub key: String,
    pub value: Option<String>,
}

/// Key-value storage collaborator holding raw per-bucket records plus
/// per-user settings.
///
/// Reads take `&self` (and the trait requires `Sync`) so the month,
/// year-to-date, and today fetches can run concurrently. Failures are
/// returned as-is; retries, if any, belong to the backend.
pub trait BucketStore: Send + Sync {
    /// Fetch bucket values. One result per requested key, request order.
    fn get(&self, granularity: Granularity, keys: &[String]) -> Result<Vec<KeyValue>>;

    /// Write bucket values. A `None` value deletes the key.
    fn put(&mut self, granularity: Granularity, kvs: Vec<KeyValue>) -> Result<()>;

    /// Fetch per-user settings. Same one-result-per-key contract.
    fn get_user(&self, keys: &[String]) -> Result<Vec<KeyValue>>;

    /// Write per-user settings.
    fn put_user(&mut self, kvs: Vec<KeyValue>) -> Result<()>;

    /// Persist any pending changes. No-op if nothing changed.
    fn flush(&self) -> Result<()>;

    /// Filesystem location whose mutation signals that some bucket range
    /// changed, for change subscriptions. None when the backend has no
    /// watchable path.
    fn watch_path(&self) -> Option<PathBuf> {
        None
    }
}

pub fn default_store() -> Box<dyn BucketStore> {
    #[cfg(feature = "sqlite")]
    {
        Box::new(sqlite_store::SqliteStore::open())
    }
    #[cfg(not(feature = "sqlite"))]
    {
        Box::new(file_store::FileStore::open())
    }
}
