use std::time::Duration;

use serde::Deserialize;

use crate::driver::Driver;
use crate::error::DriverError;

/// Path value that opens a private in-memory database.
pub const MEMORY_PATH: &str = ":memory:";

/// Options for opening a [`Driver`].
///
/// Deserializable so they can live in an application's config file:
/// ```rust
/// use sqlite_facade::DriverOptions;
///
/// let opts: DriverOptions = serde_json::from_str(
///     r#"{ "path": "app.db", "schema": "CREATE TABLE IF NOT EXISTS kv (k TEXT, v TEXT)" }"#,
/// )
/// .unwrap();
/// assert!(opts.cached);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DriverOptions {
    /// File path, `:memory:`, or the empty string for a private temporary database.
    pub path: String,
    /// Batch run once when a new connection is opened, before the handle is returned.
    #[serde(default)]
    pub schema: Option<String>,
    /// Reuse one live connection per file path.
    #[serde(default = "default_cached")]
    pub cached: bool,
    /// Busy handler timeout in milliseconds.
    #[serde(default)]
    pub busy_timeout_ms: Option<u64>,
    /// Switch file databases to write-ahead logging.
    #[serde(default)]
    pub journal_wal: bool,
}

fn default_cached() -> bool {
    true
}

impl DriverOptions {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            schema: None,
            cached: true,
            busy_timeout_ms: None,
            journal_wal: false,
        }
    }

    /// Options for a private in-memory database.
    #[must_use]
    pub fn memory() -> Self {
        Self::new(MEMORY_PATH)
    }

    #[must_use]
    pub fn builder(path: impl Into<String>) -> DriverOptionsBuilder {
        DriverOptionsBuilder::new(path)
    }

    #[must_use]
    pub fn busy_timeout(&self) -> Option<Duration> {
        self.busy_timeout_ms.map(Duration::from_millis)
    }

    /// True when the path names a database that exists only for this connection.
    #[must_use]
    pub fn is_memory(&self) -> bool {
        self.path.is_empty()
            || self.path == MEMORY_PATH
            || self.path.starts_with("file::memory:")
            || (self.path.starts_with("file:") && self.path.contains("mode=memory"))
    }
}

/// Fluent builder for [`DriverOptions`].
#[derive(Debug, Clone)]
pub struct DriverOptionsBuilder {
    opts: DriverOptions,
}

impl DriverOptionsBuilder {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            opts: DriverOptions::new(path),
        }
    }

    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.opts.schema = Some(schema.into());
        self
    }

    #[must_use]
    pub fn cached(mut self, cached: bool) -> Self {
        self.opts.cached = cached;
        self
    }

    #[must_use]
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.opts.busy_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    #[must_use]
    pub fn journal_wal(mut self, journal_wal: bool) -> Self {
        self.opts.journal_wal = journal_wal;
        self
    }

    #[must_use]
    pub fn finish(self) -> DriverOptions {
        self.opts
    }

    /// Open a [`Driver`] with these options.
    ///
    /// # Errors
    ///
    /// Returns `DriverError` if the database cannot be opened or the schema script fails.
    pub async fn build(self) -> Result<Driver, DriverError> {
        Driver::open(self.finish()).await
    }
}
