use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::config::DriverOptions;
use crate::error::DriverError;
use crate::query::{QueryArgs, normalize};
use crate::registry;
use crate::row::Row;
use crate::sqlite::SqliteWorker;
use crate::sqlite::params::convert_params;
use crate::stream::RowStream;
use crate::types::RunOutcome;

/// Async facade over one `SQLite` connection.
///
/// Cloning is cheap and every clone talks to the same connection. Each operation takes any call
/// shape convertible into [`QueryArgs`]: SQL text, a `(text, params)` tuple, a pre-built
/// [`SqlQuery`](crate::SqlQuery), or an untyped JSON object.
///
/// ```rust,no_run
/// use sqlite_facade::prelude::*;
///
/// # async fn demo() -> Result<(), DriverError> {
/// let db = DriverOptions::builder(":memory:")
///     .schema("CREATE TABLE test (id INTEGER PRIMARY KEY, name TEXT)")
///     .build()
///     .await?;
/// let id = db.run(("INSERT INTO test (name) VALUES (?)", ["Alice"])).await?;
/// let row = db.one(("SELECT * FROM test WHERE id = ?", [id])).await?;
/// assert!(row.is_some());
/// db.close().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Driver {
    worker: Arc<SqliteWorker>,
}

impl Driver {
    /// Open a database, running the schema script when a new connection is created.
    ///
    /// With `cached` set (the default), a file path that already has a live connection in this
    /// process returns that connection and the schema is not run again.
    ///
    /// # Errors
    /// Returns the engine error if the file cannot be opened or the schema script fails.
    pub async fn open(options: DriverOptions) -> Result<Self, DriverError> {
        let worker = registry::acquire(options).await?;
        Ok(Self { worker })
    }

    /// Open a database with default options.
    ///
    /// # Errors
    /// Returns the engine error if the file cannot be opened.
    pub async fn open_path(path: impl Into<String>) -> Result<Self, DriverError> {
        Self::open(DriverOptions::new(path)).await
    }

    /// The path this connection was opened with.
    #[must_use]
    pub fn path(&self) -> &str {
        self.worker.path()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.worker.is_closed()
    }

    /// True when both handles share one physical connection.
    #[must_use]
    pub fn same_connection(&self, other: &Driver) -> bool {
        Arc::ptr_eq(&self.worker, &other.worker)
    }

    /// Execute an INSERT/UPDATE and return the last inserted rowid.
    ///
    /// # Errors
    /// Returns `DriverError` if the arguments are malformed or the engine rejects the statement.
    pub async fn run(&self, args: impl Into<QueryArgs>) -> Result<i64, DriverError> {
        Ok(self.execute(args).await?.last_insert_id)
    }

    /// Execute a statement and return both the last inserted rowid and the change count.
    ///
    /// # Errors
    /// Returns `DriverError` if the arguments are malformed or the engine rejects the statement.
    pub async fn execute(&self, args: impl Into<QueryArgs>) -> Result<RunOutcome, DriverError> {
        let query = normalize(args)?;
        self.worker
            .run(query.text, convert_params(&query.values))
            .await
    }

    /// Execute SQL text (one or more statements) without binding parameters.
    ///
    /// # Errors
    /// Returns `DriverError::UnexpectedParameters` before reaching the engine when any parameter
    /// is supplied, otherwise the engine error.
    pub async fn exec(&self, args: impl Into<QueryArgs>) -> Result<(), DriverError> {
        let args = args.into();
        let supplied = args.param_count();
        if supplied > 0 {
            return Err(DriverError::UnexpectedParameters(supplied));
        }
        let query = normalize(args)?;
        self.worker.execute_batch(query.text).await
    }

    /// Fetch the first row. A query matching nothing resolves to `Ok(None)`.
    ///
    /// # Errors
    /// Returns `DriverError` if the arguments are malformed or the engine rejects the query.
    pub async fn one(&self, args: impl Into<QueryArgs>) -> Result<Option<Row>, DriverError> {
        let query = normalize(args)?;
        self.worker
            .select_one(query.text, convert_params(&query.values))
            .await
    }

    /// Alias for [`one`](Self::one).
    ///
    /// # Errors
    /// See [`one`](Self::one).
    pub async fn get(&self, args: impl Into<QueryArgs>) -> Result<Option<Row>, DriverError> {
        self.one(args).await
    }

    /// Fetch every row, in the order the engine returns them.
    ///
    /// # Errors
    /// Returns `DriverError` if the arguments are malformed or the engine rejects the query.
    pub async fn many(&self, args: impl Into<QueryArgs>) -> Result<Vec<Row>, DriverError> {
        let query = normalize(args)?;
        self.worker
            .select_all(query.text, convert_params(&query.values))
            .await
    }

    /// Alias for [`many`](Self::many).
    ///
    /// # Errors
    /// See [`many`](Self::many).
    pub async fn all(&self, args: impl Into<QueryArgs>) -> Result<Vec<Row>, DriverError> {
        self.many(args).await
    }

    /// Prepare a query and return a pull-based [`RowStream`] over its rows.
    ///
    /// # Errors
    /// Returns the engine error when preparation or parameter binding fails; no stream is
    /// created in that case.
    pub async fn stream(&self, args: impl Into<QueryArgs>) -> Result<RowStream, DriverError> {
        let query = normalize(args)?;
        let cursor_id = self
            .worker
            .open_cursor(query.text, convert_params(&query.values))
            .await?;
        Ok(RowStream::new(Arc::clone(&self.worker), cursor_id))
    }

    /// Close the connection for every handle sharing it.
    ///
    /// Open streams are finalized first. Afterwards every operation, including a second
    /// `close`, fails with [`DriverError::ConnectionClosed`].
    ///
    /// # Errors
    /// Returns the engine error if the connection does not close cleanly.
    pub async fn close(&self) -> Result<(), DriverError> {
        tracing::debug!(path = self.path(), "closing sqlite connection");
        self.worker.close().await
    }
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("path", &self.path())
            .field("worker_id", &self.worker.worker_id())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Open a driver, hand a handle to `f`, and close the connection however `f` finishes.
///
/// An error from `f` wins over an error from closing. If `f` closes the connection itself the
/// final close is skipped. A panic inside `f` drops the handles, which also releases the
/// connection.
///
/// # Errors
/// Returns the error from opening, from `f`, or from closing, in that order of precedence.
pub async fn with_driver<F, Fut, T>(options: DriverOptions, f: F) -> Result<T, DriverError>
where
    F: FnOnce(Driver) -> Fut,
    Fut: Future<Output = Result<T, DriverError>>,
{
    let driver = Driver::open(options).await?;
    let outcome = f(driver.clone()).await;
    let closed = if driver.is_closed() {
        Ok(())
    } else {
        driver.close().await
    };
    match (outcome, closed) {
        (Err(err), _) => Err(err),
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(err)) => Err(err),
    }
}
