mod channel;
mod dispatcher;
mod manager;

pub(crate) use manager::{SqliteWorker, StepReceiver};

use rusqlite::Connection;

use crate::config::DriverOptions;
use crate::error::DriverError;

/// Open and configure a connection according to `options`.
///
/// Blocking; call it off the async executor.
///
/// # Errors
/// Returns the engine error if the file cannot be opened or a pragma fails.
pub(crate) fn open_connection(options: &DriverOptions) -> Result<Connection, DriverError> {
    let conn = Connection::open(&options.path)?;
    if let Some(timeout) = options.busy_timeout() {
        conn.busy_timeout(timeout)?;
    }
    if options.journal_wal && !options.is_memory() {
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    }
    Ok(conn)
}
