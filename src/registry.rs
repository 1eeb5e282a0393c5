//! Process-wide cache of live connections, keyed by resolved file path.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, LazyLock, Weak};

use tokio::sync::Mutex;

use crate::config::DriverOptions;
use crate::error::DriverError;
use crate::sqlite::{SqliteWorker, open_connection};

type OpenConnections = LazyLock<Mutex<HashMap<PathBuf, Weak<SqliteWorker>>>>;

// Held across the whole open so two callers racing on one path share a connection.
static OPEN_CONNECTIONS: OpenConnections = LazyLock::new(|| Mutex::new(HashMap::new()));

/// Return the live connection for `options.path`, opening one if needed.
///
/// In-memory databases and `cached == false` always open a fresh connection.
pub(crate) async fn acquire(options: DriverOptions) -> Result<Arc<SqliteWorker>, DriverError> {
    let Some(key) = cache_key(&options) else {
        return open_worker(options).await;
    };

    let mut open = OPEN_CONNECTIONS.lock().await;
    open.retain(|_, worker| worker.strong_count() > 0);

    if let Some(worker) = open.get(&key).and_then(Weak::upgrade) {
        if !worker.is_closed() {
            tracing::debug!(path = %key.display(), "reusing cached sqlite connection");
            return Ok(worker);
        }
    }

    let worker = open_worker(options).await?;
    open.insert(key, Arc::downgrade(&worker));
    Ok(worker)
}

fn cache_key(options: &DriverOptions) -> Option<PathBuf> {
    if !options.cached || options.is_memory() {
        return None;
    }
    if options.path.starts_with("file:") {
        return Some(PathBuf::from(&options.path));
    }
    Some(std::path::absolute(&options.path).unwrap_or_else(|_| PathBuf::from(&options.path)))
}

async fn open_worker(options: DriverOptions) -> Result<Arc<SqliteWorker>, DriverError> {
    let path = options.path.clone();
    let schema = options.schema.clone();

    let conn = tokio::task::spawn_blocking(move || open_connection(&options))
        .await
        .map_err(|e| DriverError::ConnectionError(format!("sqlite open join error: {e}")))??;
    let worker = Arc::new(SqliteWorker::spawn(conn, path)?);
    tracing::debug!(
        path = worker.path(),
        worker_id = worker.worker_id(),
        "opened sqlite connection"
    );

    if let Some(schema) = schema {
        // On failure the worker is dropped here, which shuts the connection down.
        worker.execute_batch(schema).await?;
    }

    Ok(worker)
}
