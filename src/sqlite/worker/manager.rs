use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread;

use rusqlite::Connection;
use rusqlite::types::Value as SqlValue;
use tokio::sync::oneshot;

use crate::error::DriverError;
use crate::row::Row;
use crate::types::RunOutcome;

use super::channel::{Command, Reply};
use super::dispatcher::run_sqlite_worker;

static NEXT_WORKER_ID: AtomicU64 = AtomicU64::new(1);

/// Reply channel for one cursor step.
pub(crate) type StepReceiver = oneshot::Receiver<Result<Option<Row>, DriverError>>;

/// Handle to the thread that owns one `SQLite` connection.
///
/// Dropping the last handle asks the thread to shut down, which releases the connection.
pub(crate) struct SqliteWorker {
    sender: Sender<Command>,
    worker_id: u64,
    path: String,
    closed: AtomicBool,
}

impl SqliteWorker {
    pub(crate) fn spawn(conn: Connection, path: String) -> Result<Self, DriverError> {
        let (sender, receiver) = mpsc::channel::<Command>();
        let worker_id = NEXT_WORKER_ID.fetch_add(1, Ordering::Relaxed);
        thread::Builder::new()
            .name(format!("sqlite-worker-{worker_id}"))
            .spawn(move || run_sqlite_worker(conn, &receiver))
            .map_err(|err| {
                DriverError::ConnectionError(format!("failed to spawn SQLite worker thread: {err}"))
            })?;

        Ok(Self {
            sender,
            worker_id,
            path,
            closed: AtomicBool::new(false),
        })
    }

    pub(crate) fn worker_id(&self) -> u64 {
        self.worker_id
    }

    pub(crate) fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn send_command(&self, command: Command) -> Result<(), DriverError> {
        if self.is_closed() {
            return Err(DriverError::ConnectionClosed);
        }
        self.sender
            .send(command)
            .map_err(|_| DriverError::ConnectionClosed)
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, DriverError> {
        let (tx, rx) = oneshot::channel();
        self.send_command(build(tx))?;
        rx.await.map_err(|_| DriverError::ConnectionClosed)?
    }

    pub(crate) async fn run(
        &self,
        query: String,
        params: Vec<SqlValue>,
    ) -> Result<RunOutcome, DriverError> {
        self.request(|respond_to| Command::Run {
            query,
            params,
            respond_to,
        })
        .await
    }

    pub(crate) async fn execute_batch(&self, query: String) -> Result<(), DriverError> {
        self.request(|respond_to| Command::ExecuteBatch { query, respond_to })
            .await
    }

    pub(crate) async fn select_one(
        &self,
        query: String,
        params: Vec<SqlValue>,
    ) -> Result<Option<Row>, DriverError> {
        self.request(|respond_to| Command::SelectOne {
            query,
            params,
            respond_to,
        })
        .await
    }

    pub(crate) async fn select_all(
        &self,
        query: String,
        params: Vec<SqlValue>,
    ) -> Result<Vec<Row>, DriverError> {
        self.request(|respond_to| Command::SelectAll {
            query,
            params,
            respond_to,
        })
        .await
    }

    pub(crate) async fn open_cursor(
        &self,
        query: String,
        params: Vec<SqlValue>,
    ) -> Result<u64, DriverError> {
        self.request(|respond_to| Command::OpenCursor {
            query,
            params,
            respond_to,
        })
        .await
    }

    /// Queue one step for `cursor_id` and hand back the reply channel without awaiting it.
    pub(crate) fn step_cursor(&self, cursor_id: u64) -> Result<StepReceiver, DriverError> {
        let (tx, rx) = oneshot::channel();
        self.send_command(Command::StepCursor {
            cursor_id,
            respond_to: tx,
        })?;
        Ok(rx)
    }

    /// Ask the worker to finalize a cursor. A cursor that is already gone is ignored, as is a
    /// worker that has already stopped (closing finalizes every cursor).
    pub(crate) fn finalize_cursor(&self, cursor_id: u64) {
        let _ = self.sender.send(Command::FinalizeCursor { cursor_id });
    }

    /// Close the connection. Only the first call reaches the engine.
    pub(crate) async fn close(&self) -> Result<(), DriverError> {
        let (tx, rx) = oneshot::channel();
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(DriverError::ConnectionClosed);
        }
        self.sender
            .send(Command::Close { respond_to: tx })
            .map_err(|_| DriverError::ConnectionClosed)?;
        rx.await.map_err(|_| DriverError::ConnectionClosed)?
    }
}

impl Drop for SqliteWorker {
    fn drop(&mut self) {
        let _ = self.sender.send(Command::Shutdown);
    }
}
