use rusqlite::types::Value as SqlValue;
use tokio::sync::oneshot;

use crate::error::DriverError;
use crate::row::Row;
use crate::types::RunOutcome;

pub(super) type Reply<T> = oneshot::Sender<Result<T, DriverError>>;

pub(super) enum Command {
    Run {
        query: String,
        params: Vec<SqlValue>,
        respond_to: Reply<RunOutcome>,
    },
    ExecuteBatch {
        query: String,
        respond_to: Reply<()>,
    },
    SelectOne {
        query: String,
        params: Vec<SqlValue>,
        respond_to: Reply<Option<Row>>,
    },
    SelectAll {
        query: String,
        params: Vec<SqlValue>,
        respond_to: Reply<Vec<Row>>,
    },
    OpenCursor {
        query: String,
        params: Vec<SqlValue>,
        respond_to: Reply<u64>,
    },
    StepCursor {
        cursor_id: u64,
        respond_to: Reply<Option<Row>>,
    },
    FinalizeCursor {
        cursor_id: u64,
    },
    Close {
        respond_to: Reply<()>,
    },
    Shutdown,
}

impl Command {
    pub(super) fn name(&self) -> &'static str {
        match self {
            Command::Run { .. } => "run",
            Command::ExecuteBatch { .. } => "execute_batch",
            Command::SelectOne { .. } => "select_one",
            Command::SelectAll { .. } => "select_all",
            Command::OpenCursor { .. } => "open_cursor",
            Command::StepCursor { .. } => "step_cursor",
            Command::FinalizeCursor { .. } => "finalize_cursor",
            Command::Close { .. } => "close",
            Command::Shutdown => "shutdown",
        }
    }
}
