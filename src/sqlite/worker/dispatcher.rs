use std::collections::HashMap;
use std::sync::mpsc::Receiver;

use rusqlite::Connection;

use crate::error::DriverError;
use crate::sqlite::query::{Cursor, run, select_all, select_one};

use super::channel::{Command, Reply};

pub(super) fn run_sqlite_worker(conn: Connection, receiver: &Receiver<Command>) {
    let close_request = serve(&conn, receiver);

    match close_request {
        Some(respond_to) => {
            let outcome = conn.close().map_err(|(_, err)| DriverError::Sqlite(err));
            match &outcome {
                Ok(()) => tracing::debug!("sqlite connection closed"),
                Err(err) => tracing::warn!(error = %err, "sqlite connection failed to close cleanly"),
            }
            send(respond_to, outcome);
        }
        None => drop(conn),
    }
    // Commands still queued are dropped with the receiver; their callers observe
    // `ConnectionClosed` through the dropped reply channel.
}

/// Serve commands until shutdown or close. Returns the reply channel of a close request so the
/// connection can be closed once every cursor borrowing it is gone.
fn serve(conn: &Connection, receiver: &Receiver<Command>) -> Option<Reply<()>> {
    let mut cursors: HashMap<u64, Cursor<'_>> = HashMap::new();
    // Cursor ids never leave this connection; u64 won't exhaust in practice.
    let mut next_cursor_id: u64 = 1;

    while let Ok(command) = receiver.recv() {
        tracing::trace!(command = command.name(), "sqlite worker dispatch");
        match command {
            Command::Shutdown => break,
            Command::Close { respond_to } => {
                if !cursors.is_empty() {
                    tracing::debug!(open = cursors.len(), "finalizing open cursors before close");
                }
                cursors.clear();
                return Some(respond_to);
            }
            Command::Run {
                query,
                params,
                respond_to,
            } => send(respond_to, run(conn, &query, &params)),
            Command::ExecuteBatch { query, respond_to } => send(
                respond_to,
                conn.execute_batch(&query).map_err(DriverError::Sqlite),
            ),
            Command::SelectOne {
                query,
                params,
                respond_to,
            } => send(respond_to, select_one(conn, &query, &params)),
            Command::SelectAll {
                query,
                params,
                respond_to,
            } => send(respond_to, select_all(conn, &query, &params)),
            Command::OpenCursor {
                query,
                params,
                respond_to,
            } => {
                let outcome = Cursor::open(conn, &query, &params).map(|cursor| {
                    let cursor_id = next_cursor_id;
                    next_cursor_id = next_cursor_id.saturating_add(1);
                    cursors.insert(cursor_id, cursor);
                    tracing::debug!(cursor_id, "cursor opened");
                    cursor_id
                });
                send(respond_to, outcome);
            }
            Command::StepCursor {
                cursor_id,
                respond_to,
            } => {
                let outcome = match cursors.get_mut(&cursor_id) {
                    Some(cursor) => cursor.step(),
                    None => Err(DriverError::InvalidArgument(format!(
                        "cursor {cursor_id} is not open"
                    ))),
                };
                // Exhaustion and failure are terminal: finalize here so no later request can
                // reach the statement.
                if !matches!(outcome, Ok(Some(_))) && cursors.remove(&cursor_id).is_some() {
                    tracing::debug!(cursor_id, "cursor finalized");
                }
                send(respond_to, outcome);
            }
            Command::FinalizeCursor { cursor_id } => {
                if cursors.remove(&cursor_id).is_some() {
                    tracing::debug!(cursor_id, "cursor finalized on request");
                }
            }
        }
    }

    None
}

fn send<T>(respond_to: Reply<T>, outcome: Result<T, DriverError>) {
    if respond_to.send(outcome).is_err() {
        tracing::trace!("sqlite worker reply dropped; caller went away");
    }
}
