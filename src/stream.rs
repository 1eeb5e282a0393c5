//! Pull-based row streaming over a prepared statement.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::{Stream, StreamExt};

use crate::error::DriverError;
use crate::row::Row;
use crate::sqlite::{SqliteWorker, StepReceiver};

/// Observable state of a [`RowStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// No fetch in flight.
    Idle,
    /// One step request is outstanding.
    Fetching,
    /// The engine reported no further rows.
    Exhausted,
    /// A fetch failed; the error has been yielded.
    Errored,
    /// The caller stopped consumption.
    Destroyed,
}

impl StreamState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Exhausted | Self::Errored | Self::Destroyed)
    }
}

enum Phase {
    Idle,
    Fetching(StepReceiver),
    Done(StreamState),
}

/// Forward-only, non-restartable sequence of rows from one statement.
///
/// Each pull issues exactly one step against the statement held by the connection worker, and a
/// new step is only issued once the previous one has answered. The statement is finalized on
/// exhaustion, on error, on [`destroy`](Self::destroy), or when the stream is dropped early.
///
/// Rows can be pulled with [`next_row`](Self::next_row) or through the [`Stream`] impl:
/// ```rust,no_run
/// use futures_util::TryStreamExt;
/// use sqlite_facade::prelude::*;
///
/// # async fn demo(driver: &Driver) -> Result<(), DriverError> {
/// let mut rows = driver.stream("SELECT id, name FROM users ORDER BY id").await?;
/// while let Some(row) = rows.try_next().await? {
///     println!("{:?}", row.get("name"));
/// }
/// # Ok(())
/// # }
/// ```
pub struct RowStream {
    worker: Arc<SqliteWorker>,
    cursor_id: u64,
    phase: Phase,
    processed: u64,
}

impl RowStream {
    pub(crate) fn new(worker: Arc<SqliteWorker>, cursor_id: u64) -> Self {
        Self {
            worker,
            cursor_id,
            phase: Phase::Idle,
            processed: 0,
        }
    }

    /// Rows delivered so far.
    #[must_use]
    pub fn processed(&self) -> u64 {
        self.processed
    }

    #[must_use]
    pub fn state(&self) -> StreamState {
        match self.phase {
            Phase::Idle => StreamState::Idle,
            Phase::Fetching(_) => StreamState::Fetching,
            Phase::Done(state) => state,
        }
    }

    /// Pull the next row. `None` once the stream has ended for any reason.
    pub async fn next_row(&mut self) -> Option<Result<Row, DriverError>> {
        self.next().await
    }

    /// Stop consumption and release the statement.
    ///
    /// A step already in flight is abandoned and its row, if any, is not counted. Has no effect
    /// once the stream has ended.
    pub fn destroy(&mut self) {
        if self.state().is_terminal() {
            return;
        }
        self.phase = Phase::Done(StreamState::Destroyed);
        self.worker.finalize_cursor(self.cursor_id);
        tracing::debug!(
            cursor_id = self.cursor_id,
            processed = self.processed,
            "row stream destroyed"
        );
    }

    fn finish(&mut self, state: StreamState) {
        self.phase = Phase::Done(state);
    }
}

impl Stream for RowStream {
    type Item = Result<Row, DriverError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if matches!(this.phase, Phase::Idle) {
            match this.worker.step_cursor(this.cursor_id) {
                Ok(rx) => this.phase = Phase::Fetching(rx),
                Err(err) => {
                    this.finish(StreamState::Errored);
                    return Poll::Ready(Some(Err(err)));
                }
            }
        }

        let Phase::Fetching(rx) = &mut this.phase else {
            return Poll::Ready(None);
        };

        let reply = match Pin::new(rx).poll(cx) {
            Poll::Ready(reply) => reply,
            Poll::Pending => return Poll::Pending,
        };

        match reply {
            Ok(Ok(Some(row))) => {
                this.processed += 1;
                this.phase = Phase::Idle;
                Poll::Ready(Some(Ok(row)))
            }
            Ok(Ok(None)) => {
                this.finish(StreamState::Exhausted);
                Poll::Ready(None)
            }
            Ok(Err(err)) => {
                this.finish(StreamState::Errored);
                Poll::Ready(Some(Err(err)))
            }
            Err(_) => {
                this.finish(StreamState::Errored);
                Poll::Ready(Some(Err(DriverError::ConnectionClosed)))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.state().is_terminal() {
            (0, Some(0))
        } else {
            (0, None)
        }
    }
}

impl Drop for RowStream {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl fmt::Debug for RowStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowStream")
            .field("cursor_id", &self.cursor_id)
            .field("state", &self.state())
            .field("processed", &self.processed)
            .finish()
    }
}
