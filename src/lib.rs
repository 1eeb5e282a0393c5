//! Thin async facade over an embedded `SQLite` database.
//!
//! Every operation is a pass-through to `rusqlite`, reshaped into `async` calls:
//!
//! - [`Driver::run`] executes a write and returns the last inserted rowid;
//! - [`Driver::exec`] executes SQL text without parameters or results;
//! - [`Driver::one`] / [`Driver::get`] fetch the first row, or `None`;
//! - [`Driver::many`] / [`Driver::all`] fetch every row;
//! - [`Driver::stream`] returns a pull-based [`RowStream`];
//! - [`Driver::close`] closes the connection.
//!
//! A connection is owned by a dedicated worker thread. Each call sends one command to that
//! thread and awaits a one-shot reply, so every call settles exactly once.
//!
//! ```rust,no_run
//! use sqlite_facade::prelude::*;
//!
//! # async fn demo() -> Result<(), DriverError> {
//! let db = DriverOptions::builder(":memory:")
//!     .schema("CREATE TABLE test (id INTEGER PRIMARY KEY, name TEXT)")
//!     .build()
//!     .await?;
//!
//! db.run(("INSERT INTO test (name) VALUES (?)", params!["Alice"])).await?;
//! let q = SqlQuery::new("SELECT * FROM test WHERE name = ?").bind("Alice");
//! let alice = db.one(&q).await?;
//! let everyone = db.many("SELECT * FROM test").await?;
//! # let _ = (alice, everyone);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod prelude;
pub mod query;
pub mod row;
pub mod stream;
pub mod types;

mod registry;
mod sqlite;

pub use config::{DriverOptions, DriverOptionsBuilder, MEMORY_PATH};
pub use driver::{Driver, with_driver};
pub use error::DriverError;
pub use query::{QueryArgs, SqlQuery, normalize};
pub use row::Row;
pub use stream::{RowStream, StreamState};
pub use types::{RunOutcome, Value};
