//! Convenient imports for common functionality.
//!
//! ```rust
//! use sqlite_facade::prelude::*;
//! ```

pub use crate::config::{DriverOptions, DriverOptionsBuilder};
pub use crate::driver::{Driver, with_driver};
pub use crate::error::DriverError;
pub use crate::params;
pub use crate::query::{QueryArgs, SqlQuery, normalize};
pub use crate::row::Row;
pub use crate::stream::{RowStream, StreamState};
pub use crate::types::{RunOutcome, Value};
