use std::sync::Arc;

use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, Statement};

use crate::error::DriverError;
use crate::row::Row;
use crate::types::{RunOutcome, Value};

use super::params::values_as_tosql;

/// Extract a facade `Value` from a `SQLite` row.
///
/// # Errors
///
/// Returns `DriverError::Sqlite` if the column cannot be read.
pub(crate) fn extract_value(row: &rusqlite::Row<'_>, idx: usize) -> Result<Value, DriverError> {
    let value: SqlValue = row.get(idx)?;
    Ok(match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(i) => Value::Int(i),
        SqlValue::Real(f) => Value::Float(f),
        SqlValue::Text(s) => Value::Text(s),
        SqlValue::Blob(b) => Value::Blob(b),
    })
}

fn extract_row(row: &rusqlite::Row<'_>, column_names: &Arc<Vec<String>>) -> Result<Row, DriverError> {
    let mut values = Vec::with_capacity(column_names.len());
    for idx in 0..column_names.len() {
        values.push(extract_value(row, idx)?);
    }
    Ok(Row::new(Arc::clone(column_names), values))
}

fn column_names(stmt: &Statement<'_>) -> Arc<Vec<String>> {
    Arc::new(
        stmt.column_names()
            .iter()
            .map(std::string::ToString::to_string)
            .collect(),
    )
}

/// Execute one statement and report the last inserted rowid alongside the change count.
pub(crate) fn run(
    conn: &Connection,
    query: &str,
    params: &[SqlValue],
) -> Result<RunOutcome, DriverError> {
    let mut stmt = conn.prepare_cached(query)?;
    let changes = stmt.execute(&values_as_tosql(params)[..])?;
    Ok(RunOutcome {
        last_insert_id: conn.last_insert_rowid(),
        changes,
    })
}

/// Fetch the first row of a query, if any.
pub(crate) fn select_one(
    conn: &Connection,
    query: &str,
    params: &[SqlValue],
) -> Result<Option<Row>, DriverError> {
    let mut stmt = conn.prepare_cached(query)?;
    let names = column_names(&stmt);
    let mut rows = stmt.query(&values_as_tosql(params)[..])?;
    let first = match rows.next()? {
        Some(row) => Some(extract_row(row, &names)?),
        None => None,
    };
    Ok(first)
}

/// Fetch every row of a query, in engine order.
pub(crate) fn select_all(
    conn: &Connection,
    query: &str,
    params: &[SqlValue],
) -> Result<Vec<Row>, DriverError> {
    let mut stmt = conn.prepare_cached(query)?;
    let names = column_names(&stmt);
    let mut rows = stmt.query(&values_as_tosql(params)[..])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        out.push(extract_row(row, &names)?);
    }
    Ok(out)
}

/// A prepared statement stepped one row per request.
///
/// The statement is finalized when the cursor is dropped.
pub(crate) struct Cursor<'conn> {
    stmt: Statement<'conn>,
    column_names: Arc<Vec<String>>,
}

impl<'conn> Cursor<'conn> {
    /// Prepare `query` and bind `params` positionally.
    ///
    /// # Errors
    /// Returns the engine error if preparation fails, or `InvalidParameterCount` when the number of
    /// values does not match the statement's placeholders.
    pub(crate) fn open(
        conn: &'conn Connection,
        query: &str,
        params: &[SqlValue],
    ) -> Result<Self, DriverError> {
        let mut stmt = conn.prepare(query)?;
        let expected = stmt.parameter_count();
        if params.len() != expected {
            return Err(rusqlite::Error::InvalidParameterCount(params.len(), expected).into());
        }
        for (idx, value) in params.iter().enumerate() {
            stmt.raw_bind_parameter(idx + 1, value)?;
        }
        let column_names = column_names(&stmt);
        Ok(Self {
            stmt,
            column_names,
        })
    }

    /// Step once. `Ok(None)` means the result set is exhausted.
    pub(crate) fn step(&mut self) -> Result<Option<Row>, DriverError> {
        let mut rows = self.stmt.raw_query();
        let row = match rows.next()? {
            Some(row) => Some(extract_row(row, &self.column_names)?),
            None => None,
        };
        // `Rows` resets the statement on drop; the position must survive until the next step.
        std::mem::forget(rows);
        Ok(row)
    }
}
