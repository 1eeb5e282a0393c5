//! Argument normalization.
//!
//! Every facade operation accepts anything convertible into [`QueryArgs`] and resolves it once,
//! through [`normalize`], into a canonical [`SqlQuery`].

use serde_json::Value as JsonValue;

use crate::error::DriverError;
use crate::types::Value;

/// A SQL statement bundled with its positional parameters.
///
/// Placeholder count and order are checked by the engine when the statement is bound, not here.
/// The builder methods assemble a query incrementally:
/// ```rust
/// use sqlite_facade::SqlQuery;
///
/// let mut q = SqlQuery::new("SELECT * FROM users WHERE 1 = 1");
/// q.push_sql(" AND name = ").push_bind("alice");
/// q.push_sql(" AND age > ").push_bind(30);
/// assert_eq!(q.text, "SELECT * FROM users WHERE 1 = 1 AND name = ? AND age > ?");
/// assert_eq!(q.values.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlQuery {
    /// The SQL text
    pub text: String,
    /// The values bound to the placeholders of `text`, in order
    pub values: Vec<Value>,
}

impl SqlQuery {
    /// Create a query with no parameters.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            values: Vec::new(),
        }
    }

    /// Create a query with the given parameters.
    pub fn with_values(text: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            text: text.into(),
            values,
        }
    }

    /// Append a value for the next placeholder already present in the text.
    #[must_use]
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.values.push(value.into());
        self
    }

    /// Append raw SQL to the text.
    pub fn push_sql(&mut self, fragment: &str) -> &mut Self {
        self.text.push_str(fragment);
        self
    }

    /// Append a `?` placeholder together with its value.
    pub fn push_bind(&mut self, value: impl Into<Value>) -> &mut Self {
        self.text.push('?');
        self.values.push(value.into());
        self
    }
}

/// The call shapes accepted by the facade.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryArgs {
    /// A pre-built parameterized query.
    Query(SqlQuery),
    /// Statement text followed by positional parameters.
    Raw { text: String, params: Vec<Value> },
    /// A loosely-shaped value, e.g. read from JSON; must be an object with a string `text`
    /// field and an optional `values` array.
    Untyped(JsonValue),
}

impl QueryArgs {
    /// Number of parameters carried before normalization.
    #[must_use]
    pub fn param_count(&self) -> usize {
        match self {
            QueryArgs::Query(q) => q.values.len(),
            QueryArgs::Raw { params, .. } => params.len(),
            QueryArgs::Untyped(json) => json
                .get("values")
                .and_then(JsonValue::as_array)
                .map_or(0, Vec::len),
        }
    }
}

/// Resolve any accepted call shape into a canonical [`SqlQuery`].
///
/// # Errors
/// Returns [`DriverError::InvalidArgument`] when an untyped input is not an object, lacks a
/// string `text` field, or carries a `values` field that is not an array.
pub fn normalize(args: impl Into<QueryArgs>) -> Result<SqlQuery, DriverError> {
    match args.into() {
        QueryArgs::Query(query) => Ok(query),
        QueryArgs::Raw { text, params } => Ok(SqlQuery {
            text,
            values: params,
        }),
        QueryArgs::Untyped(json) => normalize_untyped(json),
    }
}

fn normalize_untyped(json: JsonValue) -> Result<SqlQuery, DriverError> {
    let JsonValue::Object(mut map) = json else {
        return Err(DriverError::InvalidArgument(format!(
            "expected a query object or SQL text, got {}",
            json_kind(&json)
        )));
    };

    let text = match map.remove("text") {
        Some(JsonValue::String(text)) => text,
        Some(other) => {
            return Err(DriverError::InvalidArgument(format!(
                "query `text` must be a string, got {}",
                json_kind(&other)
            )));
        }
        None => {
            return Err(DriverError::InvalidArgument(
                "query object has no `text` field".into(),
            ));
        }
    };

    let values = match map.remove("values") {
        None | Some(JsonValue::Null) => Vec::new(),
        Some(JsonValue::Array(items)) => items.into_iter().map(Value::from_json).collect(),
        Some(other) => {
            return Err(DriverError::InvalidArgument(format!(
                "query `values` must be an array, got {}",
                json_kind(&other)
            )));
        }
    };

    Ok(SqlQuery { text, values })
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

impl From<SqlQuery> for QueryArgs {
    fn from(query: SqlQuery) -> Self {
        QueryArgs::Query(query)
    }
}

impl From<&SqlQuery> for QueryArgs {
    fn from(query: &SqlQuery) -> Self {
        QueryArgs::Query(query.clone())
    }
}

impl From<&str> for QueryArgs {
    fn from(text: &str) -> Self {
        QueryArgs::Raw {
            text: text.to_owned(),
            params: Vec::new(),
        }
    }
}

impl From<String> for QueryArgs {
    fn from(text: String) -> Self {
        QueryArgs::Raw {
            text,
            params: Vec::new(),
        }
    }
}

impl From<JsonValue> for QueryArgs {
    fn from(json: JsonValue) -> Self {
        QueryArgs::Untyped(json)
    }
}

impl<T, P, V> From<(T, P)> for QueryArgs
where
    T: Into<String>,
    P: IntoIterator<Item = V>,
    V: Into<Value>,
{
    fn from((text, params): (T, P)) -> Self {
        QueryArgs::Raw {
            text: text.into(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }
}

/// Build a `Vec<Value>` from heterogeneous scalars.
///
/// ```rust
/// use sqlite_facade::{params, Value};
///
/// let values = params![1, "two", 3.0, None::<i64>];
/// assert_eq!(values[1], Value::Text("two".into()));
/// assert!(values[3].is_null());
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($value)),+]
    };
}
