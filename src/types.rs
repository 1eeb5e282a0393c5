use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

/// A scalar bound as a query parameter or read back from a result column.
///
/// Parameters of different Rust types can be collected into one list:
/// ```rust
/// use sqlite_facade::prelude::*;
///
/// let params = vec![
///     Value::Int(1),
///     Value::Text("alice".into()),
///     Value::Bool(true),
/// ];
/// # let _ = params;
/// ```
///
/// `SQLite` only stores integers, reals, text, blobs and NULL, so rows read back from the engine
/// never contain `Bool`, `Timestamp` or `Json`; those variants exist for binding.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value, bound as 0 or 1
    Bool(bool),
    /// Timestamp value, bound as `YYYY-MM-DD HH:MM:SS[.fff]` text
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value, bound as its serialized text
    Json(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl Value {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        if let Value::Int(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let Value::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            Value::Int(1) => Some(true),
            Value::Int(0) => Some(false),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let Value::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(value) => Some(*value),
            #[allow(clippy::cast_precision_loss)]
            Value::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let Value::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Convert a loosely-typed JSON scalar into a parameter value.
    ///
    /// Integers that fit in `i64` become `Int`, other numbers `Float`; arrays and objects are kept
    /// as `Json` and bound as text.
    #[must_use]
    pub fn from_json(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            JsonValue::String(s) => Value::Text(s),
            other @ (JsonValue::Array(_) | JsonValue::Object(_)) => Value::Json(other),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Timestamp(dt) => serializer.collect_str(&dt.format("%F %T%.f")),
            Value::Null => serializer.serialize_none(),
            Value::Json(json) => json.serialize(serializer),
            Value::Blob(bytes) => serializer.serialize_bytes(bytes),
        }
    }
}

/// What a single write statement reported back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Rowid of the most recent successful INSERT on the connection
    pub last_insert_id: i64,
    /// Rows changed by this statement
    pub changes: usize,
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Value::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::Text(value.clone())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Blob(value.to_vec())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::Timestamp(value)
    }
}

/// Wraps the document as `Json`, bound as its serialized text; use [`Value::from_json`] to map
/// JSON scalars onto native variants instead.
impl From<JsonValue> for Value {
    fn from(value: JsonValue) -> Self {
        Value::Json(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_scalars_map_to_matching_variants() {
        assert_eq!(Value::from_json(json!(7)), Value::Int(7));
        assert_eq!(Value::from_json(json!(1.5)), Value::Float(1.5));
        assert_eq!(Value::from_json(json!("x")), Value::Text("x".into()));
        assert_eq!(Value::from_json(json!(false)), Value::Bool(false));
        assert_eq!(Value::from_json(json!(null)), Value::Null);
        assert_eq!(Value::from_json(json!([1, 2])), Value::Json(json!([1, 2])));
    }

    #[test]
    fn option_none_becomes_null() {
        let missing: Option<&str> = None;
        assert!(Value::from(missing).is_null());
        assert_eq!(Value::from(Some(3_i32)), Value::Int(3));
    }

    #[test]
    fn integer_flags_read_as_bool() {
        assert_eq!(Value::Int(1).as_bool(), Some(true));
        assert_eq!(Value::Int(0).as_bool(), Some(false));
        assert_eq!(Value::Int(2).as_bool(), None);
    }

    #[test]
    fn text_timestamps_parse() {
        let ts = Value::Text("2024-03-01 12:30:00".into()).as_timestamp();
        assert!(ts.is_some());
        let ts = Value::Text("2024-03-01 12:30:00.250".into()).as_timestamp();
        assert!(ts.is_some());
    }
}
