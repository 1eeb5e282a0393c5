use rusqlite::types::Value as SqlValue;

use crate::types::Value;

/// Convert a single facade value to a rusqlite `Value`.
#[must_use]
pub(crate) fn to_sqlite_value(value: &Value) -> SqlValue {
    match value {
        Value::Int(i) => SqlValue::Integer(*i),
        Value::Float(f) => SqlValue::Real(*f),
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Timestamp(dt) => SqlValue::Text(dt.format("%F %T%.f").to_string()),
        Value::Null => SqlValue::Null,
        Value::Json(json) => SqlValue::Text(json.to_string()),
        Value::Blob(bytes) => SqlValue::Blob(bytes.clone()),
    }
}

/// Convert every parameter of a query, keeping order.
#[must_use]
pub(crate) fn convert_params(params: &[Value]) -> Vec<SqlValue> {
    params.iter().map(to_sqlite_value).collect()
}

pub(crate) fn values_as_tosql(values: &[SqlValue]) -> Vec<&dyn rusqlite::ToSql> {
    values.iter().map(|v| v as &dyn rusqlite::ToSql).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn non_native_values_bind_as_text_or_integer() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 2)
            .and_then(|d| d.and_hms_opt(3, 4, 5))
            .expect("valid date");
        assert_eq!(to_sqlite_value(&Value::Bool(true)), SqlValue::Integer(1));
        assert_eq!(
            to_sqlite_value(&Value::Timestamp(dt)),
            SqlValue::Text("2024-01-02 03:04:05".into())
        );
        assert_eq!(
            to_sqlite_value(&Value::Json(json!({ "a": 1 }))),
            SqlValue::Text("{\"a\":1}".into())
        );
    }
}
