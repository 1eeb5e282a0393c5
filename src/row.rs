use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::types::Value;

/// A row from a query result
///
/// Column names are shared by every row produced from the same statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// The column names for this row (shared across all rows of one statement)
    pub column_names: Arc<Vec<String>>,
    /// The values for this row, in column order
    pub values: Vec<Value>,
}

impl Row {
    /// Create a new row
    ///
    /// # Arguments
    ///
    /// * `column_names` - The column names
    /// * `values` - The values for this row
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, values: Vec<Value>) -> Self {
        Self {
            column_names,
            values,
        }
    }

    /// Get the index of a column by name
    #[must_use]
    pub fn column_index(&self, column_name: &str) -> Option<usize> {
        self.column_names.iter().position(|col| col == column_name)
    }

    /// Get a value from the row by column name
    ///
    /// Returns `None` if no column has that name.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&Value> {
        self.column_index(column_name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get a value from the row by column index
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Render the row as a JSON object keyed by column name.
    ///
    /// # Errors
    /// Returns `serde_json::Error` if a value cannot be serialized.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.column_names.iter().zip(&self.values) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Row {
        Row::new(
            Arc::new(vec!["id".into(), "name".into(), "note".into()]),
            vec![Value::Int(1), Value::Text("Alice".into()), Value::Null],
        )
    }

    #[test]
    fn lookup_by_name_and_index() {
        let row = sample();
        assert_eq!(row.get("name"), Some(&Value::Text("Alice".into())));
        assert_eq!(row.get_by_index(0), Some(&Value::Int(1)));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.len(), 3);
    }

    #[test]
    fn serializes_as_object() {
        let json = sample().to_json().expect("serialize");
        assert_eq!(json, json!({ "id": 1, "name": "Alice", "note": null }));
    }
}
