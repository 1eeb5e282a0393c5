#![allow(dead_code)]

use sqlite_facade::prelude::*;

pub const TEST_SCHEMA: &str = "CREATE TABLE test (id INTEGER PRIMARY KEY, name TEXT)";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub async fn memory_db() -> Result<Driver, DriverError> {
    init_tracing();
    DriverOptions::builder(sqlite_facade::MEMORY_PATH)
        .schema(TEST_SCHEMA)
        .build()
        .await
}

pub fn name_of(row: &Row) -> Option<&str> {
    row.get("name").and_then(Value::as_text)
}

pub fn id_of(row: &Row) -> Option<i64> {
    row.get("id").and_then(Value::as_int)
}
