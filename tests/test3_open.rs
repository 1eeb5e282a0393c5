mod common;

use common::{TEST_SCHEMA, init_tracing};
use sqlite_facade::prelude::*;
use tempfile::tempdir;

#[tokio::test]
async fn same_file_shares_one_connection() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let dir = tempdir()?;
    let path = dir.path().join("shared.db").to_string_lossy().into_owned();

    let first = DriverOptions::builder(path.clone())
        .schema(TEST_SCHEMA)
        .build()
        .await?;
    // a second schema run would fail with "table test already exists"
    let second = DriverOptions::builder(path.clone())
        .schema(TEST_SCHEMA)
        .build()
        .await?;
    assert!(first.same_connection(&second));

    first
        .run(("INSERT INTO test (name) VALUES (?)", ["via first"]))
        .await?;
    let seen = second.many("SELECT * FROM test").await?;
    assert_eq!(seen.len(), 1);

    let uncached = DriverOptions::builder(path).cached(false).build().await?;
    assert!(!uncached.same_connection(&first));
    assert_eq!(uncached.many("SELECT * FROM test").await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn memory_databases_are_never_shared() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let a = DriverOptions::builder(":memory:")
        .schema(TEST_SCHEMA)
        .build()
        .await?;
    let b = DriverOptions::builder(":memory:")
        .schema(TEST_SCHEMA)
        .build()
        .await?;
    assert!(!a.same_connection(&b));

    a.exec("INSERT INTO test (name) VALUES ('only in a')").await?;
    assert_eq!(a.many("SELECT * FROM test").await?.len(), 1);
    assert!(b.many("SELECT * FROM test").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn schema_failure_aborts_open() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let dir = tempdir()?;
    let path = dir.path().join("broken.db").to_string_lossy().into_owned();

    let err = DriverOptions::builder(path.clone())
        .schema("CREATE TABLE ok (id INTEGER); CREATE TABLE broken (")
        .build()
        .await
        .expect_err("schema has a syntax error");
    assert!(matches!(err, DriverError::Sqlite(_)));

    // the failed connection was not cached; a fresh open works
    let db = Driver::open_path(path).await?;
    db.exec("CREATE TABLE IF NOT EXISTS fine (id INTEGER)").await?;
    Ok(())
}

#[tokio::test]
async fn options_from_config_file() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let dir = tempdir()?;
    let path = dir.path().join("wal.db");
    let config = serde_json::json!({
        "path": path.to_string_lossy(),
        "schema": TEST_SCHEMA,
        "busy_timeout_ms": 2000,
        "journal_wal": true,
    });
    let options: DriverOptions = serde_json::from_value(config)?;

    let db = Driver::open(options).await?;
    let mode = db
        .one("PRAGMA journal_mode")
        .await?
        .and_then(|row| row.get_by_index(0).and_then(Value::as_text).map(str::to_lowercase));
    assert_eq!(mode.as_deref(), Some("wal"));
    db.close().await?;
    Ok(())
}
