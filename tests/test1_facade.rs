mod common;

use common::{id_of, memory_db, name_of};
use serde_json::json;
use sqlite_facade::prelude::*;

#[tokio::test]
async fn crud_round_through_every_operation() -> Result<(), Box<dyn std::error::Error>> {
    let db = memory_db().await?;

    let id = db
        .run(("INSERT INTO test (name) VALUES (?)", params!["Alice"]))
        .await?;
    assert_eq!(id, 1);

    let alice = db
        .one(SqlQuery::new("SELECT * FROM test WHERE name = ?").bind("Alice"))
        .await?
        .expect("Alice should exist");
    assert_eq!(id_of(&alice), Some(1));
    assert_eq!(name_of(&alice), Some("Alice"));
    assert_eq!(alice.to_json()?, json!({ "id": 1, "name": "Alice" }));

    db.exec("INSERT INTO test (name) VALUES ('Bob')").await?;

    let everyone = db.many("SELECT * FROM test ORDER BY id").await?;
    assert_eq!(everyone.len(), 2);
    assert_eq!(name_of(&everyone[1]), Some("Bob"));

    db.exec("UPDATE test SET name = 'Charlie' WHERE name = 'Alice'")
        .await?;

    let renamed = db
        .one(("SELECT * FROM test WHERE id = ?", [1]))
        .await?
        .expect("row 1 should exist");
    assert_eq!(renamed.to_json()?, json!({ "id": 1, "name": "Charlie" }));

    db.close().await?;
    Ok(())
}

#[tokio::test]
async fn run_returns_increasing_ids() -> Result<(), Box<dyn std::error::Error>> {
    let db = memory_db().await?;
    let first = db
        .run(("INSERT INTO test (name) VALUES (?)", ["one"]))
        .await?;
    let second = db
        .run(("INSERT INTO test (name) VALUES (?)", ["two"]))
        .await?;
    assert!(second > first, "{second} should follow {first}");

    let outcome = db.execute("UPDATE test SET name = upper(name)").await?;
    assert_eq!(outcome.changes, 2);
    Ok(())
}

#[tokio::test]
async fn empty_results_are_not_errors() -> Result<(), Box<dyn std::error::Error>> {
    let db = memory_db().await?;

    let none = db
        .one(("SELECT * FROM test WHERE name = ?", ["nobody"]))
        .await?;
    assert!(none.is_none());

    let empty = db.many("SELECT * FROM test").await?;
    assert!(empty.is_empty());

    // get/all accept the pre-built call shape and behave like one/many
    let q = SqlQuery::new("SELECT * FROM test WHERE id = ?").bind(42);
    assert!(db.get(&q).await?.is_none());
    assert!(db.all(&q).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn call_shapes_are_interchangeable() -> Result<(), Box<dyn std::error::Error>> {
    let db = memory_db().await?;
    db.run(("INSERT INTO test (name) VALUES (?)", ["Alice"]))
        .await?;

    let by_tuple = db
        .one(("SELECT * FROM test WHERE name = ?", ["Alice"]))
        .await?;
    let by_query = db
        .one(SqlQuery::with_values(
            "SELECT * FROM test WHERE name = ?",
            params!["Alice"],
        ))
        .await?;
    let by_json = db
        .one(json!({ "text": "SELECT * FROM test WHERE name = ?", "values": ["Alice"] }))
        .await?;

    assert!(by_tuple.is_some());
    assert_eq!(by_tuple, by_query);
    assert_eq!(by_tuple, by_json);
    Ok(())
}

#[tokio::test]
async fn malformed_arguments_never_reach_the_engine() -> Result<(), Box<dyn std::error::Error>> {
    let db = memory_db().await?;

    for bad in [json!(null), json!(7), json!({ "values": [1] })] {
        let err = db.one(bad).await.expect_err("should be rejected");
        assert!(matches!(err, DriverError::InvalidArgument(_)), "{err:?}");
    }

    let err = db
        .exec(("INSERT INTO test (name) VALUES (?)", ["x"]))
        .await
        .expect_err("exec takes no parameters");
    assert!(matches!(err, DriverError::UnexpectedParameters(1)));
    assert!(err.is_usage_error());

    let err = db
        .exec(SqlQuery::new("DELETE FROM test WHERE id = ?").bind(1))
        .await
        .expect_err("pre-built query with values is rejected too");
    assert!(matches!(err, DriverError::UnexpectedParameters(1)));

    assert!(db.many("SELECT * FROM test").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn engine_errors_surface_verbatim() -> Result<(), Box<dyn std::error::Error>> {
    let db = memory_db().await?;
    db.run(("INSERT INTO test (id, name) VALUES (?, ?)", params![1, "a"]))
        .await?;

    let err = db
        .run(("INSERT INTO test (id, name) VALUES (?, ?)", params![1, "b"]))
        .await
        .expect_err("duplicate primary key");
    assert!(matches!(
        err,
        DriverError::Sqlite(rusqlite_error) if rusqlite_error.sqlite_error_code()
            == Some(rusqlite::ErrorCode::ConstraintViolation)
    ));

    let err = db.many("SELEC nonsense").await.expect_err("bad sql");
    assert!(matches!(err, DriverError::Sqlite(_)));
    assert!(!err.is_usage_error());

    let err = db
        .one(("SELECT * FROM test WHERE id = ?", params![1, 2]))
        .await
        .expect_err("too many parameters");
    assert!(matches!(err, DriverError::Sqlite(_)));

    // the connection stays usable after failures
    assert_eq!(db.many("SELECT * FROM test").await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn values_round_trip_through_storage() -> Result<(), Box<dyn std::error::Error>> {
    let db = memory_db().await?;
    db.exec("CREATE TABLE mixed (i INTEGER, f REAL, t TEXT, b BLOB, n TEXT, flag INTEGER, doc TEXT)")
        .await?;
    db.run((
        "INSERT INTO mixed VALUES (?, ?, ?, ?, ?, ?, ?)",
        params![
            7_i64,
            2.5,
            "text",
            vec![0_u8, 1, 2],
            None::<String>,
            true,
            json!({ "k": [1, 2] })
        ],
    ))
    .await?;

    let row = db.one("SELECT * FROM mixed").await?.expect("one row");
    assert_eq!(row.get("i"), Some(&Value::Int(7)));
    assert_eq!(row.get("f"), Some(&Value::Float(2.5)));
    assert_eq!(row.get("t"), Some(&Value::Text("text".into())));
    assert_eq!(row.get("b").and_then(Value::as_blob), Some(&[0_u8, 1, 2][..]));
    assert!(row.get("n").is_some_and(Value::is_null));
    assert_eq!(row.get("flag").and_then(Value::as_bool), Some(true));
    assert_eq!(
        row.get("doc").and_then(Value::as_text),
        Some("{\"k\":[1,2]}")
    );
    Ok(())
}

#[tokio::test]
async fn concurrent_callers_share_one_connection() -> Result<(), Box<dyn std::error::Error>> {
    let db = memory_db().await?;
    let mut handles = Vec::new();
    for i in 0..20 {
        let db = db.clone();
        handles.push(tokio::spawn(async move {
            db.run(("INSERT INTO test (name) VALUES (?)", [format!("n{i}")]))
                .await
        }));
    }
    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await??);
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 20);

    let count = db
        .one("SELECT COUNT(*) AS n FROM test")
        .await?
        .and_then(|row| row.get("n").and_then(Value::as_int));
    assert_eq!(count, Some(20));
    Ok(())
}
