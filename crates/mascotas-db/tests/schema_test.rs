//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

async fn fresh_db() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    db
}

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = fresh_db().await;

    mascotas_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    for table in ["user", "session", "foundation", "pet", "adoption", "_migration"] {
        assert!(info_str.contains(table), "missing {table} table");
    }
}

#[tokio::test]
async fn migration_is_idempotent() {
    let db = fresh_db().await;

    mascotas_db::run_migrations(&db).await.unwrap();
    mascotas_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("SELECT * FROM _migration").await.unwrap();
    let records: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    assert_eq!(records.len(), 1, "expected exactly one migration record");
}

#[tokio::test]
async fn unique_index_prevents_second_adoption_of_a_pet() {
    let db = fresh_db().await;
    mascotas_db::run_migrations(&db).await.unwrap();

    db.query(
        "CREATE adoption SET pet_id = 'p1', user_id = 'u1', \
         foundation_id = 'f1'",
    )
    .await
    .unwrap()
    .check()
    .unwrap();

    let result = db
        .query(
            "CREATE adoption SET pet_id = 'p1', user_id = 'u2', \
             foundation_id = 'f1'",
        )
        .await
        .unwrap()
        .check();

    assert!(result.is_err(), "second adoption of p1 should be rejected");
}

#[tokio::test]
async fn negative_age_is_rejected_by_schema() {
    let db = fresh_db().await;
    mascotas_db::run_migrations(&db).await.unwrap();

    let result = db
        .query(
            "CREATE pet SET name = 'Luna', species = 'Gato', age = -1, \
             foundation_id = 'f1'",
        )
        .await
        .unwrap()
        .check();

    assert!(result.is_err(), "negative age should violate the ASSERT");
}
