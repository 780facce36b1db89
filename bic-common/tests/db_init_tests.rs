//! Database initialization tests

use bic_common::db::init::init_database;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("bic.db");

    let result = init_database(&db_path).await;
    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("bic.db");

    let pool1 = init_database(&db_path).await.unwrap();
    sqlx::query(
        "INSERT INTO job_logs (id, company_context, transcript, job_summary, created_at)
         VALUES ('log-1', 'xes', 'hello', 'hello', '2025-01-01T00:00:00.000Z')",
    )
    .execute(&pool1)
    .await
    .unwrap();
    pool1.close().await;

    // Re-running schema creation must keep existing rows
    let pool2 = init_database(&db_path).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM job_logs")
        .fetch_one(&pool2)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_all_tables_created() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("bic.db")).await.unwrap();

    for table in ["quotes", "quote_services", "quote_addons", "job_logs", "receipts", "price_book"] {
        let exists: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(exists, 1, "table {} missing", table);
    }
}

#[tokio::test]
async fn test_quote_number_is_unique_but_nullable() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("bic.db")).await.unwrap();

    let insert = "INSERT INTO quotes (id, quote_number, company_context, estimate_type, created_at)
                  VALUES (?, ?, 'xes', 'remediation', '2025-01-01T00:00:00.000Z')";

    // Any number of unnumbered quotes
    for id in ["a", "b"] {
        sqlx::query(insert)
            .bind(id)
            .bind(Option::<String>::None)
            .execute(&pool)
            .await
            .unwrap();
    }

    sqlx::query(insert)
        .bind("c")
        .bind("BIC-XES-20250101-0001")
        .execute(&pool)
        .await
        .unwrap();

    let err = sqlx::query(insert)
        .bind("d")
        .bind("BIC-XES-20250101-0001")
        .execute(&pool)
        .await
        .unwrap_err();

    match err {
        sqlx::Error::Database(db_err) => assert!(db_err.is_unique_violation()),
        other => panic!("expected unique violation, got {:?}", other),
    }
}
