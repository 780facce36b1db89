//! Quote number allocation against SQLite
//!
//! These exercise the real UNIQUE constraint rather than an in-memory store.

use bic_common::db::init::init_database;
use bic_common::db::quotes::{create_quote_with_items, NewQuote, SqliteQuoteStore};
use bic_common::db::{QuoteServiceLine, QuoteStatus};
use bic_common::quote_number::{QuoteNumberLookup, QuoteNumberStore};
use bic_common::totals::{QuoteTotals, TotalsOverrides};
use bic_common::{allocate_quote_number, QuoteNumberConfig};
use chrono::NaiveDate;
use sqlx::SqlitePool;
use std::collections::BTreeSet;
use std::sync::Arc;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn setup_db() -> (tempfile::TempDir, SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("bic.db")).await.unwrap();
    (dir, pool)
}

async fn new_quote(pool: &SqlitePool, company_context: &str) -> String {
    let services = vec![QuoteServiceLine {
        service_category: "Inspection".to_string(),
        unit: "flat".to_string(),
        quantity: 1.0,
        estimated_amount: 150.0,
        vehicle_type: None,
        passenger_count: None,
    }];
    let totals = QuoteTotals::compute(&services, &[], TotalsOverrides::default());

    create_quote_with_items(
        pool,
        &NewQuote {
            company_context: company_context.to_string(),
            estimate_type: "remediation".to_string(),
            status: QuoteStatus::New,
            client_name: None,
            notes: None,
            totals,
            disclaimer_text: None,
            disclaimer_version: None,
            metadata: serde_json::json!({}),
            services,
            addons: vec![],
        },
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_sequential_numbers_in_one_partition() {
    let (_dir, pool) = setup_db().await;
    let store = SqliteQuoteStore::new(pool.clone());
    let config = QuoteNumberConfig::default();

    let mut numbers = Vec::new();
    for _ in 0..3 {
        let id = new_quote(&pool, "xes").await;
        numbers.push(
            allocate_quote_number(&store, &config, &id, "xes", day(2025, 1, 1))
                .await
                .unwrap(),
        );
    }

    assert_eq!(
        numbers,
        vec![
            "BIC-XES-20250101-0001",
            "BIC-XES-20250101-0002",
            "BIC-XES-20250101-0003"
        ]
    );
}

#[tokio::test]
async fn test_repeat_allocation_returns_same_number() {
    let (_dir, pool) = setup_db().await;
    let store = SqliteQuoteStore::new(pool.clone());
    let config = QuoteNumberConfig::default();
    let id = new_quote(&pool, "gxs").await;

    let first = allocate_quote_number(&store, &config, &id, "gxs", day(2025, 1, 1))
        .await
        .unwrap();
    let second = allocate_quote_number(&store, &config, &id, "gxs", day(2025, 6, 1))
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(
        store.find_quote_number(&id).await.unwrap(),
        QuoteNumberLookup::Numbered(first)
    );
}

#[tokio::test]
async fn test_partitions_are_independent() {
    let (_dir, pool) = setup_db().await;
    let store = SqliteQuoteStore::new(pool.clone());
    let config = QuoteNumberConfig::default();

    let xes_day1 = new_quote(&pool, "xes").await;
    let gxs_day1 = new_quote(&pool, "gxs").await;
    let xes_day2 = new_quote(&pool, "xes").await;

    let a = allocate_quote_number(&store, &config, &xes_day1, "xes", day(2025, 1, 1))
        .await
        .unwrap();
    let b = allocate_quote_number(&store, &config, &gxs_day1, "gxs", day(2025, 1, 1))
        .await
        .unwrap();
    let c = allocate_quote_number(&store, &config, &xes_day2, "xes", day(2025, 1, 2))
        .await
        .unwrap();

    assert_eq!(a, "BIC-XES-20250101-0001");
    assert_eq!(b, "BIC-GXS-20250101-0001");
    assert_eq!(c, "BIC-XES-20250102-0001");
}

#[tokio::test]
async fn test_sequence_grows_past_four_digits() {
    let (_dir, pool) = setup_db().await;
    let store = SqliteQuoteStore::new(pool.clone());
    let config = QuoteNumberConfig::default();

    let seeded = new_quote(&pool, "xes").await;
    sqlx::query("UPDATE quotes SET quote_number = 'BIC-XES-20250101-9999' WHERE id = ?")
        .bind(&seeded)
        .execute(&pool)
        .await
        .unwrap();

    let id = new_quote(&pool, "xes").await;
    let number = allocate_quote_number(&store, &config, &id, "xes", day(2025, 1, 1))
        .await
        .unwrap();
    assert_eq!(number, "BIC-XES-20250101-10000");

    // 10000 sorts below 9999 as text; the scan must still find it
    assert_eq!(
        store
            .latest_with_prefix("BIC-XES-20250101-")
            .await
            .unwrap()
            .as_deref(),
        Some("BIC-XES-20250101-10000")
    );
}

#[tokio::test]
async fn test_prefix_match_is_exact() {
    let (_dir, pool) = setup_db().await;
    let store = SqliteQuoteStore::new(pool.clone());

    let seeded = new_quote(&pool, "xes").await;
    sqlx::query("UPDATE quotes SET quote_number = 'bic-xes-20250101-0042' WHERE id = ?")
        .bind(&seeded)
        .execute(&pool)
        .await
        .unwrap();

    assert_eq!(store.latest_with_prefix("BIC-XES-20250101-").await.unwrap(), None);
}

#[tokio::test]
async fn test_non_ascii_tag_keeps_counting() {
    let (_dir, pool) = setup_db().await;
    let store = SqliteQuoteStore::new(pool.clone());
    let config = QuoteNumberConfig {
        tag: "BÏC".to_string(),
        ..Default::default()
    };

    let mut last = String::new();
    for _ in 0..10 {
        let id = new_quote(&pool, "xes").await;
        last = allocate_quote_number(&store, &config, &id, "xes", day(2025, 1, 1))
            .await
            .unwrap();
    }

    assert_eq!(last, "BÏC-XES-20250101-0010");
    assert_eq!(
        store.latest_with_prefix("BÏC-XES-20250101-").await.unwrap().as_deref(),
        Some("BÏC-XES-20250101-0010")
    );
}

#[tokio::test]
async fn test_duplicate_write_reports_unique_violation() {
    let (_dir, pool) = setup_db().await;
    let store = SqliteQuoteStore::new(pool.clone());

    let a = new_quote(&pool, "xes").await;
    let b = new_quote(&pool, "xes").await;

    assert!(store
        .assign_quote_number(&a, "BIC-XES-20250101-0001")
        .await
        .unwrap());
    let err = store
        .assign_quote_number(&b, "BIC-XES-20250101-0001")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        bic_common::quote_number::StoreError::UniqueViolation
    ));
}

#[tokio::test]
async fn test_numbered_quote_is_not_overwritten() {
    let (_dir, pool) = setup_db().await;
    let store = SqliteQuoteStore::new(pool.clone());
    let id = new_quote(&pool, "xes").await;

    assert!(store
        .assign_quote_number(&id, "BIC-XES-20250101-0001")
        .await
        .unwrap());
    assert!(!store
        .assign_quote_number(&id, "BIC-XES-20250101-0002")
        .await
        .unwrap());
    assert_eq!(
        store.find_quote_number(&id).await.unwrap(),
        QuoteNumberLookup::Numbered("BIC-XES-20250101-0001".to_string())
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_allocations_are_unique() {
    let (_dir, pool) = setup_db().await;
    let store = Arc::new(SqliteQuoteStore::new(pool.clone()));
    let config = Arc::new(QuoteNumberConfig::default());

    let mut ids = Vec::new();
    for _ in 0..8 {
        ids.push(new_quote(&pool, "exquisite_limo").await);
    }

    let handles: Vec<_> = ids
        .into_iter()
        .map(|id| {
            let store = Arc::clone(&store);
            let config = Arc::clone(&config);
            tokio::spawn(async move {
                allocate_quote_number(&*store, &config, &id, "exquisite_limo", day(2025, 1, 1))
                    .await
            })
        })
        .collect();

    let mut numbers = BTreeSet::new();
    for handle in handles {
        let number = handle.await.unwrap().unwrap();
        assert!(numbers.insert(number), "duplicate quote number issued");
    }

    let expected: BTreeSet<String> = (1..=8)
        .map(|n| format!("BIC-ELT-20250101-{:04}", n))
        .collect();
    assert_eq!(numbers, expected);
}
