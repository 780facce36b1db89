//! Price book lookups

use sqlx::SqlitePool;
use uuid::Uuid;

use super::models::PriceBookEntry;
use crate::business::Business;
use crate::Result;

/// Price book entries for one business, ordered by label
pub async fn list_price_book(pool: &SqlitePool, business: Business) -> Result<Vec<PriceBookEntry>> {
    let entries = sqlx::query_as::<_, PriceBookEntry>(
        r#"
        SELECT id, company_context, label, service_name, unit, default_unit_price, category
        FROM price_book
        WHERE company_context = ?
        ORDER BY label ASC
        "#,
    )
    .bind(business.as_str())
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

/// Add a price book entry, returning its id
pub async fn insert_price_book_entry(
    pool: &SqlitePool,
    business: Business,
    label: &str,
    unit: &str,
    default_unit_price: f64,
    category: Option<&str>,
) -> Result<String> {
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO price_book (id, company_context, label, unit, default_unit_price, category)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(business.as_str())
    .bind(label)
    .bind(unit)
    .bind(default_unit_price)
    .bind(category)
    .execute(pool)
    .await?;

    Ok(id)
}
