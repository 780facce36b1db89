//! Quote persistence
//!
//! Quotes are created together with their line items in one transaction and
//! numbered afterwards through [`SqliteQuoteStore`], the SQLite side of the
//! quote number allocator.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::models::{
    Quote, QuoteAddonLine, QuoteDetail, QuoteServiceLine, QuoteStatus, QuoteSummary,
};
use crate::quote_number::{QuoteNumberLookup, QuoteNumberStore, StoreError};
use crate::time::{now, to_db_timestamp};
use crate::totals::QuoteTotals;
use crate::Result;

/// Everything needed to insert a quote and its lines
#[derive(Debug, Clone)]
pub struct NewQuote {
    pub company_context: String,
    pub estimate_type: String,
    pub status: QuoteStatus,
    pub client_name: Option<String>,
    pub notes: Option<String>,
    pub totals: QuoteTotals,
    pub disclaimer_text: Option<String>,
    pub disclaimer_version: Option<String>,
    pub metadata: serde_json::Value,
    pub services: Vec<QuoteServiceLine>,
    pub addons: Vec<QuoteAddonLine>,
}

/// Insert a quote with its service and add-on lines, returning the new id
///
/// The quote is created without a number; see
/// [`crate::quote_number::allocate_quote_number`].
pub async fn create_quote_with_items(pool: &SqlitePool, quote: &NewQuote) -> Result<String> {
    let quote_id = Uuid::new_v4().to_string();
    let created_at = to_db_timestamp(now());
    let metadata = serde_json::to_string(&quote.metadata)?;

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO quotes (
            id, company_context, estimate_type, status, client_name, notes,
            subtotal_services, subtotal_addons, subtotal, total, estimated_total,
            disclaimer_text, disclaimer_version, metadata, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&quote_id)
    .bind(&quote.company_context)
    .bind(&quote.estimate_type)
    .bind(quote.status.as_str())
    .bind(&quote.client_name)
    .bind(&quote.notes)
    .bind(quote.totals.subtotal_services)
    .bind(quote.totals.subtotal_addons)
    .bind(quote.totals.subtotal)
    .bind(quote.totals.total)
    .bind(quote.totals.estimated_total)
    .bind(&quote.disclaimer_text)
    .bind(&quote.disclaimer_version)
    .bind(&metadata)
    .bind(&created_at)
    .execute(&mut *tx)
    .await?;

    for (position, line) in quote.services.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO quote_services (
                id, quote_id, position, service_category, unit, quantity,
                estimated_amount, vehicle_type, passenger_count
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&quote_id)
        .bind(position as i64)
        .bind(&line.service_category)
        .bind(&line.unit)
        .bind(line.quantity)
        .bind(line.estimated_amount)
        .bind(&line.vehicle_type)
        .bind(line.passenger_count)
        .execute(&mut *tx)
        .await?;
    }

    for (position, line) in quote.addons.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO quote_addons (
                id, quote_id, position, extra_type, unit, quantity, estimated_amount
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&quote_id)
        .bind(position as i64)
        .bind(&line.extra_type)
        .bind(&line.unit)
        .bind(line.quantity)
        .bind(line.estimated_amount)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(quote_id)
}

/// All quotes, newest first
pub async fn list_quotes(pool: &SqlitePool) -> Result<Vec<QuoteSummary>> {
    let quotes = sqlx::query_as::<_, QuoteSummary>(
        r#"
        SELECT id, quote_number, created_at, company_context, estimate_type,
               client_name, status, estimated_total, total
        FROM quotes
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(quotes)
}

/// Load a quote row
pub async fn get_quote(pool: &SqlitePool, quote_id: &str) -> Result<Option<Quote>> {
    let quote = sqlx::query_as::<_, Quote>(
        r#"
        SELECT id, quote_number, company_context, estimate_type, status, client_name,
               notes, subtotal_services, subtotal_addons, subtotal, total,
               estimated_total, disclaimer_text, disclaimer_version, metadata, created_at
        FROM quotes
        WHERE id = ?
        "#,
    )
    .bind(quote_id)
    .fetch_optional(pool)
    .await?;

    Ok(quote)
}

/// Load a quote with its lines in entry order
pub async fn get_quote_detail(pool: &SqlitePool, quote_id: &str) -> Result<Option<QuoteDetail>> {
    let Some(quote) = get_quote(pool, quote_id).await? else {
        return Ok(None);
    };

    let services = sqlx::query_as::<_, QuoteServiceLine>(
        r#"
        SELECT service_category, unit, quantity, estimated_amount, vehicle_type, passenger_count
        FROM quote_services
        WHERE quote_id = ?
        ORDER BY position
        "#,
    )
    .bind(quote_id)
    .fetch_all(pool)
    .await?;

    let addons = sqlx::query_as::<_, QuoteAddonLine>(
        r#"
        SELECT extra_type, unit, quantity, estimated_amount
        FROM quote_addons
        WHERE quote_id = ?
        ORDER BY position
        "#,
    )
    .bind(quote_id)
    .fetch_all(pool)
    .await?;

    Ok(Some(QuoteDetail {
        quote,
        services,
        addons,
    }))
}

/// SQLite-backed store for quote number allocation
#[derive(Clone)]
pub struct SqliteQuoteStore {
    pool: SqlitePool,
}

impl SqliteQuoteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuoteNumberStore for SqliteQuoteStore {
    async fn find_quote_number(&self, quote_id: &str) -> std::result::Result<QuoteNumberLookup, StoreError> {
        let row: Option<Option<String>> =
            sqlx::query_scalar("SELECT quote_number FROM quotes WHERE id = ?")
                .bind(quote_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(match row {
            None => QuoteNumberLookup::Missing,
            Some(None) => QuoteNumberLookup::Unnumbered,
            Some(Some(number)) => QuoteNumberLookup::Numbered(number),
        })
    }

    async fn latest_with_prefix(&self, prefix: &str) -> std::result::Result<Option<String>, StoreError> {
        // substr instead of LIKE: LIKE is case-insensitive and treats '_' as a wildcard.
        // Length first keeps the order numeric once sequences outgrow the pad width.
        // substr and length count characters, not bytes.
        let latest: Option<String> = sqlx::query_scalar(
            r#"
            SELECT quote_number
            FROM quotes
            WHERE substr(quote_number, 1, ?) = ?
            ORDER BY length(quote_number) DESC, quote_number DESC
            LIMIT 1
            "#,
        )
        .bind(prefix.chars().count() as i64)
        .bind(prefix)
        .fetch_optional(&self.pool)
        .await?;

        Ok(latest)
    }

    async fn assign_quote_number(
        &self,
        quote_id: &str,
        quote_number: &str,
    ) -> std::result::Result<bool, StoreError> {
        let result =
            sqlx::query("UPDATE quotes SET quote_number = ? WHERE id = ? AND quote_number IS NULL")
                .bind(quote_number)
                .bind(quote_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}
