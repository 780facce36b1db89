//! Receipt metadata persistence (file bytes live on disk)

use sqlx::SqlitePool;
use uuid::Uuid;

use super::models::Receipt;
use crate::time::{now, to_db_timestamp};
use crate::Result;

#[derive(Debug, Clone)]
pub struct NewReceipt {
    pub company_context: String,
    pub uploader_note: Option<String>,
    pub file_name: String,
    pub file_path: String,
    pub public_url: String,
    pub mime_type: Option<String>,
    pub file_size: Option<i64>,
    pub related_job_log_id: Option<String>,
    pub related_quote_id: Option<String>,
}

pub async fn insert_receipt(pool: &SqlitePool, receipt: NewReceipt) -> Result<Receipt> {
    let row = Receipt {
        id: Uuid::new_v4().to_string(),
        company_context: receipt.company_context,
        uploader_note: receipt.uploader_note,
        file_name: receipt.file_name,
        file_path: receipt.file_path,
        public_url: receipt.public_url,
        mime_type: receipt.mime_type,
        file_size: receipt.file_size,
        related_job_log_id: receipt.related_job_log_id,
        related_quote_id: receipt.related_quote_id,
        created_at: to_db_timestamp(now()),
    };

    sqlx::query(
        r#"
        INSERT INTO receipts (
            id, company_context, uploader_note, file_name, file_path, public_url,
            mime_type, file_size, related_job_log_id, related_quote_id, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&row.id)
    .bind(&row.company_context)
    .bind(&row.uploader_note)
    .bind(&row.file_name)
    .bind(&row.file_path)
    .bind(&row.public_url)
    .bind(&row.mime_type)
    .bind(row.file_size)
    .bind(&row.related_job_log_id)
    .bind(&row.related_quote_id)
    .bind(&row.created_at)
    .execute(pool)
    .await?;

    Ok(row)
}

/// All receipts, newest first
pub async fn list_receipts(pool: &SqlitePool) -> Result<Vec<Receipt>> {
    let receipts = sqlx::query_as::<_, Receipt>(
        r#"
        SELECT id, company_context, uploader_note, file_name, file_path, public_url,
               mime_type, file_size, related_job_log_id, related_quote_id, created_at
        FROM receipts
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(receipts)
}
