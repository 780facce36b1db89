//! Receipt upload and listing

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use bic_common::db::receipts::{insert_receipt, list_receipts as db_list_receipts, NewReceipt};
use bic_common::db::Receipt;
use bic_common::time::now;
use serde::Serialize;
use tracing::info;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct UploadedReceipt {
    pub receipt: Receipt,
}

#[derive(Debug, Serialize)]
pub struct ReceiptList {
    pub receipts: Vec<Receipt>,
}

struct UploadedFile {
    name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct ReceiptForm {
    file: Option<UploadedFile>,
    company_context: String,
    uploader_note: String,
    related_job_log_id: String,
    related_quote_id: String,
}

fn optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

async fn read_form(mut multipart: Multipart) -> Result<ReceiptForm, ApiError> {
    let mut form = ReceiptForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await?;
            form.file = Some(UploadedFile {
                name: file_name,
                content_type,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let value = field.text().await?;
        match name.as_str() {
            "company_context" => form.company_context = value,
            "uploader_note" => form.uploader_note = value,
            "related_job_log_id" => form.related_job_log_id = value,
            "related_quote_id" => form.related_quote_id = value,
            _ => {}
        }
    }

    Ok(form)
}

/// POST /api/receipts (multipart)
pub async fn upload_receipt(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadedReceipt>, ApiError> {
    let form = read_form(multipart?).await?;

    let company_context = form.company_context.trim().to_string();
    if company_context.is_empty() {
        return Err(ApiError::BadRequest("company_context is required".to_string()));
    }
    let file = form
        .file
        .ok_or_else(|| ApiError::BadRequest("file is required".to_string()))?;

    let stored = state
        .receipts
        .store(&company_context, &file.name, &file.bytes, now())
        .await?;

    let inserted = insert_receipt(
        &state.db,
        NewReceipt {
            company_context,
            uploader_note: optional(form.uploader_note),
            file_name: stored.file_name,
            file_path: stored.relative_path.clone(),
            public_url: stored.public_url,
            mime_type: file.content_type.filter(|m| !m.is_empty()),
            file_size: i64::try_from(stored.size).ok(),
            related_job_log_id: optional(form.related_job_log_id),
            related_quote_id: optional(form.related_quote_id),
        },
    )
    .await;

    // No stored file without a receipt row
    let receipt = match inserted {
        Ok(receipt) => receipt,
        Err(e) => {
            state.receipts.discard(&stored.relative_path).await;
            return Err(e.into());
        }
    };

    info!(
        receipt_id = %receipt.id,
        path = %receipt.file_path,
        size = stored.size,
        "Stored receipt"
    );

    Ok(Json(UploadedReceipt { receipt }))
}

/// GET /api/receipts
pub async fn list_receipts(State(state): State<AppState>) -> Result<Json<ReceiptList>, ApiError> {
    let receipts = db_list_receipts(&state.db).await?;
    Ok(Json(ReceiptList { receipts }))
}
