//! Free-text field extraction endpoint

use axum::{extract::rejection::JsonRejection, Json};
use bic_common::{extract_fields, ExtractedFields};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    #[serde(default)]
    pub text: String,
}

/// POST /api/extract
pub async fn extract_text(
    payload: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Json<ExtractedFields>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(extract_fields(&request.text)))
}
