//! Price book endpoint

use axum::extract::{Query, State};
use axum::Json;
use bic_common::business::Business;
use bic_common::db::price_book::list_price_book;
use bic_common::db::PriceBookEntry;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ServicesQuery {
    #[serde(default)]
    pub business: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ServiceList {
    pub services: Vec<PriceBookEntry>,
}

/// GET /api/services?business=xes|gxs|exquisite_limo
pub async fn list_services(
    State(state): State<AppState>,
    Query(query): Query<ServicesQuery>,
) -> Result<Json<ServiceList>, ApiError> {
    let business: Business = query.business.unwrap_or_default().parse()?;
    let services = list_price_book(&state.db, business).await?;
    Ok(Json(ServiceList { services }))
}
