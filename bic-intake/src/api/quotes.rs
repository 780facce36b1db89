//! Quote endpoints
//!
//! The quote builder and older API clients post different field names for
//! the same data (`business` vs `company_context`, `estimateType` vs
//! `estimate_type`, nested UI totals vs flat columns). Both are accepted;
//! the UI name wins when both are present.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use bic_common::business::Business;
use bic_common::db::quotes::{create_quote_with_items, get_quote_detail, list_quotes as db_list_quotes, NewQuote};
use bic_common::db::{QuoteDetail, QuoteStatus, QuoteSummary};
use bic_common::time::today_utc;
use bic_common::totals::{as_number, normalize_addons, normalize_services, IncomingLine, QuoteTotals, TotalsOverrides};
use bic_common::{allocate_quote_number, AllocateError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::info;

use crate::error::ApiError;
use crate::AppState;

pub const DEFAULT_DISCLAIMER_TEXT: &str = "This is a preliminary estimate only, not a final invoice/contract. Final pricing may change after inspection and scope confirmation.";
pub const DEFAULT_DISCLAIMER_VERSION: &str = "v1";

/// Totals block sent by the quote builder
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiTotals {
    #[serde(default)]
    pub services_subtotal: Option<Value>,
    #[serde(default)]
    pub addons_subtotal: Option<Value>,
    #[serde(default)]
    pub total: Option<Value>,
}

/// POST /api/quotes body
#[derive(Debug, Default, Deserialize)]
pub struct CreateQuoteRequest {
    #[serde(default)]
    pub business: Option<String>,
    #[serde(default)]
    pub company_context: Option<String>,
    #[serde(default, rename = "estimateType")]
    pub estimate_type_ui: Option<String>,
    #[serde(default)]
    pub estimate_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "clientName")]
    pub client_name_ui: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub totals: Option<UiTotals>,
    #[serde(default)]
    pub subtotal_services: Option<Value>,
    #[serde(default)]
    pub subtotal_addons: Option<Value>,
    #[serde(default)]
    pub subtotal: Option<Value>,
    #[serde(default)]
    pub total: Option<Value>,
    #[serde(default)]
    pub estimated_total: Option<Value>,

    #[serde(default, rename = "disclaimerText")]
    pub disclaimer_text_ui: Option<String>,
    #[serde(default)]
    pub disclaimer_text: Option<String>,
    #[serde(default, rename = "disclaimerVersion")]
    pub disclaimer_version_ui: Option<String>,
    #[serde(default)]
    pub disclaimer_version: Option<String>,

    #[serde(default, rename = "jobAddress")]
    pub job_address: Option<Value>,
    #[serde(default, rename = "lossType")]
    pub loss_type: Option<Value>,
    #[serde(default)]
    pub limo: Option<Value>,

    #[serde(default)]
    pub services: Option<Vec<IncomingLine>>,
    #[serde(default)]
    pub addons: Option<Vec<IncomingLine>>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn number(value: Option<&Value>) -> Option<f64> {
    value.and_then(as_number)
}

impl CreateQuoteRequest {
    /// Validate and normalize into a row ready for insertion
    pub fn into_new_quote(self) -> Result<NewQuote, ApiError> {
        let company_context = non_empty(self.business)
            .or(non_empty(self.company_context))
            .map(|c| c.trim().to_string())
            .ok_or_else(|| ApiError::BadRequest("business/company_context is required".to_string()))?;

        let estimate_type = non_empty(self.estimate_type_ui)
            .or(non_empty(self.estimate_type))
            .ok_or_else(|| ApiError::BadRequest("estimateType is required".to_string()))?;

        let status = match non_empty(self.status) {
            Some(s) => s.parse::<QuoteStatus>()?,
            None => QuoteStatus::default(),
        };

        // Limo trip details are stamped on every service line
        let limo = self.limo.filter(Value::is_object);
        let is_limo = company_context
            .parse::<Business>()
            .map(|b| b.is_limo())
            .unwrap_or(false);
        let (vehicle_type, passenger_count) = match (&limo, is_limo) {
            (Some(limo), true) => (
                limo.get("vehicleType").and_then(Value::as_str).map(str::to_string),
                limo.get("passengers").and_then(Value::as_i64),
            ),
            _ => (None, None),
        };

        let services = normalize_services(
            self.services.as_deref().unwrap_or_default(),
            vehicle_type.as_deref(),
            passenger_count,
        );
        if services.is_empty() {
            return Err(ApiError::BadRequest(
                "At least one valid service line item is required.".to_string(),
            ));
        }
        let addons = normalize_addons(self.addons.as_deref().unwrap_or_default());

        let ui_totals = self.totals.unwrap_or_default();
        let overrides = TotalsOverrides {
            subtotal_services: number(self.subtotal_services.as_ref())
                .or(number(ui_totals.services_subtotal.as_ref())),
            subtotal_addons: number(self.subtotal_addons.as_ref())
                .or(number(ui_totals.addons_subtotal.as_ref())),
            subtotal: number(self.subtotal.as_ref()),
            total: number(self.total.as_ref()),
            estimated_total: number(self.estimated_total.as_ref())
                .or(number(ui_totals.total.as_ref()))
                .or(number(self.total.as_ref())),
        };
        let totals = QuoteTotals::compute(&services, &addons, overrides);

        let mut metadata = Map::new();
        metadata.insert(
            "estimate_context".to_string(),
            json!({
                "company_context": company_context,
                "estimate_type": estimate_type,
                "status": status.as_str(),
            }),
        );
        if let Some(address) = self.job_address.filter(|v| !v.is_null()) {
            metadata.insert("job_address".to_string(), address);
        }
        if let Some(loss_type) = self.loss_type.filter(|v| !v.is_null()) {
            metadata.insert("loss_type".to_string(), loss_type);
        }
        if let Some(limo) = limo {
            metadata.insert("limo".to_string(), limo);
        }

        Ok(NewQuote {
            company_context,
            estimate_type,
            status,
            client_name: non_empty(self.client_name_ui).or(non_empty(self.client_name)),
            notes: non_empty(self.notes),
            totals,
            disclaimer_text: Some(
                non_empty(self.disclaimer_text_ui)
                    .or(non_empty(self.disclaimer_text))
                    .unwrap_or_else(|| DEFAULT_DISCLAIMER_TEXT.to_string()),
            ),
            disclaimer_version: Some(
                non_empty(self.disclaimer_version_ui)
                    .or(non_empty(self.disclaimer_version))
                    .unwrap_or_else(|| DEFAULT_DISCLAIMER_VERSION.to_string()),
            ),
            metadata: Value::Object(metadata),
            services,
            addons,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct NumberedQuote {
    pub id: String,
    pub quote_number: String,
}

#[derive(Debug, Serialize)]
pub struct QuoteList {
    pub quotes: Vec<QuoteSummary>,
}

/// Run the allocator for today's partition
async fn number_quote(
    state: &AppState,
    quote_id: &str,
    company_context: &str,
) -> Result<String, ApiError> {
    allocate_quote_number(
        &state.quote_store,
        &state.config.quote_numbers,
        quote_id,
        company_context,
        today_utc(),
    )
    .await
    .map_err(|e| match e {
        AllocateError::Exhausted { .. } => ApiError::NumberingExhausted {
            quote_id: quote_id.to_string(),
            message: e.to_string(),
        },
        other => other.into(),
    })
}

/// POST /api/quotes
pub async fn create_quote(
    State(state): State<AppState>,
    payload: Result<Json<CreateQuoteRequest>, JsonRejection>,
) -> Result<Json<NumberedQuote>, ApiError> {
    let Json(request) = payload?;
    let new_quote = request.into_new_quote()?;

    let quote_id = create_quote_with_items(&state.db, &new_quote).await?;
    info!(
        quote_id = %quote_id,
        company_context = %new_quote.company_context,
        services = new_quote.services.len(),
        addons = new_quote.addons.len(),
        "Created quote"
    );

    let quote_number = number_quote(&state, &quote_id, &new_quote.company_context).await?;

    Ok(Json(NumberedQuote {
        id: quote_id,
        quote_number,
    }))
}

/// GET /api/quotes
pub async fn list_quotes(State(state): State<AppState>) -> Result<Json<QuoteList>, ApiError> {
    let quotes = db_list_quotes(&state.db).await?;
    Ok(Json(QuoteList { quotes }))
}

/// GET /api/quotes/:id
pub async fn get_quote(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<QuoteDetail>, ApiError> {
    get_quote_detail(&state.db, &id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Quote not found.".to_string()))
}

/// POST /api/quotes/:id/number
///
/// Retries numbering for a quote left unnumbered by an exhausted allocation.
/// Returns the existing number when the quote already has one.
pub async fn assign_quote_number(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<NumberedQuote>, ApiError> {
    let quote = bic_common::db::quotes::get_quote(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Quote not found.".to_string()))?;

    let quote_number = number_quote(&state, &quote.id, &quote.company_context).await?;

    Ok(Json(NumberedQuote {
        id: quote.id,
        quote_number,
    }))
}
