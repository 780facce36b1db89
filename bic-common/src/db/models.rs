//! Database models

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::str::FromStr;

use crate::Error;

/// Quote lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteStatus {
    #[default]
    New,
    Sent,
    Accepted,
    Declined,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::New => "NEW",
            QuoteStatus::Sent => "SENT",
            QuoteStatus::Accepted => "ACCEPTED",
            QuoteStatus::Declined => "DECLINED",
        }
    }
}

impl FromStr for QuoteStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NEW" => Ok(QuoteStatus::New),
            "SENT" => Ok(QuoteStatus::Sent),
            "ACCEPTED" => Ok(QuoteStatus::Accepted),
            "DECLINED" => Ok(QuoteStatus::Declined),
            other => Err(Error::InvalidInput(format!("Invalid quote status: {}", other))),
        }
    }
}

/// Full quote row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Quote {
    pub id: String,
    pub quote_number: Option<String>,
    pub company_context: String,
    pub estimate_type: String,
    pub status: String,
    pub client_name: Option<String>,
    pub notes: Option<String>,
    pub subtotal_services: f64,
    pub subtotal_addons: f64,
    pub subtotal: f64,
    pub total: f64,
    pub estimated_total: f64,
    pub disclaimer_text: Option<String>,
    pub disclaimer_version: Option<String>,
    pub metadata: Json<serde_json::Value>,
    pub created_at: String,
}

/// Admin listing row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuoteSummary {
    pub id: String,
    pub quote_number: Option<String>,
    pub created_at: String,
    pub company_context: String,
    pub estimate_type: String,
    pub client_name: Option<String>,
    pub status: String,
    pub estimated_total: f64,
    pub total: f64,
}

/// Service line on a quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct QuoteServiceLine {
    pub service_category: String,
    pub unit: String,
    pub quantity: f64,
    pub estimated_amount: f64,
    pub vehicle_type: Option<String>,
    pub passenger_count: Option<i64>,
}

/// Add-on line on a quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct QuoteAddonLine {
    pub extra_type: String,
    pub unit: String,
    pub quantity: f64,
    pub estimated_amount: f64,
}

/// Quote with its line items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteDetail {
    #[serde(flatten)]
    pub quote: Quote,
    pub services: Vec<QuoteServiceLine>,
    pub addons: Vec<QuoteAddonLine>,
}

/// Job log status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobLogStatus {
    #[default]
    Logged,
    Archived,
}

impl JobLogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobLogStatus::Logged => "logged",
            JobLogStatus::Archived => "archived",
        }
    }
}

impl FromStr for JobLogStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "logged" => Ok(JobLogStatus::Logged),
            "archived" => Ok(JobLogStatus::Archived),
            _ => Err(Error::InvalidInput(
                "Invalid status. Use 'archived' or 'logged'.".to_string(),
            )),
        }
    }
}

/// How a job log was captured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobLogSource {
    #[default]
    Voice,
    Typed,
}

impl JobLogSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobLogSource::Voice => "voice",
            JobLogSource::Typed => "typed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobLog {
    pub id: String,
    pub company_context: String,
    pub source: String,
    pub transcript: String,
    pub job_summary: String,
    pub audio_url: Option<String>,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Receipt {
    pub id: String,
    pub company_context: String,
    pub uploader_note: Option<String>,
    pub file_name: String,
    pub file_path: String,
    pub public_url: String,
    pub mime_type: Option<String>,
    pub file_size: Option<i64>,
    pub related_job_log_id: Option<String>,
    pub related_quote_id: Option<String>,
    pub created_at: String,
}

/// Price book entry offered when building a quote
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PriceBookEntry {
    pub id: String,
    pub company_context: String,
    pub label: String,
    pub service_name: Option<String>,
    pub unit: String,
    pub default_unit_price: f64,
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_status_parse() {
        assert_eq!("new".parse::<QuoteStatus>().unwrap(), QuoteStatus::New);
        assert_eq!("ACCEPTED".parse::<QuoteStatus>().unwrap(), QuoteStatus::Accepted);
        assert!("pending".parse::<QuoteStatus>().is_err());
    }

    #[test]
    fn test_job_log_status_is_exact() {
        assert_eq!("archived".parse::<JobLogStatus>().unwrap(), JobLogStatus::Archived);
        assert!("Archived".parse::<JobLogStatus>().is_err());
        assert!("deleted".parse::<JobLogStatus>().is_err());
    }
}
