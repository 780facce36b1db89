//! Quote line items and totals
//!
//! The quote form and older API clients disagree on field names (`name` vs
//! `service_category`, `qty` vs `quantity`, `lineTotal` vs
//! `estimated_amount`) and sometimes send numbers as strings. Everything is
//! normalized here before it reaches the database.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::db::{QuoteAddonLine, QuoteServiceLine};

/// Number from a JSON number or numeric string; anything else is absent
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| as_number(&v)))
}

/// Numeric value of a JSON number or numeric string
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

/// Round a currency amount to cents
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Line item as submitted by a client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncomingLine {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub service_category: Option<String>,
    #[serde(default)]
    pub extra_type: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub qty: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub quantity: Option<f64>,
    #[serde(default, rename = "unitPrice", deserialize_with = "lenient_number")]
    pub unit_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub estimated_amount: Option<f64>,
    #[serde(default, rename = "lineTotal", deserialize_with = "lenient_number")]
    pub line_total: Option<f64>,
}

/// Label, unit, quantity and amount of a usable line
struct NormalizedLine {
    label: String,
    unit: String,
    quantity: f64,
    amount: f64,
}

impl IncomingLine {
    fn normalize(&self, label: Option<&String>) -> Option<NormalizedLine> {
        let label = label.or(self.name.as_ref())?.trim().to_string();
        let unit = self.unit.as_deref().unwrap_or_default().trim().to_string();
        let quantity = self.quantity.or(self.qty).unwrap_or(0.0);
        let unit_price = self.unit_price.unwrap_or(0.0);
        let amount = self
            .estimated_amount
            .or(self.line_total)
            .unwrap_or(quantity * unit_price);

        if label.is_empty() || unit.is_empty() || quantity <= 0.0 {
            return None;
        }

        Some(NormalizedLine {
            label,
            unit,
            quantity,
            amount: round_cents(amount),
        })
    }
}

/// Usable service lines; limo quotes stamp the trip's vehicle and party size
pub fn normalize_services(
    lines: &[IncomingLine],
    vehicle_type: Option<&str>,
    passenger_count: Option<i64>,
) -> Vec<QuoteServiceLine> {
    lines
        .iter()
        .filter_map(|line| line.normalize(line.service_category.as_ref()))
        .map(|l| QuoteServiceLine {
            service_category: l.label,
            unit: l.unit,
            quantity: l.quantity,
            estimated_amount: l.amount,
            vehicle_type: vehicle_type.map(str::to_string),
            passenger_count,
        })
        .collect()
}

/// Usable add-on lines
pub fn normalize_addons(lines: &[IncomingLine]) -> Vec<QuoteAddonLine> {
    lines
        .iter()
        .filter_map(|line| line.normalize(line.extra_type.as_ref()))
        .map(|l| QuoteAddonLine {
            extra_type: l.label,
            unit: l.unit,
            quantity: l.quantity,
            estimated_amount: l.amount,
        })
        .collect()
}

/// Totals supplied by the client; any of them may be missing
#[derive(Debug, Clone, Copy, Default)]
pub struct TotalsOverrides {
    pub subtotal_services: Option<f64>,
    pub subtotal_addons: Option<f64>,
    pub subtotal: Option<f64>,
    pub total: Option<f64>,
    pub estimated_total: Option<f64>,
}

/// Monetary totals stored on a quote
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuoteTotals {
    pub subtotal_services: f64,
    pub subtotal_addons: f64,
    pub subtotal: f64,
    pub total: f64,
    pub estimated_total: f64,
}

impl QuoteTotals {
    /// Totals from normalized lines, with client-supplied values taking precedence
    pub fn compute(
        services: &[QuoteServiceLine],
        addons: &[QuoteAddonLine],
        overrides: TotalsOverrides,
    ) -> Self {
        let subtotal_services = overrides
            .subtotal_services
            .unwrap_or_else(|| services.iter().map(|s| s.estimated_amount).sum());
        let subtotal_addons = overrides
            .subtotal_addons
            .unwrap_or_else(|| addons.iter().map(|a| a.estimated_amount).sum());
        let combined = subtotal_services + subtotal_addons;

        let estimated_total = overrides.estimated_total.unwrap_or(combined);
        let subtotal = overrides.subtotal.unwrap_or(combined);
        let total = overrides.total.unwrap_or(estimated_total);

        Self {
            subtotal_services: round_cents(subtotal_services),
            subtotal_addons: round_cents(subtotal_addons),
            subtotal: round_cents(subtotal),
            total: round_cents(total),
            estimated_total: round_cents(estimated_total),
        }
    }
}
