//! Quote number allocation
//!
//! Quote numbers look like `BIC-XES-20250101-0007`: a fixed tag, the business
//! code, the UTC day, and a zero-padded sequence that restarts at 1 for every
//! business/day partition.
//!
//! There is no counter table. The next sequence is derived by scanning for the
//! highest number already issued under the partition prefix, and the write
//! relies on the store's UNIQUE constraint on `quote_number` to detect races.
//! A rejected write moves on to the next candidate, up to
//! [`QuoteNumberConfig::max_attempts`] times.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::business::business_code;
use crate::time::compact_date;

/// Tunables for quote number allocation (`[quote_numbers]` in the TOML config)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteNumberConfig {
    /// Leading tag of every quote number
    pub tag: String,
    /// Write attempts before giving up on a partition
    pub max_attempts: u32,
    /// Minimum digits in the sequence; wider values are never truncated
    pub sequence_width: usize,
}

impl Default for QuoteNumberConfig {
    fn default() -> Self {
        Self {
            tag: "BIC".to_string(),
            max_attempts: 8,
            sequence_width: 4,
        }
    }
}

impl QuoteNumberConfig {
    /// Partition prefix, e.g. `BIC-XES-20250101-`
    pub fn partition_prefix(&self, business_code: &str, day: NaiveDate) -> String {
        format!("{}-{}-{}-", self.tag, business_code, compact_date(day))
    }

    /// Render a full quote number from a prefix and sequence value
    pub fn format(&self, prefix: &str, sequence: u64) -> String {
        format!("{}{:0width$}", prefix, sequence, width = self.sequence_width)
    }
}

/// First sequence to try given the highest number already issued under `prefix`
///
/// Missing, zero, or unparsable suffixes restart the partition at 1.
pub fn next_sequence(prefix: &str, latest: Option<&str>) -> u64 {
    latest
        .and_then(|number| number.strip_prefix(prefix))
        .and_then(|tail| tail.parse::<u64>().ok())
        .filter(|n| *n > 0)
        .map(|n| n.saturating_add(1))
        .unwrap_or(1)
}

/// Failure reported by a [`QuoteNumberStore`]
///
/// The store decides at its own boundary whether a failed write was a
/// uniqueness violation; the allocator never inspects error text.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The candidate number is already held by another quote
    #[error("quote number already in use")]
    UniqueViolation,

    /// Anything else (connectivity, schema, permissions)
    #[error(transparent)]
    Other(#[from] crate::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::UniqueViolation
            }
            _ => StoreError::Other(crate::Error::Database(err)),
        }
    }
}

/// Current numbering state of a single quote
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteNumberLookup {
    /// No quote with that id
    Missing,
    /// Quote exists and has not been numbered yet
    Unnumbered,
    /// Quote already carries this number
    Numbered(String),
}

/// Storage operations the allocator needs
#[async_trait]
pub trait QuoteNumberStore: Send + Sync {
    /// Point lookup by quote id
    async fn find_quote_number(&self, quote_id: &str) -> Result<QuoteNumberLookup, StoreError>;

    /// Highest quote number starting with `prefix`, if any
    async fn latest_with_prefix(&self, prefix: &str) -> Result<Option<String>, StoreError>;

    /// Set the number on a quote that has none yet
    ///
    /// Returns `Ok(false)` when no unnumbered quote with that id exists.
    /// Must return [`StoreError::UniqueViolation`] when the number is taken.
    async fn assign_quote_number(
        &self,
        quote_id: &str,
        quote_number: &str,
    ) -> Result<bool, StoreError>;
}

/// Allocation failures
#[derive(Debug, Error)]
pub enum AllocateError {
    #[error("Quote not found: {0}")]
    QuoteNotFound(String),

    /// Every candidate collided; the caller may retry later with a fresh scan
    #[error("Could not assign a unique quote number under {prefix} after {attempts} attempts")]
    Exhausted { prefix: String, attempts: u32 },

    #[error("Quote number store error: {0}")]
    Store(#[from] StoreError),
}

/// Assign the next quote number in the quote's business/day partition
///
/// Safe to call repeatedly: a quote that already has a number gets it back
/// without a write.
pub async fn allocate_quote_number<S>(
    store: &S,
    config: &QuoteNumberConfig,
    quote_id: &str,
    company_context: &str,
    day: NaiveDate,
) -> Result<String, AllocateError>
where
    S: QuoteNumberStore + ?Sized,
{
    match store.find_quote_number(quote_id).await? {
        QuoteNumberLookup::Missing => {
            return Err(AllocateError::QuoteNotFound(quote_id.to_string()))
        }
        QuoteNumberLookup::Numbered(existing) => {
            debug!(quote_id, quote_number = %existing, "Quote already numbered");
            return Ok(existing);
        }
        QuoteNumberLookup::Unnumbered => {}
    }

    let prefix = config.partition_prefix(business_code(company_context), day);
    let latest = store.latest_with_prefix(&prefix).await?;
    let start = next_sequence(&prefix, latest.as_deref());

    for attempt in 0..config.max_attempts {
        let candidate = config.format(&prefix, start.saturating_add(u64::from(attempt)));

        match store.assign_quote_number(quote_id, &candidate).await {
            Ok(true) => {
                info!(quote_id, quote_number = %candidate, attempt, "Assigned quote number");
                return Ok(candidate);
            }
            Ok(false) => {
                // Numbered by a concurrent caller, or deleted underneath us
                return match store.find_quote_number(quote_id).await? {
                    QuoteNumberLookup::Numbered(existing) => Ok(existing),
                    _ => Err(AllocateError::QuoteNotFound(quote_id.to_string())),
                };
            }
            Err(StoreError::UniqueViolation) => {
                warn!(
                    quote_id,
                    candidate = %candidate,
                    attempt,
                    "Quote number taken, trying next"
                );
            }
            Err(err) => return Err(err.into()),
        }
    }

    error!(
        quote_id,
        prefix = %prefix,
        attempts = config.max_attempts,
        "Quote number allocation exhausted"
    );
    Err(AllocateError::Exhausted {
        prefix,
        attempts: config.max_attempts,
    })
}
