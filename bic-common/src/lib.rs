//! # BIC Common Library
//!
//! Shared code for the BIC quote intake service including:
//! - Database initialization, models and the quote store
//! - Quote number allocation (per-business, per-day sequences)
//! - Free-text field extraction from job notes
//! - Line item normalization and quote totals
//! - Configuration loading

pub mod business;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod quote_number;
pub mod time;
pub mod totals;

pub use business::business_code;
pub use error::{Error, Result};
pub use extract::{extract_fields, ExtractedFields};
pub use quote_number::{allocate_quote_number, AllocateError, QuoteNumberConfig};
