//! Database initialization, models and queries

pub mod init;
pub mod job_logs;
pub mod models;
pub mod price_book;
pub mod quotes;
pub mod receipts;

pub use init::*;
pub use models::*;
pub use quotes::SqliteQuoteStore;
