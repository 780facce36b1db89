//! HTTP API handlers for bic-intake

pub mod buildinfo;
pub mod extract;
pub mod health;
pub mod job_logs;
pub mod quotes;
pub mod receipts;
pub mod services;
pub mod transcribe;

pub use buildinfo::get_build_info;
pub use extract::extract_text;
pub use health::health_routes;
pub use job_logs::{
    create_job_log, delete_job_log, get_job_log, get_job_log_fields, list_job_logs,
    update_job_log_status,
};
pub use quotes::{assign_quote_number, create_quote, get_quote, list_quotes};
pub use receipts::{list_receipts, upload_receipt};
pub use services::list_services;
pub use transcribe::transcribe_audio;
