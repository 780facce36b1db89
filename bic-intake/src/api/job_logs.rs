//! Job log endpoints
//!
//! The logger posts either a raw transcript (voice) or a structured entry
//! (typed form) which is rendered into the same labeled transcript layout.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use bic_common::db::job_logs::{self, NewJobLog};
use bic_common::db::{JobLog, JobLogSource, JobLogStatus};
use bic_common::extract::{compose_transcript, JobLogEntry};
use bic_common::{extract_fields, ExtractedFields};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::AppState;

const NOT_FOUND: &str = "Log not found.";

#[derive(Debug, Default, Deserialize)]
pub struct CreateJobLogRequest {
    #[serde(default)]
    pub company_context: Option<String>,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub entry: Option<JobLogEntry>,
    #[serde(default)]
    pub source: Option<JobLogSource>,
    #[serde(default)]
    pub audio_url: Option<String>,
}

impl CreateJobLogRequest {
    pub fn into_new_log(self) -> Result<NewJobLog, ApiError> {
        let company_context = self
            .company_context
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        // A raw transcript takes precedence over a structured entry
        let transcript = match (self.transcript, self.entry) {
            (Some(t), _) if !t.trim().is_empty() => t,
            (_, Some(entry)) if entry.has_content() => compose_transcript(&entry),
            _ => String::new(),
        };

        if company_context.is_empty() || transcript.trim().is_empty() {
            return Err(ApiError::BadRequest(
                "company_context and transcript are required.".to_string(),
            ));
        }

        let audio_url = self.audio_url.filter(|u| !u.trim().is_empty());
        // A recording always means the log came from voice
        let source = if audio_url.is_some() {
            JobLogSource::Voice
        } else {
            self.source.unwrap_or_default()
        };

        Ok(NewJobLog {
            company_context,
            source,
            transcript,
            audio_url,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedJobLog {
    pub ok: bool,
    pub log: JobLog,
}

#[derive(Debug, Serialize)]
pub struct JobLogList {
    pub logs: Vec<JobLog>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogStatus {
    pub id: String,
    pub status: JobLogStatus,
}

#[derive(Debug, Serialize)]
pub struct UpdatedStatus {
    pub log: LogStatus,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub ok: bool,
}

/// POST /api/job-logs
pub async fn create_job_log(
    State(state): State<AppState>,
    payload: Result<Json<CreateJobLogRequest>, JsonRejection>,
) -> Result<Json<CreatedJobLog>, ApiError> {
    let Json(request) = payload?;
    let new_log = request.into_new_log()?;

    let log = job_logs::insert_job_log(&state.db, &new_log).await?;
    info!(
        log_id = %log.id,
        company_context = %log.company_context,
        source = %log.source,
        "Created job log"
    );

    Ok(Json(CreatedJobLog { ok: true, log }))
}

/// GET /api/job-logs
pub async fn list_job_logs(State(state): State<AppState>) -> Result<Json<JobLogList>, ApiError> {
    let logs = job_logs::list_job_logs(&state.db).await?;
    Ok(Json(JobLogList { logs }))
}

/// GET /api/job-logs/:id
pub async fn get_job_log(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobLog>, ApiError> {
    job_logs::get_job_log(&state.db, &id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))
}

/// PATCH /api/job-logs/:id
pub async fn update_job_log_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<UpdatedStatus>, ApiError> {
    let Json(request) = payload?;
    let status: JobLogStatus = request.status.unwrap_or_default().parse()?;

    if !job_logs::set_job_log_status(&state.db, &id, status).await? {
        return Err(ApiError::NotFound(NOT_FOUND.to_string()));
    }
    info!(log_id = %id, status = status.as_str(), "Updated job log status");

    Ok(Json(UpdatedStatus {
        log: LogStatus { id, status },
    }))
}

/// DELETE /api/job-logs/:id
pub async fn delete_job_log(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, ApiError> {
    if !job_logs::delete_job_log(&state.db, &id).await? {
        return Err(ApiError::NotFound(NOT_FOUND.to_string()));
    }
    info!(log_id = %id, "Deleted job log");
    Ok(Json(Deleted { ok: true }))
}

/// GET /api/job-logs/:id/fields
///
/// Quote form pre-fill for a logged job.
pub async fn get_job_log_fields(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ExtractedFields>, ApiError> {
    let log = job_logs::get_job_log(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;
    Ok(Json(extract_fields(&log.transcript)))
}
