//! Job log persistence

use sqlx::SqlitePool;
use uuid::Uuid;

use super::models::{JobLog, JobLogSource, JobLogStatus};
use crate::time::{now, to_db_timestamp};
use crate::Result;

/// Characters of the transcript kept as the listing summary
pub const SUMMARY_CHARS: usize = 120;

#[derive(Debug, Clone)]
pub struct NewJobLog {
    pub company_context: String,
    pub source: JobLogSource,
    pub transcript: String,
    pub audio_url: Option<String>,
}

/// Leading slice of a transcript shown in listings
pub fn summarize(transcript: &str) -> String {
    transcript.chars().take(SUMMARY_CHARS).collect()
}

pub async fn insert_job_log(pool: &SqlitePool, log: &NewJobLog) -> Result<JobLog> {
    let row = JobLog {
        id: Uuid::new_v4().to_string(),
        company_context: log.company_context.clone(),
        source: log.source.as_str().to_string(),
        transcript: log.transcript.clone(),
        job_summary: summarize(&log.transcript),
        audio_url: log.audio_url.clone(),
        status: JobLogStatus::Logged.as_str().to_string(),
        created_at: to_db_timestamp(now()),
    };

    sqlx::query(
        r#"
        INSERT INTO job_logs (
            id, company_context, source, transcript, job_summary, audio_url, status, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&row.id)
    .bind(&row.company_context)
    .bind(&row.source)
    .bind(&row.transcript)
    .bind(&row.job_summary)
    .bind(&row.audio_url)
    .bind(&row.status)
    .bind(&row.created_at)
    .execute(pool)
    .await?;

    Ok(row)
}

/// All job logs, newest first
pub async fn list_job_logs(pool: &SqlitePool) -> Result<Vec<JobLog>> {
    let logs = sqlx::query_as::<_, JobLog>(
        r#"
        SELECT id, company_context, source, transcript, job_summary, audio_url, status, created_at
        FROM job_logs
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(logs)
}

pub async fn get_job_log(pool: &SqlitePool, id: &str) -> Result<Option<JobLog>> {
    let log = sqlx::query_as::<_, JobLog>(
        r#"
        SELECT id, company_context, source, transcript, job_summary, audio_url, status, created_at
        FROM job_logs
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(log)
}

/// Set a log's status; `false` when no such log exists
pub async fn set_job_log_status(pool: &SqlitePool, id: &str, status: JobLogStatus) -> Result<bool> {
    let result = sqlx::query("UPDATE job_logs SET status = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Permanently delete a log; `false` when no such log exists
pub async fn delete_job_log(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM job_logs WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
