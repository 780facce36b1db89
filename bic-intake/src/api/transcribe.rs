//! Voice memo transcription endpoint

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::transcription::{AudioUpload, TranscribeError};
use crate::AppState;

const NO_FILE: &str = "No audio file received. Expected form-data key 'file'.";

#[derive(Debug, Serialize)]
pub struct Transcript {
    pub text: String,
}

/// POST /api/transcribe (multipart, key `file`)
pub async fn transcribe_audio(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Transcript>, ApiError> {
    // Configuration is checked before the body is read
    let Some(client) = state.transcriber.clone() else {
        return Err(ApiError::Internal(TranscribeError::MissingApiKey.to_string()));
    };

    let mut multipart = multipart?;
    let mut audio = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        // Plain text fields named `file` are not audio
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        audio = Some(AudioUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let audio = audio.ok_or_else(|| ApiError::BadRequest(NO_FILE.to_string()))?;
    let size = audio.bytes.len();

    match client.transcribe(audio).await {
        Ok(text) => {
            info!("Transcribed {} bytes of audio into {} characters", size, text.len());
            Ok(Json(Transcript { text }))
        }
        Err(e) => {
            warn!("Transcription failed: {}", e);
            Err(ApiError::Upstream(e.to_string()))
        }
    }
}
