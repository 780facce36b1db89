//! Speech-to-text client
//!
//! Sends voice memos to an OpenAI-compatible `/audio/transcriptions`
//! endpoint. One client is built at startup and shared by all requests.

use std::time::Duration;

use bic_common::config::TranscriptionConfig;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

const USER_AGENT: &str = concat!("bic-intake/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("Missing OPENAI_API_KEY env var.")]
    MissingApiKey,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: Option<String>,
}

/// Audio file handed to the provider
#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

pub struct TranscriptionClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl TranscriptionClient {
    pub fn new(config: &TranscriptionConfig) -> Result<Self, TranscribeError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(TranscribeError::MissingApiKey)?;

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| TranscribeError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: transcription_endpoint(&config.base_url),
            api_key,
            model: config.model.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Transcribe one audio file; an empty transcript is not an error
    pub async fn transcribe(&self, audio: AudioUpload) -> Result<String, TranscribeError> {
        debug!(
            "Transcribing {} ({} bytes) with {}",
            audio.file_name,
            audio.bytes.len(),
            self.model
        );

        let mut part = Part::bytes(audio.bytes).file_name(audio.file_name);
        if let Some(mime) = audio.content_type {
            part = part
                .mime_str(&mime)
                .map_err(|e| TranscribeError::ParseError(e.to_string()))?;
        }

        let form = Form::new().text("model", self.model.clone()).part("file", part);

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscribeError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranscribeError::ApiError(status.as_u16(), body));
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| TranscribeError::ParseError(e.to_string()))?;

        Ok(parsed.text.unwrap_or_default())
    }
}

/// `<base_url>/audio/transcriptions`, tolerating a trailing slash
pub fn transcription_endpoint(base_url: &str) -> String {
    format!("{}/audio/transcriptions", base_url.trim_end_matches('/'))
}
