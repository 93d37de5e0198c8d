use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder};
use whisperpress_audio::AudioAsset;

use crate::config::Provider;

use super::config::ApiConfig;
use super::error::TranscriptionError;
use super::transcriber::{extract_text_field, TranscriptionHints};

pub const GROQ_TRANSCRIPTION_URL: &str = "https://api.groq.com/openai/v1/audio/transcriptions";
const GROQ_MODEL: &str = "whisper-large-v3";

/// Groq Whisper API client
///
/// Sends the file name and the raw bytes as one multipart part; the response
/// is a JSON object whose `text` field holds the transcript.
pub struct GroqClient {
    config: ApiConfig,
}

impl GroqClient {
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }

    pub fn build_request(
        &self,
        http: &Client,
        asset: &AudioAsset,
        hints: &TranscriptionHints,
    ) -> Result<RequestBuilder, TranscriptionError> {
        let audio_bytes = std::fs::read(asset.path())?;
        let model = hints.model.as_deref().unwrap_or(GROQ_MODEL);

        let audio_part = Part::bytes(audio_bytes)
            .file_name(asset.file_name())
            .mime_str(asset.format().mime_type())
            .map_err(|e| TranscriptionError::Request {
                provider: Provider::Groq,
                source: e,
            })?;

        let mut form = Form::new()
            .part("file", audio_part)
            .text("model", model.to_string());

        if let Some(language) = &hints.language {
            form = form.text("language", language.clone());
        }

        Ok(http
            .post(&self.config.endpoint)
            .bearer_auth(self.config.expose_key())
            .multipart(form))
    }

    pub fn parse_response(body: String) -> Result<String, TranscriptionError> {
        extract_text_field(Provider::Groq, &body)
    }
}
