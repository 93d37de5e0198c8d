use reqwest::blocking::multipart::Form;
use reqwest::blocking::{Client, RequestBuilder};
use whisperpress_audio::AudioAsset;

use super::config::ApiConfig;
use super::error::TranscriptionError;
use super::transcriber::TranscriptionHints;

pub const OPENAI_TRANSCRIPTION_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
const OPENAI_MODEL: &str = "whisper-1";

/// OpenAI Whisper API client
///
/// Streams the file as a multipart upload and asks for `response_format=text`,
/// so the response body is the transcript itself.
pub struct OpenAIClient {
    config: ApiConfig,
}

impl OpenAIClient {
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }

    pub fn build_request(
        &self,
        http: &Client,
        asset: &AudioAsset,
        hints: &TranscriptionHints,
    ) -> Result<RequestBuilder, TranscriptionError> {
        let model = hints.model.as_deref().unwrap_or(OPENAI_MODEL);

        let mut form = Form::new()
            .file("file", asset.path())
            .map_err(|e| {
                TranscriptionError::IoError(std::io::Error::new(
                    e.kind(),
                    format!("Failed to read file: {}", e),
                ))
            })?
            .text("model", model.to_string())
            .text("response_format", "text");

        if let Some(language) = &hints.language {
            form = form.text("language", language.clone());
        }

        Ok(http
            .post(&self.config.endpoint)
            .bearer_auth(self.config.expose_key())
            .multipart(form))
    }

    /// The body already is the transcript.
    pub fn parse_response(body: String) -> Result<String, TranscriptionError> {
        Ok(body)
    }
}
