use reqwest::blocking::{Client, RequestBuilder};
use serde::Serialize;

use crate::config::Provider;

use super::config::ApiConfig;
use super::error::TranscriptionError;
use super::transcriber::{extract_text_field, TranscriptionHints};

pub const FAL_TRANSCRIPTION_URL: &str = "https://fal.run/fal-ai/wizper";
const FAL_DEFAULT_LANGUAGE: &str = "en";
const FAL_CHUNK_LEVEL: &str = "segment";
const FAL_MODEL_VERSION: &str = "3";

#[derive(Debug, Serialize)]
struct FalRequest<'a> {
    audio_url: &'a str,
    task: &'a str,
    language: &'a str,
    chunk_level: &'a str,
    version: &'a str,
}

/// fal.ai Wizper client
///
/// fal fetches the audio itself, so the file must already be reachable at a
/// public URL (see [`super::staging::StagingUploader`]).
pub struct FalClient {
    config: ApiConfig,
}

impl FalClient {
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }

    pub fn build_request(
        &self,
        http: &Client,
        audio_url: &str,
        hints: &TranscriptionHints,
    ) -> RequestBuilder {
        if let Some(model) = &hints.model {
            log::debug!("fal ignores model hint {:?}, using version {}", model, FAL_MODEL_VERSION);
        }

        let payload = FalRequest {
            audio_url,
            task: "transcribe",
            language: hints.language.as_deref().unwrap_or(FAL_DEFAULT_LANGUAGE),
            chunk_level: FAL_CHUNK_LEVEL,
            version: FAL_MODEL_VERSION,
        };

        http.post(&self.config.endpoint)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Key {}", self.config.expose_key()),
            )
            .json(&payload)
    }

    pub fn parse_response(body: String) -> Result<String, TranscriptionError> {
        extract_text_field(Provider::Fal, &body)
    }
}
