use std::time::{Duration, Instant};

use log::{error, info};
use reqwest::blocking::{Client, RequestBuilder};
use whisperpress_audio::AudioAsset;

use crate::config::Provider;

use super::config::ApiConfig;
use super::error::TranscriptionError;
use super::fal_client::FalClient;
use super::groq_client::GroqClient;
use super::openai_client::OpenAIClient;
use super::staging::StagingUploader;

/// Optional per-request hints; providers ignore the ones they cannot use
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptionHints {
    pub language: Option<String>,
    pub model: Option<String>,
}

/// Normalized output of any provider
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionResult {
    pub text: String,
    /// Time spent in the provider request/response exchange only
    pub elapsed: Duration,
    pub provider: Provider,
}

impl TranscriptionResult {
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

enum ProviderClient {
    OpenAI(OpenAIClient),
    Groq(GroqClient),
    Fal(FalClient),
}

/// Routes an audio asset to one provider and normalizes the answer.
///
/// One fixed set of providers, so this is a plain enum match rather than a
/// trait object. URL-based providers get the file staged first.
pub struct Transcriber {
    provider: Provider,
    client: ProviderClient,
    http: Client,
    staging: StagingUploader,
}

impl Transcriber {
    pub fn new(config: ApiConfig) -> Self {
        let provider = config.provider;
        let client = match provider {
            Provider::OpenAI => ProviderClient::OpenAI(OpenAIClient::new(config)),
            Provider::Groq => ProviderClient::Groq(GroqClient::new(config)),
            Provider::Fal => ProviderClient::Fal(FalClient::new(config)),
        };

        Self {
            provider,
            client,
            http: Client::new(),
            staging: StagingUploader::new(),
        }
    }

    /// Create a transcriber whose credential comes from the environment
    pub fn from_env(provider: Provider) -> Result<Self, TranscriptionError> {
        Ok(Self::new(ApiConfig::from_env(provider)?))
    }

    pub fn with_staging(mut self, staging: StagingUploader) -> Self {
        self.staging = staging;
        self
    }

    /// Replace the HTTP client, e.g. to set a request timeout
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Transcribe `asset` with the configured provider.
    ///
    /// Staging (for URL providers) happens before the clock starts; a staging
    /// failure returns before any provider request is made. No retries.
    pub fn transcribe(
        &self,
        asset: &AudioAsset,
        hints: &TranscriptionHints,
    ) -> Result<TranscriptionResult, TranscriptionError> {
        info!(
            "Transcribing audio file using {}: {:?}",
            self.provider.display_name(),
            asset.path()
        );

        // Providers that cannot take the bytes fetch the audio from a staged URL
        let staged = if self.provider.capabilities().accepts_raw_bytes {
            None
        } else {
            Some(self.staging.stage(&self.http, asset)?)
        };

        let request = match &self.client {
            ProviderClient::OpenAI(client) => client.build_request(&self.http, asset, hints)?,
            ProviderClient::Groq(client) => client.build_request(&self.http, asset, hints)?,
            ProviderClient::Fal(client) => {
                let staged = staged.ok_or(TranscriptionError::UrlRequired(self.provider))?;
                client.build_request(&self.http, &staged.url, hints)
            }
        };

        let started_at = Instant::now();
        let body = self.exchange(request)?;
        let elapsed = started_at.elapsed();

        let text = match &self.client {
            ProviderClient::OpenAI(_) => OpenAIClient::parse_response(body)?,
            ProviderClient::Groq(_) => GroqClient::parse_response(body)?,
            ProviderClient::Fal(_) => FalClient::parse_response(body)?,
        };

        info!(
            "Audio transcription completed in {:.2} seconds: {} characters",
            elapsed.as_secs_f64(),
            text.len()
        );

        Ok(TranscriptionResult {
            text,
            elapsed,
            provider: self.provider,
        })
    }

    /// Send request and return the body of a successful response
    fn exchange(&self, request: RequestBuilder) -> Result<String, TranscriptionError> {
        let provider = self.provider;

        let response = request.send().map_err(|e| {
            error!("API request error: {}", e);
            TranscriptionError::Request {
                provider,
                source: e,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("API error response ({}): {}", status, error_text);
            return Err(TranscriptionError::Provider {
                provider,
                status: status.as_u16(),
                body: error_text,
            });
        }

        response.text().map_err(|e| {
            error!("Failed to read response: {}", e);
            TranscriptionError::Request {
                provider,
                source: e,
            }
        })
    }
}

/// Pull the `text` field out of a JSON transcription response
pub(crate) fn extract_text_field(
    provider: Provider,
    body: &str,
) -> Result<String, TranscriptionError> {
    let json: serde_json::Value =
        serde_json::from_str(body).map_err(|e| TranscriptionError::MalformedResponse {
            provider,
            message: e.to_string(),
        })?;

    json.get("text")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| TranscriptionError::MalformedResponse {
            provider,
            message: "missing `text` field".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_field() {
        assert_eq!(
            extract_text_field(Provider::Groq, r#"{"text":"hello there","x_groq":{}}"#).unwrap(),
            "hello there"
        );
        assert_eq!(
            extract_text_field(Provider::Fal, r#"{"text":"","chunks":[]}"#).unwrap(),
            ""
        );
    }

    #[test]
    fn test_extract_text_field_rejects_bad_bodies() {
        for body in ["not json", r#"{"chunks":[]}"#, r#"{"text":42}"#] {
            let result = extract_text_field(Provider::Fal, body);
            assert!(
                matches!(
                    result,
                    Err(TranscriptionError::MalformedResponse {
                        provider: Provider::Fal,
                        ..
                    })
                ),
                "{body}"
            );
        }
    }

    #[test]
    fn test_client_variant_matches_provider_capabilities() {
        use strum::IntoEnumIterator;

        for provider in Provider::iter() {
            let transcriber = Transcriber::new(ApiConfig::new(provider, "key"));
            let url_only = matches!(transcriber.client, ProviderClient::Fal(_));
            assert_eq!(
                url_only,
                !provider.capabilities().accepts_raw_bytes,
                "{provider}"
            );
        }
    }

    #[test]
    fn test_transcriber_keeps_provider() {
        for provider in [Provider::OpenAI, Provider::Groq, Provider::Fal] {
            let transcriber = Transcriber::new(ApiConfig::new(provider, "key"));
            assert_eq!(transcriber.provider(), provider);
        }
    }
}
