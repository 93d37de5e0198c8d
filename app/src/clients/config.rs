use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use crate::config::Provider;

use super::error::TranscriptionError;
use super::{fal_client, groq_client, openai_client};

/// Configuration for making transcription API calls
pub struct ApiConfig {
    pub provider: Provider,
    pub api_key: SecretString,
    /// Full transcription endpoint
    pub endpoint: String,
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("provider", &self.provider)
            .field("api_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl ApiConfig {
    /// Config for `provider` at its public endpoint
    pub fn new(provider: Provider, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: SecretString::from(api_key.into()),
            endpoint: default_endpoint(provider).to_string(),
        }
    }

    /// Read the credential from the provider's environment variable
    pub fn from_env(provider: Provider) -> Result<Self, TranscriptionError> {
        let api_key = std::env::var(provider.api_key_env())
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(TranscriptionError::ApiKeyMissing(provider))?;
        Ok(Self::new(provider, api_key.trim().to_string()))
    }

    /// Point the client at another endpoint (proxies, mock servers)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub(crate) fn expose_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

pub fn default_endpoint(provider: Provider) -> &'static str {
    match provider {
        Provider::OpenAI => openai_client::OPENAI_TRANSCRIPTION_URL,
        Provider::Groq => groq_client::GROQ_TRANSCRIPTION_URL,
        Provider::Fal => fal_client::FAL_TRANSCRIPTION_URL,
    }
}
