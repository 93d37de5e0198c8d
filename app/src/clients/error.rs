use crate::config::Provider;

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("{provider} API returned status {status}: {body}")]
    Provider {
        provider: Provider,
        status: u16,
        body: String,
    },
    #[error("{provider} request failed: {source}")]
    Request {
        provider: Provider,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to parse {provider} response: {message}")]
    MalformedResponse { provider: Provider, message: String },
    #[error("{0} API key not configured")]
    ApiKeyMissing(Provider),
    #[error("{0} only accepts audio by URL and no staged URL was provided")]
    UrlRequired(Provider),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Failure publishing a file to the staging host. Nothing is retained on
/// failure, whether or not the bytes reached the host.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Staging host returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Staging upload failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("Unexpected staging response: {0}")]
    MalformedResponse(String),
    #[error("Failed to read file for staging: {0}")]
    IoError(#[from] std::io::Error),
}

impl TranscriptionError {
    /// Provider that produced the error, if it got that far
    pub fn provider(&self) -> Option<Provider> {
        match self {
            TranscriptionError::Provider { provider, .. }
            | TranscriptionError::Request { provider, .. }
            | TranscriptionError::MalformedResponse { provider, .. }
            | TranscriptionError::ApiKeyMissing(provider)
            | TranscriptionError::UrlRequired(provider) => Some(*provider),
            TranscriptionError::Upload(_) | TranscriptionError::IoError(_) => None,
        }
    }

    /// HTTP status returned by the provider, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            TranscriptionError::Provider { status, .. } => Some(*status),
            TranscriptionError::Request { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether sending the same request later could succeed.
    ///
    /// Nothing in this crate retries; this only informs the caller.
    pub fn is_retryable(&self) -> bool {
        match self {
            TranscriptionError::Provider { status, .. } => is_retryable_status(*status),
            TranscriptionError::Request { source, .. } => {
                source.is_timeout() || source.is_connect()
            }
            TranscriptionError::Upload(UploadError::Status { status, .. }) => {
                is_retryable_status(*status)
            }
            TranscriptionError::Upload(UploadError::Request(source)) => {
                source.is_timeout() || source.is_connect()
            }
            _ => false,
        }
    }

    /// Returns a user-friendly error message suitable for display in the UI
    pub fn user_message(&self) -> String {
        match self {
            TranscriptionError::Provider { status: 401, .. }
            | TranscriptionError::Provider { status: 403, .. } => {
                "Invalid API key. Check your credentials.".to_string()
            }
            TranscriptionError::Provider { status: 413, .. } => {
                "Audio file too large for the provider.".to_string()
            }
            TranscriptionError::Provider { status: 429, .. } => {
                "Rate limit reached. Please wait and retry.".to_string()
            }
            TranscriptionError::Provider {
                provider, status, ..
            } if *status >= 500 => {
                format!(
                    "{} is having problems (status {}). Try again later.",
                    provider.display_name(),
                    status
                )
            }
            TranscriptionError::Provider { provider, body, .. } => {
                format!("{} transcription failed: {}", provider.display_name(), body)
            }
            TranscriptionError::Request { provider, .. } => {
                format!("Could not reach {}. Check your connection.", provider.display_name())
            }
            TranscriptionError::MalformedResponse { provider, .. } => {
                format!("{} returned an unexpected response.", provider.display_name())
            }
            TranscriptionError::ApiKeyMissing(provider) => {
                format!(
                    "API key not configured. Set {} in your environment.",
                    provider.api_key_env()
                )
            }
            TranscriptionError::UrlRequired(provider) => {
                format!("{} needs the audio at a public URL.", provider.display_name())
            }
            TranscriptionError::Upload(_) => {
                "Failed to stage the audio file for upload. Try again.".to_string()
            }
            TranscriptionError::IoError(_) => {
                "Failed to read audio file. Please try again.".to_string()
            }
        }
    }
}

fn is_retryable_status(status: u16) -> bool {
    status >= 500 || status == 408 || status == 429
}
