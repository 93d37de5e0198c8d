use thiserror::Error;

/// Errors raised while validating, measuring or re-encoding audio.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AudioError {
    /// Unsupported extension, non-positive duration or target, or a plan that
    /// would round down to 0 kbps.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The source could not be decoded as audio.
    #[error("Failed to decode audio: {0}")]
    Decode(String),

    /// The encoder rejected the requested parameters or is not installed.
    #[error("Failed to encode audio: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AudioError {
    /// Returns a user-friendly error message suitable for display in the UI
    pub fn user_message(&self) -> String {
        match self {
            AudioError::InvalidInput(msg) => format!("Invalid audio input: {}", msg),
            AudioError::Decode(_) => {
                "Could not read the audio file. Is it really an audio file?".to_string()
            }
            AudioError::Encode(msg) => format!("Audio compression failed: {}", msg),
            AudioError::Io(_) => "Failed to access the audio file. Check the path.".to_string(),
        }
    }
}
