use derive_more::{Display, From};
use whisperpress_audio::AudioError;

use crate::clients::TranscriptionError;
use crate::config::ConfigError;
use crate::output::OutputError;

#[derive(Debug, From, Display)]
pub enum Error {
    #[from]
    #[display("{_0}")]
    Audio(AudioError),

    #[from]
    #[display("{_0}")]
    Transcription(TranscriptionError),

    #[from]
    #[display("{_0}")]
    Output(OutputError),

    #[from]
    #[display("{_0}")]
    Config(ConfigError),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Audio(e) => Some(e),
            Error::Transcription(e) => Some(e),
            Error::Output(e) => Some(e),
            Error::Config(e) => Some(e),
        }
    }
}

/// Coarse failure category shared by every component
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ErrorKind {
    InvalidInput,
    Decode,
    Encode,
    Upload,
    Provider,
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Audio(AudioError::InvalidInput(_)) => ErrorKind::InvalidInput,
            Error::Audio(AudioError::Decode(_)) => ErrorKind::Decode,
            Error::Audio(AudioError::Encode(_)) => ErrorKind::Encode,
            Error::Audio(_) => ErrorKind::Io,
            Error::Transcription(TranscriptionError::Upload(_)) => ErrorKind::Upload,
            Error::Transcription(TranscriptionError::IoError(_)) => ErrorKind::Io,
            Error::Transcription(_) => ErrorKind::Provider,
            Error::Output(_) => ErrorKind::Io,
            Error::Config(_) => ErrorKind::InvalidInput,
        }
    }

    /// Returns a user-friendly error message suitable for display in the UI
    pub fn user_message(&self) -> String {
        match self {
            Error::Audio(e) => e.user_message(),
            Error::Transcription(e) => e.user_message(),
            Error::Output(e) => e.to_string(),
            Error::Config(e) => e.to_string(),
        }
    }
}
