mod config;
mod error;
mod fal_client;
mod groq_client;
mod openai_client;
mod staging;
mod transcriber;

// Re-export public types
pub use config::{default_endpoint, ApiConfig};
pub use error::{TranscriptionError, UploadError};
pub use staging::{StagedFile, StagingUploader, STAGING_RETENTION, TMPFILES_UPLOAD_URL};
pub use transcriber::{TranscriptionHints, TranscriptionResult, Transcriber};
