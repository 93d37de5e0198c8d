//! Size-bounded audio preparation for upload to transcription services.
//!
//! This crate covers the local half of the pipeline: validating an input
//! file, measuring how long it plays, planning the bitrate that brings it
//! under a size target, and re-encoding it to constant-bitrate MP3.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use whisperpress_audio::{measure_duration, plan, AudioAsset, Transcoder, DEFAULT_TARGET_SIZE_KB};
//!
//! fn main() -> Result<(), whisperpress_audio::AudioError> {
//!     let asset = AudioAsset::open("meeting.m4a")?;
//!     let duration = measure_duration(&asset)?;
//!     let encoding = plan(duration, DEFAULT_TARGET_SIZE_KB)?;
//!     let smaller = Transcoder::new().transcode(
//!         &asset,
//!         encoding.bitrate_kbps,
//!         Path::new("meeting_compressed.mp3"),
//!     )?;
//!     println!("{} -> {} bytes", asset.size_bytes(), smaller.size_bytes());
//!     Ok(())
//! }
//! ```

mod asset;
mod duration;
mod error;
mod plan;
mod transcode;

pub use asset::{AudioAsset, AudioFormat, SUPPORTED_EXTENSIONS};
pub use duration::measure_duration;
pub use error::AudioError;
pub use plan::{
    plan, EncodingPlan, BINARY_SIZE_CORRECTION, DEFAULT_CEILING_BYTES, DEFAULT_TARGET_SIZE_KB,
};
pub use transcode::Transcoder;
