//! Constant-bitrate MP3 re-encoding through an external `ffmpeg`.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

use log::{debug, error, info};

use crate::asset::{AudioAsset, AudioFormat};
use crate::error::AudioError;

const DEFAULT_FFMPEG: &str = "ffmpeg";

/// ffmpeg stderr fragments that mean the *input* could not be read.
const DECODE_FAILURE_MARKERS: [&str; 4] = [
    "Invalid data found when processing input",
    "could not find codec parameters",
    "does not contain any stream",
    "Error while decoding stream",
];

/// Re-encodes audio to constant-bitrate MP3.
///
/// The output is always MP3 regardless of the input container. The produced
/// size is an estimate of the planned size, not a guarantee: framing overhead
/// and encoder rounding (LAME snaps to the nearest legal MP3 bitrate) can
/// overshoot slightly, and no second pass is attempted.
#[derive(Debug, Clone)]
pub struct Transcoder {
    ffmpeg: PathBuf,
}

impl Transcoder {
    /// Use the `ffmpeg` found on `PATH`.
    pub fn new() -> Self {
        Self {
            ffmpeg: PathBuf::from(DEFAULT_FFMPEG),
        }
    }

    /// Use a specific ffmpeg executable.
    pub fn with_binary(ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.ffmpeg
    }

    /// Whether the configured ffmpeg can be executed at all.
    pub fn is_available(&self) -> bool {
        Command::new(&self.ffmpeg)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Re-encode `asset` at `bitrate_kbps` into a new file at `dest`.
    ///
    /// The source is never modified; `dest` must be a different path and its
    /// directory must already exist. An existing file at `dest` is replaced.
    /// `dest` must carry an MP3 extension (`.mp3`, `.mpeg` or `.mpga`).
    pub fn transcode(
        &self,
        asset: &AudioAsset,
        bitrate_kbps: u32,
        dest: &Path,
    ) -> Result<AudioAsset, AudioError> {
        if bitrate_kbps == 0 {
            return Err(AudioError::Encode("bitrate must be at least 1 kbps".into()));
        }
        if dest == asset.path() {
            return Err(AudioError::InvalidInput(format!(
                "refusing to overwrite the source file {:?}",
                dest
            )));
        }
        let dest_format = AudioFormat::from_path(dest)?;
        if !dest_format.is_mp3() {
            return Err(AudioError::InvalidInput(format!(
                "compressed output is MP3, but {:?} has a .{} extension",
                dest, dest_format
            )));
        }
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.is_dir() {
                return Err(AudioError::Io(std::io::Error::new(
                    ErrorKind::NotFound,
                    format!("destination directory {:?} does not exist", parent),
                )));
            }
        }

        info!("Compressing audio file: {:?}", asset.path());
        info!("Exporting compressed audio to: {:?}", dest);

        let started_at = Instant::now();
        let args = self.build_args(asset.path(), bitrate_kbps, dest);
        debug!("Running {:?} {:?}", self.ffmpeg, args);

        let output = Command::new(&self.ffmpeg)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                error!("Failed to run {:?}: {}", self.ffmpeg, e);
                if e.kind() == ErrorKind::NotFound {
                    AudioError::Encode(format!("encoder unavailable: {:?} not found", self.ffmpeg))
                } else {
                    AudioError::Io(e)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            error!("ffmpeg exited with {}: {}", output.status, stderr);
            return Err(classify_failure(stderr));
        }

        let compressed = AudioAsset::open(dest)?;
        info!(
            "Audio compression completed in {:.2} seconds ({} bytes at {} kbps)",
            started_at.elapsed().as_secs_f64(),
            compressed.size_bytes(),
            bitrate_kbps
        );

        Ok(compressed)
    }

    fn build_args(&self, src: &Path, bitrate_kbps: u32, dest: &Path) -> Vec<OsString> {
        vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-y".into(),
            "-i".into(),
            src.as_os_str().to_owned(),
            "-vn".into(),
            "-codec:a".into(),
            "libmp3lame".into(),
            "-b:a".into(),
            format!("{bitrate_kbps}k").into(),
            "-f".into(),
            "mp3".into(),
            dest.as_os_str().to_owned(),
        ]
    }
}

impl Default for Transcoder {
    fn default() -> Self {
        Self::new()
    }
}

fn classify_failure(stderr: &str) -> AudioError {
    if DECODE_FAILURE_MARKERS
        .iter()
        .any(|marker| stderr.contains(marker))
    {
        AudioError::Decode(stderr.to_string())
    } else if stderr.contains("Permission denied") {
        AudioError::Io(std::io::Error::new(
            ErrorKind::PermissionDenied,
            stderr.to_string(),
        ))
    } else {
        AudioError::Encode(stderr.to_string())
    }
}
