use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::AudioError;

/// Extensions accepted as input, without the leading dot.
pub const SUPPORTED_EXTENSIONS: [&str; 7] = ["mp3", "mp4", "mpeg", "mpga", "m4a", "wav", "webm"];

/// Container format, derived from the file extension only.
///
/// A renamed file with the wrong content passes this check and fails later,
/// at decode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    Mp3,
    Mp4,
    Mpeg,
    Mpga,
    M4a,
    Wav,
    Webm,
}

impl AudioFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "mp3" => Some(Self::Mp3),
            "mp4" => Some(Self::Mp4),
            "mpeg" => Some(Self::Mpeg),
            "mpga" => Some(Self::Mpga),
            "m4a" => Some(Self::M4a),
            "wav" => Some(Self::Wav),
            "webm" => Some(Self::Webm),
            _ => None,
        }
    }

    /// Validate a path by its extension.
    pub fn from_path(path: &Path) -> Result<Self, AudioError> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| {
                AudioError::InvalidInput(format!(
                    "unsupported audio format for {:?}. Supported formats: {}",
                    path,
                    SUPPORTED_EXTENSIONS.join(", ")
                ))
            })
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Mp4 => "mp4",
            Self::Mpeg => "mpeg",
            Self::Mpga => "mpga",
            Self::M4a => "m4a",
            Self::Wav => "wav",
            Self::Webm => "webm",
        }
    }

    /// Whether files of this format hold an MPEG audio stream, the only
    /// container the transcoder writes.
    pub fn is_mp3(self) -> bool {
        matches!(self, Self::Mp3 | Self::Mpeg | Self::Mpga)
    }

    /// MIME type sent alongside multipart uploads.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Mp3 | Self::Mpeg | Self::Mpga => "audio/mpeg",
            Self::Mp4 => "audio/mp4",
            Self::M4a => "audio/m4a",
            Self::Wav => "audio/wav",
            Self::Webm => "audio/webm",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// An audio file on disk together with its byte size and container format.
///
/// Duration is deliberately not cached here: measuring it needs a full
/// decode, see [`crate::measure_duration`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioAsset {
    path: PathBuf,
    size_bytes: u64,
    format: AudioFormat,
}

impl AudioAsset {
    /// Open an existing file as an asset.
    ///
    /// The extension is checked before the filesystem is touched, so an
    /// unsupported file is rejected without reading any of its content.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AudioError> {
        let path = path.into();
        let format = AudioFormat::from_path(&path)?;
        let size_bytes = std::fs::metadata(&path)?.len();

        Ok(Self {
            path,
            size_bytes,
            format,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// File name used when the asset is sent as a multipart part.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("audio.{}", self.format.extension()))
    }

    /// Size in MiB, as printed in progress output.
    pub fn size_mib(&self) -> f64 {
        self.size_bytes as f64 / (1024.0 * 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_every_supported_extension_case_insensitively() {
        for ext in SUPPORTED_EXTENSIONS {
            let lower = PathBuf::from(format!("clip.{ext}"));
            let upper = PathBuf::from(format!("clip.{}", ext.to_uppercase()));
            assert_eq!(AudioFormat::from_path(&lower).unwrap().extension(), ext);
            assert_eq!(AudioFormat::from_path(&upper).unwrap().extension(), ext);
        }
    }

    #[test]
    fn rejects_unsupported_and_missing_extensions() {
        for name in ["notes.txt", "audio.flac", "README", "archive.mp3.zip"] {
            let result = AudioFormat::from_path(Path::new(name));
            assert!(
                matches!(result, Err(AudioError::InvalidInput(_))),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn only_mpeg_audio_formats_count_as_mp3() {
        let mp3: Vec<_> = SUPPORTED_EXTENSIONS
            .iter()
            .filter_map(|ext| AudioFormat::from_extension(ext))
            .filter(|format| format.is_mp3())
            .collect();
        assert_eq!(mp3, vec![AudioFormat::Mp3, AudioFormat::Mpeg, AudioFormat::Mpga]);
    }

    #[test]
    fn open_rejects_bad_extension_before_reading_the_file() {
        // The file does not exist: an IO error here would mean we touched disk first.
        let result = AudioAsset::open("/definitely/not/here/transcript.txt");
        assert!(matches!(result, Err(AudioError::InvalidInput(_))));
    }

    #[test]
    fn open_missing_file_is_io_error() {
        let result = AudioAsset::open("/definitely/not/here/meeting.mp3");
        assert!(matches!(result, Err(AudioError::Io(_))));
    }

    #[test]
    fn open_reads_size_from_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.wav");
        std::fs::write(&path, vec![0u8; 4096]).unwrap();

        let asset = AudioAsset::open(&path).unwrap();
        assert_eq!(asset.size_bytes(), 4096);
        assert_eq!(asset.format(), AudioFormat::Wav);
        assert_eq!(asset.file_name(), "fake.wav");
    }
}
