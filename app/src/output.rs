use std::path::{Path, PathBuf};

use log::info;

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Failed to write transcript to {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// `<dir>/<stem>_transcript.txt` next to the input
pub fn default_transcript_path(input: &Path) -> PathBuf {
    sibling_with_suffix(input, "_transcript.txt")
}

/// `<dir>/<stem>_compressed.mp3` next to the input
pub fn default_compressed_path(input: &Path) -> PathBuf {
    sibling_with_suffix(input, "_compressed.mp3")
}

fn sibling_with_suffix(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string());
    input.with_file_name(format!("{stem}{suffix}"))
}

/// Write the transcript to `path`, replacing any existing file
pub fn save_transcript(text: &str, path: &Path) -> Result<(), OutputError> {
    std::fs::write(path, text).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Transcript saved to: {:?}", path);
    Ok(())
}
