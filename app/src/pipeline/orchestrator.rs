use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::{error, info};
use tempfile::TempDir;
use uuid::Uuid;
use whisperpress_audio::{
    measure_duration, plan, AudioAsset, AudioError, AudioFormat, EncodingPlan, Transcoder,
};

use crate::clients::{Transcriber, TranscriptionHints, TranscriptionResult};
use crate::config::AppConfig;
use crate::error::{Error, ErrorKind};

use super::state::{PipelineEvent, PipelineState, PipelineTracker};

/// Inputs strictly larger than the ceiling get compressed
pub fn needs_compression(size_bytes: u64, ceiling_bytes: u64) -> bool {
    size_bytes > ceiling_bytes
}

/// Where the audio for a run comes from
#[derive(Debug, Clone)]
pub enum PipelineInput {
    File(PathBuf),
    /// In-memory buffer; written into the run's workspace before use
    Upload { file_name: String, bytes: Vec<u8> },
}

impl PipelineInput {
    /// Name the input is known by, used for logs and derived output paths
    pub fn display_name(&self) -> String {
        match self {
            PipelineInput::File(path) => path.display().to_string(),
            PipelineInput::Upload { file_name, .. } => file_name.clone(),
        }
    }
}

impl From<PathBuf> for PipelineInput {
    fn from(path: PathBuf) -> Self {
        PipelineInput::File(path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionMode {
    /// Compress only when the input exceeds the ceiling
    #[default]
    IfNeeded,
    /// Always re-encode at the planned bitrate
    Force,
}

/// Result of [`Pipeline::compress`]
#[derive(Debug, Clone)]
pub struct CompressionOutcome {
    pub original: AudioAsset,
    /// The re-encoded file, `None` when compression was not needed
    pub compressed: Option<AudioAsset>,
    pub plan: Option<EncodingPlan>,
    pub duration_seconds: Option<f64>,
}

/// Result of a successful [`Pipeline::run`]
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub run_id: Uuid,
    pub result: TranscriptionResult,
    pub original_size_bytes: u64,
    /// Size of the asset actually sent to the provider
    pub transcribed_size_bytes: u64,
    pub plan: Option<EncodingPlan>,
    pub compression_elapsed: Option<Duration>,
    pub history: Vec<PipelineState>,
}

impl PipelineOutcome {
    pub fn was_compressed(&self) -> bool {
        self.plan.is_some()
    }
}

/// A failed run: the state it failed in and the untouched original error
#[derive(Debug, thiserror::Error)]
#[error("pipeline failed in {failed_in} state: {error}")]
pub struct PipelineError {
    pub run_id: Uuid,
    pub failed_in: PipelineState,
    pub history: Vec<PipelineState>,
    #[source]
    pub error: Error,
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    pub fn user_message(&self) -> String {
        self.error.user_message()
    }
}

/// Chooses between direct dispatch and compress-then-dispatch.
///
/// Holds only configuration; every run gets its own tracker and workspace.
#[derive(Debug, Clone)]
pub struct Pipeline {
    ceiling_bytes: u64,
    target_size_kb: f64,
    transcoder: Transcoder,
    workspace_root: Option<PathBuf>,
    mode: CompressionMode,
}

impl Pipeline {
    pub fn new(config: &AppConfig) -> Self {
        let transcoder = match &config.ffmpeg_path {
            Some(path) => Transcoder::with_binary(path),
            None => Transcoder::new(),
        };
        Self {
            ceiling_bytes: config.ceiling_bytes,
            target_size_kb: config.target_size_kb,
            transcoder,
            workspace_root: None,
            mode: CompressionMode::IfNeeded,
        }
    }

    pub fn with_transcoder(mut self, transcoder: Transcoder) -> Self {
        self.transcoder = transcoder;
        self
    }

    /// Create run workspaces under `root` instead of the system temp dir
    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }

    /// Whether [`run`](Self::run) compresses every input or only oversized ones
    pub fn with_compression_mode(mut self, mode: CompressionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn ceiling_bytes(&self) -> u64 {
        self.ceiling_bytes
    }

    pub fn target_size_kb(&self) -> f64 {
        self.target_size_kb
    }

    /// Run one transcription from input to transcript.
    ///
    /// Temporary files (materialised uploads, the compressed copy) live in a
    /// workspace that is removed when this returns, on success or failure.
    /// The first failure ends the run; nothing is retried.
    pub fn run(
        &self,
        input: PipelineInput,
        transcriber: &Transcriber,
        hints: &TranscriptionHints,
    ) -> Result<PipelineOutcome, PipelineError> {
        let run_id = Uuid::new_v4();
        let mut tracker = PipelineTracker::new();
        info!(
            "Pipeline run {} started for {} via {}",
            run_id,
            input.display_name(),
            transcriber.provider().display_name()
        );

        match self.execute(run_id, &mut tracker, input, transcriber, hints) {
            Ok(mut outcome) => {
                outcome.history = tracker.history().to_vec();
                info!("Pipeline run {} finished", run_id);
                Ok(outcome)
            }
            Err(error) => {
                let failed_in = tracker.current();
                tracker.advance(PipelineEvent::Failed);
                error!(
                    "Pipeline run {} failed in {} state: {}",
                    run_id, failed_in, error
                );
                Err(PipelineError {
                    run_id,
                    failed_in,
                    history: tracker.history().to_vec(),
                    error,
                })
            }
        }
    }

    fn execute(
        &self,
        run_id: Uuid,
        tracker: &mut PipelineTracker,
        input: PipelineInput,
        transcriber: &Transcriber,
        hints: &TranscriptionHints,
    ) -> Result<PipelineOutcome, Error> {
        let workspace = create_workspace(self.workspace_root.as_deref())?;
        let source = materialize(input, workspace.path())?;
        info!(
            "Input: {:?} ({:.2} MiB)",
            source.path(),
            source.size_mib()
        );
        tracker.advance(PipelineEvent::SizeMeasured);

        let mut plan = None;
        let mut compression_elapsed = None;
        let asset = if self.mode == CompressionMode::Force
            || needs_compression(source.size_bytes(), self.ceiling_bytes)
        {
            tracker.advance(PipelineEvent::ExceedsCeiling);
            let started_at = Instant::now();
            let dest = workspace.path().join(compressed_file_name(&source));
            let (compressed, encoding, _) = self.shrink(&source, &dest)?;
            compression_elapsed = Some(started_at.elapsed());
            plan = Some(encoding);
            tracker.advance(PipelineEvent::CompressionFinished);
            compressed
        } else {
            info!("File size is within the limit, no compression needed");
            tracker.advance(PipelineEvent::WithinCeiling);
            source.clone()
        };

        tracker.advance(PipelineEvent::DispatchStarted);
        let result = transcriber.transcribe(&asset, hints)?;
        tracker.advance(PipelineEvent::ResultReady);

        Ok(PipelineOutcome {
            run_id,
            result,
            original_size_bytes: source.size_bytes(),
            transcribed_size_bytes: asset.size_bytes(),
            plan,
            compression_elapsed,
            history: Vec::new(),
        })
    }

    /// Compress a local file to `dest` without transcribing it
    pub fn compress(
        &self,
        input: &Path,
        mode: CompressionMode,
        dest: &Path,
    ) -> Result<CompressionOutcome, Error> {
        require_mp3_destination(dest)?;
        let original = AudioAsset::open(input)?;
        info!(
            "Input: {:?} ({:.2} MiB)",
            original.path(),
            original.size_mib()
        );

        if mode == CompressionMode::IfNeeded
            && !needs_compression(original.size_bytes(), self.ceiling_bytes)
        {
            info!("File size is within the limit, no compression needed");
            return Ok(CompressionOutcome {
                original,
                compressed: None,
                plan: None,
                duration_seconds: None,
            });
        }

        let (compressed, encoding, duration) = self.shrink(&original, dest)?;
        Ok(CompressionOutcome {
            original,
            compressed: Some(compressed),
            plan: Some(encoding),
            duration_seconds: Some(duration),
        })
    }

    /// Size Estimator, Bitrate Planner and Transcoder in sequence
    fn shrink(
        &self,
        source: &AudioAsset,
        dest: &Path,
    ) -> Result<(AudioAsset, EncodingPlan, f64), AudioError> {
        let duration = measure_duration(source)?;
        let encoding = plan(duration, self.target_size_kb)?;
        info!(
            "Duration: {:.1}s, target size: {:.1} KiB, bitrate: {} kbps",
            duration, encoding.target_size_kb, encoding.bitrate_kbps
        );

        let estimated = encoding.estimated_size_bytes(duration);
        if estimated >= self.ceiling_bytes {
            return Err(AudioError::InvalidInput(format!(
                "a {} kbps encode of {:.1}s is about {} bytes, not under the {} byte ceiling",
                encoding.bitrate_kbps, duration, estimated, self.ceiling_bytes
            )));
        }

        let compressed = self
            .transcoder
            .transcode(source, encoding.bitrate_kbps, dest)?;
        info!(
            "Compressed {:.2} MiB -> {:.2} MiB",
            source.size_mib(),
            compressed.size_mib()
        );
        Ok((compressed, encoding, duration))
    }
}

/// The transcoder only writes MP3, so the output name must say so
fn require_mp3_destination(dest: &Path) -> Result<(), AudioError> {
    let format = AudioFormat::from_path(dest)?;
    if format.is_mp3() {
        Ok(())
    } else {
        Err(AudioError::InvalidInput(format!(
            "compressed output is MP3, but {:?} has a .{} extension",
            dest, format
        )))
    }
}

fn create_workspace(root: Option<&Path>) -> Result<TempDir, AudioError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("whisperpress-");
    let workspace = match root {
        Some(root) => builder.tempdir_in(root)?,
        None => builder.tempdir()?,
    };
    log::debug!("Run workspace: {:?}", workspace.path());
    Ok(workspace)
}

/// Turn the input into an asset on disk, validating the extension first
fn materialize(input: PipelineInput, workspace: &Path) -> Result<AudioAsset, AudioError> {
    match input {
        PipelineInput::File(path) => AudioAsset::open(path),
        PipelineInput::Upload { file_name, bytes } => {
            // Only the final component; an upload name must not escape the workspace
            let name = Path::new(&file_name)
                .file_name()
                .map(PathBuf::from)
                .ok_or_else(|| {
                    AudioError::InvalidInput(format!("invalid upload name {:?}", file_name))
                })?;
            AudioFormat::from_path(&name)?;

            let upload_dir = workspace.join("upload");
            std::fs::create_dir(&upload_dir)?;
            let path = upload_dir.join(name);
            std::fs::write(&path, bytes)?;
            AudioAsset::open(path)
        }
    }
}

fn compressed_file_name(source: &AudioAsset) -> String {
    let stem = source
        .path()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string());
    format!("{stem}_compressed.mp3")
}
