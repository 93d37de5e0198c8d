use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use whisperpress_lib::clients::{Transcriber, TranscriptionHints};
use whisperpress_lib::clipboard::copy_to_clipboard;
use whisperpress_lib::config::{AppConfig, Provider};
use whisperpress_lib::output::{default_compressed_path, default_transcript_path, save_transcript};
use whisperpress_lib::pipeline::{CompressionMode, Pipeline, PipelineInput};
use whisperpress_lib::Error;

/// Shrink audio under the provider upload limit and transcribe it
#[derive(Parser, Debug)]
#[command(name = "whisperpress", version, about)]
struct Cli {
    /// Audio file (.mp3 .mp4 .mpeg .mpga .m4a .wav .webm)
    #[arg(short, long)]
    input: PathBuf,

    /// Transcript path, or the compressed file path with --compress-only
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only compress the file, do not transcribe
    #[arg(long)]
    compress_only: bool,

    /// Re-encode even when the file is already under the limit
    #[arg(long)]
    force_compress: bool,

    /// Also copy the transcript to the clipboard
    #[arg(short, long)]
    clipboard: bool,

    /// Transcription provider: openai, groq or fal
    #[arg(long)]
    api: Option<Provider>,

    /// Language hint, e.g. "en"
    #[arg(long)]
    language: Option<String>,

    /// Model override for providers that accept one
    #[arg(long)]
    model: Option<String>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();
    whisperpress_lib::log::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            log::debug!("{:?}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let mode = if cli.force_compress {
        CompressionMode::Force
    } else {
        CompressionMode::IfNeeded
    };
    let pipeline = Pipeline::new(&config).with_compression_mode(mode);

    if cli.compress_only {
        return compress_only(&cli, &pipeline, mode);
    }

    let provider = cli.api.unwrap_or(config.provider);
    let transcriber = Transcriber::from_env(provider)?;
    let hints = TranscriptionHints {
        language: cli.language.clone().or(config.language),
        model: cli.model.clone().or(config.model),
    };

    println!("Input file: {}", cli.input.display());
    println!("Provider: {}", provider.display_name());

    let outcome = pipeline
        .run(PipelineInput::File(cli.input.clone()), &transcriber, &hints)
        .map_err(|failure| failure.error)?;

    println!(
        "Original size: {:.2} MiB",
        outcome.original_size_bytes as f64 / (1024.0 * 1024.0)
    );
    if let Some(plan) = &outcome.plan {
        println!(
            "Compressed to {:.2} MiB at {} kbps (target {:.1} KiB)",
            outcome.transcribed_size_bytes as f64 / (1024.0 * 1024.0),
            plan.bitrate_kbps,
            plan.target_size_kb
        );
        if let Some(elapsed) = outcome.compression_elapsed {
            println!("Compression took {:.2} seconds", elapsed.as_secs_f64());
        }
    } else {
        println!("File size is within the limit, no compression needed");
    }
    println!(
        "Transcription completed in {:.2} seconds",
        outcome.result.elapsed_seconds()
    );

    let transcript_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_transcript_path(&cli.input));
    save_transcript(&outcome.result.text, &transcript_path)?;
    println!("Transcript saved to: {}", transcript_path.display());

    if cli.clipboard {
        match copy_to_clipboard(&outcome.result.text) {
            Ok(()) => println!("Transcript copied to clipboard"),
            Err(e) => eprintln!("Could not copy transcript to clipboard: {}", e),
        }
    }

    Ok(())
}

fn compress_only(cli: &Cli, pipeline: &Pipeline, mode: CompressionMode) -> Result<(), Error> {
    // A non-MP3 `-o` is rejected by the pipeline before anything is read
    let dest = cli
        .output
        .clone()
        .unwrap_or_else(|| default_compressed_path(&cli.input));

    let outcome = pipeline.compress(&cli.input, mode, &dest)?;
    println!(
        "Input file: {} ({:.2} MiB)",
        outcome.original.path().display(),
        outcome.original.size_mib()
    );

    match (&outcome.compressed, &outcome.plan) {
        (Some(compressed), Some(plan)) => {
            if let Some(duration) = outcome.duration_seconds {
                println!("Duration: {:.1} seconds", duration);
            }
            println!("Target size: {:.1} KiB", plan.target_size_kb);
            println!("Bitrate: {} kbps", plan.bitrate_kbps);
            println!(
                "Compressed file saved to: {} ({:.2} MiB)",
                compressed.path().display(),
                compressed.size_mib()
            );
        }
        _ => println!("File size is within the limit, no compression needed"),
    }

    Ok(())
}
