//! Provider routing against local mock servers.

use std::path::{Path, PathBuf};

use mockito::{Matcher, Server};
use serde_json::json;
use whisperpress_audio::AudioAsset;
use whisperpress_lib::clients::{
    ApiConfig, StagingUploader, Transcriber, TranscriptionError, TranscriptionHints, UploadError,
};
use whisperpress_lib::config::Provider;

fn write_wav(path: &Path) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..16_000 {
        writer.write_sample(((i % 100) as i16 - 50) * 100).unwrap();
    }
    writer.finalize().unwrap();
}

fn fixture(dir: &Path, name: &str) -> AudioAsset {
    let path: PathBuf = dir.join(name);
    write_wav(&path);
    AudioAsset::open(path).unwrap()
}

fn transcriber(server: &Server, provider: Provider, path: &str, key: &str) -> Transcriber {
    let config = ApiConfig::new(provider, key).with_endpoint(format!("{}{}", server.url(), path));
    Transcriber::new(config)
        .with_staging(StagingUploader::new().with_endpoint(format!("{}/api/v1/upload", server.url())))
}

#[test]
fn openai_receives_multipart_and_returns_plain_text() {
    let dir = tempfile::tempdir().unwrap();
    let asset = fixture(dir.path(), "clip.wav");
    let mut server = Server::new();

    let openai = server
        .mock("POST", "/v1/audio/transcriptions")
        .match_header("authorization", "Bearer test-key")
        .match_header("content-type", Matcher::Regex("multipart/form-data".into()))
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("whisper-1".into()),
            Matcher::Regex(r#"name="response_format""#.into()),
            Matcher::Regex(r#"filename="clip.wav""#.into()),
        ]))
        .with_status(200)
        .with_body("hello from openai\n")
        .create();
    let staging = server.mock("POST", "/api/v1/upload").expect(0).create();

    let result = transcriber(&server, Provider::OpenAI, "/v1/audio/transcriptions", "test-key")
        .transcribe(&asset, &TranscriptionHints::default())
        .unwrap();

    assert_eq!(result.text, "hello from openai\n");
    assert_eq!(result.provider, Provider::OpenAI);
    openai.assert();
    staging.assert();
}

#[test]
fn groq_sends_file_name_and_extracts_text_field() {
    let dir = tempfile::tempdir().unwrap();
    let asset = fixture(dir.path(), "memo.wav");
    let mut server = Server::new();

    let groq = server
        .mock("POST", "/openai/v1/audio/transcriptions")
        .match_header("authorization", "Bearer groq-key")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"filename="memo.wav""#.into()),
            Matcher::Regex("whisper-large-v3".into()),
            Matcher::Regex(r#"name="language"\r\n\r\nde"#.into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"text":"hallo welt","x_groq":{"id":"req_1"}}"#)
        .create();

    let hints = TranscriptionHints {
        language: Some("de".into()),
        model: None,
    };
    let result = transcriber(&server, Provider::Groq, "/openai/v1/audio/transcriptions", "groq-key")
        .transcribe(&asset, &hints)
        .unwrap();

    assert_eq!(result.text, "hallo welt");
    groq.assert();
}

#[test]
fn fal_stages_first_and_receives_download_url() {
    let dir = tempfile::tempdir().unwrap();
    let asset = fixture(dir.path(), "clip.wav");
    let mut server = Server::new();

    let staging = server
        .mock("POST", "/api/v1/upload")
        .match_body(Matcher::Regex(r#"filename="clip.wav""#.into()))
        .with_status(200)
        .with_body(r#"{"status":"success","data":{"url":"https://tmpfiles.org/123/clip.wav"}}"#)
        .create();
    let fal = server
        .mock("POST", "/fal-ai/wizper")
        .match_header("authorization", "Key fal-key")
        .match_body(Matcher::PartialJson(json!({
            "audio_url": "https://tmpfiles.org/dl/123/clip.wav",
            "task": "transcribe",
            "language": "en",
            "chunk_level": "segment",
            "version": "3",
        })))
        .with_status(200)
        .with_body(r#"{"text":"hello from fal","chunks":[]}"#)
        .create();

    let result = transcriber(&server, Provider::Fal, "/fal-ai/wizper", "fal-key")
        .transcribe(&asset, &TranscriptionHints::default())
        .unwrap();

    assert_eq!(result.text, "hello from fal");
    assert_eq!(result.provider, Provider::Fal);
    staging.assert();
    fal.assert();
}

#[test]
fn staging_failure_never_reaches_provider() {
    let dir = tempfile::tempdir().unwrap();
    let asset = fixture(dir.path(), "clip.wav");
    let mut server = Server::new();

    let staging = server
        .mock("POST", "/api/v1/upload")
        .with_status(503)
        .with_body("maintenance")
        .create();
    let fal = server.mock("POST", "/fal-ai/wizper").expect(0).create();

    let err = transcriber(&server, Provider::Fal, "/fal-ai/wizper", "fal-key")
        .transcribe(&asset, &TranscriptionHints::default())
        .unwrap_err();

    match err {
        TranscriptionError::Upload(UploadError::Status { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected upload error, got {other:?}"),
    }
    staging.assert();
    fal.assert();
}

#[test]
fn staging_response_without_url_is_an_upload_error() {
    let dir = tempfile::tempdir().unwrap();
    let asset = fixture(dir.path(), "clip.wav");
    let mut server = Server::new();

    let _staging = server
        .mock("POST", "/api/v1/upload")
        .with_status(200)
        .with_body(r#"{"status":"success","data":{}}"#)
        .create();
    let fal = server.mock("POST", "/fal-ai/wizper").expect(0).create();

    let err = transcriber(&server, Provider::Fal, "/fal-ai/wizper", "fal-key")
        .transcribe(&asset, &TranscriptionHints::default())
        .unwrap_err();

    assert!(matches!(
        err,
        TranscriptionError::Upload(UploadError::MalformedResponse(_))
    ));
    fal.assert();
}

#[test]
fn provider_errors_carry_status_and_retryability() {
    let dir = tempfile::tempdir().unwrap();
    let asset = fixture(dir.path(), "clip.wav");

    let test_cases = vec![(500, true), (503, true), (429, true), (401, false), (400, false)];

    for (status, retryable) in test_cases {
        let mut server = Server::new();
        let openai = server
            .mock("POST", "/v1/audio/transcriptions")
            .with_status(status)
            .with_body("nope")
            .create();

        let err = transcriber(&server, Provider::OpenAI, "/v1/audio/transcriptions", "k")
            .transcribe(&asset, &TranscriptionHints::default())
            .unwrap_err();

        assert_eq!(err.status_code(), Some(status as u16));
        assert_eq!(err.provider(), Some(Provider::OpenAI));
        assert_eq!(err.is_retryable(), retryable, "status {status}");
        openai.assert();
    }
}

#[test]
fn malformed_provider_json_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let asset = fixture(dir.path(), "clip.wav");
    let mut server = Server::new();

    let _groq = server
        .mock("POST", "/openai/v1/audio/transcriptions")
        .with_status(200)
        .with_body("<html>gateway</html>")
        .create();

    let err = transcriber(&server, Provider::Groq, "/openai/v1/audio/transcriptions", "k")
        .transcribe(&asset, &TranscriptionHints::default())
        .unwrap_err();

    assert!(matches!(
        err,
        TranscriptionError::MalformedResponse {
            provider: Provider::Groq,
            ..
        }
    ));
    assert!(!err.is_retryable());
}
