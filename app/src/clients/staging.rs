//! Temporary public hosting for providers that only accept a URL.
//!
//! The staged file stays publicly fetchable until the host expires it
//! (60 minutes for tmpfiles.org). Nothing here deletes it early.

use std::time::{Duration, SystemTime};

use log::{error, info};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use serde::Deserialize;
use whisperpress_audio::AudioAsset;

use super::error::UploadError;

pub const TMPFILES_UPLOAD_URL: &str = "https://tmpfiles.org/api/v1/upload";
const TMPFILES_VIEW_SEGMENT: &str = "tmpfiles.org/";
const TMPFILES_DOWNLOAD_SEGMENT: &str = "tmpfiles.org/dl/";
/// Retention advertised by the host; not enforced locally
pub const STAGING_RETENTION: Duration = Duration::from_secs(60 * 60);

/// A file published at a direct-download URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub url: String,
    pub expires_at: SystemTime,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: Option<UploadData>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: Option<String>,
}

/// Uploads files to an anonymous file host and returns direct-download links.
#[derive(Debug, Clone)]
pub struct StagingUploader {
    endpoint: String,
    view_segment: String,
    download_segment: String,
    retention: Duration,
}

impl StagingUploader {
    pub fn new() -> Self {
        Self {
            endpoint: TMPFILES_UPLOAD_URL.to_string(),
            view_segment: TMPFILES_VIEW_SEGMENT.to_string(),
            download_segment: TMPFILES_DOWNLOAD_SEGMENT.to_string(),
            retention: STAGING_RETENTION,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Change how the host's web-view URL maps to its download URL.
    pub fn with_url_rewrite(
        mut self,
        view_segment: impl Into<String>,
        download_segment: impl Into<String>,
    ) -> Self {
        self.view_segment = view_segment.into();
        self.download_segment = download_segment.into();
        self
    }

    /// Upload `asset` and return where it can be downloaded from.
    ///
    /// Any non-success status is an error even if the bytes were received.
    pub fn stage(&self, http: &Client, asset: &AudioAsset) -> Result<StagedFile, UploadError> {
        info!("Staging {:?} for URL-based transcription", asset.path());

        let audio_bytes = std::fs::read(asset.path())?;
        let part = Part::bytes(audio_bytes)
            .file_name(asset.file_name())
            .mime_str(asset.format().mime_type())
            .map_err(UploadError::Request)?;
        let form = Form::new().part("file", part);

        let response = http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .map_err(|e| {
                error!("Staging request error: {}", e);
                UploadError::Request(e)
            })?;

        let status = response.status();
        let body = response
            .text()
            .unwrap_or_else(|_| "Unknown error".to_string());

        if !status.is_success() {
            error!("Staging host error response ({}): {}", status, body);
            return Err(UploadError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: UploadResponse = serde_json::from_str(&body)
            .map_err(|e| UploadError::MalformedResponse(format!("{}: {}", e, body)))?;
        let view_url = parsed
            .data
            .and_then(|data| data.url)
            .ok_or_else(|| UploadError::MalformedResponse(format!("missing data.url in {}", body)))?;

        let url = rewrite_to_download(&view_url, &self.view_segment, &self.download_segment);
        info!("Staged file available at {}", url);

        Ok(StagedFile {
            url,
            expires_at: SystemTime::now() + self.retention,
        })
    }
}

impl Default for StagingUploader {
    fn default() -> Self {
        Self::new()
    }
}

/// Swap the first web-view segment for the download segment.
fn rewrite_to_download(url: &str, view_segment: &str, download_segment: &str) -> String {
    if url.contains(download_segment) {
        return url.to_string();
    }
    url.replacen(view_segment, download_segment, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_to_download() {
        let test_cases = vec![
            (
                "https://tmpfiles.org/12345/meeting.mp3",
                "https://tmpfiles.org/dl/12345/meeting.mp3",
            ),
            (
                "http://tmpfiles.org/7/a.mp3",
                "http://tmpfiles.org/dl/7/a.mp3",
            ),
            (
                "https://tmpfiles.org/dl/12345/meeting.mp3",
                "https://tmpfiles.org/dl/12345/meeting.mp3",
            ),
        ];

        for (input, expected) in test_cases {
            assert_eq!(
                rewrite_to_download(input, TMPFILES_VIEW_SEGMENT, TMPFILES_DOWNLOAD_SEGMENT),
                expected
            );
        }
    }

    #[test]
    fn test_custom_rewrite() {
        assert_eq!(
            rewrite_to_download("https://host/view/abc", "/view/", "/raw/"),
            "https://host/raw/abc"
        );
    }
}
