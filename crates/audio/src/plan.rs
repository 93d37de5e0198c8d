use log::info;

use crate::error::AudioError;

/// 1024² / 10⁶: reconciles KiB-based size targets with decimal kbps bitrates.
pub const BINARY_SIZE_CORRECTION: f64 = 1.048576;

/// Target size in KiB, just under the 25MB provider limit.
pub const DEFAULT_TARGET_SIZE_KB: f64 = 24.9 * 1024.0;

/// Files strictly larger than this are compressed before upload (25 MiB).
pub const DEFAULT_CEILING_BYTES: u64 = 25 * 1024 * 1024;

/// Bitrate chosen to bring an asset of known duration down to a target size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodingPlan {
    pub target_size_kb: f64,
    pub bitrate_kbps: u32,
}

impl EncodingPlan {
    pub fn target_size_bytes(&self) -> u64 {
        (self.target_size_kb * 1024.0) as u64
    }

    /// Expected output size for a constant-bitrate encode of `duration_seconds`.
    pub fn estimated_size_bytes(&self, duration_seconds: f64) -> u64 {
        (f64::from(self.bitrate_kbps) * 1000.0 / 8.0 * duration_seconds) as u64
    }
}

/// Compute the bitrate that fits `duration_seconds` of audio into
/// `target_size_kb`: `floor(target * 8 / (1.048576 * duration))`.
pub fn plan(duration_seconds: f64, target_size_kb: f64) -> Result<EncodingPlan, AudioError> {
    if !duration_seconds.is_finite() || duration_seconds <= 0.0 {
        return Err(AudioError::InvalidInput(format!(
            "duration must be positive, got {duration_seconds} seconds"
        )));
    }
    if !target_size_kb.is_finite() || target_size_kb <= 0.0 {
        return Err(AudioError::InvalidInput(format!(
            "target size must be positive, got {target_size_kb} KB"
        )));
    }

    let exact = (target_size_kb * 8.0) / (BINARY_SIZE_CORRECTION * duration_seconds);
    info!("Calculated bitrate: {:.2} kbps", exact);

    let bitrate_kbps = exact.floor();
    if bitrate_kbps < 1.0 {
        return Err(AudioError::InvalidInput(format!(
            "{target_size_kb} KB is too small for {duration_seconds:.2} seconds of audio"
        )));
    }

    Ok(EncodingPlan {
        target_size_kb,
        bitrate_kbps: bitrate_kbps.min(f64::from(u32::MAX)) as u32,
    })
}
