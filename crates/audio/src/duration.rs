//! Play-duration measurement by full decode.

use std::fs::File;

use log::{debug, info, warn};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::asset::AudioAsset;
use crate::error::AudioError;

/// Decode the whole asset and return how long it plays, in seconds.
///
/// Container metadata is not trusted for the length; every packet of the
/// first audio track is decoded and its frames counted. Corrupt frames are
/// skipped. An asset that decodes to nothing reports `0.0`.
pub fn measure_duration(asset: &AudioAsset) -> Result<f64, AudioError> {
    info!("Loading audio file: {:?}", asset.path());

    let file = File::open(asset.path())?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    hint.with_extension(asset.format().extension());

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::Decode(format!("probe failed: {e}")))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::Decode("no audio track found".into()))?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::Decode(format!("codec init failed: {e}")))?;

    let mut seconds = 0.0_f64;
    let mut frames_total: u64 = 0;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(AudioError::Decode(format!("packet read: {e}"))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(e)) => {
                warn!("Skipping corrupt audio frame: {}", e);
                continue;
            }
            Err(e) => return Err(AudioError::Decode(format!("decode: {e}"))),
        };

        let frames = decoded.frames() as u64;
        let rate = decoded.spec().rate;
        if frames == 0 || rate == 0 {
            continue;
        }

        frames_total += frames;
        seconds += frames as f64 / f64::from(rate);
    }

    debug!("Decoded {} frames from {:?}", frames_total, asset.path());
    info!("Audio duration: {:.2} seconds", seconds);

    Ok(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn write_sine_wav(path: &Path, sample_rate: u32, channels: u16, seconds: f32) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        let frames = (sample_rate as f32 * seconds) as u32;
        for i in 0..frames {
            let t = i as f32 / sample_rate as f32;
            let sample = ((t * 440.0 * std::f32::consts::TAU).sin() * 8000.0) as i16;
            for _ in 0..channels {
                writer.write_sample(sample).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn measures_mono_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_sine_wav(&path, 16_000, 1, 2.5);

        let asset = AudioAsset::open(&path).unwrap();
        let duration = measure_duration(&asset).unwrap();
        assert!((duration - 2.5).abs() < 0.01, "duration: {duration}");
    }

    #[test]
    fn measures_stereo_wav_by_frames_not_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_sine_wav(&path, 44_100, 2, 1.0);

        let asset = AudioAsset::open(&path).unwrap();
        let duration = measure_duration(&asset).unwrap();
        assert!((duration - 1.0).abs() < 0.01, "duration: {duration}");
    }

    #[test]
    fn garbage_with_audio_extension_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("renamed.mp3");
        std::fs::write(&path, b"this is a text file pretending to be audio").unwrap();

        let asset = AudioAsset::open(&path).unwrap();
        let result = measure_duration(&asset);
        assert!(matches!(result, Err(AudioError::Decode(_))), "{result:?}");
    }
}
