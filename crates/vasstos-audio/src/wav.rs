//! WAV export for environments without an output device.

use std::path::Path;

use crate::error::AudioError;
use crate::PcmClip;

/// Write `clip` as a 16-bit PCM WAV file, creating parent directories.
pub fn write_wav(path: &Path, clip: &PcmClip) -> Result<(), AudioError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| AudioError::Wav(e.to_string()))?;
    }
    let spec = hound::WavSpec {
        channels: clip.channels,
        sample_rate: clip.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in &clip.samples {
        let scaled = (sample * 32768.0).clamp(i16::MIN as f32, i16::MAX as f32);
        writer.write_sample(scaled as i16)?;
    }
    writer.finalize()?;
    tracing::info!(path = %path.display(), samples = clip.samples.len(), "WAV written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_wav_preserves_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("reply.wav");
        let clip = PcmClip::from_pcm16le(&[0x00, 0x80, 0x00, 0x00, 0xFF, 0x7F]);

        write_wav(&path, &clip).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 24_000);
        assert_eq!(spec.channels, 1);
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![i16::MIN, 0, i16::MAX]);
    }
}
