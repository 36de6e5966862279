//! VASSTOS Audio crate - decoding and playback of synthesized speech.
//!
//! The speech model returns base64-encoded raw PCM: signed 16-bit
//! little-endian mono samples at 24 kHz. This crate turns that payload into
//! normalized `f32` samples and hands them to an [`AudioSink`]. Includes a
//! mock sink for testing without real audio hardware.

pub mod error;
pub mod player;
pub mod wav;

#[cfg(feature = "playback")]
pub mod cpal_sink;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use base64::Engine;

pub use error::AudioError;
pub use player::{AudioPlayer, PlaybackMode};
pub use wav::write_wav;

#[cfg(feature = "playback")]
pub use cpal_sink::CpalSink;

/// Sample rate of the speech model's PCM output.
pub const SPEECH_SAMPLE_RATE: u32 = 24_000;

/// Divisor that maps an `i16` sample onto [-1.0, 1.0).
const I16_SCALE: f32 = 32768.0;

// =============================================================================
// Decoding
// =============================================================================

/// Decode a standard (padded) base64 payload into raw bytes.
pub fn decode_base64(data: &str) -> Result<Vec<u8>, AudioError> {
    base64::engine::general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|e| AudioError::Decode(e.to_string()))
}

/// Interpret `bytes` as signed 16-bit little-endian PCM and normalize each
/// sample by 32768. A trailing odd byte is ignored.
pub fn pcm16le_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / I16_SCALE)
        .collect()
}

// =============================================================================
// PcmClip
// =============================================================================

/// A block of normalized mono samples ready for playback.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl PcmClip {
    /// Build a 24 kHz mono clip from the speech model's raw bytes.
    pub fn from_pcm16le(bytes: &[u8]) -> Self {
        Self {
            samples: pcm16le_to_f32(bytes),
            sample_rate: SPEECH_SAMPLE_RATE,
            channels: 1,
        }
    }

    /// Playback length of the clip.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 || self.channels == 0 {
            return Duration::ZERO;
        }
        let frames = self.samples.len() as f64 / self.channels as f64;
        Duration::from_secs_f64(frames / self.sample_rate as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

// =============================================================================
// Traits
// =============================================================================

/// Output device for decoded clips.
///
/// `play` starts playback and returns immediately; it does not wait for the
/// clip to finish and does not queue behind clips already playing.
pub trait AudioSink: Send + Sync {
    fn play(&self, clip: PcmClip) -> Result<(), AudioError>;
}

// =============================================================================
// Simple sinks
// =============================================================================

/// Sink that discards clips. Used when no output device is compiled in.
#[derive(Debug, Clone, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn play(&self, clip: PcmClip) -> Result<(), AudioError> {
        tracing::debug!(
            samples = clip.samples.len(),
            "No audio output configured, dropping clip"
        );
        Ok(())
    }
}

/// Mock sink for testing. Records every clip it is asked to play.
#[derive(Debug, Clone, Default)]
pub struct MockAudioSink {
    played: Arc<Mutex<Vec<PcmClip>>>,
}

impl MockAudioSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clips played so far, in call order.
    pub fn played(&self) -> Vec<PcmClip> {
        self.played.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl AudioSink for MockAudioSink {
    fn play(&self, clip: PcmClip) -> Result<(), AudioError> {
        self.played
            .lock()
            .map_err(|e| AudioError::Device(format!("mock sink lock poisoned: {}", e)))?
            .push(clip);
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
