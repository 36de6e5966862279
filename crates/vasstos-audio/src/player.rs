//! Playback front for an [`AudioSink`].
//!
//! In [`PlaybackMode::Overlap`] every request goes straight to the sink, so
//! two clips started close together are heard on top of each other. In
//! [`PlaybackMode::Exclusive`] the player owns a single slot: a request that
//! arrives while a clip is still playing is dropped.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::error::AudioError;
use crate::{AudioSink, PcmClip};

pub use vasstos_core::types::PlaybackMode;

pub struct AudioPlayer {
    sink: Arc<dyn AudioSink>,
    mode: PlaybackMode,
    /// End of the clip occupying the slot (exclusive mode only).
    busy_until: Mutex<Option<Instant>>,
}

impl AudioPlayer {
    pub fn new(sink: Arc<dyn AudioSink>, mode: PlaybackMode) -> Self {
        Self {
            sink,
            mode,
            busy_until: Mutex::new(None),
        }
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    /// Decode raw speech bytes and start playing them.
    pub fn play_pcm(&self, bytes: &[u8]) -> Result<bool, AudioError> {
        self.play(PcmClip::from_pcm16le(bytes))
    }

    /// Start playing `clip` without waiting for it to finish.
    ///
    /// Returns `Ok(false)` when the clip was dropped: it was empty, or the
    /// player is exclusive and another clip is still playing.
    pub fn play(&self, clip: PcmClip) -> Result<bool, AudioError> {
        if clip.is_empty() {
            tracing::debug!("Ignoring empty clip");
            return Ok(false);
        }

        let duration = clip.duration();
        if self.mode == PlaybackMode::Exclusive {
            let mut slot = self
                .busy_until
                .lock()
                .map_err(|e| AudioError::Device(format!("player lock poisoned: {}", e)))?;
            let now = Instant::now();
            if slot.is_some_and(|until| until > now) {
                tracing::debug!("Playback slot busy, dropping clip");
                return Ok(false);
            }
            // The slot is only taken once the sink has accepted the clip.
            self.sink.play(clip)?;
            *slot = Some(now + duration);
        } else {
            self.sink.play(clip)?;
        }

        tracing::debug!(
            duration_ms = duration.as_millis() as u64,
            mode = ?self.mode,
            "Playback started"
        );
        Ok(true)
    }
}
