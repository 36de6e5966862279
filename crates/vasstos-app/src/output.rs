//! Speech output selection for the terminal front end.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use vasstos_audio::{write_wav, AudioError, AudioSink, NullSink, PcmClip};

/// Sink that writes each clip to `<dir>/speech-NNN.wav`.
pub struct WavDirSink {
    dir: PathBuf,
    next: AtomicUsize,
}

impl WavDirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            next: AtomicUsize::new(1),
        }
    }
}

impl AudioSink for WavDirSink {
    fn play(&self, clip: PcmClip) -> Result<(), AudioError> {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        let path = self.dir.join(format!("speech-{:03}.wav", n));
        write_wav(&path, &clip)?;
        println!("(audio saved to {})", path.display());
        Ok(())
    }
}

/// Pick the sink: a WAV directory if requested, else the output device when
/// compiled in and present, else nothing.
pub fn select_sink(save_audio: Option<PathBuf>) -> Arc<dyn AudioSink> {
    if let Some(dir) = save_audio {
        tracing::info!(dir = %dir.display(), "Speech will be written as WAV files");
        return Arc::new(WavDirSink::new(dir));
    }

    #[cfg(feature = "playback")]
    {
        let sink = vasstos_audio::CpalSink::new();
        if sink.is_available() {
            tracing::info!("Speech plays on the default output device");
            return Arc::new(sink);
        }
        tracing::warn!("No audio output device found, speech disabled");
    }

    Arc::new(NullSink)
}
