//! Error types for speech decoding and playback.

/// Errors from the audio crate.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("decode error: {0}")]
    Decode(String),
    #[error("device error: {0}")]
    Device(String),
    #[error("stream error: {0}")]
    Stream(String),
    #[error("wav error: {0}")]
    Wav(String),
}

impl From<hound::Error> for AudioError {
    fn from(err: hound::Error) -> Self {
        AudioError::Wav(err.to_string())
    }
}
