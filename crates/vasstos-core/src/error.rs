use thiserror::Error;

/// Errors shared by the VASSTOS crates: configuration and type parsing.
///
/// Subsystem crates define their own error enums and convert from this one
/// so that `?` works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("Unknown variant: {0}")]
    UnknownVariant(String),

    #[error("Unknown playback mode: {0}")]
    UnknownPlaybackMode(String),
}

impl From<toml::de::Error> for CoreError {
    fn from(err: toml::de::Error) -> Self {
        CoreError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for CoreError {
    fn from(err: toml::ser::Error) -> Self {
        CoreError::Config(err.to_string())
    }
}

/// A specialized `Result` type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
