//! Error types for the conversational core.

use vasstos_core::error::CoreError;
use vasstos_core::types::Variant;

/// Why a submitted turn was rejected before any call was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("message cannot be blank")]
    BlankInput,
    #[error("a reply is already pending")]
    TurnPending,
}

/// Errors from the chat engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The reply call failed or timed out. Never shown verbatim to the user.
    #[error("upstream error: {0}")]
    Upstream(String),
    /// The speech call failed. Swallowed by the service.
    #[error("synthesis error: {0}")]
    Synthesis(String),
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("variant {0} does not support switching language")]
    LanguageSwitchUnsupported(Variant),
    #[error("no suggestion at position {0}")]
    SuggestionOutOfRange(usize),
    #[error("message {0} is not an assistant reply")]
    NotSpeakable(usize),
    #[error("config error: {0}")]
    Config(String),
}

impl From<CoreError> for ChatError {
    fn from(err: CoreError) -> Self {
        ChatError::Config(err.to_string())
    }
}

impl ChatError {
    /// Whether this is a silently ignored submit (blank input or busy).
    pub fn is_validation(&self) -> bool {
        matches!(self, ChatError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_error_display() {
        assert_eq!(
            ChatError::Upstream("API error 500".into()).to_string(),
            "upstream error: API error 500"
        );
        assert_eq!(
            ChatError::Synthesis("no audio".into()).to_string(),
            "synthesis error: no audio"
        );
        assert_eq!(
            ChatError::Validation(ValidationError::BlankInput).to_string(),
            "validation error: message cannot be blank"
        );
        assert_eq!(
            ChatError::Validation(ValidationError::TurnPending).to_string(),
            "validation error: a reply is already pending"
        );
        assert_eq!(
            ChatError::LanguageSwitchUnsupported(Variant::KnowledgeBase).to_string(),
            "variant knowledge_base does not support switching language"
        );
        assert_eq!(
            ChatError::SuggestionOutOfRange(7).to_string(),
            "no suggestion at position 7"
        );
        assert_eq!(
            ChatError::NotSpeakable(2).to_string(),
            "message 2 is not an assistant reply"
        );
    }

    #[test]
    fn test_validation_conversion() {
        let err: ChatError = ValidationError::TurnPending.into();
        assert!(err.is_validation());
        assert!(!ChatError::Upstream(String::new()).is_validation());
    }

    #[test]
    fn test_from_core_error() {
        let err: ChatError = CoreError::UnknownLanguage("fr".into()).into();
        assert!(matches!(err, ChatError::Config(_)));
        assert!(err.to_string().contains("fr"));
    }

    #[test]
    fn test_errors_implement_debug() {
        let dbg = format!("{:?}", ChatError::Validation(ValidationError::BlankInput));
        assert!(dbg.contains("BlankInput"));
    }
}
