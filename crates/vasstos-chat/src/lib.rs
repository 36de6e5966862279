//! Conversational core of the VASSTOS assistant.
//!
//! Builds requests for the hosted generative-language API, normalizes its
//! replies (citations and embedded follow-up suggestions), and owns the
//! conversation state behind a small turn-based controller.

pub mod controller;
pub mod error;
pub mod gemini;
pub mod mock;
pub mod parser;
pub mod persona;
pub mod service;

pub use controller::{
    ConversationController, ConversationState, PendingTurn, TurnOutcome, TurnState,
};
pub use error::{ChatError, ValidationError};
pub use mock::MockBackend;
pub use parser::{extract_sources, parse_reply, split_suggestions};
pub use persona::persona_instructions;
pub use service::{ConversationBackend, GeminiService};
