//! Conversation controller: the message log and the turn lifecycle.
//!
//! A turn goes `Idle -> Pending -> {Answered, Failed} -> Idle`. At most one
//! reply call is in flight; submits while pending are rejected, not queued.
//!
//! The controller is split into [`ConversationController::begin_turn`] and
//! [`ConversationController::complete_turn`] so a front end can run the
//! reply call on another task and keep handling input meanwhile. Every turn
//! and every language switch bumps a sequence number; only the ticket of the
//! turn currently pending is applied, anything else is discarded.

use vasstos_core::locale;
use vasstos_core::types::{ConversationConfig, ConversationResult, Language, Message};

use crate::error::{ChatError, ValidationError};
use crate::service::ConversationBackend;

// =============================================================================
// Types
// =============================================================================

/// Whether a reply call is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    Pending,
}

/// How a completed turn was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// An assistant reply was appended.
    Answered,
    /// The call failed and the localized error message was appended.
    Failed,
    /// The ticket is not for the turn currently pending; nothing was applied.
    Discarded,
}

/// Ticket for a reply call started by `begin_turn`.
///
/// Not `Clone`: a ticket is consumed by `complete_turn`, so each turn can be
/// applied at most once.
#[derive(Debug)]
pub struct PendingTurn {
    history: Vec<Message>,
    config: ConversationConfig,
    seq: u64,
}

impl PendingTurn {
    /// Full log at the time of submit, ending with the new user message.
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn config(&self) -> &ConversationConfig {
        &self.config
    }

    /// Run the reply call for this turn.
    pub async fn run<B: ConversationBackend + ?Sized>(
        &self,
        backend: &B,
    ) -> Result<ConversationResult, ChatError> {
        backend.generate_reply(&self.history, &self.config).await
    }
}

/// Everything the widget needs to render. Read-only outside this module.
#[derive(Debug, Clone)]
pub struct ConversationState {
    messages: Vec<Message>,
    suggestions: Vec<String>,
    input: String,
    config: ConversationConfig,
    pending: bool,
    /// Sequence number of the latest turn or reset.
    seq: u64,
}

impl ConversationState {
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Current suggestion chips.
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// Unsent text in the input box.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn config(&self) -> &ConversationConfig {
        &self.config
    }

    pub fn language(&self) -> Language {
        self.config.language
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn turn_state(&self) -> TurnState {
        if self.pending {
            TurnState::Pending
        } else {
            TurnState::Idle
        }
    }
}

// =============================================================================
// ConversationController
// =============================================================================

pub struct ConversationController {
    state: ConversationState,
}

impl ConversationController {
    /// Start a conversation with the localized welcome message and FAQ chips.
    pub fn new(config: ConversationConfig) -> Self {
        Self {
            state: ConversationState {
                messages: vec![welcome_message(&config)],
                suggestions: locale::default_suggestions(config.language),
                input: String::new(),
                config,
                pending: false,
                seq: 0,
            },
        }
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn messages(&self) -> &[Message] {
        self.state.messages()
    }

    pub fn suggestions(&self) -> &[String] {
        self.state.suggestions()
    }

    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    pub fn turn_state(&self) -> TurnState {
        self.state.turn_state()
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.state.input = text.into();
    }

    pub fn set_use_search(&mut self, enabled: bool) {
        self.state.config.use_search = enabled;
        tracing::debug!(enabled, "Search grounding toggled");
    }

    /// Start a turn from the input buffer.
    pub fn begin_from_input(&mut self) -> Result<PendingTurn, ChatError> {
        let text = self.state.input.clone();
        self.begin_turn(&text)
    }

    /// Start a turn with the text of suggestion chip `index` (0-based).
    pub fn begin_suggestion(&mut self, index: usize) -> Result<PendingTurn, ChatError> {
        let text = self
            .state
            .suggestions
            .get(index)
            .cloned()
            .ok_or(ChatError::SuggestionOutOfRange(index))?;
        self.begin_turn(&text)
    }

    /// Append the user message and move to Pending.
    ///
    /// Rejected without any state change if `text` is blank or a reply is
    /// already pending.
    pub fn begin_turn(&mut self, text: &str) -> Result<PendingTurn, ChatError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::BlankInput.into());
        }
        if self.state.pending {
            tracing::debug!("Submit ignored, reply pending");
            return Err(ValidationError::TurnPending.into());
        }

        self.state.messages.push(Message::user(trimmed));
        self.state.input.clear();
        self.state.pending = true;
        self.state.seq += 1;

        Ok(PendingTurn {
            history: self.state.messages.clone(),
            config: self.state.config,
            seq: self.state.seq,
        })
    }

    /// Apply the outcome of a reply call and return to Idle.
    ///
    /// Only the ticket of the turn currently pending is applied. Tickets from
    /// earlier turns or from before a language switch are discarded and
    /// leave the state untouched.
    pub fn complete_turn(
        &mut self,
        turn: PendingTurn,
        outcome: Result<ConversationResult, ChatError>,
    ) -> TurnOutcome {
        if !self.state.pending || turn.seq != self.state.seq {
            tracing::debug!(
                turn_seq = turn.seq,
                current_seq = self.state.seq,
                pending = self.state.pending,
                "Discarding reply for a turn that is no longer pending"
            );
            return TurnOutcome::Discarded;
        }

        self.state.pending = false;
        match outcome {
            Ok(result) => {
                if !result.suggestions.is_empty() {
                    self.state.suggestions = result.suggestions;
                }
                self.state
                    .messages
                    .push(Message::assistant_with_sources(result.text, result.sources));
                TurnOutcome::Answered
            }
            Err(e) => {
                tracing::error!(error = %e, "Reply failed");
                self.state
                    .messages
                    .push(Message::assistant(locale::reply_error(turn.config.language)));
                TurnOutcome::Failed
            }
        }
    }

    /// Submit `text` and wait for the reply.
    ///
    /// Returns `Err` only for validation failures; upstream failures end up
    /// in the log as [`TurnOutcome::Failed`].
    pub async fn submit<B: ConversationBackend + ?Sized>(
        &mut self,
        backend: &B,
        text: &str,
    ) -> Result<TurnOutcome, ChatError> {
        let turn = self.begin_turn(text)?;
        let outcome = turn.run(backend).await;
        Ok(self.complete_turn(turn, outcome))
    }

    /// Reset the conversation in another language.
    ///
    /// The log becomes a single welcome message, the chips go back to the
    /// default FAQ set, and any pending turn is orphaned.
    pub fn switch_language(&mut self, language: Language) -> Result<(), ChatError> {
        let variant = self.state.config.variant;
        if !variant.supports_language_switch() {
            return Err(ChatError::LanguageSwitchUnsupported(variant));
        }

        self.state.config.language = language;
        self.state.seq += 1;
        self.state.pending = false;
        self.state.messages = vec![welcome_message(&self.state.config)];
        self.state.suggestions = locale::default_suggestions(language);
        tracing::info!(language = %language, "Conversation reset");
        Ok(())
    }

    /// Text of assistant message `index`, for speech synthesis.
    pub fn speech_target(&self, index: usize) -> Result<&str, ChatError> {
        match self.state.messages.get(index) {
            Some(msg) if msg.is_assistant() => Ok(&msg.content),
            _ => Err(ChatError::NotSpeakable(index)),
        }
    }

    /// Index of the most recent assistant message.
    pub fn latest_assistant_index(&self) -> Option<usize> {
        self.state.messages.iter().rposition(Message::is_assistant)
    }
}

fn welcome_message(config: &ConversationConfig) -> Message {
    Message::assistant(locale::welcome(config.language, config.variant))
}

// =============================================================================
// Tests
// =============================================================================
