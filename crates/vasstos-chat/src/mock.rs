//! Scripted backend for tests and demos without network access.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use vasstos_core::types::{ConversationConfig, ConversationResult, Language, Message};

use crate::error::ChatError;
use crate::service::ConversationBackend;

/// A recorded `generate_reply` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub history: Vec<Message>,
    pub config: ConversationConfig,
}

/// Backend that replays queued outcomes in order.
///
/// When the queue is empty it answers with `"ok"`. Speech returns whatever
/// was set with [`MockBackend::with_speech`].
#[derive(Debug, Default)]
pub struct MockBackend {
    replies: Mutex<VecDeque<Result<ConversationResult, ChatError>>>,
    speech: Option<Vec<u8>>,
    delay: Option<Duration>,
    calls: Mutex<Vec<RecordedCall>>,
    speech_calls: Mutex<Vec<(String, Language)>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_speech(mut self, bytes: Vec<u8>) -> Self {
        self.speech = Some(bytes);
        self
    }

    /// Delay every reply, to keep a turn pending for a while.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_reply(&self, result: ConversationResult) {
        if let Ok(mut q) = self.replies.lock() {
            q.push_back(Ok(result));
        }
    }

    /// Queue a plain text reply.
    pub fn push_text(&self, text: &str) {
        self.push_reply(ConversationResult {
            text: text.to_string(),
            ..ConversationResult::default()
        });
    }

    pub fn push_failure(&self, detail: &str) {
        if let Ok(mut q) = self.replies.lock() {
            q.push_back(Err(ChatError::Upstream(detail.to_string())));
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn speech_calls(&self) -> Vec<(String, Language)> {
        self.speech_calls
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ConversationBackend for MockBackend {
    async fn generate_reply(
        &self,
        history: &[Message],
        config: &ConversationConfig,
    ) -> Result<ConversationResult, ChatError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                history: history.to_vec(),
                config: *config,
            });
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.replies.lock().ok().and_then(|mut q| q.pop_front());
        next.unwrap_or_else(|| {
            Ok(ConversationResult {
                text: "ok".to_string(),
                ..ConversationResult::default()
            })
        })
    }

    async fn synthesize_speech(&self, text: &str, language: Language) -> Option<Vec<u8>> {
        if let Ok(mut calls) = self.speech_calls.lock() {
            calls.push((text.to_string(), language));
        }
        self.speech.clone()
    }
}
