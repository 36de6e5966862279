use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

// =============================================================================
// Enums
// =============================================================================

/// Author of a conversation turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// Language the assistant speaks and localizes its fixed strings in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    /// Brazilian Portuguese.
    #[default]
    Pt,
    /// English.
    En,
}

impl Language {
    /// Short code used on the command line and in config files.
    pub fn code(&self) -> &'static str {
        match self {
            Language::Pt => "pt",
            Language::En => "en",
        }
    }

    /// The other language, for a two-state toggle.
    pub fn toggled(&self) -> Self {
        match self {
            Language::Pt => Language::En,
            Language::En => Language::Pt,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = CoreError;

    /// Accepts bare codes and region-tagged forms such as `pt-BR` or `en_US`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let primary = lower.split(['-', '_']).next().unwrap_or_default();
        match primary {
            "pt" => Ok(Language::Pt),
            "en" => Ok(Language::En),
            _ => Err(CoreError::UnknownLanguage(s.to_string())),
        }
    }
}

/// Deployment flavour of the assistant.
///
/// Each variant fixes the persona template, the sampling temperature, and
/// which optional widget behaviours are available.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Knowledge-base expert. Portuguese only, no follow-up chips from the model.
    #[default]
    KnowledgeBase,
    /// Bilingual concierge that proposes follow-up questions after each reply.
    Concierge,
    /// Bilingual technical support desk.
    Support,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::KnowledgeBase => "knowledge_base",
            Variant::Concierge => "concierge",
            Variant::Support => "support",
        }
    }

    /// Fixed sampling temperature for the variant. Not user-configurable.
    pub fn temperature(&self) -> f32 {
        match self {
            Variant::KnowledgeBase => 0.6,
            Variant::Concierge => 0.7,
            Variant::Support => 0.5,
        }
    }

    /// Whether the variant offers a language toggle.
    pub fn supports_language_switch(&self) -> bool {
        !matches!(self, Variant::KnowledgeBase)
    }

    /// Whether the persona asks the model to append a `<suggestions>` block.
    pub fn embeds_suggestions(&self) -> bool {
        matches!(self, Variant::Concierge)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "knowledge_base" | "kb" => Ok(Variant::KnowledgeBase),
            "concierge" => Ok(Variant::Concierge),
            "support" => Ok(Variant::Support),
            _ => Err(CoreError::UnknownVariant(s.to_string())),
        }
    }
}

/// How overlapping speech requests are handled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    /// Every request plays, clips can be heard on top of each other.
    #[default]
    Overlap,
    /// A request that arrives while a clip is still playing is dropped.
    Exclusive,
}

impl PlaybackMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackMode::Overlap => "overlap",
            PlaybackMode::Exclusive => "exclusive",
        }
    }
}

impl fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaybackMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overlap" => Ok(PlaybackMode::Overlap),
            "exclusive" => Ok(PlaybackMode::Exclusive),
            _ => Err(CoreError::UnknownPlaybackMode(s.to_string())),
        }
    }
}

// =============================================================================
// Structs
// =============================================================================

/// A web citation attached to an assistant reply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    /// Always non-empty.
    pub uri: String,
}

/// One conversational turn. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Time-ordered identifier (UUIDv7).
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Grounding citations. Only set on assistant turns that had any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            sources: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Assistant turn with citations. An empty list is stored as `None`.
    pub fn assistant_with_sources(content: impl Into<String>, sources: Vec<Source>) -> Self {
        let mut msg = Self::assistant(content);
        if !sources.is_empty() {
            msg.sources = Some(sources);
        }
        msg
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

/// Per-call configuration for a reply request. Not persisted.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationConfig {
    pub language: Language,
    pub use_search: bool,
    /// Selects the persona instructions and the temperature.
    pub variant: Variant,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            use_search: true,
            variant: Variant::default(),
        }
    }
}

/// Normalized outcome of one reply request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationResult {
    /// Visible reply text. Never empty: falls back to a localized string.
    pub text: String,
    pub sources: Vec<Source>,
    /// Follow-up prompts parsed from an embedded suggestions block.
    pub suggestions: Vec<String>,
}
