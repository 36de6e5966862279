use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{CoreError, Result};
use crate::types::{ConversationConfig, Language, PlaybackMode, Variant};

/// Top-level configuration for the assistant.
///
/// Loaded from `~/.vasstos/config.toml` by default. Every section and field
/// falls back to its default when missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VasstosConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub audio: AudioConfig,
}

impl VasstosConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: VasstosConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| CoreError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Starting per-call configuration for a new conversation.
    pub fn conversation(&self) -> ConversationConfig {
        ConversationConfig {
            language: self.chat.language,
            use_search: self.chat.use_search,
            variant: self.chat.variant,
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// Generative-language API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL up to and including the API version segment.
    pub base_url: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Model used for text replies.
    pub text_model: String,
    /// Model used for speech synthesis.
    pub tts_model: String,
    /// Prebuilt voice for speech synthesis.
    pub voice_name: String,
    /// Per-request timeout. Unset means wait indefinitely.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            text_model: "gemini-3-pro-preview".to_string(),
            tts_model: "gemini-2.5-flash-preview-tts".to_string(),
            voice_name: "Kore".to_string(),
            request_timeout_secs: None,
        }
    }
}

impl ApiConfig {
    /// Read the API key from the configured variable, then from `API_KEY`.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .or_else(|| std::env::var("API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
    }
}

/// Conversation defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Deployment variant: "knowledge_base", "concierge" or "support".
    pub variant: Variant,
    /// Starting language: "pt" or "en".
    pub language: Language,
    /// Whether web-search grounding starts enabled.
    pub use_search: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            language: Language::default(),
            use_search: true,
        }
    }
}

/// Speech playback configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Whether the speak command is available at all.
    pub enabled: bool,
    /// "overlap" lets clips play over each other; "exclusive" drops a request
    /// while another clip is playing.
    pub playback_mode: PlaybackMode,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            playback_mode: PlaybackMode::Overlap,
        }
    }
}
