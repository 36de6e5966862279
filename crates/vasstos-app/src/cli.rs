//! CLI argument definitions for the VASSTOS terminal assistant.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

use vasstos_core::config::VasstosConfig;
use vasstos_core::types::{Language, Variant};
use vasstos_core::CoreError;

/// VASSTOS Assist: the branded support assistant in a terminal.
#[derive(Parser, Debug)]
#[command(name = "vasstos", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Log level or filter directive (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Starting language (pt, en).
    #[arg(long = "lang")]
    pub lang: Option<String>,

    /// Deployment variant (knowledge_base, concierge, support).
    #[arg(long = "variant")]
    pub variant: Option<String>,

    /// Start with web-search grounding turned off.
    #[arg(long = "no-search")]
    pub no_search: bool,

    /// Write synthesized speech as WAV files here instead of playing it.
    #[arg(long = "save-audio")]
    pub save_audio: Option<PathBuf>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > VASSTOS_CONFIG env var > ~/.vasstos/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("VASSTOS_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the tracing filter.
    ///
    /// Priority: --log-level flag > VASSTOS_LOG env var > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        if let Some(ref level) = self.log_level {
            return level.clone();
        }
        if let Ok(level) = std::env::var("VASSTOS_LOG") {
            if !level.trim().is_empty() {
                return level;
            }
        }
        config_level.to_string()
    }

    /// Fold the conversation flags into the loaded config.
    pub fn apply_overrides(&self, config: &mut VasstosConfig) -> Result<(), CoreError> {
        if let Some(ref lang) = self.lang {
            config.chat.language = lang.parse::<Language>()?;
        }
        if let Some(ref variant) = self.variant {
            config.chat.variant = variant.parse::<Variant>()?;
        }
        if self.no_search {
            config.chat.use_search = false;
        }
        Ok(())
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".vasstos").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".vasstos").join("config.toml");
    }
    PathBuf::from("config.toml")
}
