//! Configuration schema definitions

use crate::utils::expand_tilde;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Root configuration for parley
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Conversation settings
    #[serde(default)]
    pub chat: ChatConfig,
    /// Completion service connection
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Storage directory with `~` expanded
    pub fn storage_dir(&self) -> PathBuf {
        expand_tilde(&self.chat.storage_dir)
    }
}

/// What happens to the user's turn when the completion service fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServiceErrorPolicy {
    /// Leave the unanswered user turn in the history
    #[default]
    Keep,
    /// Remove the user turn that triggered the failed request
    Rollback,
}

/// Conversation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,
    /// Maximum reply length in tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// System prompt sent with every request
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Directory for auto-named transcripts
    #[serde(default = "default_storage_dir")]
    pub storage_dir: String,
    /// Handling of the pending user turn after a failed request
    #[serde(default)]
    pub on_service_error: ServiceErrorPolicy,
}

pub const DEFAULT_MODEL: &str = "claude-3-opus-20240229";
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful and friendly AI assistant. Keep your responses concise and clear.";

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_storage_dir() -> String {
    "~/.parley/conversations".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            system_prompt: default_system_prompt(),
            storage_dir: default_storage_dir(),
            on_service_error: ServiceErrorPolicy::default(),
        }
    }
}

/// Completion service connection settings
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key
    #[serde(default)]
    pub api_key: String,
    /// Base URL of the Messages API
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: default_api_base(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = if self.api_key.is_empty() {
            ""
        } else {
            "[REDACTED]"
        };
        f.debug_struct("ProviderConfig")
            .field("api_key", &api_key)
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Directory for log files
    #[serde(default = "default_log_dir")]
    pub dir: String,
    /// Also write logs to stderr
    #[serde(default)]
    pub console: bool,
    /// Module-specific overrides
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_dir() -> String {
    "~/.parley/logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            dir: default_log_dir(),
            console: false,
            overrides: HashMap::new(),
        }
    }
}
