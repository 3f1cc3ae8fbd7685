//! Upstream code-assistant configuration.

use serde::{Deserialize, Serialize};

/// Settings for the assistant that powers the chat panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Backend: `"anthropic"` or `"echo"` (offline).
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Messages API endpoint.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// API key. Falls back to `ANTHROPIC_API_KEY` when empty.
    #[serde(default)]
    pub api_key: String,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Maximum tokens per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Base system prompt; request context is appended to it.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Upstream request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
    /// Number of prior session messages replayed as history.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Bytes of the selected file included in the prompt.
    #[serde(default = "default_context_bytes")]
    pub max_context_bytes: usize,
    /// Capacity of the per-request event channel.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_url: default_api_url(),
            api_key: String::new(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            system_prompt: default_system_prompt(),
            request_timeout_seconds: default_timeout(),
            history_limit: default_history_limit(),
            max_context_bytes: default_context_bytes(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_provider() -> String {
    "anthropic".to_string()
}

fn default_api_url() -> String {
    "https://api.anthropic.com/v1/messages".to_string()
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_system_prompt() -> String {
    "You are a documentation assistant. Answer questions about the user's \
     repository and documentation tree concisely."
        .to_string()
}

fn default_timeout() -> u64 {
    300
}

fn default_history_limit() -> usize {
    20
}

fn default_context_bytes() -> usize {
    16 * 1024
}

fn default_channel_capacity() -> usize {
    64
}
