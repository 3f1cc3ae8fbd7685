//! Documentation tree limits.

use serde::{Deserialize, Serialize};

/// Limits applied by the documentation mutation handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsConfig {
    /// Maximum file content size in bytes.
    #[serde(default = "default_max_content")]
    pub max_content_bytes: usize,
    /// Maximum item name length in characters.
    #[serde(default = "default_max_name")]
    pub max_name_length: usize,
    /// File extensions accepted on creation (lowercase, without the dot).
    #[serde(default = "default_extensions")]
    pub allowed_extensions: Vec<String>,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            max_content_bytes: default_max_content(),
            max_name_length: default_max_name(),
            allowed_extensions: default_extensions(),
        }
    }
}

fn default_max_content() -> usize {
    2 * 1024 * 1024
}

fn default_max_name() -> usize {
    255
}

fn default_extensions() -> Vec<String> {
    vec!["md".to_string(), "txt".to_string(), "doc".to_string()]
}
