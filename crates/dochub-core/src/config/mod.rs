//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod assistant;
pub mod auth;
pub mod database;
pub mod documents;
pub mod logging;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::assistant::AssistantConfig;
pub use self::auth::AuthConfig;
pub use self::database::DatabaseConfig;
pub use self::documents::DocumentsConfig;
pub use self::logging::LoggingConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Row store settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Supabase token verification settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Documentation tree limits.
    #[serde(default)]
    pub documents: DocumentsConfig,
    /// Upstream assistant settings.
    #[serde(default)]
    pub assistant: AssistantConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default.toml` with an environment-specific overlay
    /// (`config/{env}.toml`) and environment variables prefixed with
    /// `DOCHUB__` (e.g. `DOCHUB__DATABASE__URL`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config", env)
    }

    /// Load configuration from an explicit directory.
    pub fn load_from(dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("DOCHUB")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("documents.allowed_extensions")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_files() {
        let config = AppConfig::load_from("does-not-exist", "test").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.provider, "postgres");
        assert_eq!(config.documents.max_content_bytes, 2 * 1024 * 1024);
        assert_eq!(config.documents.allowed_extensions, vec!["md", "txt", "doc"]);
        assert_eq!(config.assistant.provider, "anthropic");
        assert_eq!(config.logging.level, "info");
    }
}
