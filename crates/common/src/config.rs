//! Application configuration.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// File storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Blog behavior configuration.
    #[serde(default)]
    pub blog: BlogConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Base directory for stored files.
    #[serde(default = "default_storage_path")]
    pub base_path: String,
    /// Base URL for serving stored files.
    #[serde(default = "default_storage_url")]
    pub base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_path: default_storage_path(),
            base_url: default_storage_url(),
        }
    }
}

/// Blog behavior configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BlogConfig {
    /// When true, publishing an already-published post re-stamps its
    /// `published` timestamp (bumping it to the top of the index). When
    /// false, the first publish timestamp is kept.
    #[serde(default)]
    pub republish_resets_timestamp: bool,
    /// Storage key of the placeholder feature image used when a post has
    /// no image of its own.
    #[serde(default = "default_placeholder_image")]
    pub placeholder_image: String,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            republish_resets_timestamp: false,
            placeholder_image: default_placeholder_image(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

fn default_storage_path() -> String {
    "./media".to_string()
}

fn default_storage_url() -> String {
    "/media".to_string()
}

fn default_placeholder_image() -> String {
    "placeholders/feature.png".to_string()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `QUILL_ENV`)
    /// 3. Environment variables with `QUILL_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("QUILL_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("QUILL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
