use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    #[serde(default)]
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Root directory for the filesystem file store.
    pub root_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SubmissionConfig {
    /// Maximum number of files per entry.
    pub max_files: usize,
    /// Per-file ceiling for non-video uploads, in bytes.
    pub max_file_bytes: u64,
    /// Per-file ceiling for video uploads, in bytes. Videos are allowed a
    /// larger ceiling than other entry files.
    pub max_video_bytes: u64,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            max_files: 10,
            max_file_bytes: 10 * 1024 * 1024,
            max_video_bytes: 200 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BootstrapConfig {
    /// When false, `seed::bootstrap` is a no-op.
    pub enabled: bool,
    pub admin_username: String,
    pub admin_email: String,
    /// Must be non-empty when `enabled` is true.
    #[serde(default)]
    pub admin_password: String,
    /// Also create demo business/individual accounts and sample categories.
    pub sample_data: bool,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            admin_username: "admin".into(),
            admin_email: "admin@votenest.local".into(),
            admin_password: String::new(),
            sample_data: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub submission: SubmissionConfig,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.max_age", 3600)?
            .set_default("storage.root_dir", "./data/files")?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., VOTENEST__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("VOTENEST").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
