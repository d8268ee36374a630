use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CorsConfig {
    #[serde(default)]
    pub allow_origins: Vec<String>,
    #[serde(default = "default_cors_max_age")]
    pub max_age: u64,
}

fn default_cors_max_age() -> u64 {
    3600
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Blob store settings.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub blob_dir: PathBuf,
    pub max_blob_size: u64,
    /// Bounded retry for transient blob-store failures in the serve path.
    pub read_retries: u8,
}

/// Settings for the external identity provider boundary.
///
/// Identity is delegated to an auth reverse proxy: the proxy authenticates
/// the user and forwards the login name in `user_header`. The app itself
/// never sees credentials.
#[derive(Debug, Deserialize, Clone)]
pub struct IdentityConfig {
    /// Header carrying the authenticated user name. Empty or absent header
    /// means an anonymous visitor.
    pub user_header: String,
    /// Users granted the admin flag.
    #[serde(default)]
    pub admin_users: Vec<String>,
    /// Where to send visitors who want to sign in / out.
    pub login_url: String,
    pub logout_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub identity: IdentityConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("storage.blob_dir", "./blobs")?
            .set_default("storage.max_blob_size", 128 * 1024 * 1024i64)?
            .set_default("storage.read_retries", 3)?
            .set_default("identity.user_header", "x-auth-request-user")?
            .set_default("identity.login_url", "/oauth2/sign_in")?
            .set_default("identity.logout_url", "/oauth2/sign_out")?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., FILEHOSTING__DATABASE__URL)
            .add_source(Environment::with_prefix("FILEHOSTING").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
