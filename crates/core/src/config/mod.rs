//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (STELLAR_*, nested fields split on `__`)
//! 2. TOML config file (if STELLAR_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! The loaded value is built once at startup and handed to every component
//! that needs provider credentials or timeouts.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Unsplash API credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnsplashConfig {
    /// Set via STELLAR_UNSPLASH__ACCESS_KEY.
    #[serde(default)]
    pub access_key: Option<String>,
}

/// Google Drive OAuth client credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoogleDriveConfig {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub secret: Option<String>,
}

/// Dropbox OAuth client credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DropboxConfig {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub secret: Option<String>,
}

/// OneDrive (Microsoft identity platform) client credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OnedriveConfig {
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub secret: Option<String>,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (STELLAR_*)
/// 2. TOML config file (if STELLAR_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Port the HTTP service listens on.
    ///
    /// Set via STELLAR_PORT environment variable.
    #[serde(default = "default_port")]
    pub port: u16,

    /// OAuth redirect URI registered with every storage provider.
    ///
    /// Set via STELLAR_REDIRECT_URL environment variable.
    #[serde(default)]
    pub redirect_url: Option<String>,

    /// Root directory of the image cache.
    ///
    /// Set via STELLAR_CACHE_DIR environment variable.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// User-Agent string for outbound requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout for image fetches and API calls in milliseconds.
    ///
    /// Set via STELLAR_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Timeout for save-to-storage relays in milliseconds.
    ///
    /// Set via STELLAR_UPLOAD_TIMEOUT_MS environment variable.
    #[serde(default = "default_upload_timeout_ms")]
    pub upload_timeout_ms: u64,

    /// Hosts the image endpoint may point at.
    ///
    /// Set via STELLAR_IMAGE_HOSTS environment variable (`[a.com, b.com]`).
    #[serde(default = "default_image_hosts")]
    pub image_hosts: Vec<String>,

    #[serde(default)]
    pub unsplash: UnsplashConfig,

    #[serde(default)]
    pub google_drive: GoogleDriveConfig,

    #[serde(default)]
    pub dropbox: DropboxConfig,

    #[serde(default)]
    pub onedrive: OnedriveConfig,
}

fn default_port() -> u16 {
    8080
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cached_images")
}

fn default_user_agent() -> String {
    concat!("stellar-photos/", env!("CARGO_PKG_VERSION")).into()
}

fn default_timeout_ms() -> u64 {
    60_000
}

fn default_upload_timeout_ms() -> u64 {
    180_000
}

fn default_image_hosts() -> Vec<String> {
    vec!["images.unsplash.com".into(), "plus.unsplash.com".into()]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            redirect_url: None,
            cache_dir: default_cache_dir(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            upload_timeout_ms: default_upload_timeout_ms(),
            image_hosts: default_image_hosts(),
            unsplash: UnsplashConfig::default(),
            google_drive: GoogleDriveConfig::default(),
            dropbox: DropboxConfig::default(),
            onedrive: OnedriveConfig::default(),
        }
    }
}

/// Credentials for one OAuth client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientCredentials<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Upload timeout as Duration.
    pub fn upload_timeout(&self) -> Duration {
        Duration::from_millis(self.upload_timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `STELLAR_`
    /// 2. TOML file from `STELLAR_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("STELLAR_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("STELLAR_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Unsplash access key, checked when an Unsplash route is called.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the key is not set.
    pub fn require_unsplash_key(&self) -> Result<&str, ConfigError> {
        require(&self.unsplash.access_key, "unsplash.access_key", "STELLAR_UNSPLASH__ACCESS_KEY")
    }

    /// OAuth redirect URI shared by every provider.
    pub fn require_redirect_url(&self) -> Result<&str, ConfigError> {
        require(&self.redirect_url, "redirect_url", "STELLAR_REDIRECT_URL")
    }

    pub fn require_google_drive(&self) -> Result<ClientCredentials<'_>, ConfigError> {
        Ok(ClientCredentials {
            client_id: require(&self.google_drive.key, "google_drive.key", "STELLAR_GOOGLE_DRIVE__KEY")?,
            client_secret: require(&self.google_drive.secret, "google_drive.secret", "STELLAR_GOOGLE_DRIVE__SECRET")?,
        })
    }

    /// Dropbox app key alone, for handing to the extension.
    pub fn require_dropbox_key(&self) -> Result<&str, ConfigError> {
        require(&self.dropbox.key, "dropbox.key", "STELLAR_DROPBOX__KEY")
    }

    /// Dropbox key and secret, needed only for the token exchange.
    pub fn require_dropbox(&self) -> Result<ClientCredentials<'_>, ConfigError> {
        Ok(ClientCredentials {
            client_id: self.require_dropbox_key()?,
            client_secret: require(&self.dropbox.secret, "dropbox.secret", "STELLAR_DROPBOX__SECRET")?,
        })
    }

    pub fn require_onedrive(&self) -> Result<ClientCredentials<'_>, ConfigError> {
        Ok(ClientCredentials {
            client_id: require(&self.onedrive.app_id, "onedrive.app_id", "STELLAR_ONEDRIVE__APP_ID")?,
            client_secret: require(&self.onedrive.secret, "onedrive.secret", "STELLAR_ONEDRIVE__SECRET")?,
        })
    }
}

fn require<'a>(value: &'a Option<String>, field: &str, env: &str) -> Result<&'a str, ConfigError> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::Missing { field: field.into(), hint: format!("Set {env} environment variable") })
}
