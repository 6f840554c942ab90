//! Configuration settings structure
//!
//! Defines the settings structure and environment loading logic for the
//! importer.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Main configuration settings for the importer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// LinguaLeo account credentials and login behavior
    pub account: AccountSettings,
    /// Remote API endpoints and request tuning
    pub api: ApiSettings,
    /// Where session cookies live between runs
    pub storage: StorageSettings,
    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Account credentials and login behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountSettings {
    /// Account email; required before a session can be opened
    pub email: String,
    /// Account password; hosts that set `remember_password = false`
    /// should prompt instead of storing it
    pub password: Option<String>,
    /// Whether hosts may write the password back to the config file
    pub remember_password: bool,
    /// Keep the session cookie file between runs
    pub stay_logged_in: bool,
}

/// Remote API endpoints and request tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL of the JSON API
    pub base_url: String,
    /// Auth dispatch URL (form-encoded login endpoint)
    pub auth_url: String,
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Page size for the word listing endpoints
    pub words_per_request: usize,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

/// Cookie persistence locations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Cookie file path; defaults to the platform config directory
    pub cookie_file: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level
    pub level: String,
    /// Enable verbose logging
    pub verbose: bool,
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: None,
            remember_password: true,
            stay_logged_in: true,
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.lingualeo.com".to_string(),
            auth_url: "https://lingualeo.com/ru/uauth/dispatch".to_string(),
            user_agent: "Anki Add-on".to_string(),
            words_per_request: 999,
            request_timeout_secs: 30,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            verbose: false,
        }
    }
}

impl ApiSettings {
    /// Per-request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Default cookie file location under the platform config directory.
pub fn default_cookie_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("lingualeo-importer").join("cookies.txt"))
}

/// Default config file location under the platform config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("lingualeo-importer").join("config.toml"))
}

impl Settings {
    /// Create new settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from environment variables, on top of defaults.
    pub fn from_env() -> crate::Result<Self> {
        let mut settings = Self::default();
        settings.apply_env()?;
        Ok(settings)
    }

    /// Overlay `LINGUALEO_*` environment variables onto these settings.
    pub fn apply_env(&mut self) -> crate::Result<()> {
        self.apply_env_vars(|name| std::env::var(name).ok())
    }

    fn apply_env_vars(&mut self, get: impl Fn(&str) -> Option<String>) -> crate::Result<()> {
        if let Some(email) = get("LINGUALEO_EMAIL") {
            self.account.email = email;
        }
        if let Some(password) = get("LINGUALEO_PASSWORD") {
            self.account.password = Some(password);
        }
        if let Some(base_url) = get("LINGUALEO_API_BASE_URL") {
            self.api.base_url = base_url;
        }
        if let Some(auth_url) = get("LINGUALEO_AUTH_URL") {
            self.api.auth_url = auth_url;
        }
        if let Some(per_page) = get("LINGUALEO_WORDS_PER_REQUEST") {
            self.api.words_per_request = per_page.parse().map_err(|e| {
                crate::Error::Config(format!("Invalid LINGUALEO_WORDS_PER_REQUEST: {}", e))
            })?;
        }
        if let Some(cookie_file) = get("LINGUALEO_COOKIE_FILE") {
            self.storage.cookie_file = Some(PathBuf::from(cookie_file));
        }
        if let Some(level) = get("LINGUALEO_LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(())
    }

    /// Where cookies should be persisted, or `None` when the user asked not
    /// to stay logged in.
    pub fn cookie_path(&self) -> Option<PathBuf> {
        if !self.account.stay_logged_in {
            return None;
        }
        self.storage.cookie_file.clone().or_else(default_cookie_path)
    }

    /// Check settings for values that cannot work.
    pub fn validate(&self) -> crate::Result<()> {
        if self.api.words_per_request == 0 {
            return Err(crate::Error::config("words_per_request must be at least 1"));
        }
        url::Url::parse(&self.api.base_url)
            .map_err(|e| crate::Error::Config(format!("Invalid api.base_url: {}", e)))?;
        url::Url::parse(&self.api.auth_url)
            .map_err(|e| crate::Error::Config(format!("Invalid api.auth_url: {}", e)))?;
        Ok(())
    }
}
