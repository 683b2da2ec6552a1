//! Environment-based configuration module
//!
//! Configuration can be set via:
//! 1. Environment variables (highest priority)
//! 2. .env file
//! 3. Default values (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::{env, fs};

/// Application environment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    /// Get environment from APP_ENV variable or default to Development
    pub fn from_env() -> Self {
        match env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()).as_str() {
            "production" => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        *self == Environment::Production
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub app_name: String,
    pub version: String,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub logging: LoggingConfig,
}

/// Backend REST API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the subadmin backend
    pub base_url: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Encryption key for the local preference store (env override; a
    /// bundled application key is used when unset)
    pub encryption_key: Option<String>,

    /// Preference store file name (relative to app data dir)
    pub prefs_file: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug)
    pub level: String,

    /// Log to file
    pub log_to_file: bool,

    /// Log to stdout
    pub log_to_stdout: bool,

    /// Use JSON format (true for production)
    pub json_format: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let environment = Environment::from_env();

        Self {
            environment,
            app_name: env::var("APP_NAME").unwrap_or_else(|_| "Subadmin Dashboard".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),

            api: ApiConfig {
                base_url: env::var("API_BASE_URL")
                    .unwrap_or_else(|_| "https://api.example-resto.com".to_string()),
                request_timeout_secs: env::var("API_REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(15),
                connect_timeout_secs: env::var("API_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            },

            security: SecurityConfig {
                encryption_key: env::var("ENCRYPTION_KEY").ok(),
                prefs_file: env::var("PREFS_FILE").unwrap_or_else(|_| "prefs.dat".to_string()),
            },

            logging: LoggingConfig {
                level: env::var("RUST_LOG").unwrap_or_else(|_| {
                    if environment.is_production() { "warn".to_string() } else { "debug".to_string() }
                }),
                log_to_file: true,
                log_to_stdout: env::var("LOG_TO_STDOUT")
                    .map(|s| s == "true")
                    .unwrap_or(true),
                json_format: environment.is_production(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and defaults
    pub fn load() -> Self {
        Self::default()
    }

    /// Load configuration from a .env file (if exists)
    pub fn load_from_file(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        let content = fs::read_to_string(path).ok()?;

        // Simple .env parser (key=value format)
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim().trim_matches('"').trim_matches('\'');
                env::set_var(key, value);
            }
        }

        Some(Self::default())
    }

    pub fn is_production(&self) -> bool {
        self.environment.is_production()
    }

    /// Validate configuration for production
    pub fn validate(&self) -> Result<(), String> {
        if self.is_production() {
            // The bundled fallback key obscures, it does not protect.
            // Production deployments must set their own.
            if self.security.encryption_key.is_none() {
                return Err(
                    "ENCRYPTION_KEY must be set in production. \
                     Set it via environment variable."
                        .to_string(),
                );
            }

            if self.api.base_url.starts_with("http://") {
                eprintln!("WARNING: API base URL is not HTTPS in production!");
            }
        }

        Ok(())
    }
}

/// Global configuration instance
static GLOBAL_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Initialize the global configuration
pub fn init_config() -> &'static AppConfig {
    GLOBAL_CONFIG.get_or_init(AppConfig::load)
}

/// Get the global configuration
pub fn get_config() -> &'static AppConfig {
    GLOBAL_CONFIG.get().expect("Configuration not initialized. Call init_config() first.")
}
