//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FIREBASE_PROJECT_ID` - Firebase project hosting the Firestore database
//! - `FIREBASE_API_KEY` - Firebase web API key
//! - `CLAUDE_API_KEY` - Anthropic Claude API key
//!
//! ## Optional
//! - `PANTRY_HOST` - Bind address (default: 127.0.0.1)
//! - `PANTRY_PORT` - Listen port (default: 3000)
//! - `FIRESTORE_COLLECTION` - Collection holding the items (default: inventory)
//! - `FIRESTORE_BASE_URL` - Firestore REST endpoint (default: production)
//! - `CLAUDE_MODEL` - Claude model ID (default: claude-sonnet-4-20250514)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Pantry Tracker application configuration.
#[derive(Debug, Clone)]
pub struct PantryConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Firestore item store configuration
    pub firestore: FirestoreConfig,
    /// Claude AI configuration
    pub claude: ClaudeConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Firestore REST API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct FirestoreConfig {
    /// Firestore REST endpoint, overridable for local emulators
    pub base_url: String,
    /// Firebase project ID
    pub project_id: String,
    /// Collection holding one document per item
    pub collection: String,
    /// Firebase web API key
    pub api_key: SecretString,
}

impl std::fmt::Debug for FirestoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreConfig")
            .field("base_url", &self.base_url)
            .field("project_id", &self.project_id)
            .field("collection", &self.collection)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Claude API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct ClaudeConfig {
    /// Anthropic API key
    pub api_key: SecretString,
    /// Model ID (e.g., "claude-sonnet-4-20250514")
    pub model: String,
}

impl std::fmt::Debug for ClaudeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaudeConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

impl PantryConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets look like unfilled placeholders.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("PANTRY_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("PANTRY_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PANTRY_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PANTRY_PORT".to_string(), e.to_string()))?;

        let firestore = FirestoreConfig::from_env()?;
        let claude = ClaudeConfig::from_env()?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_env_or_default("SENTRY_SAMPLE_RATE", "1.0")
            .parse::<f32>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SENTRY_SAMPLE_RATE".to_string(), e.to_string())
            })?;
        let sentry_traces_sample_rate = get_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0")
            .parse::<f32>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SENTRY_TRACES_SAMPLE_RATE".to_string(), e.to_string())
            })?;

        Ok(Self {
            host,
            port,
            firestore,
            claude,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl FirestoreConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: get_env_or_default("FIRESTORE_BASE_URL", DEFAULT_FIRESTORE_BASE_URL),
            project_id: get_required_env("FIREBASE_PROJECT_ID")?,
            collection: get_env_or_default("FIRESTORE_COLLECTION", "inventory"),
            api_key: get_validated_secret("FIREBASE_API_KEY")?,
        })
    }
}

impl ClaudeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: get_validated_secret("CLAUDE_API_KEY")?,
            model: get_env_or_default("CLAUDE_MODEL", DEFAULT_CLAUDE_MODEL),
        })
    }
}

/// Get a required environment variable.
fn get_required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Get a required secret, rejecting obvious placeholder values.
fn get_validated_secret(name: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(name)?;

    if let Some(pattern) = find_placeholder(&value) {
        return Err(ConfigError::InsecureSecret(
            name.to_string(),
            format!("value looks like a placeholder (contains \"{pattern}\")"),
        ));
    }

    Ok(SecretString::from(value))
}

/// Returns the first placeholder pattern found in the value, if any.
fn find_placeholder(value: &str) -> Option<&'static str> {
    let lowered = value.to_lowercase();
    PLACEHOLDER_PATTERNS
        .iter()
        .find(|pattern| lowered.contains(**pattern))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_detection_flags_common_patterns() {
        assert_eq!(find_placeholder("your-api-key-here"), Some("your-"));
        assert_eq!(find_placeholder("CHANGEME"), Some("changeme"));
        assert_eq!(find_placeholder("sk-TODO-fill-in"), Some("todo"));
    }

    #[test]
    fn placeholder_detection_accepts_real_looking_keys() {
        assert_eq!(find_placeholder("AIzaSyB4kQz9mPdxu28LqWn61c"), None);
        assert_eq!(find_placeholder("sk-ant-api03-4f8a"), None);
    }

    #[test]
    fn socket_addr_combines_host_and_port() {
        let config = PantryConfig {
            host: "127.0.0.1".parse().expect("valid ip"),
            port: 3000,
            firestore: FirestoreConfig {
                base_url: DEFAULT_FIRESTORE_BASE_URL.to_string(),
                project_id: "demo".to_string(),
                collection: "inventory".to_string(),
                api_key: SecretString::from("k"),
            },
            claude: ClaudeConfig {
                api_key: SecretString::from("k"),
                model: DEFAULT_CLAUDE_MODEL.to_string(),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn debug_redacts_secrets() {
        let firestore = FirestoreConfig {
            base_url: DEFAULT_FIRESTORE_BASE_URL.to_string(),
            project_id: "demo".to_string(),
            collection: "inventory".to_string(),
            api_key: SecretString::from("very-real-key"),
        };
        let debug = format!("{firestore:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("very-real-key"));
    }
}
