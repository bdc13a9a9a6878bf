use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub assrt: Option<AssrtConfig>,
    #[serde(default)]
    pub shooter: Option<ShooterConfig>,
}

/// Outbound HTTP settings shared by every provider
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds (default: 10)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout() -> u32 {
    10
}

fn default_user_agent() -> String {
    format!("subgrab/{}", env!("CARGO_PKG_VERSION"))
}

/// Where downloaded subtitles are written
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            temp_dir: default_temp_dir(),
        }
    }
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir().join("subgrab")
}

/// Assrt provider configuration (text search, two-step)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssrtConfig {
    /// API token, 32 characters
    pub token: String,
    #[serde(default = "default_assrt_search_url")]
    pub search_url: String,
    #[serde(default = "default_assrt_detail_url")]
    pub detail_url: String,
}

impl AssrtConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            search_url: default_assrt_search_url(),
            detail_url: default_assrt_detail_url(),
        }
    }
}

fn default_assrt_search_url() -> String {
    "https://api.assrt.net/v1/sub/search".to_string()
}

fn default_assrt_detail_url() -> String {
    "https://api.assrt.net/v1/sub/detail".to_string()
}

/// Shooter provider configuration (fingerprint search, one-step)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShooterConfig {
    #[serde(default = "default_shooter_api_url")]
    pub api_url: String,
}

impl Default for ShooterConfig {
    fn default() -> Self {
        Self {
            api_url: default_shooter_api_url(),
        }
    }
}

fn default_shooter_api_url() -> String {
    "https://www.shooter.cn/api/subapi.php".to_string()
}

/// Sanitized config for display (token redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub http: HttpConfig,
    pub storage: StorageConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assrt: Option<SanitizedAssrtConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shooter: Option<ShooterConfig>,
}

/// Sanitized assrt config (token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAssrtConfig {
    pub search_url: String,
    pub detail_url: String,
    pub token_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            http: config.http.clone(),
            storage: config.storage.clone(),
            assrt: config.assrt.as_ref().map(|a| SanitizedAssrtConfig {
                search_url: a.search_url.clone(),
                detail_url: a.detail_url.clone(),
                token_configured: !a.token.is_empty(),
            }),
            shooter: config.shooter.clone(),
        }
    }
}
