// Configuration loading and parsing (gateway.toml, credentials.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub gateway: GatewaySettings,
    pub credentials: CredentialsConfig,
    pub db_path: String,
    /// Filler value for the address fields the gateway requires but a
    /// donation flow never collects (ip, city, address, zip).
    pub placeholder: String,
}

// ---------------------------------------------------------------------------
// gateway.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire gateway.toml file.
#[derive(Debug, Clone, Deserialize)]
struct GatewayFile {
    gateway: GatewaySettings,
    database: DatabaseSection,
    #[serde(default)]
    records: RecordsSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewaySettings {
    /// Gateway API root. Requests are sent to `{base_url}/customers` etc.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// When false, every request carries `test = true` so the gateway
    /// processes it against its sandbox.
    #[serde(default)]
    pub live: bool,
    /// Two-letter country code attached to created customers.
    #[serde(default = "default_country")]
    pub country: String,
    /// UI language the gateway uses on its hosted checkout pages.
    #[serde(default = "default_language")]
    pub language: String,
    /// Where the gateway redirects the donor after checkout.
    pub return_url: String,
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSection {
    path: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RecordsSection {
    #[serde(default = "default_placeholder")]
    placeholder: String,
}

impl Default for RecordsSection {
    fn default() -> Self {
        Self {
            placeholder: default_placeholder(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.bepaid.by".to_string()
}

fn default_country() -> String {
    "BY".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_placeholder() -> String {
    "default".to_string()
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub shop_id: Option<String>,
    pub shop_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/gateway.toml` and
/// (optionally) `config/credentials.toml`, relative to the given `base_dir`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- gateway.toml (required) ---
    let gateway_path = config_dir.join("gateway.toml");
    let gateway_text = read_file(&gateway_path)?;
    let gateway_file: GatewayFile =
        toml::from_str(&gateway_text).map_err(|e| ConfigError::ParseError {
            path: gateway_path.clone(),
            source: e,
        })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        gateway: gateway_file.gateway,
        credentials,
        db_path: gateway_file.database.path,
        placeholder: gateway_file.records.placeholder,
    };

    validate(&config)?;

    Ok(config)
}

/// Convenience wrapper: loads config relative to the current working directory.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let gw = &config.gateway;

    if let Err(e) = reqwest::Url::parse(&gw.base_url) {
        return Err(ConfigError::ValidationError {
            field: "gateway.base_url".into(),
            message: format!("not a valid URL: {e}"),
        });
    }

    if let Err(e) = reqwest::Url::parse(&gw.return_url) {
        return Err(ConfigError::ValidationError {
            field: "gateway.return_url".into(),
            message: format!("not a valid URL: {e}"),
        });
    }

    let country_ok = gw.country.len() == 2 && gw.country.bytes().all(|b| b.is_ascii_uppercase());
    if !country_ok {
        return Err(ConfigError::ValidationError {
            field: "gateway.country".into(),
            message: format!(
                "must be a two-letter uppercase country code, got `{}`",
                gw.country
            ),
        });
    }

    if gw.language.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "gateway.language".into(),
            message: "must not be empty".into(),
        });
    }

    if config.db_path.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "database.path".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
