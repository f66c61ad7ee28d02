//! Configuration management.
//!
//! Values come from built-in defaults, an optional TOML file, and
//! `CATALOG_TRANSFER_*` environment variables, applied in that order.

use crate::observability::LogFormat;
use crate::{Error, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Prefix of every environment override.
pub const ENV_PREFIX: &str = "CATALOG_TRANSFER_";

/// Main configuration for catalog transfer.
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Base URL of the catalog REST API.
    pub api_base_url: String,
    /// Name of the catalog to read from or write to.
    pub catalog_name: String,
    /// `api-version` query parameter sent with every request.
    pub api_version: String,
    /// Number of search results requested per page during export.
    pub page_size: u32,
    /// HTTP client timeouts.
    pub http: HttpConfig,
    /// Bearer token for the catalog API.
    pub access_token: Option<SecretString>,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// HTTP client configuration for catalog requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpConfig {
    /// Request timeout in milliseconds (0 to disable).
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds (0 to disable).
    pub connect_timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            connect_timeout_ms: 3_000,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Output format.
    pub format: LogFormat,
    /// Filter directive (e.g. `info`, `catalog_transfer=debug`).
    pub level: Option<String>,
    /// Write logs to this file instead of stderr.
    pub file: Option<PathBuf>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Catalog API base URL.
    pub api_base_url: Option<String>,
    /// Catalog name.
    pub catalog_name: Option<String>,
    /// API version.
    pub api_version: Option<String>,
    /// Search page size.
    pub page_size: Option<u32>,
    /// Access token.
    pub access_token: Option<String>,
    /// HTTP section.
    pub http: Option<ConfigFileHttp>,
    /// Logging section.
    pub logging: Option<ConfigFileLogging>,
}

/// HTTP section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileHttp {
    /// Request timeout.
    pub timeout_ms: Option<u64>,
    /// Connect timeout.
    pub connect_timeout_ms: Option<u64>,
}

/// Logging section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileLogging {
    /// `pretty` or `json`.
    pub format: Option<String>,
    /// Filter directive.
    pub level: Option<String>,
    /// Log file path.
    pub file: Option<String>,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            api_base_url: Self::DEFAULT_API_BASE_URL.to_string(),
            catalog_name: Self::DEFAULT_CATALOG_NAME.to_string(),
            api_version: Self::DEFAULT_API_VERSION.to_string(),
            page_size: Self::DEFAULT_PAGE_SIZE,
            http: HttpConfig::default(),
            access_token: None,
            logging: LoggingSettings::default(),
        }
    }
}

impl TransferConfig {
    /// Default API endpoint.
    pub const DEFAULT_API_BASE_URL: &'static str = "https://api.azuredatacatalog.com";

    /// Default catalog name.
    pub const DEFAULT_CATALOG_NAME: &'static str = "DefaultCatalog";

    /// Default API version.
    pub const DEFAULT_API_VERSION: &'static str = "2016-03-30";

    /// Default search page size.
    pub const DEFAULT_PAGE_SIZE: u32 = 100;

    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        Self::from_toml(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid configuration.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;

        Self::from_config_file(file)
    }

    /// Loads configuration from the default location.
    ///
    /// Checks `<config_dir>/catalog-transfer/config.toml`, then
    /// `~/.config/catalog-transfer/config.toml`. Returns defaults if neither
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed.
    pub fn load_default() -> Result<Self> {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Ok(Self::default());
        };

        let candidates = [
            base_dirs
                .config_dir()
                .join("catalog-transfer")
                .join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("catalog-transfer")
                .join("config.toml"),
        ];

        candidates
            .iter()
            .find(|path| path.exists())
            .map_or_else(|| Ok(Self::default()), |path| Self::load_from_file(path))
    }

    /// Loads configuration the way the CLI does.
    ///
    /// Reads `.env` if present, then an explicit path, then
    /// `CATALOG_TRANSFER_CONFIG_PATH`, then the default location, and finally
    /// applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file cannot be loaded or an override is
    /// invalid.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        // A missing .env is normal
        let _ = dotenvy::dotenv();

        let config = if let Some(path) = path {
            Self::load_from_file(path)?
        } else if let Some(env_path) = env_var("CONFIG_PATH") {
            Self::load_from_file(Path::new(&env_path))?
        } else {
            Self::load_default()?
        };

        config.with_env_overrides()
    }

    /// Converts a `ConfigFile` to `TransferConfig`.
    fn from_config_file(file: ConfigFile) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = file.api_base_url {
            config.api_base_url = url;
        }
        if let Some(name) = file.catalog_name {
            config.catalog_name = name;
        }
        if let Some(version) = file.api_version {
            config.api_version = version;
        }
        if let Some(page_size) = file.page_size {
            config.page_size = page_size;
        }
        if let Some(token) = file.access_token {
            config.access_token = Some(SecretString::from(token));
        }
        if let Some(http) = file.http {
            if let Some(v) = http.timeout_ms {
                config.http.timeout_ms = v;
            }
            if let Some(v) = http.connect_timeout_ms {
                config.http.connect_timeout_ms = v;
            }
        }
        if let Some(logging) = file.logging {
            if let Some(format) = logging.format {
                config.logging.format = format.parse()?;
            }
            config.logging.level = logging.level;
            config.logging.file = logging.file.map(PathBuf::from);
        }

        config.validate()?;
        Ok(config)
    }

    /// Applies `CATALOG_TRANSFER_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric override does not parse or the result
    /// fails validation.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Some(v) = env_var("API_BASE_URL") {
            self.api_base_url = v;
        }
        if let Some(v) = env_var("CATALOG_NAME") {
            self.catalog_name = v;
        }
        if let Some(v) = env_var("API_VERSION") {
            self.api_version = v;
        }
        if let Some(v) = env_var("PAGE_SIZE") {
            self.page_size = parse_env_number("PAGE_SIZE", &v)?;
        }
        if let Some(v) = env_var("TIMEOUT_MS") {
            self.http.timeout_ms = parse_env_number("TIMEOUT_MS", &v)?;
        }
        if let Some(v) = env_var("CONNECT_TIMEOUT_MS") {
            self.http.connect_timeout_ms = parse_env_number("CONNECT_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = env_var("ACCESS_TOKEN") {
            self.access_token = Some(SecretString::from(v));
        }
        if let Some(v) = env_var("LOG_FORMAT") {
            self.logging.format = v.parse()?;
        }
        if let Some(v) = env_var("LOG_FILE") {
            self.logging.file = Some(PathBuf::from(v));
        }

        self.validate()?;
        Ok(self)
    }

    /// Checks invariants that the rest of the crate relies on.
    ///
    /// # Errors
    ///
    /// Returns an error if the page size is zero or a required string is
    /// empty.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::InvalidInput(
                "page_size must be greater than zero".to_string(),
            ));
        }
        if self.api_base_url.trim().is_empty() {
            return Err(Error::InvalidInput("api_base_url is empty".to_string()));
        }
        if self.catalog_name.trim().is_empty() {
            return Err(Error::InvalidInput("catalog_name is empty".to_string()));
        }
        Ok(())
    }

    /// Sets the catalog name.
    #[must_use]
    pub fn with_catalog_name(mut self, name: impl Into<String>) -> Self {
        self.catalog_name = name.into();
        self
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Sets the access token.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(SecretString::from(token.into()));
        self
    }
}

/// Reads a non-blank `CATALOG_TRANSFER_<name>` variable.
fn env_var(name: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{name}"))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

fn parse_env_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        Error::InvalidInput(format!(
            "{ENV_PREFIX}{name} must be a non-negative integer, got '{value}'"
        ))
    })
}
