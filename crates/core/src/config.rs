use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub market: MarketConfig,
    pub signing: SigningConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct MarketConfig {
    pub search_api_key: Option<SecretString>,
    pub search_base_url: String,
    pub shopping_api_key: Option<SecretString>,
    pub shopping_base_url: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct SigningConfig {
    pub enabled: bool,
    pub base_url: String,
    pub api_key: Option<SecretString>,
    pub webhook_secret: Option<String>,
    pub return_url: String,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub search_api_key: Option<String>,
    pub shopping_api_key: Option<String>,
    pub signing_enabled: Option<bool>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://vaulted.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            market: MarketConfig {
                search_api_key: None,
                search_base_url: "https://serpapi.com/search".to_string(),
                shopping_api_key: None,
                shopping_base_url: "https://serpapi.com/search".to_string(),
                timeout_secs: 10,
            },
            signing: SigningConfig {
                enabled: false,
                base_url: "https://demo.docusign.net/restapi".to_string(),
                api_key: None,
                webhook_secret: None,
                return_url: "http://localhost:8080/agreements/complete".to_string(),
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("vaulted.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(market) = patch.market {
            if let Some(search_api_key_value) = market.search_api_key {
                self.market.search_api_key = Some(secret_value(search_api_key_value));
            }
            if let Some(search_base_url) = market.search_base_url {
                self.market.search_base_url = search_base_url;
            }
            if let Some(shopping_api_key_value) = market.shopping_api_key {
                self.market.shopping_api_key = Some(secret_value(shopping_api_key_value));
            }
            if let Some(shopping_base_url) = market.shopping_base_url {
                self.market.shopping_base_url = shopping_base_url;
            }
            if let Some(timeout_secs) = market.timeout_secs {
                self.market.timeout_secs = timeout_secs;
            }
        }

        if let Some(signing) = patch.signing {
            if let Some(enabled) = signing.enabled {
                self.signing.enabled = enabled;
            }
            if let Some(base_url) = signing.base_url {
                self.signing.base_url = base_url;
            }
            if let Some(signing_api_key_value) = signing.api_key {
                self.signing.api_key = Some(secret_value(signing_api_key_value));
            }
            if let Some(webhook_secret) = signing.webhook_secret {
                self.signing.webhook_secret = Some(webhook_secret);
            }
            if let Some(return_url) = signing.return_url {
                self.signing.return_url = return_url;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("VAULTED_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("VAULTED_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_u32("VAULTED_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("VAULTED_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("VAULTED_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("VAULTED_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("VAULTED_SERVER_PORT") {
            self.server.port = parse_u16("VAULTED_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("VAULTED_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("VAULTED_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("VAULTED_MARKET_SEARCH_API_KEY") {
            self.market.search_api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("VAULTED_MARKET_SEARCH_BASE_URL") {
            self.market.search_base_url = value;
        }
        if let Some(value) = read_env("VAULTED_MARKET_SHOPPING_API_KEY") {
            self.market.shopping_api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("VAULTED_MARKET_SHOPPING_BASE_URL") {
            self.market.shopping_base_url = value;
        }
        if let Some(value) = read_env("VAULTED_MARKET_TIMEOUT_SECS") {
            self.market.timeout_secs = parse_u64("VAULTED_MARKET_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("VAULTED_SIGNING_ENABLED") {
            self.signing.enabled = parse_bool("VAULTED_SIGNING_ENABLED", &value)?;
        }
        if let Some(value) = read_env("VAULTED_SIGNING_BASE_URL") {
            self.signing.base_url = value;
        }
        if let Some(value) = read_env("VAULTED_SIGNING_API_KEY") {
            self.signing.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("VAULTED_SIGNING_WEBHOOK_SECRET") {
            self.signing.webhook_secret = Some(value);
        }
        if let Some(value) = read_env("VAULTED_SIGNING_RETURN_URL") {
            self.signing.return_url = value;
        }

        let log_level = read_env("VAULTED_LOGGING_LEVEL").or_else(|| read_env("VAULTED_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("VAULTED_LOGGING_FORMAT").or_else(|| read_env("VAULTED_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(search_api_key) = overrides.search_api_key {
            self.market.search_api_key = Some(secret_value(search_api_key));
        }
        if let Some(shopping_api_key) = overrides.shopping_api_key {
            self.market.shopping_api_key = Some(secret_value(shopping_api_key));
        }
        if let Some(enabled) = overrides.signing_enabled {
            self.signing.enabled = enabled;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_server(&self.server)?;
        validate_market(&self.market)?;
        validate_signing(&self.signing)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("vaulted.toml"), PathBuf::from("config/vaulted.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation(
            "server.port must be greater than zero".to_string(),
        ));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_market(market: &MarketConfig) -> Result<(), ConfigError> {
    if market.timeout_secs == 0 || market.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "market.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if market.search_api_key.is_some() && !is_http_url(&market.search_base_url) {
        return Err(ConfigError::Validation(
            "market.search_base_url must start with http:// or https://".to_string(),
        ));
    }

    if market.shopping_api_key.is_some() && !is_http_url(&market.shopping_base_url) {
        return Err(ConfigError::Validation(
            "market.shopping_base_url must start with http:// or https://".to_string(),
        ));
    }

    Ok(())
}

fn validate_signing(signing: &SigningConfig) -> Result<(), ConfigError> {
    if !signing.enabled {
        return Ok(());
    }

    if !is_http_url(&signing.base_url) {
        return Err(ConfigError::Validation(
            "signing.base_url must start with http:// or https://".to_string(),
        ));
    }

    let missing_key = signing
        .api_key
        .as_ref()
        .map(|value| value.expose_secret().trim().is_empty())
        .unwrap_or(true);
    if missing_key {
        return Err(ConfigError::Validation(
            "signing.api_key is required when signing is enabled".to_string(),
        ));
    }

    let missing_secret =
        signing.webhook_secret.as_ref().map(|value| value.trim().is_empty()).unwrap_or(true);
    if missing_secret {
        return Err(ConfigError::Validation(
            "signing.webhook_secret is required when signing is enabled".to_string(),
        ));
    }

    if !is_http_url(&signing.return_url) {
        return Err(ConfigError::Validation(
            "signing.return_url must start with http:// or https://".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    server: Option<ServerPatch>,
    market: Option<MarketPatch>,
    signing: Option<SigningPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct MarketPatch {
    search_api_key: Option<String>,
    search_base_url: Option<String>,
    shopping_api_key: Option<String>,
    shopping_base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SigningPatch {
    enabled: Option<bool>,
    base_url: Option<String>,
    api_key: Option<String>,
    webhook_secret: Option<String>,
    return_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
