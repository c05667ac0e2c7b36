//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.
//!
//! Unknown keys are rejected and every value is validated once at startup,
//! so a typo in `techplan.toml` fails loudly instead of being ignored.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::endpoints::{API_URL_ENV, DEFAULT_API_BASE, DEFAULT_TIMEOUT_MS};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub dev_server: DevServerConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// API base: absolute (`http://host/api`) or relative to `origin`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Origin a relative `base_url` is resolved against (the dev server)
    #[serde(default = "default_origin")]
    pub origin: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_origin() -> String {
    "http://localhost:8080".to_string()
}

fn default_request_timeout() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            origin: default_origin(),
            request_timeout_ms: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Absolute API base URL, without a trailing slash
    pub fn resolved_base_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if is_http_url(base) {
            base.to_string()
        } else {
            format!("{}{}", self.origin.trim_end_matches('/'), base)
        }
    }
}

/// Development server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DevServerConfig {
    #[serde(default = "default_dev_host")]
    pub host: String,

    #[serde(default = "default_dev_port")]
    pub port: u16,

    #[serde(default = "default_proxy_rules")]
    pub proxy: Vec<ProxyRule>,
}

/// Forward every request under `prefix` to `target`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProxyRule {
    pub prefix: String,

    pub target: String,

    /// Rewrite `Host` (and `Origin`) to the target
    #[serde(default = "default_change_origin")]
    pub change_origin: bool,
}

fn default_dev_host() -> String {
    "127.0.0.1".to_string()
}

fn default_dev_port() -> u16 {
    8080
}

fn default_change_origin() -> bool {
    true
}

fn default_proxy_rules() -> Vec<ProxyRule> {
    vec![ProxyRule {
        prefix: "/api".to_string(),
        target: "http://localhost:8000".to_string(),
        change_origin: true,
    }]
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            host: default_dev_host(),
            port: default_dev_port(),
            proxy: default_proxy_rules(),
        }
    }
}

impl DevServerConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Production build layout
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Sub-directory of `output_dir` for static assets
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,

    #[serde(default)]
    pub production_source_map: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("static")
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            assets_dir: default_assets_dir(),
            production_source_map: false,
        }
    }
}

impl BuildConfig {
    pub fn assets_path(&self) -> PathBuf {
        self.output_dir.join(&self.assets_dir)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse and validate TOML content
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the first default location that exists, or the environment.
    ///
    /// A config file that exists but is invalid is an error, not a fallback.
    pub fn load_default() -> Result<Self, ConfigError> {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("techplan").join("techplan.toml")),
            Some(PathBuf::from("/etc/techplan/techplan.toml")),
            Some(PathBuf::from("./techplan.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                let config = Self::load_with_env(path)?;
                tracing::info!("Loaded config from {:?}", path);
                return Ok(config);
            }
        }

        tracing::debug!("No config file found, using defaults with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = var(API_URL_ENV).filter(|v| !v.is_empty()) {
            self.api.base_url = url;
        }

        if let Some(port) = var("TECHPLAN_DEV_PORT") {
            self.dev_server.port = port.parse().map_err(|_| {
                ConfigError::Invalid(format!("TECHPLAN_DEV_PORT is not a port: {}", port))
            })?;
        }

        if let Some(level) = var("TECHPLAN_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("TECHPLAN_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Check every value once, failing on the first problem
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.api.request_timeout_ms == 0 {
            return invalid("api.request_timeout_ms must be greater than zero".into());
        }
        let base = self.api.base_url.trim();
        if !(is_http_url(base) || base.starts_with('/')) {
            return invalid(format!(
                "api.base_url must be an http(s) URL or start with '/': {}",
                self.api.base_url
            ));
        }
        if base.starts_with('/') && !is_http_url(&self.api.origin) {
            return invalid(format!(
                "api.origin must be an http(s) URL: {}",
                self.api.origin
            ));
        }

        if self.dev_server.port == 0 {
            return invalid("dev_server.port must be greater than zero".into());
        }

        let mut prefixes: Vec<&str> = Vec::new();
        for rule in &self.dev_server.proxy {
            if !rule.prefix.starts_with('/') {
                return invalid(format!(
                    "dev_server.proxy prefix must start with '/': {}",
                    rule.prefix
                ));
            }
            if prefixes.contains(&rule.prefix.as_str()) {
                return invalid(format!(
                    "dev_server.proxy prefix declared twice: {}",
                    rule.prefix
                ));
            }
            prefixes.push(&rule.prefix);

            if !is_http_url(&rule.target) {
                return invalid(format!(
                    "dev_server.proxy target must be an http(s) URL: {}",
                    rule.target
                ));
            }
        }

        if self.build.assets_dir.is_absolute() {
            return invalid(format!(
                "build.assets_dir must be relative to build.output_dir: {:?}",
                self.build.assets_dir
            ));
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return invalid(format!(
                "logging.format must be 'pretty' or 'json': {}",
                self.logging.format
            ));
        }

        Ok(())
    }
}

fn is_http_url(s: &str) -> bool {
    match reqwest::Url::parse(s) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.has_host(),
        Err(_) => false,
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Techplan Configuration
#
# Environment variables override these settings:
# - TECHPLAN_API_URL
# - TECHPLAN_DEV_PORT
# - TECHPLAN_LOG_LEVEL
# - TECHPLAN_LOG_FORMAT

[api]
# API base: an absolute URL, or a path resolved against `origin`
base_url = "/api"

# Where a relative base_url lives (the dev server)
origin = "http://localhost:8080"

# Request timeout in milliseconds
request_timeout_ms = 60000

[dev_server]
# Dev server host
host = "127.0.0.1"

# Dev server port
port = 8080

# Forward /api to the backend, rewriting Host to the target
[[dev_server.proxy]]
prefix = "/api"
target = "http://localhost:8000"
change_origin = true

[build]
# Where the compiled frontend lands
output_dir = "dist"

# Static assets, relative to output_dir
assets_dir = "static"

# Ship source maps in production builds
production_source_map = false

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "/api");
        assert_eq!(config.api.request_timeout_ms, 60_000);
        assert_eq!(config.dev_server.port, 8080);
        assert_eq!(
            config.dev_server.proxy,
            vec![ProxyRule {
                prefix: "/api".to_string(),
                target: "http://localhost:8000".to_string(),
                change_origin: true,
            }]
        );
        assert_eq!(config.build.output_dir, PathBuf::from("dist"));
        assert_eq!(config.build.assets_path(), PathBuf::from("dist/static"));
        assert!(!config.build.production_source_map);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_generated_config_round_trips_to_defaults() {
        let config = Config::parse(&generate_default_config()).unwrap();
        let defaults = Config::default();

        assert_eq!(config.api.base_url, defaults.api.base_url);
        assert_eq!(config.dev_server.proxy, defaults.dev_server.proxy);
        assert_eq!(config.build.assets_dir, defaults.build.assets_dir);
    }

    #[test]
    fn test_resolved_base_url() {
        let mut api = ApiConfig::default();
        assert_eq!(api.resolved_base_url(), "http://localhost:8080/api");

        api.base_url = "https://proposals.example.com/api/".to_string();
        assert_eq!(api.resolved_base_url(), "https://proposals.example.com/api");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = Config::parse("[dev_server]\nprot = 9000\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        let err = Config::parse("[telemetry]\nenabled = true\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_invalid_values_rejected() {
        for content in [
            "[api]\nrequest_timeout_ms = 0\n",
            "[api]\nbase_url = \"api\"\n",
            "[dev_server]\nport = 0\n",
            "[[dev_server.proxy]]\nprefix = \"api\"\ntarget = \"http://localhost:8000\"\n",
            "[[dev_server.proxy]]\nprefix = \"/api\"\ntarget = \"localhost:8000\"\n",
            "[build]\nassets_dir = \"/static\"\n",
            "[logging]\nformat = \"xml\"\n",
        ] {
            let err = Config::parse(content).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "accepted: {}", content);
        }
    }

    #[test]
    fn test_duplicate_proxy_prefix_rejected() {
        let content = r#"
[[dev_server.proxy]]
prefix = "/api"
target = "http://localhost:8000"

[[dev_server.proxy]]
prefix = "/api"
target = "http://localhost:9000"
"#;
        assert!(matches!(
            Config::parse(content),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TECHPLAN_API_URL", "http://backend:8000/api"),
            ("TECHPLAN_DEV_PORT", "9090"),
            ("TECHPLAN_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.api.base_url, "http://backend:8000/api");
        assert_eq!(config.api.resolved_base_url(), "http://backend:8000/api");
        assert_eq!(config.dev_server.port, 9090);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_bad_port_override() {
        let mut config = Config::default();
        let result = config.apply_overrides(|key| {
            (key == "TECHPLAN_DEV_PORT").then(|| "eighty".to_string())
        });
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[dev_server]\nport = 3000\n\n[build]\noutput_dir = \"public\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.dev_server.port, 3000);
        assert_eq!(config.build.output_dir, PathBuf::from("public"));
        // Untouched sections keep their defaults
        assert_eq!(config.dev_server.proxy.len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
