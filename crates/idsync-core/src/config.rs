//! Tool configuration loading and types.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{SyncError, SyncResult};
use crate::keywords::KeywordConfig;

/// Root configuration, loaded once per run and passed down explicitly.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub keywords: KeywordConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection settings for the identity server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub base_url: String,
    #[serde(default = "default_tenant_domain")]
    pub tenant_domain: String,
    /// Client id of the application this tool authenticates as.
    #[serde(default)]
    pub client_id: String,
    /// Bearer token forwarded as-is; obtaining it is out of scope.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_tls_verify")]
    pub tls_verify: bool,
}

fn default_tenant_domain() -> String {
    "carbon.super".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_tls_verify() -> bool {
    true
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Identity of the client this tool itself is registered as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerIdentity {
    pub client_id: String,
}

impl ServerIdentity {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
        }
    }
}

impl SyncConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SyncResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            SyncError::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(content: &str) -> SyncResult<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| SyncError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("IDSYNC_BASE_URL") {
            self.server.base_url = url;
        }
        if let Ok(tenant) = std::env::var("IDSYNC_TENANT_DOMAIN") {
            self.server.tenant_domain = tenant;
        }
        if let Ok(client_id) = std::env::var("IDSYNC_CLIENT_ID") {
            self.server.client_id = client_id;
        }
        if let Ok(token) = std::env::var("IDSYNC_TOKEN") {
            self.server.token = Some(token);
        }
    }

    /// The tool's own identity, consulted by the protected-resource guard.
    pub fn identity(&self) -> ServerIdentity {
        ServerIdentity::new(self.server.client_id.clone())
    }

    fn validate(&self) -> SyncResult<()> {
        let url = self.server.base_url.trim();
        if url.is_empty() {
            return Err(SyncError::Config("server.base_url must not be empty".to_string()));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(SyncError::Config(format!(
                "server.base_url must start with http:// or https://, got '{url}'"
            )));
        }
        Ok(())
    }
}

/// Locations of the configuration file.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Base configuration directory
    pub config_dir: PathBuf,
    /// Path to config.yaml
    pub config_file: PathBuf,
}

impl ConfigPaths {
    /// Resolve the configuration file.
    ///
    /// Order: explicit path, `IDSYNC_CONFIG`, then the platform config
    /// directory (`~/.config/idsync/config.yaml` on Linux).
    pub fn resolve(explicit: Option<&Path>) -> SyncResult<Self> {
        if let Some(path) = explicit {
            return Ok(Self::for_file(path.to_path_buf()));
        }

        if let Ok(path) = std::env::var("IDSYNC_CONFIG") {
            return Ok(Self::for_file(PathBuf::from(path)));
        }

        let base_dir = dirs::config_dir().ok_or_else(|| {
            SyncError::Config("Could not determine configuration directory".to_string())
        })?;
        let config_dir = base_dir.join("idsync");

        Ok(Self {
            config_file: config_dir.join("config.yaml"),
            config_dir,
        })
    }

    fn for_file(config_file: PathBuf) -> Self {
        let config_dir = config_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            config_dir,
            config_file,
        }
    }

    /// Load the configuration file and apply environment overrides.
    pub fn load(&self) -> SyncResult<SyncConfig> {
        let mut config = SyncConfig::from_file(&self.config_file)?;
        config.apply_env_overrides();
        Ok(config)
    }
}
