//! Tool configuration for cache-provision.
//!
//! This module provides the settings that shape a provisioning run but are
//! not part of the cache document itself: how nodes are reached, deployment
//! policy, where the client/server mapping lives, and logging. Configuration
//! is loaded from a YAML file and overridden by environment variables.

mod deployment;
mod logging;
mod management;

pub use deployment::{
    DeploymentConfig, MappingConfig, MergeMode, DEFAULT_MAPPING_PATH, DEFAULT_PROVIDER_ID,
};
pub use logging::{LogFormat, LogLevel, LogOutput, LoggingConfig};
pub use management::{
    ManagementConfig, Scheme, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_MANAGEMENT_PORT,
};

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{ProvisionError, Result};

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/cache-provision/config.yaml";

/// Environment variable for configuration file path.
pub const ENV_CONFIG_PATH: &str = "CACHE_PROVISION_CONFIG";

/// Tool configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Management transport configuration.
    pub management: ManagementConfig,

    /// Deployment policy.
    pub deployment: DeploymentConfig,

    /// Client/server mapping record.
    pub mapping: MappingConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Loads configuration with the following priority:
    /// 1. Explicit path (if provided)
    /// 2. CACHE_PROVISION_CONFIG environment variable
    /// 3. Default path (/etc/cache-provision/config.yaml)
    ///
    /// Returns default config if no file exists.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_config_path(explicit_path);

        if path.exists() {
            let mut config = Self::load_from_path(&path)?;
            config.apply_env_overrides();
            config.validate()?;
            return Ok(config);
        } else if explicit_path.is_some() {
            return Err(ProvisionError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let mut config = Config::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProvisionError::config_with_source(
                format!("Failed to read config file: {}", path.display()),
                e,
            )
        })?;

        Self::load_from_str(&content)
    }

    /// Loads configuration from a YAML string.
    pub fn load_from_str(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ProvisionError::config_with_source("Failed to parse config", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Resolves the configuration file path based on priority.
    fn resolve_config_path(explicit_path: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit_path {
            return path.to_path_buf();
        }

        if let Ok(env_path) = env::var(ENV_CONFIG_PATH) {
            return PathBuf::from(env_path);
        }

        PathBuf::from(DEFAULT_CONFIG_PATH)
    }

    /// Applies environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        // Management settings
        if let Ok(scheme) = env::var("CACHE_PROVISION_SCHEME") {
            if let Ok(scheme) = scheme.parse() {
                self.management.scheme = scheme;
            }
        }
        if let Ok(port) = env::var("CACHE_PROVISION_PORT") {
            if let Ok(port) = port.parse() {
                self.management.port = port;
            }
        }
        if let Ok(secs) = env::var("CACHE_PROVISION_CONNECT_TIMEOUT") {
            if let Ok(secs) = secs.parse() {
                self.management.connect_timeout_secs = secs;
            }
        }

        // Deployment settings
        if let Ok(token) = env::var("CACHE_PROVISION_TOKEN") {
            self.deployment.token = token;
        }
        if let Ok(mode) = env::var("CACHE_PROVISION_MERGE_MODE") {
            if let Ok(mode) = mode.parse() {
                self.deployment.merge_mode = mode;
            }
        }

        // Mapping settings
        if let Ok(path) = env::var("CACHE_PROVISION_MAPPING_PATH") {
            self.mapping.path = PathBuf::from(path);
        }

        // Logging settings
        if let Ok(level) = env::var("CACHE_PROVISION_LOG_LEVEL") {
            if let Ok(level) = level.parse() {
                self.logging.level = level;
            }
        }
        if let Ok(format) = env::var("CACHE_PROVISION_LOG_FORMAT") {
            if let Ok(format) = format.parse() {
                self.logging.format = format;
            }
        }
    }

    /// Validates configuration.
    pub fn validate(&self) -> Result<()> {
        if self.management.port == 0 {
            return Err(ProvisionError::config("management.port must be > 0"));
        }

        if self.management.connect_timeout_secs == 0 {
            return Err(ProvisionError::config(
                "management.connect-timeout-secs must be > 0",
            ));
        }

        if self.management.request_timeout_secs == Some(0) {
            return Err(ProvisionError::config(
                "management.request-timeout-secs must be > 0 when set",
            ));
        }

        if self.deployment.provider_id.trim().is_empty() {
            return Err(ProvisionError::config(
                "deployment.provider-id must not be empty",
            ));
        }

        if self.mapping.path.as_os_str().is_empty() {
            return Err(ProvisionError::config("mapping.path must not be empty"));
        }

        Ok(())
    }
}
