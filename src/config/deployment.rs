//! Deployment policy configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ProvisionError;

/// Provider identifier under which client/server lists are published.
pub const DEFAULT_PROVIDER_ID: &str = "CACHE";

/// Default location of the client/server mapping record.
pub const DEFAULT_MAPPING_PATH: &str = "/var/lib/cache-provision/client-mapping.yaml";

/// Deployment policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DeploymentConfig {
    /// Provider identifier sent with client/server list updates.
    pub provider_id: String,

    /// Token sent with registration requests.
    pub token: String,

    /// How prior client lists from overwritten nodes are merged.
    pub merge_mode: MergeMode,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            provider_id: DEFAULT_PROVIDER_ID.to_string(),
            token: String::new(),
            merge_mode: MergeMode::Isolated,
        }
    }
}

/// Client-node merge behavior on overwrite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// Each node gets a fresh copy of the base document plus its own prior clients.
    #[default]
    Isolated,
    /// Merged client lists carry over to the nodes that follow.
    Carry,
}

impl FromStr for MergeMode {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "isolated" => Ok(MergeMode::Isolated),
            "carry" => Ok(MergeMode::Carry),
            _ => Err(ProvisionError::config(format!("Unknown merge mode: {}", s))),
        }
    }
}

/// Client/server mapping record location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Path of the mapping record file.
    pub path: PathBuf,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_MAPPING_PATH),
        }
    }
}
