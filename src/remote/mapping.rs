//! Cluster-wide client/server mapping.
//!
//! After every target node has accepted a cache, the addresses that host it
//! are published so client processes know which servers front the cache.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{ProvisionError, Result};

/// Publishes the servers that host a cache.
#[async_trait]
pub trait MappingSynchronizer: Send + Sync {
    /// Records `addresses` as the servers of cache `cache`.
    async fn update_server_mapping(&self, cache: &str, addresses: &[String]) -> Result<()>;
}

/// Mapping record, keyed by cache name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterMappingRecord {
    pub caches: BTreeMap<String, CacheMapping>,
}

/// Servers of one cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CacheMapping {
    /// Server addresses, without duplicates, in deployment order.
    pub servers: Vec<String>,
    /// When the entry was last written.
    pub updated_at: DateTime<Utc>,
    /// Host that wrote the entry.
    pub updated_by: String,
}

impl ClusterMappingRecord {
    /// Replaces the entry of `cache` with `addresses`.
    pub fn set_servers(&mut self, cache: &str, addresses: &[String]) {
        let mut servers: Vec<String> = Vec::with_capacity(addresses.len());
        for address in addresses {
            if !servers.contains(address) {
                servers.push(address.clone());
            }
        }

        self.caches.insert(
            cache.to_string(),
            CacheMapping {
                servers,
                updated_at: Utc::now(),
                updated_by: local_host_name(),
            },
        );
    }

    /// Returns the servers of `cache`, if recorded.
    pub fn servers(&self, cache: &str) -> Option<&[String]> {
        self.caches.get(cache).map(|m| m.servers.as_slice())
    }
}

fn local_host_name() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Mapping synchronizer backed by a YAML file.
#[derive(Debug, Clone)]
pub struct FileMappingSynchronizer {
    path: PathBuf,
}

impl FileMappingSynchronizer {
    /// Creates a synchronizer writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the record file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the current record; a missing file is an empty record.
    pub async fn load(&self) -> Result<ClusterMappingRecord> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(ClusterMappingRecord::default()),
            Ok(content) => serde_yaml::from_str(&content).map_err(|e| {
                ProvisionError::mapping_with_source(
                    format!("Failed to parse mapping record {}", self.path.display()),
                    e,
                )
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(ClusterMappingRecord::default())
            }
            Err(e) => Err(ProvisionError::mapping_with_source(
                format!("Failed to read mapping record {}", self.path.display()),
                e,
            )),
        }
    }

    async fn store(&self, record: &ClusterMappingRecord) -> Result<()> {
        let content = serde_yaml::to_string(record).map_err(|e| {
            ProvisionError::mapping_with_source("Failed to serialize mapping record", e)
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ProvisionError::mapping_with_source(
                    format!("Failed to create {}", parent.display()),
                    e,
                )
            })?;
        }

        // Write then rename so readers never see a partial record.
        let tmp = self.path.with_extension("yaml.tmp");
        tokio::fs::write(&tmp, content).await.map_err(|e| {
            ProvisionError::mapping_with_source(format!("Failed to write {}", tmp.display()), e)
        })?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            ProvisionError::mapping_with_source(
                format!("Failed to replace {}", self.path.display()),
                e,
            )
        })
    }
}

#[async_trait]
impl MappingSynchronizer for FileMappingSynchronizer {
    async fn update_server_mapping(&self, cache: &str, addresses: &[String]) -> Result<()> {
        debug!(path = %self.path.display(), cache = %cache, "Updating client/server mapping");

        let mut record = self.load().await?;
        record.set_servers(cache, addresses);
        self.store(&record).await?;

        info!(
            cache = %cache,
            servers = addresses.len(),
            path = %self.path.display(),
            "Client/server mapping updated"
        );
        Ok(())
    }
}
