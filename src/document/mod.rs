//! Normalized cache configuration document.
//!
//! A [`CacheDocument`] is what gets registered on every target node. The
//! same serde representation is used for configuration files and for the
//! management wire, so a document read back from a node compares equal to
//! the one that was registered.

mod eviction;
pub mod parser;
mod topology;
mod xml;

pub use eviction::{
    Cleanup, EvictionKind, EvictionPolicy, LogSettings, PerfCounters, Priority, Storage,
    StorageKind, DEFAULT_CLEANUP_INTERVAL_SECS, DEFAULT_EVICTION_RATIO,
};
pub use parser::{
    ConfigurationFileParser, DocumentFileParser, RawCacheDocument, YamlFileParser,
};
pub use xml::XmlFileParser;
pub use topology::{
    ClusterSettings, Topology, TopologyKind, DEFAULT_PORT_RANGE,
    DEFAULT_STATS_REPORT_INTERVAL_SECS, REPLICA_PORT_RANGE,
};

use serde::{Deserialize, Serialize};

use crate::error::{ProvisionError, Result};

/// Cache configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CacheDocument {
    /// Cache name.
    pub name: String,

    /// Whether clients host the cache in-process (local topology only).
    #[serde(default)]
    pub in_proc: bool,

    /// Backing storage.
    pub storage: Storage,

    /// Eviction policy.
    pub eviction_policy: EvictionPolicy,

    /// Expiration cleanup.
    pub cleanup: Cleanup,

    /// Node-side cache logging.
    #[serde(default)]
    pub log: LogSettings,

    /// Performance counters.
    #[serde(default)]
    pub perf_counters: PerfCounters,

    /// Distribution shape.
    pub topology: Topology,

    /// Where the cache runs and who uses it.
    #[serde(default)]
    pub deployment: Deployment,
}

impl CacheDocument {
    /// Returns true if the cache spans several nodes.
    pub fn is_clustered(&self) -> bool {
        self.topology.kind.is_clustered()
    }

    /// Checks the structural invariants of the document.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ProvisionError::config("Cache name must not be empty"));
        }

        if self.storage.size == 0 {
            return Err(ProvisionError::config("storage.size must be > 0"));
        }

        let ratio = self.eviction_policy.eviction_ratio;
        if !(ratio > 0.0 && ratio <= 100.0) {
            return Err(ProvisionError::config(format!(
                "eviction-policy.eviction-ratio must be in (0, 100], got {}",
                ratio
            )));
        }

        if self.in_proc && self.is_clustered() {
            return Err(ProvisionError::config(
                "Cluster cache cannot be in-proc",
            ));
        }

        match (self.is_clustered(), &self.topology.cluster_settings) {
            (true, None) => {
                return Err(ProvisionError::config(format!(
                    "Cluster settings are required for {} topology",
                    self.topology.kind
                )));
            }
            (true, Some(cluster)) => {
                if cluster.transport_port == 0 {
                    return Err(ProvisionError::config(
                        "cluster-settings.transport-port must be > 0",
                    ));
                }
                if cluster.port_range == 0 {
                    return Err(ProvisionError::config(
                        "cluster-settings.port-range must be >= 1",
                    ));
                }
                if u32::from(cluster.transport_port) + u32::from(cluster.port_range) - 1
                    > u32::from(u16::MAX)
                {
                    return Err(ProvisionError::config(
                        "cluster-settings.port-range exceeds the last valid port",
                    ));
                }
            }
            (false, Some(_)) => {
                return Err(ProvisionError::config(
                    "Cluster settings are only allowed for clustered topologies",
                ));
            }
            (false, None) => {}
        }

        Ok(())
    }
}

/// Deployment section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Deployment {
    /// Server nodes the cache is deployed to.
    pub servers: Vec<String>,

    /// Client nodes already registered against the cache.
    pub client_nodes: Vec<String>,
}

impl Deployment {
    /// Merges a node's prior client list into this one.
    ///
    /// Prior entries come first; entries already present are not repeated.
    pub fn merge_client_nodes(&mut self, prior: &[String]) {
        let mut merged: Vec<String> = Vec::with_capacity(prior.len() + self.client_nodes.len());
        for node in prior.iter().chain(self.client_nodes.iter()) {
            if !merged.contains(node) {
                merged.push(node.clone());
            }
        }
        self.client_nodes = merged;
    }
}
