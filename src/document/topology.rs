//! Cache topology and cluster settings.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ProvisionError;

/// Default transport port range of a clustered cache.
pub const DEFAULT_PORT_RANGE: u16 = 1;

/// Port range of a partitioned-replica cache; the second port carries replica traffic.
pub const REPLICA_PORT_RANGE: u16 = 2;

/// Stats report interval of synthesized cluster settings, in seconds.
pub const DEFAULT_STATS_REPORT_INTERVAL_SECS: u32 = 600;

/// Distribution shape of a cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TopologyKind {
    /// Single-node cache.
    #[default]
    Local,
    /// Every node holds a full copy.
    Replicated,
    /// Data is partitioned across nodes.
    Partitioned,
    /// Partitioned, each partition backed by a replica on another node.
    #[serde(alias = "partitioned-with-replica")]
    PartitionedReplica,
}

impl TopologyKind {
    /// Returns true for topologies that span several nodes.
    pub fn is_clustered(&self) -> bool {
        !matches!(self, TopologyKind::Local)
    }

    /// Returns the canonical topology name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TopologyKind::Local => "local",
            TopologyKind::Replicated => "replicated",
            TopologyKind::Partitioned => "partitioned",
            TopologyKind::PartitionedReplica => "partitioned-replica",
        }
    }
}

impl std::fmt::Display for TopologyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TopologyKind {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "local-cache" => Ok(TopologyKind::Local),
            "replicated" => Ok(TopologyKind::Replicated),
            "partitioned" => Ok(TopologyKind::Partitioned),
            "partitioned-replica" | "partitioned-with-replica" => {
                Ok(TopologyKind::PartitionedReplica)
            }
            _ => Err(ProvisionError::invalid_argument(format!(
                "Invalid topology name '{}'. Valid topologies: local, replicated, partitioned, partitioned-replica",
                s
            ))),
        }
    }
}

/// Topology section of a normalized document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Topology {
    /// Topology kind.
    pub kind: TopologyKind,

    /// Cluster settings, present iff the topology is clustered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_settings: Option<ClusterSettings>,
}

impl Topology {
    /// Creates a local topology.
    pub fn local() -> Self {
        Self::default()
    }

    /// Creates a clustered topology with synthesized cluster settings.
    ///
    /// Partitioned-replica reserves a second contiguous port.
    pub fn clustered(kind: TopologyKind, transport_port: u16) -> Self {
        let port_range = if kind == TopologyKind::PartitionedReplica {
            REPLICA_PORT_RANGE
        } else {
            DEFAULT_PORT_RANGE
        };

        Self {
            kind,
            cluster_settings: Some(ClusterSettings {
                transport_port,
                port_range,
                stats_report_interval: DEFAULT_STATS_REPORT_INTERVAL_SECS,
            }),
        }
    }
}

/// Cluster transport settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClusterSettings {
    /// TCP port used for cluster traffic.
    pub transport_port: u16,

    /// Number of contiguous ports starting at `transport_port`.
    pub port_range: u16,

    /// Interval between cluster statistics reports, in seconds.
    pub stats_report_interval: u32,
}
