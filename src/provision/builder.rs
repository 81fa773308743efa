//! Cache document construction.
//!
//! A document is built either from a configuration file or from the
//! discrete run parameters. Both paths end with the same normalization:
//! the name comes from the request and clustered caches list the target
//! servers in their deployment section.

use std::path::Path;
use tracing::{debug, warn};

use super::params::{ProvisionParams, ProvisionRequest};
use crate::document::{
    Cleanup, ClusterSettings, ConfigurationFileParser, CacheDocument, EvictionKind,
    EvictionPolicy, LogSettings, PerfCounters, Priority, RawCacheDocument, Storage, Topology,
    TopologyKind, DEFAULT_EVICTION_RATIO, DEFAULT_PORT_RANGE, DEFAULT_STATS_REPORT_INTERVAL_SECS,
    REPLICA_PORT_RANGE,
};
use crate::error::{ProvisionError, Result};

/// Cache size used when none is given, in megabytes.
pub const DEFAULT_CACHE_SIZE_MB: u64 = 1024;

/// File extensions accepted for configuration files.
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["ncconf", "xml"];

/// Builds the cache document for a validated request.
pub fn build_document(
    request: &ProvisionRequest,
    parser: &dyn ConfigurationFileParser,
) -> Result<CacheDocument> {
    let mut document = match &request.params.path {
        Some(path) => from_file(path, parser)?,
        None => from_params(&request.params, request.topology)?,
    };

    document.name = request.cache_id().to_string();

    if document.is_clustered() {
        document.deployment.servers = request.targets.as_slice().to_vec();
    }

    Ok(document)
}

/// Checks that `path` names a supported configuration file.
pub fn check_extension(path: &Path) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        None => Err(ProvisionError::invalid_argument(format!(
            "Incorrect configuration file path specified: {}",
            path.display()
        ))),
        Some(ext) if SUPPORTED_EXTENSIONS.contains(&ext) => Ok(()),
        Some(_) => Err(ProvisionError::invalid_argument(
            "Incorrect file format. Only .ncconf and .xml are supported.",
        )),
    }
}

/// Builds a document from the first cache in a configuration file.
fn from_file(path: &Path, parser: &dyn ConfigurationFileParser) -> Result<CacheDocument> {
    check_extension(path)?;

    let candidates = parser.parse(path)?;
    let count = candidates.len();
    let raw = candidates
        .into_iter()
        .next()
        .ok_or_else(|| ProvisionError::config("Configuration cannot be loaded"))?;

    if count > 1 {
        debug!(
            path = %path.display(),
            candidates = count,
            "Configuration file holds several caches, using the first"
        );
    }

    normalize(raw)
}

/// Fills defaults into a parsed document and rejects fatal omissions.
fn normalize(raw: RawCacheDocument) -> Result<CacheDocument> {
    let storage = match &raw.storage {
        Some(storage) => match storage.size {
            Some(size) if size > 0 => Storage {
                kind: storage.kind,
                size,
            },
            _ => return Err(ProvisionError::config("Cache size is not specified")),
        },
        None => return Err(ProvisionError::config("Cache size is not specified")),
    };

    let raw_topology = raw.topology.unwrap_or_default();
    let kind = raw_topology.kind;

    let topology = if kind.is_clustered() {
        let cluster = raw_topology.cluster_settings.ok_or_else(|| {
            ProvisionError::config("Cluster settings not specified for the cluster cache")
        })?;
        let channel = cluster.channel.ok_or_else(|| {
            ProvisionError::config(
                "Cluster channel related settings not specified for cluster cache",
            )
        })?;
        let transport_port = channel
            .tcp_port
            .filter(|port| *port != 0)
            .ok_or_else(|| ProvisionError::config("Cluster port not specified for cluster cache"))?;

        Topology {
            kind,
            cluster_settings: Some(ClusterSettings {
                transport_port,
                port_range: channel.port_range.unwrap_or(default_port_range(kind)),
                stats_report_interval: cluster
                    .stats_report_interval
                    .unwrap_or(DEFAULT_STATS_REPORT_INTERVAL_SECS),
            }),
        }
    } else {
        if raw_topology.cluster_settings.is_some() {
            warn!("Ignoring cluster settings of a local cache");
        }
        Topology::local()
    };

    Ok(CacheDocument {
        name: raw.name.unwrap_or_default(),
        in_proc: raw.in_proc,
        storage,
        eviction_policy: raw.eviction_policy.unwrap_or_default(),
        cleanup: raw.cleanup.unwrap_or_default(),
        log: raw.log.unwrap_or_default(),
        perf_counters: raw.perf_counters.unwrap_or_default(),
        topology,
        deployment: raw.deployment.unwrap_or_default(),
    })
}

/// Synthesizes a document from discrete parameters.
fn from_params(params: &ProvisionParams, kind: TopologyKind) -> Result<CacheDocument> {
    let mut eviction_policy = EvictionPolicy {
        policy: EvictionKind::Priority,
        default_priority: Priority::Normal,
        eviction_ratio: DEFAULT_EVICTION_RATIO,
        enabled: false,
    };

    if let Some(policy) = params.eviction_policy {
        eviction_policy.policy = policy;
        eviction_policy.enabled = true;
    }
    if let Some(ratio) = params.ratio {
        eviction_policy.eviction_ratio = ratio;
    }
    if let Some(priority) = params.default_priority {
        eviction_policy.default_priority = priority;
        eviction_policy.enabled = true;
    }

    let mut cleanup = Cleanup::default();
    if let Some(interval) = params.cleanup_interval {
        cleanup.interval = interval;
    }

    let topology = if kind.is_clustered() {
        let port = params
            .cluster_port
            .filter(|port| *port != 0)
            .ok_or_else(|| ProvisionError::invalid_argument("Cluster port not specified"))?;
        Topology::clustered(kind, port)
    } else {
        Topology::local()
    };

    Ok(CacheDocument {
        name: params.cache_id.clone(),
        in_proc: params.in_proc && kind == TopologyKind::Local,
        storage: Storage::heap(params.cache_size.unwrap_or(DEFAULT_CACHE_SIZE_MB)),
        eviction_policy,
        cleanup,
        log: LogSettings::default(),
        perf_counters: PerfCounters::default(),
        topology,
        deployment: Default::default(),
    })
}

fn default_port_range(kind: TopologyKind) -> u16 {
    if kind == TopologyKind::PartitionedReplica {
        REPLICA_PORT_RANGE
    } else {
        DEFAULT_PORT_RANGE
    }
}
