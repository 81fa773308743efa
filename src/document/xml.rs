//! XML configuration files.
//!
//! A file holds a `<configuration>` root with one `<cache-config>` element
//! per cache. Element names follow the kebab-case keys of the YAML form;
//! list sections (`servers`, `client-nodes`) hold repeated `<node>`
//! elements.

use serde::Deserialize;
use std::str::FromStr;

use super::eviction::{Cleanup, EvictionPolicy, LogSettings, PerfCounters, StorageKind};
use super::parser::{RawCacheDocument, RawChannel, RawClusterSettings, RawStorage, RawTopology};
use super::topology::TopologyKind;
use super::Deployment;
use crate::error::{ProvisionError, Result};

#[derive(Debug, Default, Deserialize)]
struct XmlConfiguration {
    #[serde(rename = "cache-config", default)]
    caches: Vec<XmlCacheConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct XmlCacheConfig {
    name: Option<String>,
    in_proc: Option<bool>,
    storage: Option<XmlStorage>,
    eviction_policy: Option<XmlEvictionPolicy>,
    cleanup: Option<XmlCleanup>,
    log: Option<XmlLog>,
    perf_counters: Option<XmlPerfCounters>,
    topology: Option<XmlTopology>,
    deployment: Option<XmlDeployment>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct XmlStorage {
    #[serde(rename = "type")]
    kind: Option<String>,
    size: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct XmlEvictionPolicy {
    policy: Option<String>,
    default_priority: Option<String>,
    eviction_ratio: Option<f64>,
    enabled: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct XmlCleanup {
    interval: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct XmlLog {
    enabled: Option<bool>,
    trace_errors: Option<bool>,
    trace_debug: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct XmlPerfCounters {
    enabled: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct XmlTopology {
    kind: Option<String>,
    cluster_settings: Option<XmlClusterSettings>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct XmlClusterSettings {
    stats_report_interval: Option<u32>,
    channel: Option<XmlChannel>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct XmlChannel {
    tcp_port: Option<u16>,
    port_range: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct XmlDeployment {
    servers: Option<XmlNodeList>,
    client_nodes: Option<XmlNodeList>,
}

#[derive(Debug, Default, Deserialize)]
struct XmlNodeList {
    #[serde(rename = "node", default)]
    nodes: Vec<String>,
}

/// Parser for XML configuration files.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlFileParser;

impl XmlFileParser {
    /// Parses the caches of an XML document, in file order.
    pub fn parse_str(&self, content: &str) -> Result<Vec<RawCacheDocument>> {
        let configuration: XmlConfiguration = quick_xml::de::from_str(content).map_err(|e| {
            ProvisionError::config_with_source("Failed to parse cache configuration", e)
        })?;

        configuration.caches.into_iter().map(into_raw).collect()
    }
}

fn parse_value<T>(field: &str, value: &str) -> Result<T>
where
    T: FromStr<Err = ProvisionError>,
{
    value.trim().parse().map_err(|e: ProvisionError| {
        ProvisionError::config(format!("Invalid value for {}: {}", field, e))
    })
}

fn into_raw(cache: XmlCacheConfig) -> Result<RawCacheDocument> {
    let storage = match cache.storage {
        Some(storage) => Some(RawStorage {
            kind: match storage.kind {
                Some(kind) => parse_value::<StorageKind>("storage type", &kind)?,
                None => StorageKind::default(),
            },
            size: storage.size,
        }),
        None => None,
    };

    let eviction_policy = match cache.eviction_policy {
        Some(section) => {
            let mut policy = EvictionPolicy::default();
            if let Some(kind) = section.policy {
                policy.policy = parse_value("eviction policy", &kind)?;
            }
            if let Some(priority) = section.default_priority {
                policy.default_priority = parse_value("default priority", &priority)?;
            }
            if let Some(ratio) = section.eviction_ratio {
                policy.eviction_ratio = ratio;
            }
            if let Some(enabled) = section.enabled {
                policy.enabled = enabled;
            }
            Some(policy)
        }
        None => None,
    };

    let cleanup = cache.cleanup.map(|section| {
        let mut cleanup = Cleanup::default();
        if let Some(interval) = section.interval {
            cleanup.interval = interval;
        }
        cleanup
    });

    let log = cache.log.map(|section| {
        let defaults = LogSettings::default();
        LogSettings {
            enabled: section.enabled.unwrap_or(defaults.enabled),
            trace_errors: section.trace_errors.unwrap_or(defaults.trace_errors),
            trace_debug: section.trace_debug.unwrap_or(defaults.trace_debug),
        }
    });

    let perf_counters = cache.perf_counters.map(|section| PerfCounters {
        enabled: section
            .enabled
            .unwrap_or(PerfCounters::default().enabled),
    });

    let topology = match cache.topology {
        Some(section) => Some(RawTopology {
            kind: match section.kind {
                Some(kind) => parse_value::<TopologyKind>("topology", &kind)?,
                None => TopologyKind::default(),
            },
            cluster_settings: section.cluster_settings.map(|cluster| RawClusterSettings {
                stats_report_interval: cluster.stats_report_interval,
                channel: cluster.channel.map(|channel| RawChannel {
                    tcp_port: channel.tcp_port,
                    port_range: channel.port_range,
                }),
            }),
        }),
        None => None,
    };

    let deployment = cache.deployment.map(|section| Deployment {
        servers: section.servers.map(|list| list.nodes).unwrap_or_default(),
        client_nodes: section.client_nodes.map(|list| list.nodes).unwrap_or_default(),
    });

    Ok(RawCacheDocument {
        name: cache.name,
        in_proc: cache.in_proc.unwrap_or(false),
        storage,
        eviction_policy,
        cleanup,
        log,
        perf_counters,
        topology,
        deployment,
    })
}
