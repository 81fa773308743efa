//! Configuration file parsing.
//!
//! A configuration file holds one or more cache documents. Sections may be
//! omitted; the builder decides which absences get defaults and which are
//! fatal, so every section here is optional.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::eviction::{Cleanup, EvictionPolicy, LogSettings, PerfCounters, StorageKind};
use super::topology::TopologyKind;
use super::xml::XmlFileParser;
use super::Deployment;
use crate::error::{ProvisionError, Result};

/// Cache document as written in a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RawCacheDocument {
    pub name: Option<String>,
    pub in_proc: bool,
    pub storage: Option<RawStorage>,
    pub eviction_policy: Option<EvictionPolicy>,
    pub cleanup: Option<Cleanup>,
    pub log: Option<LogSettings>,
    pub perf_counters: Option<PerfCounters>,
    pub topology: Option<RawTopology>,
    pub deployment: Option<Deployment>,
}

/// Storage section as written in a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawStorage {
    #[serde(rename = "type")]
    pub kind: StorageKind,
    pub size: Option<u64>,
}

/// Topology section as written in a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RawTopology {
    pub kind: TopologyKind,
    pub cluster_settings: Option<RawClusterSettings>,
}

/// Cluster section as written in a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RawClusterSettings {
    pub stats_report_interval: Option<u32>,
    pub channel: Option<RawChannel>,
}

/// Cluster channel section as written in a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RawChannel {
    pub tcp_port: Option<u16>,
    pub port_range: Option<u16>,
}

/// Parses configuration files into candidate documents.
pub trait ConfigurationFileParser {
    /// Parses the file at `path`. Returns every document found, in file order.
    fn parse(&self, path: &Path) -> Result<Vec<RawCacheDocument>>;
}

/// Parser for YAML (and JSON) document streams.
///
/// Documents are separated by `---`; empty documents are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFileParser;

impl YamlFileParser {
    /// Parses documents from a string.
    pub fn parse_str(&self, content: &str) -> Result<Vec<RawCacheDocument>> {
        let mut documents = Vec::new();

        if content.trim().is_empty() {
            return Ok(documents);
        }

        for stream_doc in serde_yaml::Deserializer::from_str(content) {
            let parsed = Option::<RawCacheDocument>::deserialize(stream_doc).map_err(|e| {
                ProvisionError::config_with_source("Failed to parse cache configuration", e)
            })?;
            if let Some(doc) = parsed {
                documents.push(doc);
            }
        }

        Ok(documents)
    }
}

impl ConfigurationFileParser for YamlFileParser {
    fn parse(&self, path: &Path) -> Result<Vec<RawCacheDocument>> {
        self.parse_str(&read_file(path)?)
    }
}

impl ConfigurationFileParser for XmlFileParser {
    fn parse(&self, path: &Path) -> Result<Vec<RawCacheDocument>> {
        self.parse_str(&read_file(path)?)
    }
}

/// Parser that picks the format from the content: XML when the first
/// non-blank character is `<`, YAML otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentFileParser;

impl DocumentFileParser {
    /// Parses documents from a string in either format.
    pub fn parse_str(&self, content: &str) -> Result<Vec<RawCacheDocument>> {
        if content.trim_start().starts_with('<') {
            XmlFileParser.parse_str(content)
        } else {
            YamlFileParser.parse_str(content)
        }
    }
}

impl ConfigurationFileParser for DocumentFileParser {
    fn parse(&self, path: &Path) -> Result<Vec<RawCacheDocument>> {
        self.parse_str(&read_file(path)?)
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        ProvisionError::config_with_source(
            format!("Failed to read configuration file: {}", path.display()),
            e,
        )
    })
}
