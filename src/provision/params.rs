//! Per-run provisioning parameters.

use std::fmt;
use std::ops::Index;
use std::path::PathBuf;

use crate::document::{EvictionKind, Priority, TopologyKind};

/// Parameters of one provisioning run, as supplied by the caller.
///
/// Nothing here has been checked yet; [`super::validate_params`] turns it
/// into a [`ProvisionRequest`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProvisionParams {
    /// Cache name. Overrides any name in the configuration file.
    pub cache_id: String,

    /// Comma-separated target server addresses.
    pub servers: String,

    /// Cache size in megabytes.
    pub cache_size: Option<u64>,

    /// Cleanup interval in seconds.
    pub cleanup_interval: Option<u32>,

    /// Cluster transport port.
    pub cluster_port: Option<u16>,

    /// Default item priority override.
    pub default_priority: Option<Priority>,

    /// Eviction policy override.
    pub eviction_policy: Option<EvictionKind>,

    /// Host the cache in the client process.
    pub in_proc: bool,

    /// Configuration file; when set the document is built from it.
    pub path: Option<PathBuf>,

    /// Eviction ratio override.
    pub ratio: Option<f64>,

    /// Topology name; empty means local.
    pub topology: String,

    /// Replace an existing cache of the same name.
    pub overwrite: bool,

    /// Apply the configuration to running nodes without restart.
    pub hot_apply: bool,
}

/// Validated request produced from [`ProvisionParams`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionRequest {
    pub params: ProvisionParams,
    pub topology: TopologyKind,
    pub targets: TargetNodeList,
}

impl ProvisionRequest {
    /// Returns the cache name.
    pub fn cache_id(&self) -> &str {
        &self.params.cache_id
    }
}

/// Ordered list of target node addresses.
///
/// Duplicates are kept; each entry is contacted independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetNodeList(Vec<String>);

impl TargetNodeList {
    /// Parses a comma-separated address list. Entries are trimmed and empty
    /// entries dropped.
    pub fn parse(servers: &str) -> Self {
        Self(
            servers
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Index<usize> for TargetNodeList {
    type Output = String;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl From<Vec<String>> for TargetNodeList {
    fn from(nodes: Vec<String>) -> Self {
        Self(nodes)
    }
}

impl<'a> IntoIterator for &'a TargetNodeList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for TargetNodeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_targets() {
        let targets = TargetNodeList::parse("10.0.0.1, 10.0.0.2,10.0.0.1");
        assert_eq!(targets.len(), 3);
        assert_eq!(targets[0], "10.0.0.1");
        assert_eq!(targets[1], "10.0.0.2");
        assert_eq!(targets[2], "10.0.0.1");
    }

    #[test]
    fn test_parse_drops_empty_entries() {
        let targets = TargetNodeList::parse(" ,a,,b, ");
        assert_eq!(targets.as_slice(), &["a".to_string(), "b".to_string()]);

        assert!(TargetNodeList::parse("").is_empty());
        assert!(TargetNodeList::parse(",,").is_empty());
    }

    #[test]
    fn test_display() {
        let targets = TargetNodeList::parse("a, b");
        assert_eq!(targets.to_string(), "a,b");
    }
}
