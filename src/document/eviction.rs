//! Storage, eviction and housekeeping sections of a cache document.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ProvisionError;

/// Default eviction ratio (percent of items evicted when the cache is full).
pub const DEFAULT_EVICTION_RATIO: f64 = 5.0;

/// Default cleanup interval in seconds.
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u32 = 15;

/// Backing storage of the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Storage {
    /// Storage kind.
    #[serde(rename = "type", default)]
    pub kind: StorageKind,

    /// Capacity in megabytes.
    pub size: u64,
}

impl Storage {
    /// Creates heap storage with the given capacity.
    pub fn heap(size: u64) -> Self {
        Self {
            kind: StorageKind::Heap,
            size,
        }
    }
}

/// Storage kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// In-process heap storage.
    #[default]
    Heap,
}

impl FromStr for StorageKind {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "heap" => Ok(StorageKind::Heap),
            _ => Err(ProvisionError::invalid_argument(format!(
                "Invalid storage type '{}'. Valid types: heap",
                s
            ))),
        }
    }
}

/// Eviction policy section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EvictionPolicy {
    /// Policy kind.
    pub policy: EvictionKind,

    /// Priority assigned to items inserted without one.
    pub default_priority: Priority,

    /// Percentage of items evicted per pass, in (0, 100].
    pub eviction_ratio: f64,

    /// Whether eviction runs at all.
    pub enabled: bool,
}

impl Default for EvictionPolicy {
    fn default() -> Self {
        Self {
            policy: EvictionKind::Priority,
            default_priority: Priority::Normal,
            eviction_ratio: DEFAULT_EVICTION_RATIO,
            enabled: true,
        }
    }
}

/// Eviction policy kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionKind {
    /// Evict lowest priority items first.
    #[default]
    Priority,
    /// Least recently used.
    Lru,
    /// Least frequently used.
    Lfu,
}

impl FromStr for EvictionKind {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "priority" => Ok(EvictionKind::Priority),
            "lru" => Ok(EvictionKind::Lru),
            "lfu" => Ok(EvictionKind::Lfu),
            _ => Err(ProvisionError::invalid_argument(format!(
                "Invalid eviction policy '{}'. Valid policies: priority, lru, lfu",
                s
            ))),
        }
    }
}

/// Item priority used by priority eviction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    BelowNormal,
    #[default]
    Normal,
    AboveNormal,
    High,
}

impl FromStr for Priority {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "low" => Ok(Priority::Low),
            "below-normal" | "belownormal" => Ok(Priority::BelowNormal),
            "normal" => Ok(Priority::Normal),
            "above-normal" | "abovenormal" => Ok(Priority::AboveNormal),
            "high" => Ok(Priority::High),
            _ => Err(ProvisionError::invalid_argument(format!(
                "Invalid default priority '{}'. Valid priorities: low, below-normal, normal, above-normal, high",
                s
            ))),
        }
    }
}

/// Expiration cleanup section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cleanup {
    /// Interval between cleanup passes, in seconds.
    pub interval: u32,
}

impl Default for Cleanup {
    fn default() -> Self {
        Self {
            interval: DEFAULT_CLEANUP_INTERVAL_SECS,
        }
    }
}

/// Node-side cache logging section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LogSettings {
    pub enabled: bool,
    pub trace_errors: bool,
    pub trace_debug: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            trace_errors: true,
            trace_debug: false,
        }
    }
}

/// Performance counter section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerfCounters {
    pub enabled: bool,
}

impl Default for PerfCounters {
    fn default() -> Self {
        Self { enabled: true }
    }
}
