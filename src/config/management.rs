//! Management transport configuration.
//!
//! Controls how the tool reaches the management service on each node.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use crate::error::ProvisionError;

/// Default management port of a cache server node.
pub const DEFAULT_MANAGEMENT_PORT: u16 = 8250;

/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Management transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ManagementConfig {
    /// URL scheme used to reach nodes.
    pub scheme: Scheme,

    /// Port used when a node address carries none.
    pub port: u16,

    /// Bound on establishing a session with a node, in seconds.
    pub connect_timeout_secs: u64,

    /// Bound on each register/update request, in seconds. Unbounded when absent.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ManagementConfig {
    fn default() -> Self {
        Self {
            scheme: Scheme::Http,
            port: DEFAULT_MANAGEMENT_PORT,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            request_timeout_secs: None,
        }
    }
}

impl ManagementConfig {
    /// Returns the connect timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Returns the per-request timeout, if any.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// URL scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Plain HTTP.
    #[default]
    Http,
    /// HTTP over TLS.
    Https,
}

impl Scheme {
    /// Returns the scheme as used in URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl FromStr for Scheme {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            _ => Err(ProvisionError::config(format!("Unknown scheme: {}", s))),
        }
    }
}
