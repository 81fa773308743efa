//! Management API wire types.
//!
//! Every response uses the same envelope; request bodies are specific to
//! the operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::CacheDocument;
use crate::error::ErrorResponse;

/// Standard API response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data. May be absent on success (e.g. no such cache).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error information (present on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResponse>,
    /// Response timestamp.
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    /// Creates a successful response with data.
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Creates a successful response without data.
    pub fn empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Creates a failed response with an error.
    pub fn error(error: ErrorResponse) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            timestamp: Utc::now(),
        }
    }
}

/// Health probe response data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthData {
    /// Health status.
    pub status: HealthStatus,
    /// Management service version.
    pub version: String,
}

/// Health status enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Body of a cache registration request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RegisterRequest {
    pub config: CacheDocument,
    pub token: String,
    pub overwrite: bool,
    pub hot_apply: bool,
}

/// Body of a client/server list update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClientServerListRequest {
    pub servers: Vec<String>,
    pub provider_id: String,
}
