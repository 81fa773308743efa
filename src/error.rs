//! Error types and error handling for cache-provision.
//!
//! This module defines the error taxonomy of the provisioning workflow,
//! stable error codes, the error body exchanged with management nodes,
//! and CLI exit codes.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// E001: Malformed input (bad extension, missing required parameter)
    #[serde(rename = "E001")]
    InvalidArgument,

    /// E002: Structurally invalid cache configuration
    #[serde(rename = "E002")]
    InvalidConfiguration,

    /// E003: Cache already registered on the node
    #[serde(rename = "E003")]
    AlreadyExists,

    /// E004: Failed to reach the management node
    #[serde(rename = "E004")]
    ConnectionError,

    /// E005: Operation timed out
    #[serde(rename = "E005")]
    Timeout,

    /// E006: The management node rejected the operation
    #[serde(rename = "E006")]
    RemoteError,

    /// E007: Client/server mapping update failed
    #[serde(rename = "E007")]
    MappingError,
}

impl ErrorCode {
    /// Returns the error code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidArgument => "E001",
            ErrorCode::InvalidConfiguration => "E002",
            ErrorCode::AlreadyExists => "E003",
            ErrorCode::ConnectionError => "E004",
            ErrorCode::Timeout => "E005",
            ErrorCode::RemoteError => "E006",
            ErrorCode::MappingError => "E007",
        }
    }

}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// CLI exit codes.
pub mod exit_code {
    /// General error
    pub const GENERAL_ERROR: i32 = 1;
    /// Configuration error
    pub const CONFIG_ERROR: i32 = 2;
    /// Connection error
    pub const CONNECTION_ERROR: i32 = 3;
    /// Timeout error
    pub const TIMEOUT_ERROR: i32 = 4;
    /// Command line argument error
    pub const CLI_ERROR: i32 = 64;
}

/// The main error type for cache-provision.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Malformed input detected before any network call.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Cache configuration (or tool configuration) is structurally invalid.
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A cache with the same name is already registered on the node.
    #[error("Specified cache already exists: '{cache}' on {server}")]
    AlreadyExists { cache: String, server: String },

    /// Failed to reach a management node.
    #[error("Connection error: {target}")]
    Connection {
        target: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("Timeout: {operation} (waited {seconds}s)")]
    Timeout { operation: String, seconds: u64 },

    /// The management node rejected or failed an operation.
    #[error("Remote error: {message}")]
    Remote {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The cluster-wide client/server mapping could not be updated.
    #[error("Mapping update failed: {message}")]
    Mapping {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Deployment aborted on a node. Wraps the first failure of the run.
    #[error("Failed to create cache on server '{server}': {source}")]
    Deployment {
        server: String,
        /// Nodes that accepted the configuration before the failure.
        accepted: Vec<String>,
        #[source]
        source: Box<ProvisionError>,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProvisionError {
    /// Returns the error code for this error.
    ///
    /// A deployment wrapper reports the code of the failure it wraps.
    pub fn code(&self) -> ErrorCode {
        match self {
            ProvisionError::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            ProvisionError::InvalidConfiguration { .. } => ErrorCode::InvalidConfiguration,
            ProvisionError::AlreadyExists { .. } => ErrorCode::AlreadyExists,
            ProvisionError::Connection { .. } => ErrorCode::ConnectionError,
            ProvisionError::Timeout { .. } => ErrorCode::Timeout,
            ProvisionError::Remote { .. } => ErrorCode::RemoteError,
            ProvisionError::Mapping { .. } => ErrorCode::MappingError,
            ProvisionError::Deployment { source, .. } => source.code(),
            ProvisionError::Io(_) => ErrorCode::InvalidConfiguration,
            ProvisionError::Yaml(_) => ErrorCode::InvalidConfiguration,
            ProvisionError::Json(_) => ErrorCode::RemoteError,
        }
    }

    /// Returns the CLI exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ProvisionError::InvalidArgument { .. } => exit_code::CLI_ERROR,
            ProvisionError::InvalidConfiguration { .. } | ProvisionError::Yaml(_) => {
                exit_code::CONFIG_ERROR
            }
            ProvisionError::Connection { .. } => exit_code::CONNECTION_ERROR,
            ProvisionError::Timeout { .. } => exit_code::TIMEOUT_ERROR,
            ProvisionError::Deployment { source, .. } => source.exit_code(),
            _ => exit_code::GENERAL_ERROR,
        }
    }

    /// Returns the innermost error, unwrapping deployment context.
    pub fn root(&self) -> &ProvisionError {
        match self {
            ProvisionError::Deployment { source, .. } => source.root(),
            other => other,
        }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ProvisionError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an invalid configuration error with a message.
    pub fn config(message: impl Into<String>) -> Self {
        ProvisionError::InvalidConfiguration {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an invalid configuration error with a message and source.
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ProvisionError::InvalidConfiguration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a remote error with a message.
    pub fn remote(message: impl Into<String>) -> Self {
        ProvisionError::Remote {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a remote error with a message and source.
    pub fn remote_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ProvisionError::Remote {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a connection error.
    pub fn connection(target: impl Into<String>) -> Self {
        ProvisionError::Connection {
            target: target.into(),
            source: None,
        }
    }

    /// Creates a connection error with a source.
    pub fn connection_with_source(
        target: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ProvisionError::Connection {
            target: target.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a mapping error with a message.
    pub fn mapping(message: impl Into<String>) -> Self {
        ProvisionError::Mapping {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a mapping error with a message and source.
    pub fn mapping_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ProvisionError::Mapping {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Error body of a management API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "E003").
    pub code: ErrorCode,

    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    /// Creates a new error response.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Converts a response received from a node back into an error.
    pub fn into_error(self, cache: &str, server: &str) -> ProvisionError {
        match self.code {
            ErrorCode::AlreadyExists => ProvisionError::AlreadyExists {
                cache: cache.to_string(),
                server: server.to_string(),
            },
            ErrorCode::InvalidConfiguration => {
                ProvisionError::config(format!("[{}] {}", self.code, self.message))
            }
            _ => ProvisionError::remote(format!("[{}] {}", self.code, self.message)),
        }
    }
}

/// Result type alias for cache-provision operations.
pub type Result<T> = std::result::Result<T, ProvisionError>;
