//! cache-provision - Distributed cache provisioning tool
//!
//! This crate builds cache configuration documents, validates them and
//! deploys them to every server node of a cluster through the nodes'
//! management API.
//!
//! # Overview
//!
//! A provisioning run takes per-invocation parameters (or a configuration
//! file), turns them into a [`document::CacheDocument`], and registers that
//! document on each target node in order. The first failing node aborts the
//! run. Once every node has accepted the cache, the cluster-wide
//! client/server mapping is updated.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface definitions
//! - [`config`] - Tool configuration parsing and validation
//! - [`document`] - Cache configuration documents and file parsing
//! - [`error`] - Error types and error handling
//! - [`provision`] - Parameter validation, document building and deployment
//! - [`remote`] - Management node clients and mapping synchronization

pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod provision;
pub mod remote;

// Re-exports for convenience
pub use cli::Cli;
pub use config::Config;
pub use document::CacheDocument;
pub use error::{ErrorCode, ProvisionError, Result};
pub use provision::{prepare, DeploymentCoordinator, ProvisionParams};
pub use remote::{FileMappingSynchronizer, HttpNodeConnector};
