//! Remote collaborators of a provisioning run.
//!
//! This module provides the management node traits with their HTTP
//! implementation, the management API wire types, and the client/server
//! mapping synchronizer.

pub mod http;
pub mod mapping;
pub mod node;
pub mod wire;


pub use http::{HttpNodeConnector, HttpNodeSession};
pub use mapping::{
    CacheMapping, ClusterMappingRecord, FileMappingSynchronizer, MappingSynchronizer,
};
pub use node::{NodeConnector, NodeSession};
