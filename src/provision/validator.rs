//! Parameter validation.
//!
//! Checks run in a fixed order and stop at the first violation. The
//! in-proc check precedes the size/port checks so an in-proc clustered
//! request gets the more specific error even when its cluster port is
//! also missing.

use tracing::debug;

use super::params::{ProvisionParams, ProvisionRequest, TargetNodeList};
use crate::document::TopologyKind;
use crate::error::{ProvisionError, Result};

/// Validates run parameters and resolves the topology and target list.
pub fn validate_params(params: ProvisionParams) -> Result<ProvisionRequest> {
    if params.cache_id.trim().is_empty() {
        return Err(ProvisionError::invalid_argument("Cache name not specified"));
    }

    let targets = TargetNodeList::parse(&params.servers);
    if targets.is_empty() {
        return Err(ProvisionError::invalid_argument("Server IP not specified"));
    }

    if params.topology.trim().is_empty() {
        if params.path.is_none() && params.cache_size == Some(0) {
            return Err(ProvisionError::invalid_argument("Cache size not specified"));
        }
        debug!(cache = %params.cache_id, "No topology given, using local");
        return Ok(ProvisionRequest {
            params,
            topology: TopologyKind::Local,
            targets,
        });
    }

    let topology: TopologyKind = params.topology.parse()?;

    if params.in_proc && topology != TopologyKind::Local {
        return Err(ProvisionError::invalid_argument(
            "Cluster cache cannot be in-proc",
        ));
    }

    if params.path.is_none() {
        if params.cache_size == Some(0) {
            return Err(ProvisionError::invalid_argument("Cache size not specified"));
        }
        if topology.is_clustered() && params.cluster_port.unwrap_or(0) == 0 {
            return Err(ProvisionError::invalid_argument(
                "Cluster port not specified",
            ));
        }
    }

    Ok(ProvisionRequest {
        params,
        topology,
        targets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn params(topology: &str) -> ProvisionParams {
        ProvisionParams {
            cache_id: "c1".to_string(),
            servers: "10.0.0.1".to_string(),
            cache_size: Some(1024),
            topology: topology.to_string(),
            ..Default::default()
        }
    }

    fn message(result: Result<ProvisionRequest>) -> String {
        match result {
            Err(ProvisionError::InvalidArgument { message }) => message,
            other => panic!("Expected InvalidArgument, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_cache_id() {
        let mut p = params("local");
        p.cache_id = String::new();
        assert_eq!(message(validate_params(p)), "Cache name not specified");
    }

    #[test]
    fn test_missing_servers() {
        let mut p = params("local");
        p.servers = "  ".to_string();
        assert_eq!(message(validate_params(p)), "Server IP not specified");
    }

    #[test]
    fn test_empty_topology_defaults_to_local() {
        let request = validate_params(params("")).unwrap();
        assert_eq!(request.topology, TopologyKind::Local);
        assert_eq!(request.targets.len(), 1);
    }

    #[test]
    fn test_unknown_topology() {
        assert!(message(validate_params(params("mirror"))).contains("Invalid topology"));
    }

    #[test]
    fn test_local_in_proc_accepted() {
        let mut p = params("local");
        p.in_proc = true;
        assert!(validate_params(p).is_ok());
    }

    #[test]
    fn test_clustered_in_proc_rejected() {
        let mut p = params("replicated");
        p.in_proc = true;
        p.cluster_port = Some(7800);
        assert_eq!(message(validate_params(p)), "Cluster cache cannot be in-proc");
    }

    #[test]
    fn test_in_proc_checked_before_cluster_port() {
        let mut p = params("partitioned");
        p.in_proc = true;
        p.cluster_port = None;
        assert_eq!(message(validate_params(p)), "Cluster cache cannot be in-proc");
    }

    #[test]
    fn test_clustered_requires_cluster_port() {
        let p = params("partitioned");
        assert_eq!(message(validate_params(p)), "Cluster port not specified");
    }

    #[test]
    fn test_cluster_port_not_required_with_file() {
        let mut p = params("partitioned");
        p.path = Some(PathBuf::from("cache.ncconf"));
        assert!(validate_params(p).is_ok());
    }

    #[test]
    fn test_zero_cache_size_rejected() {
        let mut p = params("local");
        p.cache_size = Some(0);
        assert_eq!(message(validate_params(p)), "Cache size not specified");
    }

    #[test]
    fn test_separator_only_server_list_rejected() {
        let mut p = params("local");
        p.servers = ",,".to_string();
        assert_eq!(message(validate_params(p)), "Server IP not specified");
    }

    #[test]
    fn test_separator_only_server_list_without_topology() {
        let mut p = params("");
        p.servers = ",".to_string();
        assert_eq!(message(validate_params(p)), "Server IP not specified");
    }

    #[test]
    fn test_zero_cache_size_without_topology() {
        let mut p = params("");
        p.cache_size = Some(0);
        assert_eq!(message(validate_params(p)), "Cache size not specified");

        let mut p = params("");
        p.cache_size = Some(0);
        p.path = Some(PathBuf::from("cache.ncconf"));
        assert!(validate_params(p).is_ok());
    }

    #[test]
    fn test_valid_clustered_request() {
        let mut p = params("partitioned-replica");
        p.cluster_port = Some(7800);
        p.servers = "a,b".to_string();

        let request = validate_params(p).unwrap();
        assert_eq!(request.topology, TopologyKind::PartitionedReplica);
        assert_eq!(request.targets.len(), 2);
        assert_eq!(request.cache_id(), "c1");
    }
}
