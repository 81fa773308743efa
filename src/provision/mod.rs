//! Provisioning pipeline.
//!
//! A run goes through three stages, each returning a `Result`:
//! parameter validation, document construction (with document validation),
//! and deployment to the target nodes.

pub mod builder;
pub mod coordinator;
pub mod params;
pub mod validator;

#[cfg(test)]
mod coordinator_tests;

pub use builder::{build_document, DEFAULT_CACHE_SIZE_MB};
pub use coordinator::{
    DeployOptions, DeploymentCoordinator, DeploymentReport, NodeOutcome, NodeStatus,
};
pub use params::{ProvisionParams, ProvisionRequest, TargetNodeList};
pub use validator::validate_params;

use tracing::debug;

use crate::document::{CacheDocument, ConfigurationFileParser};
use crate::error::Result;

/// Validates parameters and builds the validated cache document.
///
/// Nothing here touches the network.
pub fn prepare(
    params: ProvisionParams,
    parser: &dyn ConfigurationFileParser,
) -> Result<(ProvisionRequest, CacheDocument)> {
    let request = validate_params(params)?;
    let document = build_document(&request, parser)?;
    document.validate()?;

    debug!(
        cache = %document.name,
        topology = %document.topology.kind,
        servers = %request.targets,
        "Cache document ready"
    );

    Ok((request, document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{TopologyKind, YamlFileParser};
    use crate::error::ProvisionError;

    #[test]
    fn test_prepare_local() {
        let params = ProvisionParams {
            cache_id: "c1".to_string(),
            servers: "10.0.0.1".to_string(),
            cache_size: Some(1024),
            ..Default::default()
        };

        let (request, document) = prepare(params, &YamlFileParser).unwrap();
        assert_eq!(request.topology, TopologyKind::Local);
        assert_eq!(document.name, "c1");
        assert!(document.topology.cluster_settings.is_none());
    }

    #[test]
    fn test_prepare_rejects_separator_only_servers() {
        let params = ProvisionParams {
            cache_id: "c1".to_string(),
            servers: ",".to_string(),
            ..Default::default()
        };

        let err = prepare(params, &YamlFileParser).unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::InvalidArgument);
        assert!(err.to_string().contains("Server IP not specified"));
    }

    #[test]
    fn test_prepare_rejects_bad_ratio() {
        let params = ProvisionParams {
            cache_id: "c1".to_string(),
            servers: "10.0.0.1".to_string(),
            topology: "local".to_string(),
            ratio: Some(150.0),
            ..Default::default()
        };

        let err = prepare(params, &YamlFileParser).unwrap_err();
        assert!(matches!(err, ProvisionError::InvalidConfiguration { .. }));
    }
}
