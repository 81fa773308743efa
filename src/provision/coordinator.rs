//! Deployment coordination.
//!
//! The coordinator walks the target list in order and registers the cache
//! on each node. The first failure aborts the run: later nodes are never
//! contacted and nothing is rolled back. The mapping synchronizer runs once,
//! after every node has accepted the cache.

use std::time::Duration;
use tracing::{debug, error, info};

use super::params::{ProvisionRequest, TargetNodeList};
use crate::config::{Config, MergeMode};
use crate::document::CacheDocument;
use crate::error::{ProvisionError, Result};
use crate::remote::{MappingSynchronizer, NodeConnector, NodeSession};

/// Per-run deployment options.
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Bound on connecting to each node.
    pub connect_timeout: Duration,
    /// Replace existing caches of the same name.
    pub overwrite: bool,
    /// Apply the configuration without restarting nodes.
    pub hot_apply: bool,
    /// Provider identifier for client/server list updates.
    pub provider_id: String,
    /// Token sent with registrations.
    pub token: String,
    /// Client-node merge behavior on overwrite.
    pub merge_mode: MergeMode,
}

impl DeployOptions {
    /// Combines tool configuration with the flags of a request.
    pub fn new(config: &Config, request: &ProvisionRequest) -> Self {
        Self {
            connect_timeout: config.management.connect_timeout(),
            overwrite: request.params.overwrite,
            hot_apply: request.params.hot_apply,
            provider_id: config.deployment.provider_id.clone(),
            token: config.deployment.token.clone(),
            merge_mode: config.deployment.merge_mode,
        }
    }
}

/// Status of one target node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeStatus {
    /// Not contacted (yet).
    Pending,
    /// The node registered the cache.
    Accepted,
    /// The node failed; the run stopped here.
    Rejected { reason: String },
}

/// Outcome slot of one target node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeOutcome {
    pub address: String,
    pub status: NodeStatus,
}

/// Outcome of a deployment run, one slot per target in list order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentReport {
    pub cache: String,
    pub outcomes: Vec<NodeOutcome>,
}

impl DeploymentReport {
    fn new(cache: &str, targets: &TargetNodeList) -> Self {
        Self {
            cache: cache.to_string(),
            outcomes: targets
                .iter()
                .map(|address| NodeOutcome {
                    address: address.clone(),
                    status: NodeStatus::Pending,
                })
                .collect(),
        }
    }

    /// Returns the addresses of accepting nodes, in list order.
    pub fn accepted(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|o| o.status == NodeStatus::Accepted)
            .map(|o| o.address.clone())
            .collect()
    }
}

/// Deploys a cache document to a list of nodes.
pub struct DeploymentCoordinator<'a> {
    connector: &'a dyn NodeConnector,
    synchronizer: &'a dyn MappingSynchronizer,
    options: DeployOptions,
}

impl<'a> DeploymentCoordinator<'a> {
    /// Creates a coordinator.
    pub fn new(
        connector: &'a dyn NodeConnector,
        synchronizer: &'a dyn MappingSynchronizer,
        options: DeployOptions,
    ) -> Self {
        Self {
            connector,
            synchronizer,
            options,
        }
    }

    /// Deploys `base` to every node in `targets`, then publishes the mapping.
    ///
    /// Returns the report of a fully successful run. On failure the error
    /// names the failing node and wraps its cause.
    pub async fn deploy(
        &self,
        base: &CacheDocument,
        targets: &TargetNodeList,
    ) -> Result<DeploymentReport> {
        if targets.is_empty() {
            return Err(ProvisionError::invalid_argument("Server IP not specified"));
        }

        let mut report = DeploymentReport::new(&base.name, targets);
        // Only used in carry mode: the document registered on the previous node.
        let mut carried: Option<CacheDocument> = None;

        for (index, address) in targets.iter().enumerate() {
            let node_base = match (self.options.merge_mode, &carried) {
                (MergeMode::Carry, Some(previous)) => previous,
                _ => base,
            };

            info!(cache = %base.name, server = %address, "Creating cache");

            match self.deploy_node(node_base, address, targets).await {
                Ok(registered) => {
                    report.outcomes[index].status = NodeStatus::Accepted;
                    info!(cache = %base.name, server = %address, "Cache successfully created");
                    if self.options.merge_mode == MergeMode::Carry {
                        carried = Some(registered);
                    }
                }
                Err(e) => {
                    report.outcomes[index].status = NodeStatus::Rejected {
                        reason: e.to_string(),
                    };
                    error!(
                        cache = %base.name,
                        server = %address,
                        error = %e,
                        "Failed to create cache"
                    );
                    debug!(outcomes = ?report.outcomes, "Deployment aborted");

                    return Err(ProvisionError::Deployment {
                        server: address.clone(),
                        accepted: report.accepted(),
                        source: Box::new(e),
                    });
                }
            }
        }

        self.synchronizer
            .update_server_mapping(&base.name, &report.accepted())
            .await?;

        Ok(report)
    }

    /// Runs the whole node sequence and always releases the session.
    async fn deploy_node(
        &self,
        base: &CacheDocument,
        address: &str,
        targets: &TargetNodeList,
    ) -> Result<CacheDocument> {
        let session = self.connect(address).await?;
        let result = self.provision(session.as_ref(), base, targets).await;
        session.dispose().await;
        result
    }

    async fn connect(&self, address: &str) -> Result<Box<dyn NodeSession>> {
        let timeout = self.options.connect_timeout;
        match tokio::time::timeout(timeout, self.connector.connect(address, timeout)).await {
            Ok(result) => result,
            Err(_) => Err(ProvisionError::Timeout {
                operation: format!("connect to {}", address),
                seconds: timeout.as_secs(),
            }),
        }
    }

    /// Reconciles with the node's existing configuration, registers the
    /// document and pushes the client/server list. Returns the document as
    /// registered on the node.
    async fn provision(
        &self,
        session: &dyn NodeSession,
        base: &CacheDocument,
        targets: &TargetNodeList,
    ) -> Result<CacheDocument> {
        let mut document = base.clone();

        if let Some(existing) = session.get_configuration(&document.name).await? {
            if !self.options.overwrite {
                return Err(ProvisionError::AlreadyExists {
                    cache: document.name.clone(),
                    server: session.address().to_string(),
                });
            }

            debug!(
                cache = %document.name,
                server = %session.address(),
                prior_clients = existing.deployment.client_nodes.len(),
                "Overwriting existing cache, merging client nodes"
            );
            document
                .deployment
                .merge_client_nodes(&existing.deployment.client_nodes);
        }

        session
            .register(
                &document.name,
                &document,
                &self.options.token,
                self.options.overwrite,
                self.options.hot_apply,
            )
            .await?;

        session
            .update_client_server_list(
                &document.name,
                targets.as_slice(),
                &self.options.provider_id,
            )
            .await?;

        Ok(document)
    }
}
