//! Management node traits.
//!
//! These traits are the seam between the deployment coordinator and the
//! transport used to reach each server node. A connector opens one session
//! per node; the coordinator drives the session and disposes of it before
//! moving on.

use async_trait::async_trait;
use std::time::Duration;

use crate::document::CacheDocument;
use crate::error::Result;

/// Opens management sessions to server nodes.
#[async_trait]
pub trait NodeConnector: Send + Sync {
    /// Connects to the node at `address`, giving up after `timeout`.
    async fn connect(&self, address: &str, timeout: Duration) -> Result<Box<dyn NodeSession>>;
}

/// A management session with one server node.
#[async_trait]
pub trait NodeSession: Send + Sync {
    /// Returns the node address this session was opened for.
    fn address(&self) -> &str;

    /// Fetches the configuration registered under `name`, if any.
    async fn get_configuration(&self, name: &str) -> Result<Option<CacheDocument>>;

    /// Registers `document` under `name`.
    async fn register(
        &self,
        name: &str,
        document: &CacheDocument,
        token: &str,
        overwrite: bool,
        hot_apply: bool,
    ) -> Result<()>;

    /// Replaces the client/server list of cache `name`.
    async fn update_client_server_list(
        &self,
        name: &str,
        servers: &[String],
        provider_id: &str,
    ) -> Result<()>;

    /// Releases the session. Failures are not reported.
    async fn dispose(&self);
}
