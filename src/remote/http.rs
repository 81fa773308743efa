//! HTTP management client.
//!
//! Talks to the management service of a server node over its JSON API.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::{DeserializeOwned, IgnoredAny};
use std::time::Duration;
use tracing::{debug, info};

use super::node::{NodeConnector, NodeSession};
use super::wire::{ApiResponse, ClientServerListRequest, HealthData, HealthStatus, RegisterRequest};
use crate::config::ManagementConfig;
use crate::document::CacheDocument;
use crate::error::{ProvisionError, Result};

/// Opens HTTP sessions to management nodes.
#[derive(Debug, Clone)]
pub struct HttpNodeConnector {
    config: ManagementConfig,
}

impl HttpNodeConnector {
    /// Creates a connector from management settings.
    pub fn new(config: ManagementConfig) -> Self {
        Self { config }
    }

    /// Returns the base URL for a node address.
    ///
    /// Full URLs are used as given. Addresses without a port get the
    /// configured management port; bare IPv6 addresses are bracketed.
    pub fn base_url(&self, address: &str) -> String {
        let address = address.trim().trim_end_matches('/');

        if address.starts_with("http://") || address.starts_with("https://") {
            return address.to_string();
        }

        let scheme = self.config.scheme.as_str();
        if has_port(address) {
            format!("{}://{}", scheme, address)
        } else if address.contains(':') && !address.starts_with('[') {
            format!("{}://[{}]:{}", scheme, address, self.config.port)
        } else {
            format!("{}://{}:{}", scheme, address, self.config.port)
        }
    }
}

fn has_port(address: &str) -> bool {
    match address.rsplit_once(':') {
        Some((host, port)) => {
            port.parse::<u16>().is_ok() && (!host.contains(':') || host.ends_with(']'))
        }
        None => false,
    }
}

#[async_trait]
impl NodeConnector for HttpNodeConnector {
    async fn connect(&self, address: &str, timeout: Duration) -> Result<Box<dyn NodeSession>> {
        let mut builder = Client::builder().connect_timeout(timeout);
        if let Some(request_timeout) = self.config.request_timeout() {
            builder = builder.timeout(request_timeout);
        }
        let client = builder.build().map_err(|e| {
            ProvisionError::connection_with_source(
                format!("{} (failed to create HTTP client)", address),
                e,
            )
        })?;

        let base_url = self.base_url(address);
        let base = Url::parse(&base_url).map_err(|e| {
            ProvisionError::invalid_argument(format!(
                "Invalid server address '{}': {}",
                address, e
            ))
        })?;

        let session = HttpNodeSession {
            client,
            base,
            address: address.to_string(),
            request_timeout: self.config.request_timeout(),
        };

        debug!(address = %address, url = %base_url, "Connecting to management node");

        let health = match tokio::time::timeout(timeout, session.health()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(ProvisionError::Timeout {
                    operation: format!("connect to {}", address),
                    seconds: timeout.as_secs(),
                })
            }
        };

        if health.status == HealthStatus::Unhealthy {
            return Err(ProvisionError::connection(format!(
                "{} (node reports unhealthy)",
                address
            )));
        }

        info!(
            address = %address,
            version = %health.version,
            "Connected to management node"
        );

        Ok(Box::new(session))
    }
}

/// HTTP session with one management node.
#[derive(Debug, Clone)]
pub struct HttpNodeSession {
    /// HTTP client.
    client: Client,
    /// Base URL of the node.
    base: Url,
    /// Address as given by the caller.
    address: String,
    /// Per-request timeout, for error reporting.
    request_timeout: Option<Duration>,
}

impl HttpNodeSession {
    /// Builds an endpoint URL from path segments.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ProvisionError::invalid_argument(format!(
                    "Server address '{}' cannot be used as a base URL",
                    self.address
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Probes the node's health endpoint.
    async fn health(&self) -> Result<HealthData> {
        let url = self.url(&["api", "v1", "health"])?;
        let response: ApiResponse<HealthData> = self.send(self.client.get(url), "health").await?;

        self.check(response, "")?
            .ok_or_else(|| ProvisionError::remote("Health response missing data"))
    }

    /// Sends a request and decodes the response envelope.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &str,
    ) -> Result<ApiResponse<T>> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ProvisionError::Timeout {
                    operation: format!("{} on {}", operation, self.address),
                    seconds: self.request_timeout.map(|t| t.as_secs()).unwrap_or_default(),
                }
            } else {
                ProvisionError::connection_with_source(&self.address, e)
            }
        })?;

        let status = response.status();
        response.json::<ApiResponse<T>>().await.map_err(|e| {
            ProvisionError::remote_with_source(
                format!("Failed to parse {} response (HTTP {})", operation, status),
                e,
            )
        })
    }

    /// Converts a response envelope into its data or an error.
    fn check<T>(&self, response: ApiResponse<T>, cache: &str) -> Result<Option<T>> {
        if response.success {
            Ok(response.data)
        } else {
            match response.error {
                Some(err) => Err(err.into_error(cache, &self.address)),
                None => Err(ProvisionError::remote(format!(
                    "Unknown error from {}",
                    self.address
                ))),
            }
        }
    }
}

#[async_trait]
impl NodeSession for HttpNodeSession {
    fn address(&self) -> &str {
        &self.address
    }

    async fn get_configuration(&self, name: &str) -> Result<Option<CacheDocument>> {
        let url = self.url(&["api", "v1", "caches", name, "config"])?;
        debug!(url = %url, cache = %name, "Fetching existing configuration");

        let response: ApiResponse<CacheDocument> =
            self.send(self.client.get(url), "get configuration").await?;
        self.check(response, name)
    }

    async fn register(
        &self,
        name: &str,
        document: &CacheDocument,
        token: &str,
        overwrite: bool,
        hot_apply: bool,
    ) -> Result<()> {
        let url = self.url(&["api", "v1", "caches", name])?;
        let request = RegisterRequest {
            config: document.clone(),
            token: token.to_string(),
            overwrite,
            hot_apply,
        };

        info!(
            url = %url,
            cache = %name,
            overwrite = overwrite,
            hot_apply = hot_apply,
            "Registering cache"
        );

        let response: ApiResponse<IgnoredAny> = self
            .send(self.client.post(url).json(&request), "register")
            .await?;
        self.check(response, name).map(|_| ())
    }

    async fn update_client_server_list(
        &self,
        name: &str,
        servers: &[String],
        provider_id: &str,
    ) -> Result<()> {
        let url = self.url(&["api", "v1", "caches", name, "client-servers"])?;
        let request = ClientServerListRequest {
            servers: servers.to_vec(),
            provider_id: provider_id.to_string(),
        };

        debug!(url = %url, cache = %name, servers = servers.len(), "Updating client/server list");

        let response: ApiResponse<IgnoredAny> = self
            .send(self.client.put(url).json(&request), "update client/server list")
            .await?;
        self.check(response, name).map(|_| ())
    }

    async fn dispose(&self) {
        debug!(address = %self.address, "Releasing management session");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Scheme;

    fn connector() -> HttpNodeConnector {
        HttpNodeConnector::new(ManagementConfig::default())
    }

    #[test]
    fn test_base_url_adds_default_port() {
        assert_eq!(connector().base_url("10.0.0.1"), "http://10.0.0.1:8250");
        assert_eq!(connector().base_url("cache-1.local"), "http://cache-1.local:8250");
    }

    #[test]
    fn test_base_url_keeps_explicit_port() {
        assert_eq!(connector().base_url("10.0.0.1:9000"), "http://10.0.0.1:9000");
        assert_eq!(connector().base_url("[::1]:9000"), "http://[::1]:9000");
    }

    #[test]
    fn test_base_url_ipv6() {
        assert_eq!(connector().base_url("::1"), "http://[::1]:8250");
        assert_eq!(connector().base_url("[fe80::1]"), "http://[fe80::1]:8250");
    }

    #[test]
    fn test_base_url_full_url() {
        assert_eq!(
            connector().base_url("https://node.example/"),
            "https://node.example"
        );
    }

    #[test]
    fn test_base_url_scheme() {
        let connector = HttpNodeConnector::new(ManagementConfig {
            scheme: Scheme::Https,
            port: 9443,
            ..Default::default()
        });
        assert_eq!(connector.base_url("10.0.0.1"), "https://10.0.0.1:9443");
    }
}
