//! Tests for the deployment coordinator.

#[cfg(test)]
mod tests {
    use crate::config::MergeMode;
    use crate::document::{
        CacheDocument, Cleanup, Deployment, EvictionPolicy, LogSettings, PerfCounters, Storage,
        Topology, TopologyKind,
    };
    use crate::error::{ErrorCode, ProvisionError, Result};
    use crate::provision::coordinator::{
        DeployOptions, DeploymentCoordinator, NodeStatus,
    };
    use crate::provision::params::TargetNodeList;
    use crate::remote::{MappingSynchronizer, NodeConnector, NodeSession};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Behavior of one fake node.
    #[derive(Default)]
    struct FakeNode {
        caches: HashMap<String, CacheDocument>,
        client_servers: HashMap<String, (Vec<String>, String)>,
        fail_connect: bool,
        hang_connect: bool,
        fail_register: bool,
    }

    #[derive(Default)]
    struct ClusterState {
        nodes: HashMap<String, FakeNode>,
        calls: Vec<String>,
    }

    /// In-memory cluster of management nodes.
    #[derive(Clone, Default)]
    struct FakeCluster {
        state: Arc<Mutex<ClusterState>>,
    }

    impl FakeCluster {
        fn with_nodes(addresses: &[&str]) -> Self {
            let cluster = Self::default();
            {
                let mut state = cluster.state.lock().unwrap();
                for address in addresses {
                    state.nodes.insert(address.to_string(), FakeNode::default());
                }
            }
            cluster
        }

        fn node<R>(&self, address: &str, f: impl FnOnce(&mut FakeNode) -> R) -> R {
            let mut state = self.state.lock().unwrap();
            f(state.nodes.get_mut(address).expect("unknown node"))
        }

        fn calls(&self) -> Vec<String> {
            self.state.lock().unwrap().calls.clone()
        }

        fn record(&self, call: String) {
            self.state.lock().unwrap().calls.push(call);
        }

        fn stored(&self, address: &str, cache: &str) -> Option<CacheDocument> {
            self.node(address, |n| n.caches.get(cache).cloned())
        }
    }

    #[async_trait]
    impl NodeConnector for FakeCluster {
        async fn connect(&self, address: &str, _timeout: Duration) -> Result<Box<dyn NodeSession>> {
            self.record(format!("connect:{}", address));
            let (fail, hang) = self.node(address, |n| (n.fail_connect, n.hang_connect));

            if hang {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            if fail {
                return Err(ProvisionError::connection(address));
            }

            Ok(Box::new(FakeSession {
                cluster: self.clone(),
                address: address.to_string(),
            }))
        }
    }

    struct FakeSession {
        cluster: FakeCluster,
        address: String,
    }

    #[async_trait]
    impl NodeSession for FakeSession {
        fn address(&self) -> &str {
            &self.address
        }

        async fn get_configuration(&self, name: &str) -> Result<Option<CacheDocument>> {
            self.cluster.record(format!("get:{}", self.address));
            Ok(self.cluster.stored(&self.address, name))
        }

        async fn register(
            &self,
            name: &str,
            document: &CacheDocument,
            _token: &str,
            overwrite: bool,
            _hot_apply: bool,
        ) -> Result<()> {
            self.cluster.record(format!("register:{}", self.address));
            self.cluster.node(&self.address, |node| {
                if node.fail_register {
                    return Err(ProvisionError::remote("registration rejected"));
                }
                if node.caches.contains_key(name) && !overwrite {
                    return Err(ProvisionError::AlreadyExists {
                        cache: name.to_string(),
                        server: self.address.clone(),
                    });
                }
                node.caches.insert(name.to_string(), document.clone());
                Ok(())
            })
        }

        async fn update_client_server_list(
            &self,
            name: &str,
            servers: &[String],
            provider_id: &str,
        ) -> Result<()> {
            self.cluster.record(format!("update:{}", self.address));
            self.cluster.node(&self.address, |node| {
                node.client_servers.insert(
                    name.to_string(),
                    (servers.to_vec(), provider_id.to_string()),
                );
            });
            Ok(())
        }

        async fn dispose(&self) {
            self.cluster.record(format!("dispose:{}", self.address));
        }
    }

    /// Mapping synchronizer recording every call.
    #[derive(Default)]
    struct RecordingSync {
        calls: Mutex<Vec<(String, Vec<String>)>>,
        fail: bool,
    }

    #[async_trait]
    impl MappingSynchronizer for RecordingSync {
        async fn update_server_mapping(&self, cache: &str, addresses: &[String]) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push((cache.to_string(), addresses.to_vec()));
            if self.fail {
                return Err(ProvisionError::mapping("record is read-only"));
            }
            Ok(())
        }
    }

    fn options(overwrite: bool) -> DeployOptions {
        DeployOptions {
            connect_timeout: Duration::from_secs(5),
            overwrite,
            hot_apply: false,
            provider_id: "CACHE".to_string(),
            token: String::new(),
            merge_mode: MergeMode::Isolated,
        }
    }

    fn document(client_nodes: &[&str]) -> CacheDocument {
        CacheDocument {
            name: "c1".to_string(),
            in_proc: false,
            storage: Storage::heap(1024),
            eviction_policy: EvictionPolicy::default(),
            cleanup: Cleanup::default(),
            log: LogSettings::default(),
            perf_counters: PerfCounters::default(),
            topology: Topology::clustered(TopologyKind::Partitioned, 7800),
            deployment: Deployment {
                servers: vec![],
                client_nodes: client_nodes.iter().map(|s| s.to_string()).collect(),
            },
        }
    }

    fn targets(list: &str) -> TargetNodeList {
        TargetNodeList::parse(list)
    }

    #[tokio::test]
    async fn test_deploys_to_every_node_in_order() {
        let cluster = FakeCluster::with_nodes(&["A", "B"]);
        let sync = RecordingSync::default();
        let coordinator = DeploymentCoordinator::new(&cluster, &sync, options(false));

        let report = coordinator
            .deploy(&document(&[]), &targets("A,B"))
            .await
            .unwrap();

        assert_eq!(report.cache, "c1");
        assert_eq!(report.accepted(), vec!["A", "B"]);
        assert!(report
            .outcomes
            .iter()
            .all(|o| o.status == NodeStatus::Accepted));

        assert_eq!(
            cluster.calls(),
            vec![
                "connect:A", "get:A", "register:A", "update:A", "dispose:A",
                "connect:B", "get:B", "register:B", "update:B", "dispose:B",
            ]
        );

        let (servers, provider) = cluster.node("B", |n| n.client_servers["c1"].clone());
        assert_eq!(servers, vec!["A", "B"]);
        assert_eq!(provider, "CACHE");

        let calls = sync.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], ("c1".to_string(), vec!["A".to_string(), "B".to_string()]));
    }

    #[tokio::test]
    async fn test_second_registration_without_overwrite_fails() {
        let cluster = FakeCluster::with_nodes(&["A"]);
        let sync = RecordingSync::default();
        let coordinator = DeploymentCoordinator::new(&cluster, &sync, options(false));

        coordinator
            .deploy(&document(&[]), &targets("A"))
            .await
            .unwrap();
        let err = coordinator
            .deploy(&document(&[]), &targets("A"))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::AlreadyExists);
        assert!(matches!(err.root(), ProvisionError::AlreadyExists { .. }));
        assert_eq!(sync.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_overwrite_merges_prior_client_nodes() {
        let cluster = FakeCluster::with_nodes(&["A"]);
        let sync = RecordingSync::default();

        DeploymentCoordinator::new(&cluster, &sync, options(true))
            .deploy(&document(&["web-1"]), &targets("A"))
            .await
            .unwrap();
        DeploymentCoordinator::new(&cluster, &sync, options(true))
            .deploy(&document(&["web-2"]), &targets("A"))
            .await
            .unwrap();

        let stored = cluster.stored("A", "c1").unwrap();
        assert_eq!(stored.deployment.client_nodes, vec!["web-1", "web-2"]);
        assert_eq!(sync.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failure_stops_the_run() {
        let cluster = FakeCluster::with_nodes(&["A", "B", "C"]);
        cluster.node("B", |n| n.fail_register = true);
        let sync = RecordingSync::default();
        let coordinator = DeploymentCoordinator::new(&cluster, &sync, options(false));

        let err = coordinator
            .deploy(&document(&[]), &targets("A,B,C"))
            .await
            .unwrap_err();

        match &err {
            ProvisionError::Deployment {
                server, accepted, ..
            } => {
                assert_eq!(server, "B");
                assert_eq!(accepted, &vec!["A".to_string()]);
            }
            other => panic!("Expected Deployment error, got {:?}", other),
        }
        assert!(err.to_string().contains("Failed to create cache on server 'B'"));
        assert!(err.to_string().contains("registration rejected"));

        let calls = cluster.calls();
        assert!(calls.contains(&"register:A".to_string()));
        assert!(calls.contains(&"dispose:B".to_string()));
        assert!(!calls.iter().any(|c| c.ends_with(":C")));
        assert!(cluster.stored("A", "c1").is_some());
        assert!(sync.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_existing_cache_fails_before_next_server() {
        let cluster = FakeCluster::with_nodes(&["10.0.0.1", "10.0.0.2"]);
        cluster.node("10.0.0.1", |n| {
            n.caches.insert("c1".to_string(), document(&[]));
        });
        let sync = RecordingSync::default();
        let coordinator = DeploymentCoordinator::new(&cluster, &sync, options(false));

        let err = coordinator
            .deploy(&document(&[]), &targets("10.0.0.1,10.0.0.2"))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::AlreadyExists);
        let calls = cluster.calls();
        assert_eq!(
            calls,
            vec!["connect:10.0.0.1", "get:10.0.0.1", "dispose:10.0.0.1"]
        );
        assert!(sync.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_targets_are_contacted_independently() {
        let cluster = FakeCluster::with_nodes(&["A"]);
        let sync = RecordingSync::default();
        let coordinator = DeploymentCoordinator::new(&cluster, &sync, options(false));

        let err = coordinator
            .deploy(&document(&[]), &targets("A,A"))
            .await
            .unwrap_err();

        match err {
            ProvisionError::Deployment { accepted, .. } => assert_eq!(accepted, vec!["A"]),
            other => panic!("Expected Deployment error, got {:?}", other),
        }
        assert_eq!(
            cluster.calls().iter().filter(|c| *c == "connect:A").count(),
            2
        );
    }

    #[tokio::test]
    async fn test_connect_failure_aborts() {
        let cluster = FakeCluster::with_nodes(&["A", "B"]);
        cluster.node("A", |n| n.fail_connect = true);
        let sync = RecordingSync::default();
        let coordinator = DeploymentCoordinator::new(&cluster, &sync, options(false));

        let err = coordinator
            .deploy(&document(&[]), &targets("A,B"))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::ConnectionError);
        assert_eq!(cluster.calls(), vec!["connect:A"]);
    }

    #[tokio::test]
    async fn test_connect_timeout_is_bounded() {
        let cluster = FakeCluster::with_nodes(&["A"]);
        cluster.node("A", |n| n.hang_connect = true);
        let sync = RecordingSync::default();
        let mut opts = options(false);
        opts.connect_timeout = Duration::from_millis(50);
        let coordinator = DeploymentCoordinator::new(&cluster, &sync, opts);

        let err = coordinator
            .deploy(&document(&[]), &targets("A"))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::Timeout);
    }

    #[tokio::test]
    async fn test_isolated_merge_does_not_leak_between_nodes() {
        let cluster = FakeCluster::with_nodes(&["A", "B"]);
        cluster.node("A", |n| {
            n.caches.insert("c1".to_string(), document(&["x"]));
        });
        cluster.node("B", |n| {
            n.caches.insert("c1".to_string(), document(&["y"]));
        });
        let sync = RecordingSync::default();
        let coordinator = DeploymentCoordinator::new(&cluster, &sync, options(true));

        coordinator
            .deploy(&document(&[]), &targets("A,B"))
            .await
            .unwrap();

        assert_eq!(
            cluster.stored("A", "c1").unwrap().deployment.client_nodes,
            vec!["x"]
        );
        assert_eq!(
            cluster.stored("B", "c1").unwrap().deployment.client_nodes,
            vec!["y"]
        );
    }

    #[tokio::test]
    async fn test_carry_merge_accumulates_across_nodes() {
        let cluster = FakeCluster::with_nodes(&["A", "B"]);
        cluster.node("A", |n| {
            n.caches.insert("c1".to_string(), document(&["x"]));
        });
        cluster.node("B", |n| {
            n.caches.insert("c1".to_string(), document(&["y"]));
        });
        let sync = RecordingSync::default();
        let mut opts = options(true);
        opts.merge_mode = MergeMode::Carry;
        let coordinator = DeploymentCoordinator::new(&cluster, &sync, opts);

        coordinator
            .deploy(&document(&[]), &targets("A,B"))
            .await
            .unwrap();

        assert_eq!(
            cluster.stored("B", "c1").unwrap().deployment.client_nodes,
            vec!["y", "x"]
        );
    }

    #[tokio::test]
    async fn test_mapping_failure_after_all_nodes() {
        let cluster = FakeCluster::with_nodes(&["A", "B"]);
        let sync = RecordingSync {
            fail: true,
            ..Default::default()
        };
        let coordinator = DeploymentCoordinator::new(&cluster, &sync, options(false));

        let err = coordinator
            .deploy(&document(&[]), &targets("A,B"))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::MappingError);
        assert!(cluster.stored("A", "c1").is_some());
        assert!(cluster.stored("B", "c1").is_some());
    }

    #[tokio::test]
    async fn test_empty_target_list_rejected() {
        let cluster = FakeCluster::default();
        let sync = RecordingSync::default();
        let coordinator = DeploymentCoordinator::new(&cluster, &sync, options(false));

        let err = coordinator
            .deploy(&document(&[]), &TargetNodeList::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ProvisionError::InvalidArgument { .. }));
        assert!(cluster.calls().is_empty());
    }
}
