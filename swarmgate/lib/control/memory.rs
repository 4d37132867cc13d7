use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ControlPlane, ListFilter};
use crate::{
    config::DEFAULT_CLUSTER_NAME,
    models::{
        Cluster, ClusterSpec, Entity, EntityKind, Meta, Network, NetworkSpec, Node, NodeSpec,
        NodeStatus, Service, ServiceSpec, Task, TaskState, TaskStatus, Version,
    },
    SwarmgateError, SwarmgateResult,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// An embedded control plane keeping every entity in memory.
///
/// It enforces what the gateway relies on from a real control plane: opaque IDs, version stamps
/// checked on every update, unique service and network names, and refusal to remove a network
/// that is still in use. It does not schedule anything; tasks only exist when inserted
/// explicitly.
#[derive(Debug)]
pub struct MemoryControlPlane {
    store: RwLock<Store>,
}

#[derive(Debug, Default)]
struct Store {
    services: BTreeMap<String, Service>,
    nodes: BTreeMap<String, Node>,
    networks: BTreeMap<String, Network>,
    clusters: BTreeMap<String, Cluster>,
    tasks: BTreeMap<String, Task>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl MemoryControlPlane {
    /// Creates a control plane holding a single cluster with the default settings.
    pub fn new() -> Self {
        let cluster = Cluster {
            id: generate_id(),
            meta: Meta::created_now(),
            spec: ClusterSpec::with_defaults(DEFAULT_CLUSTER_NAME),
        };

        let mut store = Store::default();
        store.clusters.insert(cluster.id.clone(), cluster);

        Self {
            store: RwLock::new(store),
        }
    }

    /// Registers a node, as if it had joined the cluster.
    pub async fn insert_node(&self, spec: NodeSpec, status: NodeStatus) -> Node {
        let node = Node {
            id: generate_id(),
            meta: Meta::created_now(),
            spec,
            status,
        };

        tracing::debug!(id = %node.id, name = %node.spec.annotations.name, "node registered");
        self.store
            .write()
            .await
            .nodes
            .insert(node.id.clone(), node.clone());

        node
    }

    /// Records a task of an existing service, as an orchestrator would.
    pub async fn insert_task(
        &self,
        service_id: &str,
        node_id: Option<&str>,
        slot: u64,
        desired_state: TaskState,
        state: TaskState,
    ) -> SwarmgateResult<Task> {
        let mut store = self.store.write().await;
        if !store.services.contains_key(service_id) {
            return Err(not_found(EntityKind::Service, service_id));
        }

        if let Some(node_id) = node_id {
            if !store.nodes.contains_key(node_id) {
                return Err(not_found(EntityKind::Node, node_id));
            }
        }

        let task = Task {
            id: generate_id(),
            meta: Meta::created_now(),
            service_id: service_id.to_string(),
            node_id: node_id.map(str::to_string),
            slot,
            desired_state,
            status: TaskStatus {
                state,
                message: format!("{:?}", state).to_lowercase(),
                timestamp: Utc::now(),
            },
        };

        store.tasks.insert(task.id.clone(), task.clone());
        Ok(task)
    }
}

impl Store {
    fn service_name_taken(&self, name: &str, except: Option<&str>) -> bool {
        self.services
            .values()
            .any(|s| s.name() == name && Some(s.id()) != except)
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn not_found(kind: EntityKind, id: &str) -> SwarmgateError {
    SwarmgateError::NotFound {
        kind,
        identifier: id.to_string(),
    }
}

fn get_cloned<E: Entity + Clone>(map: &BTreeMap<String, E>, id: &str) -> SwarmgateResult<E> {
    map.get(id).cloned().ok_or_else(|| not_found(E::KIND, id))
}

/// Lists the entities passing `keep`, oldest first.
fn list_sorted<E: Entity + Clone>(
    map: &BTreeMap<String, E>,
    keep: impl Fn(&E) -> bool,
) -> Vec<E> {
    let mut entities: Vec<E> = map.values().filter(|e| keep(*e)).cloned().collect();
    entities.sort_by(|a, b| {
        a.meta()
            .get_created_at()
            .cmp(b.meta().get_created_at())
            .then_with(|| a.id().cmp(b.id()))
    });
    entities
}

/// Checks the version stamp of an update and returns the stored entity to replace.
fn check_version<'a, E: Entity>(
    map: &'a mut BTreeMap<String, E>,
    id: &str,
    version: Version,
) -> SwarmgateResult<&'a mut E> {
    let entity = map.get_mut(id).ok_or_else(|| not_found(E::KIND, id))?;
    let current = *entity.meta().get_version();
    if current != version {
        return Err(SwarmgateError::Conflict {
            kind: E::KIND,
            id: id.to_string(),
            expected: version.index,
            current: current.index,
        });
    }

    Ok(entity)
}

fn remove<E: Entity>(map: &mut BTreeMap<String, E>, id: &str) -> SwarmgateResult<E> {
    map.remove(id).ok_or_else(|| not_found(E::KIND, id))
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for MemoryControlPlane {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ControlPlane for MemoryControlPlane {
    async fn get_service(&self, id: &str) -> SwarmgateResult<Service> {
        get_cloned(&self.store.read().await.services, id)
    }

    async fn list_services(&self, filter: &ListFilter) -> SwarmgateResult<Vec<Service>> {
        let store = self.store.read().await;
        Ok(list_sorted(&store.services, |s| filter.matches_name(s.name())))
    }

    async fn create_service(&self, spec: ServiceSpec) -> SwarmgateResult<Service> {
        if spec.annotations.name.is_empty() {
            return Err(SwarmgateError::InvalidArgument(
                "service name must be provided".to_string(),
            ));
        }

        if spec.task.container.image.is_empty() {
            return Err(SwarmgateError::InvalidArgument(
                "image reference must be provided".to_string(),
            ));
        }

        let mut store = self.store.write().await;
        if store.service_name_taken(&spec.annotations.name, None) {
            return Err(SwarmgateError::AlreadyExists {
                kind: EntityKind::Service,
                name: spec.annotations.name,
            });
        }

        let service = Service {
            id: generate_id(),
            meta: Meta::created_now(),
            spec,
        };

        store.services.insert(service.id.clone(), service.clone());
        Ok(service)
    }

    async fn update_service(
        &self,
        id: &str,
        version: Version,
        spec: ServiceSpec,
    ) -> SwarmgateResult<Service> {
        let mut store = self.store.write().await;
        if store.service_name_taken(&spec.annotations.name, Some(id)) {
            return Err(SwarmgateError::AlreadyExists {
                kind: EntityKind::Service,
                name: spec.annotations.name,
            });
        }

        let service = check_version(&mut store.services, id, version)?;
        service.spec = spec;
        service.meta.bump();
        Ok(service.clone())
    }

    async fn remove_service(&self, id: &str) -> SwarmgateResult<()> {
        let mut store = self.store.write().await;
        remove(&mut store.services, id)?;
        store.tasks.retain(|_, task| task.service_id != id);
        Ok(())
    }

    async fn get_node(&self, id: &str) -> SwarmgateResult<Node> {
        get_cloned(&self.store.read().await.nodes, id)
    }

    async fn list_nodes(&self, filter: &ListFilter) -> SwarmgateResult<Vec<Node>> {
        let store = self.store.read().await;
        Ok(list_sorted(&store.nodes, |n| filter.matches_name(n.name())))
    }

    async fn update_node(
        &self,
        id: &str,
        version: Version,
        spec: NodeSpec,
    ) -> SwarmgateResult<Node> {
        let mut store = self.store.write().await;
        let node = check_version(&mut store.nodes, id, version)?;
        node.spec = spec;
        node.meta.bump();
        Ok(node.clone())
    }

    async fn remove_node(&self, id: &str) -> SwarmgateResult<()> {
        let mut store = self.store.write().await;
        remove(&mut store.nodes, id)?;
        for task in store.tasks.values_mut() {
            if task.node_id.as_deref() == Some(id) {
                task.node_id = None;
                task.desired_state = TaskState::Shutdown;
            }
        }

        Ok(())
    }

    async fn get_network(&self, id: &str) -> SwarmgateResult<Network> {
        get_cloned(&self.store.read().await.networks, id)
    }

    async fn list_networks(&self, filter: &ListFilter) -> SwarmgateResult<Vec<Network>> {
        let store = self.store.read().await;
        Ok(list_sorted(&store.networks, |n| filter.matches_name(n.name())))
    }

    async fn create_network(&self, spec: NetworkSpec) -> SwarmgateResult<Network> {
        if spec.annotations.name.is_empty() {
            return Err(SwarmgateError::InvalidArgument(
                "network name must be provided".to_string(),
            ));
        }

        let mut store = self.store.write().await;
        if store
            .networks
            .values()
            .any(|n| n.name() == spec.annotations.name)
        {
            return Err(SwarmgateError::AlreadyExists {
                kind: EntityKind::Network,
                name: spec.annotations.name,
            });
        }

        let network = Network {
            id: generate_id(),
            meta: Meta::created_now(),
            spec,
        };

        store.networks.insert(network.id.clone(), network.clone());
        Ok(network)
    }

    async fn remove_network(&self, id: &str) -> SwarmgateResult<()> {
        let mut store = self.store.write().await;
        if !store.networks.contains_key(id) {
            return Err(not_found(EntityKind::Network, id));
        }

        if let Some(service) = store
            .services
            .values()
            .find(|s| s.spec.networks.iter().any(|n| n.target == id))
        {
            return Err(SwarmgateError::Remote(format!(
                "network {} is in use by service {}",
                id, service.id
            )));
        }

        store.networks.remove(id);
        Ok(())
    }

    async fn get_cluster(&self, id: &str) -> SwarmgateResult<Cluster> {
        get_cloned(&self.store.read().await.clusters, id)
    }

    async fn list_clusters(&self, filter: &ListFilter) -> SwarmgateResult<Vec<Cluster>> {
        let store = self.store.read().await;
        Ok(list_sorted(&store.clusters, |c| filter.matches_name(c.name())))
    }

    async fn update_cluster(
        &self,
        id: &str,
        version: Version,
        spec: ClusterSpec,
    ) -> SwarmgateResult<Cluster> {
        let mut store = self.store.write().await;
        let cluster = check_version(&mut store.clusters, id, version)?;
        cluster.spec = spec;
        cluster.meta.bump();
        Ok(cluster.clone())
    }

    async fn get_task(&self, id: &str) -> SwarmgateResult<Task> {
        get_cloned(&self.store.read().await.tasks, id)
    }

    async fn list_tasks(&self, filter: &ListFilter) -> SwarmgateResult<Vec<Task>> {
        let store = self.store.read().await;
        Ok(list_sorted(&store.tasks, |t| filter.matches_task(t)))
    }

    async fn remove_task(&self, id: &str) -> SwarmgateResult<()> {
        remove(&mut self.store.write().await.tasks, id).map(|_| ())
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
