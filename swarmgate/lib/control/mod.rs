//! The boundary to the orchestration control plane.
//!
//! The gateway talks to the control plane through the [`ControlPlane`] trait, a CRUD surface
//! with one family of calls per entity kind. Every call is bounded by a [`CallContext`] carrying
//! a cancellation token and a deadline. [`resolve`] locates the single entity a client-supplied
//! identifier refers to, and [`MemoryControlPlane`] is an embedded implementation used by the
//! binary and the tests.

mod context;
mod memory;
mod resolve;
mod seed;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use context::*;
pub use memory::*;
pub use resolve::*;
pub use seed::*;

use async_trait::async_trait;
use typed_builder::TypedBuilder;

use crate::{
    models::{
        Cluster, ClusterSpec, Network, NetworkSpec, Node, NodeSpec, Service, ServiceSpec, Task,
        Version,
    },
    SwarmgateResult,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Restricts a list call. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, TypedBuilder)]
pub struct ListFilter {
    /// Exact names to match.
    #[builder(default)]
    pub names: Vec<String>,

    /// Owning services to match, for tasks.
    #[builder(default)]
    pub service_ids: Vec<String>,

    /// Assigned nodes to match, for tasks.
    #[builder(default)]
    pub node_ids: Vec<String>,
}

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// The CRUD surface of the orchestration control plane.
///
/// Getting an unknown ID yields [`SwarmgateError::NotFound`](crate::SwarmgateError::NotFound).
/// Updates carry the version observed at read time and yield
/// [`SwarmgateError::Conflict`](crate::SwarmgateError::Conflict) when it is stale.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Gets a service by ID.
    async fn get_service(&self, id: &str) -> SwarmgateResult<Service>;

    /// Lists services.
    async fn list_services(&self, filter: &ListFilter) -> SwarmgateResult<Vec<Service>>;

    /// Creates a service.
    async fn create_service(&self, spec: ServiceSpec) -> SwarmgateResult<Service>;

    /// Replaces the specification of a service.
    async fn update_service(
        &self,
        id: &str,
        version: Version,
        spec: ServiceSpec,
    ) -> SwarmgateResult<Service>;

    /// Removes a service and its tasks.
    async fn remove_service(&self, id: &str) -> SwarmgateResult<()>;

    /// Gets a node by ID.
    async fn get_node(&self, id: &str) -> SwarmgateResult<Node>;

    /// Lists nodes.
    async fn list_nodes(&self, filter: &ListFilter) -> SwarmgateResult<Vec<Node>>;

    /// Replaces the specification of a node.
    async fn update_node(&self, id: &str, version: Version, spec: NodeSpec)
        -> SwarmgateResult<Node>;

    /// Removes a node from the cluster.
    async fn remove_node(&self, id: &str) -> SwarmgateResult<()>;

    /// Gets a network by ID.
    async fn get_network(&self, id: &str) -> SwarmgateResult<Network>;

    /// Lists networks.
    async fn list_networks(&self, filter: &ListFilter) -> SwarmgateResult<Vec<Network>>;

    /// Creates a network.
    async fn create_network(&self, spec: NetworkSpec) -> SwarmgateResult<Network>;

    /// Removes a network.
    async fn remove_network(&self, id: &str) -> SwarmgateResult<()>;

    /// Gets a cluster by ID.
    async fn get_cluster(&self, id: &str) -> SwarmgateResult<Cluster>;

    /// Lists clusters.
    async fn list_clusters(&self, filter: &ListFilter) -> SwarmgateResult<Vec<Cluster>>;

    /// Replaces the specification of a cluster.
    async fn update_cluster(
        &self,
        id: &str,
        version: Version,
        spec: ClusterSpec,
    ) -> SwarmgateResult<Cluster>;

    /// Gets a task by ID.
    async fn get_task(&self, id: &str) -> SwarmgateResult<Task>;

    /// Lists tasks.
    async fn list_tasks(&self, filter: &ListFilter) -> SwarmgateResult<Vec<Task>>;

    /// Removes a task.
    async fn remove_task(&self, id: &str) -> SwarmgateResult<()>;
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ListFilter {
    /// A filter matching entities named exactly `name`.
    pub fn by_name(name: impl Into<String>) -> Self {
        Self::builder().names(vec![name.into()]).build()
    }

    /// A filter matching the tasks of a service.
    pub fn by_service(service_id: impl Into<String>) -> Self {
        Self::builder().service_ids(vec![service_id.into()]).build()
    }

    /// A filter matching the tasks assigned to a node.
    pub fn by_node(node_id: impl Into<String>) -> Self {
        Self::builder().node_ids(vec![node_id.into()]).build()
    }

    pub(crate) fn matches_name(&self, name: &str) -> bool {
        self.names.is_empty() || self.names.iter().any(|n| n == name)
    }

    pub(crate) fn matches_task(&self, task: &Task) -> bool {
        let service_matches =
            self.service_ids.is_empty() || self.service_ids.contains(task.get_service_id());

        let node_matches = self.node_ids.is_empty()
            || task
                .get_node_id()
                .as_ref()
                .is_some_and(|node_id| self.node_ids.contains(node_id));

        service_matches && node_matches
    }
}
