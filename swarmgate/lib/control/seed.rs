use std::{collections::BTreeMap, path::Path};

use serde::Deserialize;

use super::{ControlPlane, ListFilter, MemoryControlPlane};
use crate::{
    models::{
        Annotations, Entity, EntityKind, NodeAvailability, NodeMembership, NodeRole, NodeSpec,
        NodeState, NodeStatus, ServiceMode, ServiceSpec, TaskState,
    },
    SwarmgateError, SwarmgateResult,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Entities preloaded into the embedded control plane at startup.
///
/// ## Format
///
/// ```toml
/// [[nodes]]
/// name = "node-1"
/// role = "manager"
/// membership = "accepted"
/// state = "ready"
/// addr = "10.0.0.11"
/// labels = { zone = "east" }
///
/// [[services]]
/// name = "web"
/// image = "nginx:1.25"
/// replicas = 2
///
/// [[tasks]]
/// service = "web"
/// node = "node-1"
/// slot = 1
/// state = "running"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Seed {
    /// Nodes to register.
    pub nodes: Vec<SeedNode>,

    /// Services to create.
    pub services: Vec<SeedService>,

    /// Tasks to record, referring to seeded services and nodes by name.
    pub tasks: Vec<SeedTask>,
}

/// A node in a seed file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedNode {
    /// The node name.
    pub name: String,

    /// The node role.
    #[serde(default)]
    pub role: NodeRole,

    /// The admission state.
    #[serde(default)]
    pub membership: NodeMembership,

    /// The scheduling availability.
    #[serde(default)]
    pub availability: NodeAvailability,

    /// The reported connectivity state.
    #[serde(default)]
    pub state: NodeState,

    /// The reported address.
    #[serde(default)]
    pub addr: Option<String>,

    /// Node labels.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

/// A service in a seed file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedService {
    /// The service name.
    pub name: String,

    /// The container image.
    pub image: String,

    /// The replica count, 1 when omitted. Ignored for global services.
    #[serde(default)]
    pub replicas: Option<u64>,

    /// Whether the service runs in global mode.
    #[serde(default)]
    pub global: bool,
}

/// A task in a seed file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedTask {
    /// The name of the owning service.
    pub service: String,

    /// The name of the node running the task.
    #[serde(default)]
    pub node: Option<String>,

    /// The replica slot.
    #[serde(default)]
    pub slot: u64,

    /// The state the orchestrator wants.
    #[serde(default = "SeedTask::default_desired_state")]
    pub desired_state: TaskState,

    /// The observed state.
    #[serde(default = "SeedTask::default_state")]
    pub state: TaskState,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Seed {
    /// Reads a seed file.
    pub async fn load(path: impl AsRef<Path>) -> SwarmgateResult<Self> {
        let contents = tokio::fs::read_to_string(path).await?;
        contents.parse()
    }

    /// Loads the seeded entities into the control plane.
    pub async fn apply(&self, control: &MemoryControlPlane) -> SwarmgateResult<()> {
        let mut node_ids = BTreeMap::new();
        for node in &self.nodes {
            let spec = NodeSpec {
                annotations: Annotations {
                    name: node.name.clone(),
                    labels: node.labels.clone(),
                },
                role: node.role,
                membership: node.membership,
                availability: node.availability,
            };

            let status = NodeStatus {
                state: node.state,
                addr: node.addr.clone(),
            };

            let created = control.insert_node(spec, status).await;
            node_ids.insert(node.name.clone(), created.id().to_string());
        }

        for service in &self.services {
            let mut spec = ServiceSpec::baseline();
            spec.annotations = Annotations::named(&service.name);
            spec.task.container.image = service.image.clone();
            spec.mode = match (service.global, service.replicas) {
                (true, _) => ServiceMode::Global,
                (false, replicas) => ServiceMode::Replicated {
                    replicas: replicas.unwrap_or(1),
                },
            };

            control.create_service(spec).await?;
        }

        for task in &self.tasks {
            let services = control
                .list_services(&ListFilter::by_name(&task.service))
                .await?;
            let service = services.first().ok_or_else(|| SwarmgateError::NotFound {
                kind: EntityKind::Service,
                identifier: task.service.clone(),
            })?;

            let node_id = match &task.node {
                Some(name) => Some(node_ids.get(name).ok_or_else(|| SwarmgateError::NotFound {
                    kind: EntityKind::Node,
                    identifier: name.clone(),
                })?),
                None => None,
            };

            control
                .insert_task(
                    service.id(),
                    node_id.map(String::as_str),
                    task.slot,
                    task.desired_state,
                    task.state,
                )
                .await?;
        }

        tracing::info!(
            nodes = self.nodes.len(),
            services = self.services.len(),
            tasks = self.tasks.len(),
            "seeded control plane"
        );

        Ok(())
    }
}

impl SeedTask {
    fn default_desired_state() -> TaskState {
        TaskState::Running
    }

    fn default_state() -> TaskState {
        TaskState::Running
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl std::str::FromStr for Seed {
    type Err = SwarmgateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Node;

    const SEED: &str = r#"
        [[nodes]]
        name = "node-1"
        role = "manager"
        membership = "accepted"
        state = "ready"
        labels = { zone = "east" }

        [[nodes]]
        name = "node-2"

        [[services]]
        name = "web"
        image = "nginx:1.25"
        replicas = 2

        [[tasks]]
        service = "web"
        node = "node-1"
        slot = 1

        [[tasks]]
        service = "web"
        slot = 2
        state = "pending"
    "#;

    #[test_log::test(tokio::test)]
    async fn test_seed_populates_control_plane() {
        let seed: Seed = SEED.parse().unwrap();
        let control = MemoryControlPlane::new();
        seed.apply(&control).await.unwrap();

        let nodes: Vec<Node> = control.list_nodes(&ListFilter::default()).await.unwrap();
        assert_eq!(nodes.len(), 2);

        let manager = nodes.iter().find(|n| n.name() == "node-1").unwrap();
        assert_eq!(manager.get_spec().role, NodeRole::Manager);
        assert_eq!(manager.get_status().state, NodeState::Ready);
        assert_eq!(
            manager.get_spec().annotations.labels.get("zone").map(String::as_str),
            Some("east")
        );

        let worker = nodes.iter().find(|n| n.name() == "node-2").unwrap();
        assert_eq!(worker.get_spec().membership, NodeMembership::Pending);

        let services = control.list_services(&ListFilter::by_name("web")).await.unwrap();
        assert_eq!(
            services[0].get_spec().mode,
            ServiceMode::Replicated { replicas: 2 }
        );

        let tasks = control
            .list_tasks(&ListFilter::by_service(services[0].id()))
            .await
            .unwrap();
        assert_eq!(tasks.len(), 2);
    }

    #[test_log::test(tokio::test)]
    async fn test_seed_unknown_task_service_fails() {
        let seed: Seed = "[[tasks]]\nservice = \"ghost\"".parse().unwrap();
        let control = MemoryControlPlane::new();

        assert!(matches!(
            seed.apply(&control).await,
            Err(SwarmgateError::NotFound { kind: EntityKind::Service, .. })
        ));
    }

    #[test]
    fn test_seed_rejects_malformed_toml() {
        assert!(matches!(
            "[[nodes]]\nrole = \"manager\"".parse::<Seed>(),
            Err(SwarmgateError::Seed(_))
        ));
    }

    #[test_log::test(tokio::test)]
    async fn test_seed_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.toml");
        tokio::fs::write(&path, SEED).await.unwrap();

        let seed = Seed::load(&path).await.unwrap();
        assert_eq!(seed.nodes.len(), 2);
        assert_eq!(seed.tasks[1].state, TaskState::Pending);
    }
}
