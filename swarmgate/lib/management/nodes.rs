//! Node operations.

use serde::Serialize;

use super::Scope;
use crate::{
    control::ListFilter,
    events::EventAction,
    models::{Entity, Node, NodeAvailability, NodeMembership, NodeSpec, Task},
    SwarmgateError, SwarmgateResult,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A node together with the tasks assigned to it.
#[derive(Debug, Clone, Serialize)]
pub struct NodeDetails {
    /// The node.
    pub node: Node,

    /// Its tasks: only those still meant to run unless every task was asked for.
    pub tasks: Vec<Task>,
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Lists every node.
pub async fn list(scope: &Scope<'_>) -> SwarmgateResult<Vec<Node>> {
    scope
        .call(scope.control().list_nodes(&ListFilter::default()))
        .await
}

/// Returns a node and its tasks. Unless `all` is set, tasks whose desired state is past running
/// are left out.
pub async fn inspect(
    scope: &Scope<'_>,
    identifier: &str,
    all: bool,
) -> SwarmgateResult<NodeDetails> {
    let node: Node = scope.resolve(identifier).await?;
    let tasks = scope
        .call(scope.control().list_tasks(&ListFilter::by_node(node.id())))
        .await?
        .into_iter()
        .filter(|task| all || task.is_desired_active())
        .collect();

    Ok(NodeDetails { node, tasks })
}

/// Admits a pending node into the cluster.
pub async fn accept(scope: &Scope<'_>, identifier: &str) -> SwarmgateResult<Node> {
    let node: Node = scope.resolve(identifier).await?;
    if node.get_spec().membership == NodeMembership::Accepted {
        return Err(SwarmgateError::NoChange(format!(
            "node {} is already accepted",
            node.id()
        )));
    }

    let mut spec = node.get_spec().clone();
    spec.membership = NodeMembership::Accepted;

    submit(scope, &node, spec).await
}

/// Makes a paused or drained node available for new tasks again.
pub async fn activate(scope: &Scope<'_>, identifier: &str) -> SwarmgateResult<Node> {
    let node: Node = scope.resolve(identifier).await?;
    if node.get_spec().availability == NodeAvailability::Active {
        return Err(SwarmgateError::NoChange(format!(
            "node {} is already active",
            node.id()
        )));
    }

    let mut spec = node.get_spec().clone();
    spec.availability = NodeAvailability::Active;

    submit(scope, &node, spec).await
}

/// Removes a node from the cluster and returns its ID.
pub async fn remove(scope: &Scope<'_>, identifier: &str) -> SwarmgateResult<String> {
    let node: Node = scope.resolve(identifier).await?;
    scope.call(scope.control().remove_node(node.id())).await?;

    tracing::info!(id = %node.id(), name = %node.name(), "node removed");
    scope.publish(EventAction::Remove, &node);

    Ok(node.id().to_string())
}

async fn submit(
    scope: &Scope<'_>,
    node: &Node,
    spec: NodeSpec,
) -> SwarmgateResult<Node> {
    let updated = scope
        .call(
            scope
                .control()
                .update_node(node.id(), *node.meta().get_version(), spec),
        )
        .await?;

    tracing::info!(
        id = %updated.id(),
        membership = ?updated.get_spec().membership,
        availability = ?updated.get_spec().availability,
        "node updated"
    );
    scope.publish(EventAction::Update, &updated);

    Ok(updated)
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        control::{CallContext, ControlPlane, MemoryControlPlane},
        events::EventsHandler,
        models::{Annotations, NodeStatus, ServiceSpec, TaskState},
    };

    async fn node(
        control: &MemoryControlPlane,
        name: &str,
        availability: NodeAvailability,
    ) -> Node {
        control
            .insert_node(
                NodeSpec {
                    annotations: Annotations::named(name),
                    availability,
                    ..Default::default()
                },
                NodeStatus::default(),
            )
            .await
    }

    #[test_log::test(tokio::test)]
    async fn test_nodes_accept_pending_node_once() {
        let control = MemoryControlPlane::new();
        let events = EventsHandler::default();
        let scope = Scope::new(&control, CallContext::new(), &events);
        let pending = node(&control, "worker-1", NodeAvailability::Active).await;

        let accepted = accept(&scope, "worker-1").await.unwrap();
        assert_eq!(accepted.id(), pending.id());
        assert_eq!(accepted.get_spec().membership, NodeMembership::Accepted);
        assert_eq!(accepted.meta().get_version().index, 2);

        assert!(matches!(
            accept(&scope, pending.id()).await,
            Err(SwarmgateError::NoChange(_))
        ));
    }

    #[test_log::test(tokio::test)]
    async fn test_nodes_activate_sets_active() {
        let control = MemoryControlPlane::new();
        let events = EventsHandler::default();
        let scope = Scope::new(&control, CallContext::new(), &events);
        node(&control, "drained", NodeAvailability::Drain).await;
        node(&control, "active", NodeAvailability::Active).await;

        let activated = activate(&scope, "drained").await.unwrap();
        assert_eq!(activated.get_spec().availability, NodeAvailability::Active);
        assert_eq!(activated.get_spec().membership, NodeMembership::Pending);

        assert!(matches!(
            activate(&scope, "active").await,
            Err(SwarmgateError::NoChange(_))
        ));
    }

    #[test_log::test(tokio::test)]
    async fn test_nodes_inspect_filters_by_desired_state() {
        let control = MemoryControlPlane::new();
        let events = EventsHandler::default();
        let scope = Scope::new(&control, CallContext::new(), &events);
        let worker = node(&control, "worker-1", NodeAvailability::Active).await;

        let mut spec = ServiceSpec::baseline();
        spec.annotations = Annotations::named("web");
        spec.task.container.image = "nginx".to_string();
        let service = control.create_service(spec).await.unwrap();

        control
            .insert_task(
                service.id(),
                Some(worker.id()),
                1,
                TaskState::Running,
                TaskState::Starting,
            )
            .await
            .unwrap();
        control
            .insert_task(
                service.id(),
                Some(worker.id()),
                2,
                TaskState::Shutdown,
                TaskState::Running,
            )
            .await
            .unwrap();

        let details = inspect(&scope, "worker-1", false).await.unwrap();
        assert_eq!(details.tasks.len(), 1);
        assert_eq!(details.tasks[0].get_desired_state(), &TaskState::Running);

        let details = inspect(&scope, worker.id(), true).await.unwrap();
        assert_eq!(details.tasks.len(), 2);
    }

    #[test_log::test(tokio::test)]
    async fn test_nodes_remove_returns_id() {
        let control = MemoryControlPlane::new();
        let events = EventsHandler::default();
        let scope = Scope::new(&control, CallContext::new(), &events);
        let worker = node(&control, "worker-1", NodeAvailability::Active).await;

        assert_eq!(remove(&scope, "worker-1").await.unwrap(), worker.id());
        assert!(list(&scope).await.unwrap().is_empty());
    }
}
