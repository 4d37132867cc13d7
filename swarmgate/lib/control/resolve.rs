use async_trait::async_trait;

use super::{CallContext, ControlPlane, ListFilter};
use crate::{
    models::{Cluster, Entity, Network, Node, Service},
    spec::NetworkLookup,
    SwarmgateError, SwarmgateResult,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Resolves identifiers against a control plane under a call context.
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    control: &'a dyn ControlPlane,
    ctx: &'a CallContext,
}

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// An entity kind that can be located by ID or by name.
#[async_trait]
pub trait Resolvable: Entity + Sized + Send {
    /// Gets the entity by its exact ID.
    async fn fetch(control: &dyn ControlPlane, id: &str) -> SwarmgateResult<Self>;

    /// Lists the entities matching the filter.
    async fn list(control: &dyn ControlPlane, filter: &ListFilter) -> SwarmgateResult<Vec<Self>>;
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl<'a> Resolver<'a> {
    /// Creates a resolver.
    pub fn new(control: &'a dyn ControlPlane, ctx: &'a CallContext) -> Self {
        Self { control, ctx }
    }

    /// Resolves `identifier` to exactly one entity of kind `E`.
    pub async fn resolve<E: Resolvable>(&self, identifier: &str) -> SwarmgateResult<E> {
        resolve(self.control, self.ctx, identifier).await
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Resolves a client-supplied identifier to exactly one entity.
///
/// The identifier is first looked up as a full ID. If that lookup fails for any reason other
/// than cancellation or an expired deadline, the entities named exactly `identifier` are listed
/// instead: none yields [`SwarmgateError::NotFound`], more than one yields
/// [`SwarmgateError::Ambiguous`] carrying the match count.
pub async fn resolve<E: Resolvable>(
    control: &dyn ControlPlane,
    ctx: &CallContext,
    identifier: &str,
) -> SwarmgateResult<E> {
    match ctx.run(E::fetch(control, identifier)).await {
        Ok(entity) => return Ok(entity),
        Err(e) if e.is_interrupted() => return Err(e),
        Err(e) => {
            tracing::debug!(kind = %E::KIND, identifier, error = %e, "id lookup failed, trying name");
        }
    }

    let filter = ListFilter::by_name(identifier);
    let mut matches = ctx.run(E::list(control, &filter)).await?;

    match matches.len() {
        0 => Err(SwarmgateError::NotFound {
            kind: E::KIND,
            identifier: identifier.to_string(),
        }),
        1 => Ok(matches.remove(0)),
        n => Err(SwarmgateError::Ambiguous {
            kind: E::KIND,
            identifier: identifier.to_string(),
            matches: n,
        }),
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

#[async_trait]
impl Resolvable for Service {
    async fn fetch(control: &dyn ControlPlane, id: &str) -> SwarmgateResult<Self> {
        control.get_service(id).await
    }

    async fn list(control: &dyn ControlPlane, filter: &ListFilter) -> SwarmgateResult<Vec<Self>> {
        control.list_services(filter).await
    }
}

#[async_trait]
impl Resolvable for Node {
    async fn fetch(control: &dyn ControlPlane, id: &str) -> SwarmgateResult<Self> {
        control.get_node(id).await
    }

    async fn list(control: &dyn ControlPlane, filter: &ListFilter) -> SwarmgateResult<Vec<Self>> {
        control.list_nodes(filter).await
    }
}

#[async_trait]
impl Resolvable for Network {
    async fn fetch(control: &dyn ControlPlane, id: &str) -> SwarmgateResult<Self> {
        control.get_network(id).await
    }

    async fn list(control: &dyn ControlPlane, filter: &ListFilter) -> SwarmgateResult<Vec<Self>> {
        control.list_networks(filter).await
    }
}

#[async_trait]
impl Resolvable for Cluster {
    async fn fetch(control: &dyn ControlPlane, id: &str) -> SwarmgateResult<Self> {
        control.get_cluster(id).await
    }

    async fn list(control: &dyn ControlPlane, filter: &ListFilter) -> SwarmgateResult<Vec<Self>> {
        control.list_clusters(filter).await
    }
}

#[async_trait]
impl NetworkLookup for Resolver<'_> {
    async fn lookup_network(&self, identifier: &str) -> SwarmgateResult<String> {
        let network: Network = self.resolve(identifier).await?;
        Ok(network.id().to_string())
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::{
        control::MemoryControlPlane,
        models::{
            Annotations, ClusterSpec, EntityKind, NetworkSpec, NodeSpec, NodeStatus, ServiceSpec,
            Task, Version,
        },
    };

    fn service_spec(name: &str) -> ServiceSpec {
        let mut spec = ServiceSpec::baseline();
        spec.annotations = Annotations::named(name);
        spec.task.container.image = "busybox".to_string();
        spec
    }

    #[test_log::test(tokio::test)]
    async fn test_resolve_by_exact_id_ignores_name_collisions() {
        let control = MemoryControlPlane::new();
        let first = control.insert_node(NodeSpec::default(), NodeStatus::default()).await;
        let mut named = NodeSpec::default();
        named.annotations = Annotations::named(first.id());
        control.insert_node(named.clone(), NodeStatus::default()).await;
        control.insert_node(named, NodeStatus::default()).await;

        let ctx = CallContext::new();
        let node: Node = resolve(&control, &ctx, first.id()).await.unwrap();
        assert_eq!(node.id(), first.id());
    }

    #[test_log::test(tokio::test)]
    async fn test_resolve_falls_back_to_name() {
        let control = MemoryControlPlane::new();
        let created = control.create_service(service_spec("web")).await.unwrap();

        let ctx = CallContext::new();
        let service: Service = resolve(&control, &ctx, "web").await.unwrap();
        assert_eq!(service.id(), created.id());
    }

    #[test_log::test(tokio::test)]
    async fn test_resolve_not_found_and_ambiguous() {
        let control = MemoryControlPlane::new();
        let mut spec = NodeSpec::default();
        spec.annotations = Annotations::named("worker");
        control.insert_node(spec.clone(), NodeStatus::default()).await;
        control.insert_node(spec, NodeStatus::default()).await;

        let ctx = CallContext::new();

        let result = resolve::<Node>(&control, &ctx, "manager").await;
        assert!(matches!(
            result,
            Err(SwarmgateError::NotFound { kind: EntityKind::Node, identifier }) if identifier == "manager"
        ));

        let result = resolve::<Node>(&control, &ctx, "worker").await;
        assert!(matches!(
            result,
            Err(SwarmgateError::Ambiguous { kind: EntityKind::Node, matches: 2, .. })
        ));
    }

    #[test_log::test(tokio::test)]
    async fn test_resolve_network_lookup_returns_id() {
        let control = MemoryControlPlane::new();
        let mut spec = NetworkSpec::default();
        spec.annotations = Annotations::named("frontend");
        let network = control.create_network(spec).await.unwrap();

        let ctx = CallContext::new();
        let resolver = Resolver::new(&control, &ctx);
        assert_eq!(
            resolver.lookup_network("frontend").await.unwrap(),
            network.id()
        );
    }

    /// A control plane whose lookups never answer, counting list calls.
    #[derive(Default)]
    struct Stalled {
        lists: AtomicUsize,
    }

    #[async_trait]
    impl ControlPlane for Stalled {
        async fn get_service(&self, _: &str) -> SwarmgateResult<Service> {
            std::future::pending().await
        }

        async fn list_services(&self, _: &ListFilter) -> SwarmgateResult<Vec<Service>> {
            self.lists.fetch_add(1, Ordering::SeqCst);
            Ok(vec![])
        }

        async fn create_service(&self, _: ServiceSpec) -> SwarmgateResult<Service> {
            unimplemented!()
        }

        async fn update_service(&self, _: &str, _: Version, _: ServiceSpec) -> SwarmgateResult<Service> {
            unimplemented!()
        }

        async fn remove_service(&self, _: &str) -> SwarmgateResult<()> {
            unimplemented!()
        }

        async fn get_node(&self, _: &str) -> SwarmgateResult<Node> {
            unimplemented!()
        }

        async fn list_nodes(&self, _: &ListFilter) -> SwarmgateResult<Vec<Node>> {
            unimplemented!()
        }

        async fn update_node(&self, _: &str, _: Version, _: NodeSpec) -> SwarmgateResult<Node> {
            unimplemented!()
        }

        async fn remove_node(&self, _: &str) -> SwarmgateResult<()> {
            unimplemented!()
        }

        async fn get_network(&self, _: &str) -> SwarmgateResult<Network> {
            unimplemented!()
        }

        async fn list_networks(&self, _: &ListFilter) -> SwarmgateResult<Vec<Network>> {
            unimplemented!()
        }

        async fn create_network(&self, _: NetworkSpec) -> SwarmgateResult<Network> {
            unimplemented!()
        }

        async fn remove_network(&self, _: &str) -> SwarmgateResult<()> {
            unimplemented!()
        }

        async fn get_cluster(&self, _: &str) -> SwarmgateResult<Cluster> {
            unimplemented!()
        }

        async fn list_clusters(&self, _: &ListFilter) -> SwarmgateResult<Vec<Cluster>> {
            unimplemented!()
        }

        async fn update_cluster(&self, _: &str, _: Version, _: ClusterSpec) -> SwarmgateResult<Cluster> {
            unimplemented!()
        }

        async fn get_task(&self, _: &str) -> SwarmgateResult<Task> {
            unimplemented!()
        }

        async fn list_tasks(&self, _: &ListFilter) -> SwarmgateResult<Vec<Task>> {
            unimplemented!()
        }

        async fn remove_task(&self, _: &str) -> SwarmgateResult<()> {
            unimplemented!()
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_resolve_deadline_skips_name_fallback() {
        let control = Stalled::default();
        let ctx = CallContext::with_timeout(std::time::Duration::from_millis(20));

        let result = resolve::<Service>(&control, &ctx, "web").await;

        assert!(matches!(result, Err(SwarmgateError::DeadlineExceeded)));
        assert_eq!(control.lists.load(Ordering::SeqCst), 0);
    }
}
