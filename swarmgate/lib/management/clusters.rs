//! Cluster operations.

use super::Scope;
use crate::{
    control::ListFilter,
    events::EventAction,
    models::{Cluster, Entity},
    spec::{self, ClusterUpdateRequest},
    SwarmgateError, SwarmgateResult,
};

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Lists every cluster.
pub async fn list(scope: &Scope<'_>) -> SwarmgateResult<Vec<Cluster>> {
    scope
        .call(scope.control().list_clusters(&ListFilter::default()))
        .await
}

/// Returns a single cluster.
pub async fn inspect(scope: &Scope<'_>, identifier: &str) -> SwarmgateResult<Cluster> {
    scope.resolve(identifier).await
}

/// Applies a client request to the settings of a cluster.
///
/// Refused with [`SwarmgateError::NoChange`] when the request leaves the settings as they are.
pub async fn update(
    scope: &Scope<'_>,
    identifier: &str,
    request: &ClusterUpdateRequest,
) -> SwarmgateResult<Cluster> {
    let current: Cluster = scope.resolve(identifier).await?;

    let mut spec = current.get_spec().clone();
    spec::apply_cluster_update(request, &mut spec)?;
    if &spec == current.get_spec() {
        return Err(SwarmgateError::NoChange("no changes detected".to_string()));
    }

    let cluster = scope
        .call(
            scope
                .control()
                .update_cluster(current.id(), *current.meta().get_version(), spec),
        )
        .await?;

    tracing::info!(id = %cluster.id(), name = %cluster.name(), "cluster updated");
    scope.publish(EventAction::Update, &cluster);

    Ok(cluster)
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
