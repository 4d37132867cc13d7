//! Network operations.

use super::Scope;
use crate::{
    control::ListFilter,
    events::EventAction,
    models::{Entity, Network},
    spec::{self, NetworkRequest},
    SwarmgateResult,
};

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Lists every network.
pub async fn list(scope: &Scope<'_>) -> SwarmgateResult<Vec<Network>> {
    scope
        .call(scope.control().list_networks(&ListFilter::default()))
        .await
}

/// Returns a single network.
pub async fn inspect(scope: &Scope<'_>, identifier: &str) -> SwarmgateResult<Network> {
    scope.resolve(identifier).await
}

/// Creates a network from a client request.
pub async fn create(scope: &Scope<'_>, request: &NetworkRequest) -> SwarmgateResult<Network> {
    let spec = spec::build_network_spec(request)?;
    let network = scope.call(scope.control().create_network(spec)).await?;

    tracing::info!(id = %network.id(), name = %network.name(), "network created");
    scope.publish(EventAction::Create, &network);

    Ok(network)
}

/// Removes a network and returns its ID.
pub async fn remove(scope: &Scope<'_>, identifier: &str) -> SwarmgateResult<String> {
    let network: Network = scope.resolve(identifier).await?;
    scope
        .call(scope.control().remove_network(network.id()))
        .await?;

    tracing::info!(id = %network.id(), name = %network.name(), "network removed");
    scope.publish(EventAction::Remove, &network);

    Ok(network.id().to_string())
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
