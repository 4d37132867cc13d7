use async_trait::async_trait;

use super::{
    apply_binds, apply_mode, apply_placement, apply_resources, apply_restart, apply_update,
    apply_volumes,
    client::{present, present_list, present_map, ServiceRequest},
};
use crate::{
    config::PortMapping,
    models::{EndpointSpec, NetworkAttachmentConfig, PortConfig, ServiceSpec},
    SwarmgateError, SwarmgateResult, ValidationError,
};

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// Resolves the network a service asks to be attached to.
#[async_trait]
pub trait NetworkLookup: Send + Sync {
    /// Returns the ID of the single network matching `identifier`, by ID or by name.
    async fn lookup_network(&self, identifier: &str) -> SwarmgateResult<String>;
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Merges a sparse client request into a baseline service specification.
///
/// Only the fields present in the request are written; everything else keeps its baseline
/// value. Fields are applied in a fixed order (annotations, mode, container, resources, ports,
/// network, restart, update, placement, binds, volumes) and the first failure aborts the merge.
pub async fn merge(
    request: &ServiceRequest,
    mut spec: ServiceSpec,
    networks: &dyn NetworkLookup,
) -> SwarmgateResult<ServiceSpec> {
    apply_annotations(request, &mut spec);
    apply_mode(request, &mut spec)?;
    apply_container(request, &mut spec);
    apply_resources(request, &mut spec)?;
    apply_ports(request, &mut spec)?;
    apply_network(request, &mut spec, networks).await?;
    apply_restart(request, &mut spec)?;
    apply_update(request, &mut spec)?;
    apply_placement(request, &mut spec);
    apply_binds(request, &mut spec)?;
    apply_volumes(request, &mut spec)?;

    Ok(spec)
}

/// Merges a client request into a copy of the stored specification, failing with
/// [`SwarmgateError::NoChange`] when the result equals the stored one.
pub async fn merge_update(
    request: &ServiceRequest,
    current: &ServiceSpec,
    networks: &dyn NetworkLookup,
) -> SwarmgateResult<ServiceSpec> {
    let merged = merge(request, current.clone(), networks).await?;
    if merged == *current {
        return Err(SwarmgateError::NoChange("no changes detected".to_string()));
    }

    Ok(merged)
}

fn apply_annotations(request: &ServiceRequest, spec: &mut ServiceSpec) {
    if let Some(name) = present(&request.name) {
        spec.annotations.name = name.to_string();
    }

    if let Some(labels) = present_map(&request.labels) {
        spec.annotations.labels = labels.clone();
    }
}

fn apply_container(request: &ServiceRequest, spec: &mut ServiceSpec) {
    let container = &mut spec.task.container;

    if let Some(image) = present(&request.image) {
        container.image = image.to_string();
    }

    if let Some(args) = present_list(&request.args) {
        container.args = args.to_vec();
    }

    if let Some(env) = present_list(&request.env) {
        container.env = env.to_vec();
    }
}

fn apply_ports(request: &ServiceRequest, spec: &mut ServiceSpec) -> Result<(), ValidationError> {
    let Some(ports) = present_list(&request.ports) else {
        return Ok(());
    };

    let ports = ports
        .iter()
        .map(|port| port.parse::<PortMapping>().map(PortConfig::from))
        .collect::<Result<Vec<_>, _>>()?;

    spec.endpoint.get_or_insert_with(EndpointSpec::default).ports = ports;
    Ok(())
}

async fn apply_network(
    request: &ServiceRequest,
    spec: &mut ServiceSpec,
    networks: &dyn NetworkLookup,
) -> SwarmgateResult<()> {
    if let Some(network) = present(&request.network) {
        let target = networks.lookup_network(network).await?;
        spec.networks = vec![NetworkAttachmentConfig { target }];
    }

    Ok(())
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
