use super::{
    build_ipam,
    client::{present, present_list, present_map, NetworkRequest},
};
use crate::{
    models::{Annotations, Driver, NetworkSpec},
    SwarmgateError, SwarmgateResult,
};

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Builds the specification of a new network.
///
/// The name is mandatory. A driver configuration is only produced when a driver name is given,
/// and carries the driver options; the IPAM options come from [`build_ipam`].
pub fn build_network_spec(request: &NetworkRequest) -> SwarmgateResult<NetworkSpec> {
    let name = present(&request.name)
        .ok_or_else(|| SwarmgateError::InvalidArgument("name is required".to_string()))?;

    let driver_config = present(&request.driver).map(|driver| Driver {
        name: driver.to_string(),
        options: present_map(&request.opts).cloned().unwrap_or_default(),
    });

    let ipam = build_ipam(
        present(&request.ipam_driver),
        present_list(&request.subnet).unwrap_or_default(),
        present_list(&request.gateway).unwrap_or_default(),
        present_list(&request.ip_range).unwrap_or_default(),
    )?;

    Ok(NetworkSpec {
        annotations: Annotations::named(name),
        driver_config,
        ipam,
    })
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
