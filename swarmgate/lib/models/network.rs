use std::{collections::BTreeMap, net::IpAddr};

use getset::Getters;
use serde::{Deserialize, Serialize};

use super::{Annotations, Entity, EntityKind, Meta};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A network stored by the control plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[getset(get = "pub with_prefix")]
pub struct Network {
    /// The opaque network ID.
    pub(crate) id: String,

    /// Version and timestamps.
    pub(crate) meta: Meta,

    /// The desired state of the network.
    pub(crate) spec: NetworkSpec,
}

/// The desired state of a network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Name and labels.
    pub annotations: Annotations,

    /// The network driver and its options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_config: Option<Driver>,

    /// IP address management settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipam: Option<IpamOptions>,
}

/// A named driver with free-form options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    /// The driver name.
    pub name: String,

    /// Driver-specific options.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

/// IP address management settings of a network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpamOptions {
    /// The IPAM driver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<Driver>,

    /// One entry per subnet.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub configs: Vec<IpamConfig>,
}

/// The address management settings of a single subnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpamConfig {
    /// The address family, inferred from the subnet.
    pub family: AddressFamily,

    /// The subnet in CIDR notation, as supplied.
    pub subnet: String,

    /// The gateway address, which lies within the subnet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<IpAddr>,

    /// The allocation range in CIDR notation, which lies within the subnet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
}

/// IP address families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    /// IPv4.
    Ipv4,

    /// IPv6.
    Ipv6,
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Entity for Network {
    const KIND: EntityKind = EntityKind::Network;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.spec.annotations.name
    }

    fn meta(&self) -> &Meta {
        &self.meta
    }
}
