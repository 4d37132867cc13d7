use std::{fmt, str::FromStr};

use getset::Getters;
use serde::{Deserialize, Serialize};

use super::{Annotations, Entity, EntityKind, Meta};
use crate::ValidationError;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A cluster member stored by the control plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[getset(get = "pub with_prefix")]
pub struct Node {
    /// The opaque node ID.
    pub(crate) id: String,

    /// Version and timestamps.
    pub(crate) meta: Meta,

    /// The desired state of the node.
    pub(crate) spec: NodeSpec,

    /// The state last reported by the node.
    pub(crate) status: NodeStatus,
}

/// The desired state of a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Name and labels.
    pub annotations: Annotations,

    /// The role the node plays in the cluster.
    #[serde(default)]
    pub role: NodeRole,

    /// Whether the node has been admitted to the cluster.
    #[serde(default)]
    pub membership: NodeMembership,

    /// Whether the node may receive new tasks.
    #[serde(default)]
    pub availability: NodeAvailability,
}

/// The state reported by a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatus {
    /// The connectivity state.
    pub state: NodeState,

    /// The address the node was last seen at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addr: Option<String>,
}

/// Node roles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    /// Runs tasks only.
    #[default]
    Worker,

    /// Takes part in cluster management.
    Manager,
}

/// Node admission states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeMembership {
    /// Waiting to be accepted.
    #[default]
    Pending,

    /// Admitted to the cluster.
    Accepted,
}

/// Node scheduling availability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeAvailability {
    /// Receives new tasks.
    #[default]
    Active,

    /// Keeps running tasks but receives no new ones.
    Pause,

    /// Has its tasks moved away.
    Drain,
}

/// Node connectivity states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    /// Not reported yet.
    #[default]
    Unknown,

    /// Known to be down.
    Down,

    /// Connected and ready.
    Ready,

    /// Lost contact.
    Disconnected,
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Entity for Node {
    const KIND: EntityKind = EntityKind::Node;

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

impl FromStr for NodeRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "worker" => Ok(Self::Worker),
            "manager" => Ok(Self::Manager),
            _ => Err(ValidationError::InvalidRole(s.to_string())),
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Worker => write!(f, "worker"),
            Self::Manager => write!(f, "manager"),
        }
    }
}
