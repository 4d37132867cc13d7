//! Strongly-typed specifications and entities exchanged with the control plane.
//!
//! Every entity owned by the control plane pairs an opaque ID and a [`Meta`] block (holding the
//! version stamp used for optimistic concurrency) with a desired-state specification. The
//! gateway never constructs entities itself; it reads them back from the control plane and
//! submits new specifications.

mod cluster;
mod meta;
mod network;
mod node;
mod service;
mod task;

pub(crate) mod duration;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use cluster::*;
pub use meta::*;
pub use network::*;
pub use node::*;
pub use service::*;
pub use task::*;

use std::fmt;

use serde::{Deserialize, Serialize};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The kinds of entity managed through the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A replicated or global service.
    Service,

    /// A cluster member.
    Node,

    /// An overlay network.
    Network,

    /// The cluster itself.
    Cluster,

    /// A single scheduled instance of a service.
    Task,
}

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// A versioned object owned by the control plane.
pub trait Entity {
    /// The kind of this entity.
    const KIND: EntityKind;

    /// The opaque identifier assigned by the control plane.
    fn id(&self) -> &str;

    /// The human name, not guaranteed to be unique.
    fn name(&self) -> &str;

    /// The metadata block holding the version stamp.
    fn meta(&self) -> &Meta;
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Service => "service",
            Self::Node => "node",
            Self::Network => "network",
            Self::Cluster => "cluster",
            Self::Task => "task",
        };

        write!(f, "{}", kind)
    }
}
