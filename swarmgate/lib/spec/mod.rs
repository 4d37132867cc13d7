//! The specification engine.
//!
//! Client requests arrive as flat, sparse structures where every field is optional. The engine
//! turns them into full [`ServiceSpec`](crate::models::ServiceSpec),
//! [`NetworkSpec`](crate::models::NetworkSpec) and [`ClusterSpec`](crate::models::ClusterSpec)
//! values by applying each present field onto a baseline:
//!
//! - [`merge`] applies a [`ServiceRequest`] to a baseline service specification in a fixed
//!   order, and [`merge_update`] additionally reports an update that changes nothing.
//! - [`build_ipam`] derives per-subnet IPAM entries from independent subnet, gateway and range
//!   lists.
//! - [`apply_cluster_update`] applies a [`ClusterUpdateRequest`] to a cluster specification.
//!
//! Absence always means "leave unchanged": empty strings, empty lists and empty maps are
//! treated exactly like missing fields.

mod client;
mod cluster;
mod ipam;
mod merge;
mod mount;
mod network;
mod policy;
mod resource;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use client::*;
pub use cluster::*;
pub use ipam::*;
pub use merge::*;
pub use mount::*;
pub use network::*;
pub use policy::*;
pub use resource::*;
