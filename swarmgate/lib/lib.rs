//! `swarmgate` is a declarative HTTP gateway for managing workloads on a swarm orchestrator.
//!
//! # Overview
//!
//! Clients describe services, networks and cluster settings with flat, sparse JSON documents.
//! swarmgate turns those documents into versioned, strongly-typed specifications and submits
//! them to an orchestration control plane. It handles:
//! - Locating the one entity an identifier refers to, by ID or by name
//! - Merging partial updates into stored specifications without touching other fields
//! - Parsing resource quantities, durations, ports, mounts and IPAM settings
//! - Optimistic concurrency through version stamps
//! - Streaming change events to subscribers
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use swarmgate::{
//!     config::ServerConfig,
//!     control::MemoryControlPlane,
//!     events::EventsHandler,
//!     server::{self, ServerState},
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let state = ServerState::new(
//!         Arc::new(MemoryControlPlane::new()),
//!         EventsHandler::default(),
//!         ServerConfig::default(),
//!     );
//!
//!     server::serve(state).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Server configuration and defaults
//! - [`control`] - Control-plane boundary, entity resolution and the embedded control plane
//! - [`events`] - Change events and their subscribers
//! - [`management`] - Request pipelines for every entity kind
//! - [`models`] - Entities and specifications stored by the control plane
//! - [`server`] - REST API server implementation
//! - [`spec`] - Client requests and the specification merge engine

#![warn(missing_docs)]

mod error;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub mod cli;
pub mod config;
pub mod control;
pub mod events;
pub mod management;
pub mod models;
pub mod server;
pub mod spec;

pub use error::*;
