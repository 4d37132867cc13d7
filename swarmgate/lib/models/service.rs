use std::{fmt, time::Duration};

use getset::Getters;
use serde::{Deserialize, Serialize};

use super::{duration, Annotations, Entity, EntityKind, Meta};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A service stored by the control plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[getset(get = "pub with_prefix")]
pub struct Service {
    /// The opaque service ID.
    pub(crate) id: String,

    /// Version and timestamps.
    pub(crate) meta: Meta,

    /// The desired state of the service.
    pub(crate) spec: ServiceSpec,
}

/// The desired state of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSpec {
    /// Name and labels.
    pub annotations: Annotations,

    /// How tasks are distributed across the cluster.
    pub mode: ServiceMode,

    /// The template every task of the service is created from.
    pub task: TaskSpec,

    /// The rolling-update policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<UpdateConfig>,

    /// The networks the service tasks are attached to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<NetworkAttachmentConfig>,

    /// The ports published by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<EndpointSpec>,
}

/// The scheduling mode of a service. Exactly one mode is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceMode {
    /// A fixed number of tasks spread across the cluster.
    Replicated {
        /// The number of tasks to keep running.
        replicas: u64,
    },

    /// One task on every eligible node.
    Global,
}

/// The template for the tasks of a service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    /// The container to run.
    pub container: ContainerSpec,

    /// Resource reservations and limits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,

    /// When and how failed tasks are restarted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart: Option<RestartPolicy>,

    /// Constraints restricting which nodes may run the tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,
}

/// The container run by every task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSpec {
    /// The image reference.
    pub image: String,

    /// The arguments passed to the entrypoint.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    /// Environment variables in `KEY=value` form.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<String>,

    /// Mounts attached to the container.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mounts: Vec<Mount>,
}

/// Reservation and limit pairs for a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequirements {
    /// Resources guaranteed to the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservations: Option<Resources>,

    /// Resources the task may not exceed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<Resources>,
}

/// A quantity of CPU and memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    /// CPU in units of 10^-9 cores.
    pub nano_cpus: i64,

    /// Memory in bytes.
    pub memory_bytes: i64,
}

/// The restart policy of a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartPolicy {
    /// When a stopped task is restarted.
    pub condition: RestartCondition,

    /// The delay between restart attempts.
    #[serde(default, with = "duration::option", skip_serializing_if = "Option::is_none")]
    pub delay: Option<Duration>,

    /// The maximum number of restarts, 0 meaning unlimited.
    #[serde(default)]
    pub max_attempts: u64,

    /// The window over which restart attempts are counted, unbounded when unset.
    #[serde(default, with = "duration::option", skip_serializing_if = "Option::is_none")]
    pub window: Option<Duration>,
}

/// The condition under which a task is restarted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestartCondition {
    /// Never restart.
    #[default]
    None,

    /// Restart only when the task exits with a failure.
    Failure,

    /// Always restart.
    Any,
}

/// The rolling-update policy of a service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateConfig {
    /// How many tasks are updated at once, 0 meaning all at once.
    pub parallelism: u64,

    /// The delay between update batches.
    #[serde(with = "duration")]
    pub delay: Duration,
}

/// Placement constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Constraint expressions such as `node.labels.zone==east`.
    pub constraints: Vec<String>,
}

/// A filesystem mount attached to the container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mount {
    /// The kind of mount.
    pub kind: MountKind,

    /// The host path for binds, absent for anonymous volumes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// The path inside the container.
    pub target: String,

    /// Whether the mount is writable.
    pub writable: bool,
}

/// The kinds of mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MountKind {
    /// A host path mounted into the container.
    Bind,

    /// An anonymous volume managed by the node.
    Volume,
}

/// A network the service tasks are attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkAttachmentConfig {
    /// The ID of the network.
    pub target: String,
}

/// The ports published by a service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSpec {
    /// The published ports.
    pub ports: Vec<PortConfig>,
}

/// A single published port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortConfig {
    /// The transport protocol.
    pub protocol: PortProtocol,

    /// The port inside the container.
    pub target_port: u16,

    /// The port published on the cluster, assigned by the control plane when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_port: Option<u16>,
}

/// Transport protocols for published ports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortProtocol {
    /// TCP.
    #[default]
    Tcp,

    /// UDP.
    Udp,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ServiceSpec {
    /// The specification a newly created service starts from: one replica of an empty
    /// container.
    pub fn baseline() -> Self {
        Self {
            annotations: Annotations::default(),
            mode: ServiceMode::Replicated { replicas: 1 },
            task: TaskSpec::default(),
            update: None,
            networks: Vec::new(),
            endpoint: None,
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Entity for Service {
    const KIND: EntityKind = EntityKind::Service;

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

impl fmt::Display for RestartCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Failure => write!(f, "failure"),
            Self::Any => write!(f, "any"),
        }
    }
}

impl fmt::Display for PortProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => write!(f, "tcp"),
            Self::Udp => write!(f, "udp"),
        }
    }
}
