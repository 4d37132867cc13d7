use chrono::{DateTime, Utc};
use getset::Getters;
use serde::{Deserialize, Serialize};

use super::{Entity, EntityKind, Meta};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A scheduled instance of a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[getset(get = "pub with_prefix")]
pub struct Task {
    /// The opaque task ID.
    pub(crate) id: String,

    /// Version and timestamps.
    pub(crate) meta: Meta,

    /// The service the task belongs to.
    pub(crate) service_id: String,

    /// The node the task is assigned to, once scheduled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) node_id: Option<String>,

    /// The replica slot, 0 for global services.
    pub(crate) slot: u64,

    /// The state the orchestrator wants the task in.
    pub(crate) desired_state: TaskState,

    /// The state last observed on the node.
    pub(crate) status: TaskStatus,
}

/// The observed status of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatus {
    /// The observed state.
    pub state: TaskState,

    /// A human-readable description of the state.
    #[serde(default)]
    pub message: String,

    /// When the state was observed.
    pub timestamp: DateTime<Utc>,
}

/// Task lifecycle states, in lifecycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    /// Created but not yet processed.
    New,

    /// Resources allocated.
    Allocated,

    /// Waiting for a node.
    Pending,

    /// Assigned to a node.
    Assigned,

    /// Accepted by the node.
    Accepted,

    /// Being prepared on the node.
    Preparing,

    /// Ready to start.
    Ready,

    /// Starting.
    Starting,

    /// Running.
    Running,

    /// Exited successfully.
    Complete,

    /// Shut down by the orchestrator.
    Shutdown,

    /// Exited with a failure.
    Failed,

    /// Refused by the node.
    Rejected,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Task {
    /// Returns `true` if the orchestrator still wants the task to run.
    pub fn is_desired_active(&self) -> bool {
        self.desired_state <= TaskState::Running
    }

    /// Returns `true` if the task was last observed running.
    pub fn is_running(&self) -> bool {
        self.status.state == TaskState::Running
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Entity for Task {
    const KIND: EntityKind = EntityKind::Task;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.id
    }

    fn meta(&self) -> &Meta {
        &self.meta
    }
}
