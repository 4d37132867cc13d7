use std::time::Duration;

use getset::Getters;
use serde::{Deserialize, Serialize};

use super::{duration, Annotations, Entity, EntityKind, Meta, NodeRole};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The algorithm recorded next to hashed join secrets.
pub const SECRET_HASH_ALGORITHM: &str = "bcrypt";

/// The default number of finished tasks kept per slot.
pub const DEFAULT_TASK_HISTORY_RETENTION_LIMIT: i64 = 5;

/// The default interval at which nodes are expected to heartbeat.
pub const DEFAULT_HEARTBEAT_PERIOD: Duration = Duration::from_secs(5);

/// The default validity of node certificates (90 days).
pub const DEFAULT_NODE_CERT_EXPIRY: Duration = Duration::from_secs(90 * 24 * 60 * 60);

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The cluster stored by the control plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[getset(get = "pub with_prefix")]
pub struct Cluster {
    /// The opaque cluster ID.
    pub(crate) id: String,

    /// Version and timestamps.
    pub(crate) meta: Meta,

    /// The desired cluster-wide settings.
    pub(crate) spec: ClusterSpec,
}

/// Cluster-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSpec {
    /// Name and labels.
    pub annotations: Annotations,

    /// How joining nodes are admitted.
    pub acceptance_policy: AcceptancePolicy,

    /// Task orchestration settings.
    pub orchestration: OrchestrationConfig,

    /// Agent dispatcher settings.
    pub dispatcher: DispatcherConfig,

    /// Certificate authority settings.
    pub ca_config: CaConfig,
}

/// Admission rules for joining nodes, one policy per role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptancePolicy {
    /// The per-role policies.
    pub policies: Vec<RoleAdmissionPolicy>,
}

/// The admission rule for one node role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAdmissionPolicy {
    /// The role this policy applies to.
    pub role: NodeRole,

    /// Whether nodes with this role are admitted without manual acceptance.
    pub autoaccept: bool,

    /// The secret joining nodes must present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<HashedSecret>,
}

/// A join secret stored in hashed form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashedSecret {
    /// The hash.
    pub data: String,

    /// The hashing algorithm.
    pub alg: String,
}

/// Task orchestration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestrationConfig {
    /// How many finished tasks are kept per slot or node.
    pub task_history_retention_limit: i64,
}

/// Agent dispatcher settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// How often agents must heartbeat.
    #[serde(with = "duration")]
    pub heartbeat_period: Duration,
}

/// Certificate authority settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaConfig {
    /// How long node certificates stay valid.
    #[serde(with = "duration")]
    pub node_cert_expiry: Duration,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ClusterSpec {
    /// The settings a new cluster starts with: workers are admitted automatically, managers
    /// must be accepted by hand.
    pub fn with_defaults(name: impl Into<String>) -> Self {
        Self {
            annotations: Annotations::named(name),
            acceptance_policy: AcceptancePolicy {
                policies: vec![
                    RoleAdmissionPolicy {
                        role: NodeRole::Worker,
                        autoaccept: true,
                        secret: None,
                    },
                    RoleAdmissionPolicy {
                        role: NodeRole::Manager,
                        autoaccept: false,
                        secret: None,
                    },
                ],
            },
            orchestration: OrchestrationConfig {
                task_history_retention_limit: DEFAULT_TASK_HISTORY_RETENTION_LIMIT,
            },
            dispatcher: DispatcherConfig {
                heartbeat_period: DEFAULT_HEARTBEAT_PERIOD,
            },
            ca_config: CaConfig {
                node_cert_expiry: DEFAULT_NODE_CERT_EXPIRY,
            },
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Entity for Cluster {
    const KIND: EntityKind = EntityKind::Cluster;

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
