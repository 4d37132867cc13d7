use std::{
    error::Error,
    fmt::{self, Display},
};
use thiserror::Error;

use crate::models::EntityKind;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result of a swarmgate-related operation.
pub type SwarmgateResult<T> = Result<T, SwarmgateError>;

/// An error that occurred while resolving, merging or submitting a specification.
#[derive(Debug, Error)]
pub enum SwarmgateError {
    /// No stored entity matches the identifier, neither by ID nor by name.
    #[error("{kind} {identifier} not found")]
    NotFound {
        /// The kind of entity that was looked up.
        kind: EntityKind,

        /// The identifier supplied by the client.
        identifier: String,
    },

    /// More than one stored entity carries the name used as identifier.
    #[error("{kind} {identifier} is ambiguous ({matches} matches found)")]
    Ambiguous {
        /// The kind of entity that was looked up.
        kind: EntityKind,

        /// The identifier supplied by the client.
        identifier: String,

        /// The number of entities matching the identifier.
        matches: usize,
    },

    /// The client input is malformed or contradictory.
    #[error("invalid specification: {0}")]
    Validation(#[from] ValidationError),

    /// A mandatory request argument is missing or empty.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The update would leave the stored specification untouched.
    #[error("{0}")]
    NoChange(String),

    /// The control plane rejected an update carrying a stale version stamp.
    #[error("update out of sequence: {kind} {id} is at version {current}, update was based on version {expected}")]
    Conflict {
        /// The kind of entity being updated.
        kind: EntityKind,

        /// The ID of the entity being updated.
        id: String,

        /// The version the update was based on.
        expected: u64,

        /// The version currently stored.
        current: u64,
    },

    /// The control plane refused to create an entity whose name is taken.
    #[error("{kind} name {name} conflicts with an existing object")]
    AlreadyExists {
        /// The kind of entity being created.
        kind: EntityKind,

        /// The conflicting name.
        name: String,
    },

    /// A control-plane call failed for a reason opaque to the gateway.
    #[error("control plane error: {0}")]
    Remote(String),

    /// The request was cancelled before the control plane answered.
    #[error("operation cancelled")]
    Cancelled,

    /// The request deadline passed before the control plane answered.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// An I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A seed file could not be decoded.
    #[error("invalid seed file: {0}")]
    Seed(#[from] toml::de::Error),

    /// An error that can represent any error.
    #[error(transparent)]
    Custom(#[from] AnyError),
}

/// A validation failure detected while turning client input into a specification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The mode is neither `replicated` nor `global`.
    #[error("mode: unsupported mode {0:?} (expected replicated or global)")]
    InvalidMode(String),

    /// A replica count was supplied for a global service.
    #[error("replicas: can only be specified in replicated mode")]
    ReplicasInGlobalMode,

    /// A CPU quantity could not be converted to nano-CPUs.
    #[error("{field}: invalid cpu {value:?}: {reason}")]
    InvalidCpu {
        /// The request field carrying the value.
        field: &'static str,

        /// The offending value.
        value: String,

        /// Why the value was rejected.
        reason: String,
    },

    /// A memory quantity could not be converted to bytes.
    #[error("{field}: invalid memory size {value:?}")]
    InvalidMemory {
        /// The request field carrying the value.
        field: &'static str,

        /// The offending value.
        value: String,
    },

    /// The restart condition is not one of `none`, `failure` or `any`.
    #[error("restart-condition: invalid restart condition {0:?}")]
    InvalidRestartCondition(String),

    /// A duration string could not be parsed.
    #[error("{field}: invalid duration {value:?}: {reason}")]
    InvalidDuration {
        /// The request field carrying the value.
        field: &'static str,

        /// The offending value.
        value: String,

        /// Why the value was rejected.
        reason: String,
    },

    /// A port mapping is not in `published:target[/protocol]` form.
    #[error("ports: port format {0:?} not supported")]
    InvalidPort(String),

    /// A bind mount is not in `source:target` form.
    #[error("bind: bind format {0:?} not supported")]
    InvalidBind(String),

    /// A volume mount contains the bind separator.
    #[error("volume: volume format {0:?} not supported")]
    InvalidVolume(String),

    /// A subnet or IP range is not a valid CIDR.
    #[error("{field}: invalid CIDR {value:?}")]
    InvalidCidr {
        /// The request field carrying the value.
        field: &'static str,

        /// The offending value.
        value: String,
    },

    /// A gateway is not a valid IP address.
    #[error("gateway: invalid IP address {0:?}")]
    InvalidGateway(String),

    /// An autoaccept role is neither `worker` nor `manager`.
    #[error("autoaccept: unrecognized role {0:?}")]
    InvalidRole(String),
}

/// An error that can represent any error.
#[derive(Debug)]
pub struct AnyError {
    error: anyhow::Error,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl SwarmgateError {
    /// Creates a new `Err` result.
    pub fn custom(error: impl Into<anyhow::Error>) -> SwarmgateError {
        SwarmgateError::Custom(AnyError {
            error: error.into(),
        })
    }

    /// Returns `true` if the error comes from cancellation or an expired deadline rather than
    /// from the control plane itself.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}

impl AnyError {
    /// Downcasts the error to a `T`.
    pub fn downcast<T>(&self) -> Option<&T>
    where
        T: Display + fmt::Debug + Send + Sync + 'static,
    {
        self.error.downcast_ref::<T>()
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Creates an `Ok` `SwarmgateResult`.
#[allow(non_snake_case)]
pub fn Ok<T>(value: T) -> SwarmgateResult<T> {
    Result::Ok(value)
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl PartialEq for AnyError {
    fn eq(&self, other: &Self) -> bool {
        self.error.to_string() == other.error.to_string()
    }
}

impl Display for AnyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl Error for AnyError {}
