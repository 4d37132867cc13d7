use std::time::Duration;

use super::client::{present, ServiceRequest};
use crate::{
    models::{RestartCondition, RestartPolicy, ServiceMode, ServiceSpec, UpdateConfig},
    ValidationError,
};

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Applies the mode and replica count.
///
/// Switching mode discards the payload of the previous mode. Switching to replicated without a
/// count yields one replica, never an empty replicated block with zero. A replica count is
/// rejected when the service ends up in global mode.
pub fn apply_mode(request: &ServiceRequest, spec: &mut ServiceSpec) -> Result<(), ValidationError> {
    if let Some(mode) = present(&request.mode) {
        match mode {
            "global" => spec.mode = ServiceMode::Global,
            "replicated" => {
                if !matches!(spec.mode, ServiceMode::Replicated { .. }) {
                    spec.mode = ServiceMode::Replicated { replicas: 1 };
                }
            }
            other => return Err(ValidationError::InvalidMode(other.to_string())),
        }
    }

    if let Some(count) = request.replicas {
        match &mut spec.mode {
            ServiceMode::Replicated { replicas } => *replicas = count,
            ServiceMode::Global => return Err(ValidationError::ReplicasInGlobalMode),
        }
    }

    Ok(())
}

/// Applies the restart condition, delay, maximum attempts and window.
pub fn apply_restart(
    request: &ServiceRequest,
    spec: &mut ServiceSpec,
) -> Result<(), ValidationError> {
    if let Some(condition) = present(&request.restart_condition) {
        let condition = parse_restart_condition(condition)?;
        restart_mut(spec).condition = condition;
    }

    if let Some(delay) = present(&request.restart_delay) {
        let delay = parse_duration("restart-delay", delay)?;
        restart_mut(spec).delay = Some(delay);
    }

    if let Some(max_attempts) = request.restart_max_attempts {
        restart_mut(spec).max_attempts = max_attempts;
    }

    if let Some(window) = present(&request.restart_window) {
        let window = parse_duration("restart-window", window)?;
        restart_mut(spec).window = Some(window);
    }

    Ok(())
}

/// Applies the rolling-update parallelism and delay.
pub fn apply_update(
    request: &ServiceRequest,
    spec: &mut ServiceSpec,
) -> Result<(), ValidationError> {
    if let Some(parallelism) = request.update_parallelism {
        spec.update
            .get_or_insert_with(UpdateConfig::default)
            .parallelism = parallelism;
    }

    if let Some(delay) = present(&request.update_delay) {
        let delay = parse_duration("update-delay", delay)?;
        spec.update.get_or_insert_with(UpdateConfig::default).delay = delay;
    }

    Ok(())
}

/// Parses a restart condition: `none`, `failure` or `any`.
pub fn parse_restart_condition(value: &str) -> Result<RestartCondition, ValidationError> {
    match value {
        "none" => Ok(RestartCondition::None),
        "failure" => Ok(RestartCondition::Failure),
        "any" => Ok(RestartCondition::Any),
        _ => Err(ValidationError::InvalidRestartCondition(value.to_string())),
    }
}

/// Parses a human-readable duration such as `5s`, `1m30s` or `2h`.
///
/// ## Examples
///
/// ```
/// use std::time::Duration;
/// use swarmgate::spec::parse_duration;
///
/// assert_eq!(parse_duration("update-delay", "1m30s").unwrap(), Duration::from_secs(90));
/// ```
pub fn parse_duration(field: &'static str, value: &str) -> Result<Duration, ValidationError> {
    humantime::parse_duration(value.trim()).map_err(|e| ValidationError::InvalidDuration {
        field,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn restart_mut(spec: &mut ServiceSpec) -> &mut RestartPolicy {
    spec.task.restart.get_or_insert_with(RestartPolicy::default)
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
