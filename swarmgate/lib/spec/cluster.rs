use super::{
    client::{present, present_list, ClusterUpdateRequest},
    parse_duration,
};
use crate::{
    models::{ClusterSpec, HashedSecret, NodeRole, RoleAdmissionPolicy, SECRET_HASH_ALGORITHM},
    SwarmgateError, SwarmgateResult,
};

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Applies a cluster update request to a cluster specification.
///
/// `autoaccept` is a whitelist: every policy first loses autoaccept, then each listed role
/// gains it, getting a new policy if it has none. The first `secret` is hashed with bcrypt and
/// stored on every policy.
pub fn apply_cluster_update(
    request: &ClusterUpdateRequest,
    spec: &mut ClusterSpec,
) -> SwarmgateResult<()> {
    if let Some(roles) = present_list(&request.autoaccept) {
        let roles = roles
            .iter()
            .map(|role| role.parse::<NodeRole>())
            .collect::<Result<Vec<_>, _>>()?;

        let policies = &mut spec.acceptance_policy.policies;
        for policy in policies.iter_mut() {
            policy.autoaccept = false;
        }

        for role in roles {
            let mut found = false;
            for policy in policies.iter_mut().filter(|policy| policy.role == role) {
                policy.autoaccept = true;
                found = true;
            }

            if !found {
                policies.push(RoleAdmissionPolicy {
                    role,
                    autoaccept: true,
                    secret: None,
                });
            }
        }
    }

    if let Some(secret) = present_list(&request.secret).and_then(|secrets| secrets.first()) {
        let hashed = bcrypt::hash(secret, bcrypt::DEFAULT_COST).map_err(SwarmgateError::custom)?;
        for policy in spec.acceptance_policy.policies.iter_mut() {
            policy.secret = Some(HashedSecret {
                data: hashed.clone(),
                alg: SECRET_HASH_ALGORITHM.to_string(),
            });
        }
    }

    if let Some(limit) = request.taskhistory {
        spec.orchestration.task_history_retention_limit = limit;
    }

    if let Some(expiry) = present(&request.certexpiry) {
        spec.ca_config.node_cert_expiry = parse_duration("certexpiry", expiry)?;
    }

    if let Some(period) = present(&request.heartbeatperiod) {
        spec.dispatcher.heartbeat_period = parse_duration("heartbeatperiod", period)?;
    }

    Ok(())
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
