use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The body of a service create or update request.
///
/// Every field is optional. Strings that are empty or only whitespace, and lists or maps that
/// are empty, count as absent. Numbers count as present whenever they are supplied, including
/// `0`, so a client can explicitly reset `restart-max-attempts` to unlimited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ServiceRequest {
    /// The service name.
    pub name: Option<String>,

    /// The container image.
    pub image: Option<String>,

    /// Service labels, replacing the stored ones.
    pub labels: Option<BTreeMap<String, String>>,

    /// `replicated` or `global`.
    pub mode: Option<String>,

    /// The number of replicas, only valid in replicated mode.
    pub replicas: Option<u64>,

    /// Container arguments.
    pub args: Option<Vec<String>>,

    /// Container environment in `KEY=value` form.
    pub env: Option<Vec<String>>,

    /// Published ports in `published:target[/protocol]` form.
    pub ports: Option<Vec<String>>,

    /// The name or ID of the network to attach to.
    pub network: Option<String>,

    /// Reserved memory (e.g. `512m`).
    pub memory_reservation: Option<String>,

    /// Memory limit (e.g. `512m`).
    pub memory_limit: Option<String>,

    /// Reserved CPU cores (e.g. `0.5`).
    pub cpu_reservation: Option<String>,

    /// CPU core limit (e.g. `0.5`).
    pub cpu_limit: Option<String>,

    /// How many tasks are updated at once, 0 meaning all at once.
    pub update_parallelism: Option<u64>,

    /// The delay between update batches.
    pub update_delay: Option<String>,

    /// `none`, `failure` or `any`.
    pub restart_condition: Option<String>,

    /// The delay between restarts.
    pub restart_delay: Option<String>,

    /// The maximum number of restarts, 0 meaning unlimited.
    pub restart_max_attempts: Option<u64>,

    /// The window used to evaluate restart attempts.
    pub restart_window: Option<String>,

    /// Placement constraints (e.g. `node.labels.zone==east`).
    pub constraint: Option<Vec<String>>,

    /// Bind mounts in `source:target` form.
    pub bind: Option<Vec<String>>,

    /// Anonymous volume targets.
    pub volume: Option<Vec<String>>,
}

/// The body of a network create request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkRequest {
    /// The network name.
    pub name: Option<String>,

    /// The network driver.
    pub driver: Option<String>,

    /// Driver options.
    pub opts: Option<BTreeMap<String, String>>,

    /// The IPAM driver.
    pub ipam_driver: Option<String>,

    /// Subnets in CIDR notation.
    pub subnet: Option<Vec<String>>,

    /// Gateway addresses, each assigned to the first subnet containing it.
    pub gateway: Option<Vec<String>>,

    /// Allocation ranges in CIDR notation, each assigned to the first subnet containing it.
    pub ip_range: Option<Vec<String>>,
}

/// The body of a cluster update request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterUpdateRequest {
    /// The roles whose nodes are admitted automatically. Every other role loses autoaccept.
    pub autoaccept: Option<Vec<String>>,

    /// The join secret. Only the first element is used.
    pub secret: Option<Vec<String>>,

    /// How many finished tasks are kept per slot.
    pub taskhistory: Option<i64>,

    /// The validity of node certificates.
    pub certexpiry: Option<String>,

    /// The agent heartbeat period.
    pub heartbeatperiod: Option<String>,
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Returns the string if it is present and not blank.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// Returns the list if it is present and not empty.
pub(crate) fn present_list(value: &Option<Vec<String>>) -> Option<&[String]> {
    value.as_deref().filter(|list| !list.is_empty())
}

/// Returns the map if it is present and not empty.
pub(crate) fn present_map(
    value: &Option<BTreeMap<String, String>>,
) -> Option<&BTreeMap<String, String>> {
    value.as_ref().filter(|map| !map.is_empty())
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_request_uses_kebab_case_names() {
        let request: ServiceRequest = serde_json::from_str(
            r#"{"name": "web", "memory-limit": "512m", "restart-max-attempts": 0}"#,
        )
        .unwrap();

        assert_eq!(request.name.as_deref(), Some("web"));
        assert_eq!(request.memory_limit.as_deref(), Some("512m"));
        assert_eq!(request.restart_max_attempts, Some(0));
        assert_eq!(request.image, None);
    }

    #[test]
    fn test_client_present_treats_blank_as_absent() {
        assert_eq!(present(&None), None);
        assert_eq!(present(&Some(String::new())), None);
        assert_eq!(present(&Some("  \t".to_string())), None);
        assert_eq!(present(&Some("x".to_string())), Some("x"));

        assert_eq!(present_list(&Some(vec![])), None);
        assert_eq!(present_map(&Some(BTreeMap::new())), None);
    }

    #[test]
    fn test_client_network_request_uses_snake_case_names() {
        let request: NetworkRequest = serde_json::from_str(
            r#"{"name": "backend", "ipam_driver": "default", "ip_range": ["10.0.0.0/25"]}"#,
        )
        .unwrap();

        assert_eq!(request.ipam_driver.as_deref(), Some("default"));
        assert_eq!(request.ip_range, Some(vec!["10.0.0.0/25".to_string()]));
    }
}
