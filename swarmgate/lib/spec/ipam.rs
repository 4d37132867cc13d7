use std::net::IpAddr;

use ipnetwork::IpNetwork;

use crate::{
    models::{AddressFamily, Driver, IpamConfig, IpamOptions},
    ValidationError,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A gateway or range still waiting for a subnet to claim it.
#[derive(Debug)]
struct Candidate<T> {
    literal: String,
    value: T,
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Builds the IPAM options of a network from independently supplied subnets, gateways and
/// ranges.
///
/// Subnets are processed in order. Each subnet claims the first remaining gateway it contains
/// and the first remaining range whose network address it contains; a claimed candidate is
/// removed so no later subnet can reuse it. Candidates that no subnet contains are dropped
/// without error.
///
/// Returns `None` when neither a driver nor any subnet is supplied.
///
/// ## Examples
///
/// ```
/// use swarmgate::spec::build_ipam;
///
/// let subnets = vec!["10.0.0.0/24".to_string(), "10.0.1.0/24".to_string()];
/// let gateways = vec!["10.0.1.1".to_string()];
///
/// let ipam = build_ipam(None, &subnets, &gateways, &[]).unwrap().unwrap();
/// assert_eq!(ipam.configs[0].gateway, None);
/// assert_eq!(ipam.configs[1].gateway, Some("10.0.1.1".parse().unwrap()));
/// ```
pub fn build_ipam(
    driver: Option<&str>,
    subnets: &[String],
    gateways: &[String],
    ranges: &[String],
) -> Result<Option<IpamOptions>, ValidationError> {
    let driver = driver
        .filter(|name| !name.trim().is_empty())
        .map(|name| Driver {
            name: name.to_string(),
            ..Default::default()
        });

    if subnets.is_empty() {
        return Ok(driver.map(|driver| IpamOptions {
            driver: Some(driver),
            configs: Vec::new(),
        }));
    }

    let mut remaining_gateways = gateways
        .iter()
        .map(|literal| {
            literal
                .trim()
                .parse::<IpAddr>()
                .map(|value| Candidate {
                    literal: literal.clone(),
                    value,
                })
                .map_err(|_| ValidationError::InvalidGateway(literal.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut remaining_ranges = ranges
        .iter()
        .map(|literal| {
            parse_cidr("ip_range", literal).map(|value| Candidate {
                literal: literal.clone(),
                value,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut configs = Vec::with_capacity(subnets.len());
    for literal in subnets {
        let subnet = parse_cidr("subnet", literal)?;

        let gateway = take_first(&mut remaining_gateways, |ip| subnet.contains(*ip))
            .map(|candidate| candidate.value);

        let range = take_first(&mut remaining_ranges, |range| subnet.contains(range.network()))
            .map(|candidate| candidate.literal);

        configs.push(IpamConfig {
            family: family_of(&subnet),
            subnet: literal.clone(),
            gateway,
            range,
        });
    }

    if !remaining_gateways.is_empty() || !remaining_ranges.is_empty() {
        tracing::debug!(
            gateways = ?remaining_gateways.iter().map(|c| &c.literal).collect::<Vec<_>>(),
            ranges = ?remaining_ranges.iter().map(|c| &c.literal).collect::<Vec<_>>(),
            "dropping ipam candidates outside every subnet"
        );
    }

    Ok(Some(IpamOptions { driver, configs }))
}

/// Removes and returns the first candidate matching the predicate, preserving the order of the
/// rest.
fn take_first<T>(
    candidates: &mut Vec<Candidate<T>>,
    predicate: impl Fn(&T) -> bool,
) -> Option<Candidate<T>> {
    let index = candidates
        .iter()
        .position(|candidate| predicate(&candidate.value))?;
    Some(candidates.remove(index))
}

/// Parses a CIDR literal, requiring an explicit prefix length.
fn parse_cidr(field: &'static str, literal: &str) -> Result<IpNetwork, ValidationError> {
    let invalid = || ValidationError::InvalidCidr {
        field,
        value: literal.to_string(),
    };

    let trimmed = literal.trim();
    if !trimmed.contains('/') {
        return Err(invalid());
    }

    let network: IpNetwork = trimmed.parse().map_err(|_| invalid())?;
    IpNetwork::new(network.network(), network.prefix()).map_err(|_| invalid())
}

/// Returns the family of a subnet; IPv4-mapped IPv6 subnets count as IPv4.
fn family_of(subnet: &IpNetwork) -> AddressFamily {
    match subnet {
        IpNetwork::V4(_) => AddressFamily::Ipv4,
        IpNetwork::V6(v6) if v6.network().to_ipv4_mapped().is_some() => AddressFamily::Ipv4,
        IpNetwork::V6(_) => AddressFamily::Ipv6,
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_ipam_gateway_goes_to_first_containing_subnet() {
        let ipam = build_ipam(
            None,
            &strings(&["10.0.0.0/24", "10.0.1.0/24"]),
            &strings(&["10.0.0.1"]),
            &[],
        )
        .unwrap()
        .unwrap();

        assert_eq!(ipam.driver, None);
        assert_eq!(ipam.configs.len(), 2);
        assert_eq!(ipam.configs[0].gateway, Some("10.0.0.1".parse().unwrap()));
        assert_eq!(ipam.configs[1].gateway, None);
        assert!(ipam.configs.iter().all(|c| c.family == AddressFamily::Ipv4));
    }

    #[test]
    fn test_ipam_gateway_is_consumed_once_for_duplicate_subnets() {
        let ipam = build_ipam(
            None,
            &strings(&["10.0.0.0/24", "10.0.0.0/24"]),
            &strings(&["10.0.0.1"]),
            &strings(&["10.0.0.128/25"]),
        )
        .unwrap()
        .unwrap();

        assert_eq!(ipam.configs[0].gateway, Some("10.0.0.1".parse().unwrap()));
        assert_eq!(ipam.configs[0].range.as_deref(), Some("10.0.0.128/25"));
        assert_eq!(ipam.configs[1].gateway, None);
        assert_eq!(ipam.configs[1].range, None);
    }

    #[test]
    fn test_ipam_candidates_keep_input_order() {
        let ipam = build_ipam(
            None,
            &strings(&["10.0.0.0/16", "10.0.0.0/16"]),
            &strings(&["192.168.0.1", "10.0.5.1", "10.0.0.1"]),
            &[],
        )
        .unwrap()
        .unwrap();

        assert_eq!(ipam.configs[0].gateway, Some("10.0.5.1".parse().unwrap()));
        assert_eq!(ipam.configs[1].gateway, Some("10.0.0.1".parse().unwrap()));
    }

    #[test]
    fn test_ipam_detects_ipv6_family() {
        let ipam = build_ipam(None, &strings(&["fd00::/64"]), &strings(&["fd00::1"]), &[])
            .unwrap()
            .unwrap();

        assert_eq!(ipam.configs[0].family, AddressFamily::Ipv6);
        assert_eq!(ipam.configs[0].gateway, Some("fd00::1".parse().unwrap()));
    }

    #[test]
    fn test_ipam_without_subnets_keeps_only_the_driver() {
        assert_eq!(build_ipam(None, &[], &strings(&["10.0.0.1"]), &[]), Ok(None));
        assert_eq!(build_ipam(Some("  "), &[], &[], &[]), Ok(None));

        let ipam = build_ipam(Some("default"), &[], &[], &[]).unwrap().unwrap();
        assert_eq!(ipam.driver.map(|d| d.name), Some("default".to_string()));
        assert!(ipam.configs.is_empty());
    }

    #[test]
    fn test_ipam_rejects_malformed_literals() {
        assert_eq!(
            build_ipam(None, &strings(&["10.0.0.0"]), &[], &[]),
            Err(ValidationError::InvalidCidr {
                field: "subnet",
                value: "10.0.0.0".to_string(),
            })
        );

        assert_eq!(
            build_ipam(None, &strings(&["10.0.0.0/24"]), &strings(&["gateway"]), &[]),
            Err(ValidationError::InvalidGateway("gateway".to_string()))
        );

        assert!(matches!(
            build_ipam(None, &strings(&["10.0.0.0/24"]), &[], &strings(&["10.0.0.0/99"])),
            Err(ValidationError::InvalidCidr { field: "ip_range", .. })
        ));
    }
}
