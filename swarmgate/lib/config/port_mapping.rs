use std::{fmt, str::FromStr};

use crate::{
    models::{PortConfig, PortProtocol},
    ValidationError,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A published port of a service.
///
/// ## Format
/// A port mapping can be specified in two forms, each with an optional protocol suffix:
/// - `published:target` - Publishes the container port `target` on cluster port `published`
///   (e.g. "8080:80", "53:53/udp")
/// - `target` - Publishes the container port on a port picked by the control plane
///   (e.g. "80", "80/tcp")
///
/// ## Examples
///
/// ```
/// use swarmgate::config::PortMapping;
/// use swarmgate::models::PortProtocol;
///
/// let mapping = "8080:80/udp".parse::<PortMapping>().unwrap();
/// assert_eq!(mapping.get_published(), Some(8080));
/// assert_eq!(mapping.get_target(), 80);
/// assert_eq!(mapping.get_protocol(), PortProtocol::Udp);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortMapping {
    published: Option<u16>,
    target: u16,
    protocol: PortProtocol,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl PortMapping {
    /// Creates a mapping publishing `target` on `published`.
    pub fn with_published(published: u16, target: u16, protocol: PortProtocol) -> Self {
        Self {
            published: Some(published),
            target,
            protocol,
        }
    }

    /// Creates a mapping whose published port is left to the control plane.
    pub fn with_target(target: u16, protocol: PortProtocol) -> Self {
        Self {
            published: None,
            target,
            protocol,
        }
    }

    /// Returns the published port, if one was given.
    pub fn get_published(&self) -> Option<u16> {
        self.published
    }

    /// Returns the container port.
    pub fn get_target(&self) -> u16 {
        self.target
    }

    /// Returns the transport protocol.
    pub fn get_protocol(&self) -> PortProtocol {
        self.protocol
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl FromStr for PortMapping {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidPort(s.to_string());

        let (ports, protocol) = match s.rsplit_once('/') {
            Some((ports, "tcp")) => (ports, PortProtocol::Tcp),
            Some((ports, "udp")) => (ports, PortProtocol::Udp),
            Some(_) => return Err(invalid()),
            None => (s, PortProtocol::Tcp),
        };

        let parse = |port: &str| port.trim().parse::<u16>().map_err(|_| invalid());

        match ports.split_once(':') {
            Some((published, target)) => Ok(Self::with_published(
                parse(published)?,
                parse(target)?,
                protocol,
            )),
            None => Ok(Self::with_target(parse(ports)?, protocol)),
        }
    }
}

impl fmt::Display for PortMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.published {
            Some(published) => write!(f, "{}:{}/{}", published, self.target, self.protocol),
            None => write!(f, "{}/{}", self.target, self.protocol),
        }
    }
}

impl From<PortMapping> for PortConfig {
    fn from(mapping: PortMapping) -> Self {
        PortConfig {
            protocol: mapping.protocol,
            target_port: mapping.target,
            published_port: mapping.published,
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
