use std::{net::SocketAddr, time::Duration};

use getset::Getters;
use typed_builder::TypedBuilder;

use super::{DEFAULT_CALL_TIMEOUT, DEFAULT_SERVER_ADDR};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Runtime configuration of the HTTP gateway.
///
/// ## Examples
///
/// ```
/// use std::time::Duration;
/// use swarmgate::config::ServerConfig;
///
/// let config = ServerConfig::builder()
///     .addr("127.0.0.1:9000".parse().unwrap())
///     .enable_cors(true)
///     .build();
///
/// assert!(*config.get_enable_cors());
/// assert_eq!(*config.get_timeout(), Duration::from_secs(30));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder, Getters)]
#[getset(get = "pub with_prefix")]
pub struct ServerConfig {
    /// The address the server listens on.
    #[builder(default = DEFAULT_SERVER_ADDR)]
    addr: SocketAddr,

    /// Whether CORS headers are added to every response.
    #[builder(default)]
    enable_cors: bool,

    /// The deadline applied to every control-plane call made for a request.
    #[builder(default = DEFAULT_CALL_TIMEOUT)]
    timeout: Duration,
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for ServerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
