use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Default port for the HTTP server.
pub const DEFAULT_SERVER_PORT: u16 = 8888;

/// Default address the HTTP server listens on.
pub const DEFAULT_SERVER_ADDR: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_SERVER_PORT);

/// Default deadline for a single control-plane call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Default name of the cluster the embedded control plane starts with.
pub const DEFAULT_CLUSTER_NAME: &str = "default";

/// Default log filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "swarmgate=info,tower_http=info";

/// Log filter used when verbose logging is requested.
pub const VERBOSE_LOG_FILTER: &str = "swarmgate=debug,tower_http=debug";

/// Capacity of the event broadcast channel.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;
