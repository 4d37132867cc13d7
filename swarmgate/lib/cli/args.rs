use std::{net::SocketAddr, path::PathBuf, time::Duration};

use clap::Parser;

use super::styles;
use crate::config::{ServerConfig, DEFAULT_SERVER_ADDR};

//-------------------------------------------------------------------------------------------------
// Types
//-------------------------------------------------------------------------------------------------

/// swarmgate CLI - A declarative HTTP gateway for a swarm orchestrator
#[derive(Debug, Parser)]
#[command(name = "swarmgate", author, about, version, styles=styles::styles())]
pub struct SwarmgateArgs {
    /// The subcommand to run
    #[command(subcommand)]
    pub subcommand: Option<SwarmgateSubcommand>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands
#[derive(Debug, Parser)]
pub enum SwarmgateSubcommand {
    /// Start the HTTP gateway
    #[command(name = "serve")]
    Serve {
        /// Address to listen on
        #[arg(short, long, env = "SWARMGATE_ADVERTISE", default_value_t = DEFAULT_SERVER_ADDR)]
        advertise: SocketAddr,

        /// Add CORS headers to every response
        #[arg(short = 'c', long, env = "SWARMGATE_ENABLE_CORS")]
        api_enable_cors: bool,

        /// Deadline for every control-plane call, e.g. `30s` or `1m`
        #[arg(
            long,
            env = "SWARMGATE_TIMEOUT",
            default_value = "30s",
            value_parser = humantime::parse_duration
        )]
        timeout: Duration,

        /// TOML file of nodes, services and tasks to preload into the control plane
        #[arg(long, value_name = "PATH")]
        seed: Option<PathBuf>,
    },
}

//-------------------------------------------------------------------------------------------------
// Methods
//-------------------------------------------------------------------------------------------------

impl SwarmgateSubcommand {
    /// Returns the server configuration described by a `serve` invocation.
    pub fn server_config(&self) -> ServerConfig {
        match self {
            Self::Serve {
                advertise,
                api_enable_cors,
                timeout,
                ..
            } => ServerConfig::builder()
                .addr(*advertise)
                .enable_cors(*api_enable_cors)
                .timeout(*timeout)
                .build(),
        }
    }
}

//-------------------------------------------------------------------------------------------------
// Tests
//-------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CALL_TIMEOUT;

    #[test]
    fn test_args_serve_defaults() {
        let args = SwarmgateArgs::try_parse_from(["swarmgate", "serve"]).unwrap();
        let config = args.subcommand.unwrap().server_config();

        assert_eq!(*config.get_addr(), DEFAULT_SERVER_ADDR);
        assert!(!*config.get_enable_cors());
        assert_eq!(*config.get_timeout(), DEFAULT_CALL_TIMEOUT);
    }

    #[test]
    fn test_args_serve_overrides() {
        let args = SwarmgateArgs::try_parse_from([
            "swarmgate",
            "serve",
            "-a",
            "127.0.0.1:9000",
            "-c",
            "--timeout",
            "1m30s",
            "--seed",
            "cluster.toml",
        ])
        .unwrap();

        let subcommand = args.subcommand.unwrap();
        let config = subcommand.server_config();
        assert_eq!(config.get_addr().port(), 9000);
        assert!(*config.get_enable_cors());
        assert_eq!(*config.get_timeout(), Duration::from_secs(90));

        let SwarmgateSubcommand::Serve { seed, .. } = subcommand;
        assert_eq!(seed, Some(PathBuf::from("cluster.toml")));
    }

    #[test]
    fn test_args_rejects_bad_timeout() {
        let result = SwarmgateArgs::try_parse_from(["swarmgate", "serve", "--timeout", "soon"]);
        assert!(result.is_err());
    }
}
