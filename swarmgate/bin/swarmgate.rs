use std::sync::Arc;

use clap::{CommandFactory, Parser};
use swarmgate::{
    cli::{SwarmgateArgs, SwarmgateSubcommand},
    config::{DEFAULT_LOG_FILTER, VERBOSE_LOG_FILTER},
    control::{MemoryControlPlane, Seed},
    events::EventsHandler,
    server::{self, ServerState},
};
use tracing_subscriber::{fmt, EnvFilter};

//--------------------------------------------------------------------------------------------------
// Functions: main
//--------------------------------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before reading any environment-backed argument
    dotenvy::dotenv().ok();

    let args = SwarmgateArgs::parse();

    // Initialize tracing subscriber with EnvFilter
    let default_filter = if args.verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };

    fmt()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_level(true)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    match args.subcommand {
        Some(subcommand) => {
            let config = subcommand.server_config();
            let SwarmgateSubcommand::Serve { seed, .. } = subcommand;

            let control = MemoryControlPlane::new();
            if let Some(path) = seed {
                tracing::info!("seeding control plane from {}", path.display());
                Seed::load(&path).await?.apply(&control).await?;
            }

            let state = ServerState::new(Arc::new(control), EventsHandler::default(), config);
            server::serve(state).await?;
        }
        None => {
            SwarmgateArgs::command().print_help()?;
        }
    }

    Ok(())
}
