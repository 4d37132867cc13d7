//! The HTTP gateway.
//!
//! Routes decode client requests, run the matching pipeline from
//! [`management`](crate::management) under a per-request
//! [`CallContext`](crate::control::CallContext) and render the outcome as JSON. Failures render
//! as [`ErrorResponse`] bodies with a status code derived from the error kind.

mod handlers;
mod routes;
mod state;
mod types;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use routes::*;
pub use state::*;
pub use types::*;

use tokio::net::TcpListener;

use crate::SwarmgateResult;

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Serves the gateway until Ctrl-C is received.
///
/// On shutdown every event subscriber is closed so that streaming responses end and the server
/// can drain.
pub async fn serve(state: ServerState) -> SwarmgateResult<()> {
    let addr = *state.config().get_addr();
    let events = state.events().clone();
    let app = create_router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for shutdown signal: {}", e);
                return;
            }

            tracing::info!("shutdown signal received, closing event subscribers");
            events.close_all();
        })
        .await?;

    tracing::info!("server stopped");
    Ok(())
}
