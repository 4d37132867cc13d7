//! Route definitions for the HTTP server.

use axum::{
    http::{header, HeaderName, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::{handlers, state::ServerState};

//-------------------------------------------------------------------------------------------------
// Functions
//-------------------------------------------------------------------------------------------------

/// Creates a new router with all API endpoints configured
///
/// ## Arguments
/// * `state` - The shared server state
///
/// # Returns
/// A configured Router instance, with CORS headers when enabled in the state's configuration
pub fn create_router(state: ServerState) -> Router {
    let enable_cors = *state.config().get_enable_cors();

    let router = Router::new()
        .route("/services", get(handlers::list_services_handler))
        .route("/services/create", post(handlers::create_service_handler))
        .route(
            "/services/{id}",
            get(handlers::inspect_service_handler).delete(handlers::remove_service_handler),
        )
        .route(
            "/services/{id}/update",
            post(handlers::update_service_handler),
        )
        .route("/nodes", get(handlers::list_nodes_handler))
        .route(
            "/nodes/{id}",
            get(handlers::inspect_node_handler).delete(handlers::remove_node_handler),
        )
        .route("/nodes/{id}/accept", post(handlers::accept_node_handler))
        .route("/nodes/{id}/activate", post(handlers::activate_node_handler))
        .route("/networks", get(handlers::list_networks_handler))
        .route("/networks/create", post(handlers::create_network_handler))
        .route(
            "/networks/{id}",
            get(handlers::inspect_network_handler).delete(handlers::remove_network_handler),
        )
        .route("/clusters", get(handlers::list_clusters_handler))
        .route("/clusters/{id}", get(handlers::inspect_cluster_handler))
        .route(
            "/clusters/{id}/update",
            post(handlers::update_cluster_handler),
        )
        .route("/tasks", get(handlers::list_tasks_handler))
        .route(
            "/tasks/{id}",
            get(handlers::inspect_task_handler).delete(handlers::remove_task_handler),
        )
        .route("/events", get(handlers::events_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        tracing::info!("cors enabled for every route");
        router.layer(cors_layer())
    } else {
        router
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
            header::CONTENT_TYPE,
            header::ACCEPT,
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::DELETE,
            Method::PUT,
            Method::OPTIONS,
        ])
}
