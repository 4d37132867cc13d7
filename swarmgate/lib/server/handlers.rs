//! HTTP request handlers for the REST API.
//!
//! Each handler builds a request scope from the shared state, runs the matching management
//! operation and renders the result, or the error, as JSON.

use std::convert::Infallible;

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use chrono::DateTime;
use futures::StreamExt;
use serde::Serialize;

use super::{
    state::ServerState,
    types::{AllQuery, ApiError, EventsQuery, IdResponse, JsonBody},
};
use crate::{
    management::{clusters, networks, nodes, services, tasks},
    spec::{ClusterUpdateRequest, NetworkRequest, ServiceRequest},
    SwarmgateError, SwarmgateResult,
};

//-------------------------------------------------------------------------------------------------
// Functions: Services
//-------------------------------------------------------------------------------------------------

/// Handler for the GET /services endpoint
pub async fn list_services_handler(State(state): State<ServerState>) -> Response {
    reply(StatusCode::OK, services::list(&state.scope()).await)
}

/// Handler for the GET /services/{id} endpoint
///
/// Returns the service and its running tasks, or all of its tasks with `?all=1`
pub async fn inspect_service_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(query): Query<AllQuery>,
) -> Response {
    reply(
        StatusCode::OK,
        services::inspect(&state.scope(), &id, query.all()).await,
    )
}

/// Handler for the POST /services/create endpoint
pub async fn create_service_handler(
    State(state): State<ServerState>,
    JsonBody(request): JsonBody<ServiceRequest>,
) -> Response {
    reply(
        StatusCode::CREATED,
        services::create(&state.scope(), &request).await,
    )
}

/// Handler for the POST /services/{id}/update endpoint
pub async fn update_service_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<ServiceRequest>,
) -> Response {
    reply(
        StatusCode::OK,
        services::update(&state.scope(), &id, &request).await,
    )
}

/// Handler for the DELETE /services/{id} endpoint
pub async fn remove_service_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Response {
    reply_id(services::remove(&state.scope(), &id).await)
}

//-------------------------------------------------------------------------------------------------
// Functions: Nodes
//-------------------------------------------------------------------------------------------------

/// Handler for the GET /nodes endpoint
pub async fn list_nodes_handler(State(state): State<ServerState>) -> Response {
    reply(StatusCode::OK, nodes::list(&state.scope()).await)
}

/// Handler for the GET /nodes/{id} endpoint
///
/// Returns the node and the tasks still meant to run on it, or all of them with `?all=1`
pub async fn inspect_node_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(query): Query<AllQuery>,
) -> Response {
    reply(
        StatusCode::OK,
        nodes::inspect(&state.scope(), &id, query.all()).await,
    )
}

/// Handler for the POST /nodes/{id}/accept endpoint
pub async fn accept_node_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Response {
    reply(StatusCode::OK, nodes::accept(&state.scope(), &id).await)
}

/// Handler for the POST /nodes/{id}/activate endpoint
pub async fn activate_node_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Response {
    reply(StatusCode::OK, nodes::activate(&state.scope(), &id).await)
}

/// Handler for the DELETE /nodes/{id} endpoint
pub async fn remove_node_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Response {
    reply_id(nodes::remove(&state.scope(), &id).await)
}

//-------------------------------------------------------------------------------------------------
// Functions: Networks
//-------------------------------------------------------------------------------------------------

/// Handler for the GET /networks endpoint
pub async fn list_networks_handler(State(state): State<ServerState>) -> Response {
    reply(StatusCode::OK, networks::list(&state.scope()).await)
}

/// Handler for the GET /networks/{id} endpoint
pub async fn inspect_network_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Response {
    reply(StatusCode::OK, networks::inspect(&state.scope(), &id).await)
}

/// Handler for the POST /networks/create endpoint
pub async fn create_network_handler(
    State(state): State<ServerState>,
    JsonBody(request): JsonBody<NetworkRequest>,
) -> Response {
    reply(
        StatusCode::CREATED,
        networks::create(&state.scope(), &request).await,
    )
}

/// Handler for the DELETE /networks/{id} endpoint
pub async fn remove_network_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Response {
    reply_id(networks::remove(&state.scope(), &id).await)
}

//-------------------------------------------------------------------------------------------------
// Functions: Clusters
//-------------------------------------------------------------------------------------------------

/// Handler for the GET /clusters endpoint
pub async fn list_clusters_handler(State(state): State<ServerState>) -> Response {
    reply(StatusCode::OK, clusters::list(&state.scope()).await)
}

/// Handler for the GET /clusters/{id} endpoint
pub async fn inspect_cluster_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Response {
    reply(StatusCode::OK, clusters::inspect(&state.scope(), &id).await)
}

/// Handler for the POST /clusters/{id}/update endpoint
pub async fn update_cluster_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<ClusterUpdateRequest>,
) -> Response {
    reply(
        StatusCode::OK,
        clusters::update(&state.scope(), &id, &request).await,
    )
}

//-------------------------------------------------------------------------------------------------
// Functions: Tasks
//-------------------------------------------------------------------------------------------------

/// Handler for the GET /tasks endpoint
///
/// Returns the tasks still meant to run, or every task with `?all=1`
pub async fn list_tasks_handler(
    State(state): State<ServerState>,
    Query(query): Query<AllQuery>,
) -> Response {
    reply(StatusCode::OK, tasks::list(&state.scope(), query.all()).await)
}

/// Handler for the GET /tasks/{id} endpoint
pub async fn inspect_task_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Response {
    reply(StatusCode::OK, tasks::inspect(&state.scope(), &id).await)
}

/// Handler for the DELETE /tasks/{id} endpoint
pub async fn remove_task_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Response {
    reply_id(tasks::remove(&state.scope(), &id).await)
}

//-------------------------------------------------------------------------------------------------
// Functions: Events
//-------------------------------------------------------------------------------------------------

/// Handler for the GET /events endpoint
///
/// Streams one JSON event per line until `until` passes, the server shuts down or the client
/// goes away.
pub async fn events_handler(
    State(state): State<ServerState>,
    Query(query): Query<EventsQuery>,
) -> Response {
    let until = match query.until {
        Some(secs) => match DateTime::from_timestamp(secs, 0) {
            Some(until) => Some(until),
            None => {
                return ApiError(SwarmgateError::InvalidArgument(format!(
                    "until {} is out of range",
                    secs
                )))
                .into_response()
            }
        },
        None => None,
    };

    let subscription = state.events().subscribe(until);
    tracing::info!(subscriber = %subscription.id(), "events subscriber registered");

    let stream = subscription.into_stream().filter_map(|event| async move {
        match serde_json::to_vec(&event) {
            Ok(mut line) => {
                line.push(b'\n');
                Some(Ok::<_, Infallible>(Bytes::from(line)))
            }
            Err(e) => {
                tracing::warn!("failed to encode event: {}", e);
                None
            }
        }
    });

    (
        [(header::CONTENT_TYPE, "application/x-ndjson")],
        Body::from_stream(stream),
    )
        .into_response()
}

//-------------------------------------------------------------------------------------------------
// Functions: Helpers
//-------------------------------------------------------------------------------------------------

fn reply<T: Serialize>(status: StatusCode, result: SwarmgateResult<T>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

fn reply_id(result: SwarmgateResult<String>) -> Response {
    reply(StatusCode::OK, result.map(|id| IdResponse { id }))
}
