#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use swarmgate::{
    config::ServerConfig,
    control::MemoryControlPlane,
    events::EventsHandler,
    server::{create_router, ServerState},
};
use tower::ServiceExt;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A router backed by an embedded control plane the test can reach into.
pub struct TestApp {
    pub router: Router,
    pub control: Arc<MemoryControlPlane>,
    pub events: EventsHandler,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    pub fn with_config(config: ServerConfig) -> Self {
        let control = Arc::new(MemoryControlPlane::new());
        let events = EventsHandler::default();
        let state = ServerState::new(control.clone(), events.clone(), config);

        Self {
            router: create_router(state),
            control,
            events,
        }
    }

    /// Sends a request and returns the status with the decoded JSON body.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> anyhow::Result<(StatusCode, Value)> {
        let body = body.map(|value| value.to_string()).unwrap_or_default();
        self.send_raw(method, uri, body).await
    }

    /// Sends a request with a verbatim body.
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        body: impl Into<Body>,
    ) -> anyhow::Result<(StatusCode, Value)> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())?;

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        Ok((status, value))
    }

    pub async fn get(&self, uri: &str) -> anyhow::Result<(StatusCode, Value)> {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> anyhow::Result<(StatusCode, Value)> {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> anyhow::Result<(StatusCode, Value)> {
        self.send(Method::DELETE, uri, None).await
    }
}
