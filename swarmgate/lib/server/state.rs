//! Server state management.

use std::sync::Arc;

use getset::Getters;

use crate::{
    config::ServerConfig,
    control::{CallContext, ControlPlane},
    events::EventsHandler,
    management::Scope,
};

//-------------------------------------------------------------------------------------------------
// Types
//-------------------------------------------------------------------------------------------------

/// Shared server state, cloned into every request handler.
#[derive(Clone, Getters)]
#[getset(get = "pub")]
pub struct ServerState {
    /// The control plane all operations are submitted to.
    control: Arc<dyn ControlPlane>,

    /// The event fan-out.
    events: EventsHandler,

    /// The runtime configuration.
    config: ServerConfig,
}

//-------------------------------------------------------------------------------------------------
// Methods
//-------------------------------------------------------------------------------------------------

impl ServerState {
    /// Creates a new server state.
    pub fn new(
        control: Arc<dyn ControlPlane>,
        events: EventsHandler,
        config: ServerConfig,
    ) -> Self {
        Self {
            control,
            events,
            config,
        }
    }

    /// Returns a scope for a single request, bounded by the configured timeout.
    pub fn scope(&self) -> Scope<'_> {
        Scope::new(
            self.control.as_ref(),
            CallContext::with_timeout(*self.config.get_timeout()),
            &self.events,
        )
    }
}
