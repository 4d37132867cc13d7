//! Request pipelines for every managed entity kind.
//!
//! Each operation runs a single pass of decode, resolve, merge, validate and submit against the
//! control plane, bounded by the [`CallContext`] of the request. Mutating operations publish an
//! event once the control plane has accepted the change.

pub mod clusters;
pub mod networks;
pub mod nodes;
pub mod services;
pub mod tasks;

use std::future::Future;

use crate::{
    control::{CallContext, ControlPlane, Resolvable, Resolver},
    events::{EventAction, EventsHandler},
    models::Entity,
    SwarmgateResult,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Everything an operation needs to talk to the control plane on behalf of one request.
pub struct Scope<'a> {
    control: &'a dyn ControlPlane,
    ctx: CallContext,
    events: &'a EventsHandler,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl<'a> Scope<'a> {
    /// Creates a scope.
    pub fn new(
        control: &'a dyn ControlPlane,
        ctx: CallContext,
        events: &'a EventsHandler,
    ) -> Self {
        Self {
            control,
            ctx,
            events,
        }
    }

    /// Returns the control plane.
    pub fn control(&self) -> &'a dyn ControlPlane {
        self.control
    }

    /// Returns the call context.
    pub fn ctx(&self) -> &CallContext {
        &self.ctx
    }

    /// Returns a resolver bound to this scope.
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(self.control, &self.ctx)
    }

    /// Resolves an identifier to exactly one entity.
    pub async fn resolve<E: Resolvable>(&self, identifier: &str) -> SwarmgateResult<E> {
        self.resolver().resolve(identifier).await
    }

    /// Runs a control-plane call under the scope's context.
    pub async fn call<T>(
        &self,
        call: impl Future<Output = SwarmgateResult<T>>,
    ) -> SwarmgateResult<T> {
        self.ctx.run(call).await
    }

    /// Publishes an event about an entity.
    pub(crate) fn publish<E: Entity>(&self, action: EventAction, entity: &E) {
        self.events.publish(E::KIND, action, entity.id());
    }
}
