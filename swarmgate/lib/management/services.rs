//! Service operations.

use serde::Serialize;

use super::Scope;
use crate::{
    control::ListFilter,
    events::EventAction,
    models::{Entity, Service, ServiceSpec, Task},
    spec::{self, ServiceRequest},
    SwarmgateError, SwarmgateResult,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A service together with its tasks.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceDetails {
    /// The service.
    pub service: Service,

    /// Its tasks: only running ones unless every task was asked for.
    pub tasks: Vec<Task>,
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Lists every service.
pub async fn list(scope: &Scope<'_>) -> SwarmgateResult<Vec<Service>> {
    scope
        .call(scope.control().list_services(&ListFilter::default()))
        .await
}

/// Returns a service and its tasks. Unless `all` is set, only running tasks are returned.
pub async fn inspect(
    scope: &Scope<'_>,
    identifier: &str,
    all: bool,
) -> SwarmgateResult<ServiceDetails> {
    let service: Service = scope.resolve(identifier).await?;
    let tasks = scope
        .call(scope.control().list_tasks(&ListFilter::by_service(service.id())))
        .await?
        .into_iter()
        .filter(|task| all || task.is_running())
        .collect();

    Ok(ServiceDetails { service, tasks })
}

/// Creates a service from a client request. Name and image are mandatory.
pub async fn create(scope: &Scope<'_>, request: &ServiceRequest) -> SwarmgateResult<Service> {
    if spec::present(&request.name).is_none() {
        return Err(SwarmgateError::InvalidArgument("name is required".to_string()));
    }

    if spec::present(&request.image).is_none() {
        return Err(SwarmgateError::InvalidArgument("image is required".to_string()));
    }

    let resolver = scope.resolver();
    let spec = spec::merge(request, ServiceSpec::baseline(), &resolver).await?;
    let service = scope.call(scope.control().create_service(spec)).await?;

    tracing::info!(id = %service.id(), name = %service.name(), "service created");
    scope.publish(EventAction::Create, &service);

    Ok(service)
}

/// Applies a client request to a stored service.
///
/// The update is submitted with the version read during resolution, and refused with
/// [`SwarmgateError::NoChange`] when it would not change anything.
pub async fn update(
    scope: &Scope<'_>,
    identifier: &str,
    request: &ServiceRequest,
) -> SwarmgateResult<Service> {
    let current: Service = scope.resolve(identifier).await?;

    let resolver = scope.resolver();
    let spec = spec::merge_update(request, current.get_spec(), &resolver).await?;
    let service = scope
        .call(scope.control().update_service(
            current.id(),
            *current.meta().get_version(),
            spec,
        ))
        .await?;

    tracing::info!(
        id = %service.id(),
        version = service.meta().get_version().index,
        "service updated"
    );
    scope.publish(EventAction::Update, &service);

    Ok(service)
}

/// Removes a service and returns its ID.
pub async fn remove(scope: &Scope<'_>, identifier: &str) -> SwarmgateResult<String> {
    let service: Service = scope.resolve(identifier).await?;
    scope
        .call(scope.control().remove_service(service.id()))
        .await?;

    tracing::info!(id = %service.id(), name = %service.name(), "service removed");
    scope.publish(EventAction::Remove, &service);

    Ok(service.id().to_string())
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;
    use crate::{
        control::{CallContext, ControlPlane, MemoryControlPlane},
        events::EventsHandler,
        models::{EntityKind, ServiceMode, TaskState},
    };

    fn request(name: &str, image: &str) -> ServiceRequest {
        ServiceRequest {
            name: Some(name.to_string()),
            image: Some(image.to_string()),
            ..Default::default()
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_services_create_requires_name_and_image() {
        let control = MemoryControlPlane::new();
        let events = EventsHandler::default();
        let scope = Scope::new(&control, CallContext::new(), &events);

        let result = create(&scope, &request("", "nginx")).await;
        assert!(matches!(
            result,
            Err(SwarmgateError::InvalidArgument(msg)) if msg == "name is required"
        ));

        let result = create(&scope, &request("web", " ")).await;
        assert!(matches!(
            result,
            Err(SwarmgateError::InvalidArgument(msg)) if msg == "image is required"
        ));
    }

    #[test_log::test(tokio::test)]
    async fn test_services_create_update_remove_publish_events() {
        let control = MemoryControlPlane::new();
        let events = EventsHandler::default();
        let mut stream = Box::pin(events.subscribe(None).into_stream());
        let scope = Scope::new(&control, CallContext::new(), &events);

        let created = create(&scope, &request("web", "nginx:1.25")).await.unwrap();
        assert_eq!(created.get_spec().mode, ServiceMode::Replicated { replicas: 1 });

        let change = ServiceRequest {
            replicas: Some(4),
            ..Default::default()
        };
        let updated = update(&scope, "web", &change).await.unwrap();
        assert_eq!(updated.get_spec().mode, ServiceMode::Replicated { replicas: 4 });
        assert_eq!(updated.meta().get_version().index, 2);

        let result = update(&scope, created.id(), &change).await;
        assert!(matches!(result, Err(SwarmgateError::NoChange(_))));

        assert_eq!(remove(&scope, "web").await.unwrap(), created.id());
        assert!(matches!(
            scope.control().get_service(created.id()).await,
            Err(SwarmgateError::NotFound { kind: EntityKind::Service, .. })
        ));

        let actions: Vec<_> = (&mut stream)
            .take(3)
            .map(|event| (event.action, event.id))
            .collect()
            .await;
        assert_eq!(
            actions,
            vec![
                (EventAction::Create, created.id().to_string()),
                (EventAction::Update, created.id().to_string()),
                (EventAction::Remove, created.id().to_string()),
            ]
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_services_inspect_filters_tasks() {
        let control = MemoryControlPlane::new();
        let events = EventsHandler::default();
        let scope = Scope::new(&control, CallContext::new(), &events);

        let service = create(&scope, &request("web", "nginx")).await.unwrap();
        control
            .insert_task(service.id(), None, 1, TaskState::Running, TaskState::Running)
            .await
            .unwrap();
        control
            .insert_task(service.id(), None, 1, TaskState::Shutdown, TaskState::Failed)
            .await
            .unwrap();

        let details = inspect(&scope, "web", false).await.unwrap();
        assert_eq!(details.tasks.len(), 1);
        assert!(details.tasks[0].is_running());

        let details = inspect(&scope, "web", true).await.unwrap();
        assert_eq!(details.tasks.len(), 2);
    }

    #[test_log::test(tokio::test)]
    async fn test_services_update_with_unknown_network_fails() {
        let control = MemoryControlPlane::new();
        let events = EventsHandler::default();
        let scope = Scope::new(&control, CallContext::new(), &events);

        create(&scope, &request("web", "nginx")).await.unwrap();
        let change = ServiceRequest {
            network: Some("missing".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            update(&scope, "web", &change).await,
            Err(SwarmgateError::NotFound { kind: EntityKind::Network, .. })
        ));
    }
}
