//! Task operations.

use super::Scope;
use crate::{
    control::ListFilter,
    events::EventAction,
    models::{Entity, Task},
    SwarmgateResult,
};

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Lists tasks. Unless `all` is set, tasks whose desired state is past running are left out.
pub async fn list(scope: &Scope<'_>, all: bool) -> SwarmgateResult<Vec<Task>> {
    let tasks = scope
        .call(scope.control().list_tasks(&ListFilter::default()))
        .await?;

    Ok(tasks
        .into_iter()
        .filter(|task| all || task.is_desired_active())
        .collect())
}

/// Returns a single task. Tasks have no names, so only exact IDs are accepted.
pub async fn inspect(scope: &Scope<'_>, id: &str) -> SwarmgateResult<Task> {
    scope.call(scope.control().get_task(id)).await
}

/// Removes a task and returns its ID.
pub async fn remove(scope: &Scope<'_>, id: &str) -> SwarmgateResult<String> {
    let task = inspect(scope, id).await?;
    scope.call(scope.control().remove_task(task.id())).await?;

    tracing::info!(id = %task.id(), service = %task.get_service_id(), "task removed");
    scope.publish(EventAction::Remove, &task);

    Ok(task.id().to_string())
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
