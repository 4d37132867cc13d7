use super::client::{present_list, ServiceRequest};
use crate::{
    config::BindPair,
    models::{Mount, MountKind, Placement, ServiceSpec},
    ValidationError,
};

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Replaces the placement constraints.
pub fn apply_placement(request: &ServiceRequest, spec: &mut ServiceSpec) {
    if let Some(constraints) = present_list(&request.constraint) {
        spec.task
            .placement
            .get_or_insert_with(Placement::default)
            .constraints = constraints.to_vec();
    }
}

/// Appends a writable bind mount for each `source:target` entry not already mounted.
///
/// Entries are validated before any is appended, so a malformed entry leaves the mount list
/// untouched.
pub fn apply_binds(
    request: &ServiceRequest,
    spec: &mut ServiceSpec,
) -> Result<(), ValidationError> {
    let Some(binds) = present_list(&request.bind) else {
        return Ok(());
    };

    let mounts = binds
        .iter()
        .map(|bind| bind.parse::<BindPair>().map(Mount::from))
        .collect::<Result<Vec<_>, _>>()?;

    append_mounts(&mut spec.task.container.mounts, mounts);
    Ok(())
}

/// Appends a writable anonymous volume for each target path not already mounted.
pub fn apply_volumes(
    request: &ServiceRequest,
    spec: &mut ServiceSpec,
) -> Result<(), ValidationError> {
    let Some(volumes) = present_list(&request.volume) else {
        return Ok(());
    };

    if let Some(volume) = volumes.iter().find(|volume| volume.contains(':')) {
        return Err(ValidationError::InvalidVolume(volume.clone()));
    }

    let mounts = volumes.iter().map(|target| Mount {
        kind: MountKind::Volume,
        source: None,
        target: target.clone(),
        writable: true,
    });

    append_mounts(&mut spec.task.container.mounts, mounts);
    Ok(())
}

/// Mounts are identified by kind, source and target; an entry matching an existing mount is
/// skipped so resubmitting a stored list leaves it unchanged.
fn append_mounts(existing: &mut Vec<Mount>, mounts: impl IntoIterator<Item = Mount>) {
    for mount in mounts {
        let mounted = existing.iter().any(|m| {
            m.kind == mount.kind && m.source == mount.source && m.target == mount.target
        });

        if !mounted {
            existing.push(mount);
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_binds_and_volumes_append() {
        let mut spec = ServiceSpec::baseline();
        spec.task.container.mounts.push(Mount {
            kind: MountKind::Volume,
            source: None,
            target: "/existing".to_string(),
            writable: true,
        });

        let request = ServiceRequest {
            bind: Some(vec!["/srv/www:/usr/share/nginx/html".to_string()]),
            volume: Some(vec!["/cache".to_string()]),
            ..Default::default()
        };

        apply_binds(&request, &mut spec).unwrap();
        apply_volumes(&request, &mut spec).unwrap();

        let targets: Vec<_> = spec
            .task
            .container
            .mounts
            .iter()
            .map(|m| (m.kind, m.source.as_deref(), m.target.as_str()))
            .collect();

        assert_eq!(
            targets,
            vec![
                (MountKind::Volume, None, "/existing"),
                (MountKind::Bind, Some("/srv/www"), "/usr/share/nginx/html"),
                (MountKind::Volume, None, "/cache"),
            ]
        );
        assert!(spec.task.container.mounts.iter().all(|m| m.writable));
    }

    #[test]
    fn test_mount_existing_entries_are_not_repeated() {
        let mut spec = ServiceSpec::baseline();
        let request = ServiceRequest {
            bind: Some(vec!["/srv:/data".to_string(), "/srv:/data".to_string()]),
            volume: Some(vec!["/cache".to_string()]),
            ..Default::default()
        };

        apply_binds(&request, &mut spec).unwrap();
        apply_volumes(&request, &mut spec).unwrap();
        let first = spec.task.container.mounts.clone();
        assert_eq!(first.len(), 2);

        apply_binds(&request, &mut spec).unwrap();
        apply_volumes(&request, &mut spec).unwrap();
        assert_eq!(spec.task.container.mounts, first);

        let request = ServiceRequest {
            bind: Some(vec!["/other:/data".to_string()]),
            ..Default::default()
        };
        apply_binds(&request, &mut spec).unwrap();
        assert_eq!(spec.task.container.mounts.len(), 3);
    }

    #[test]
    fn test_mount_bind_without_separator_names_the_entry() {
        let mut spec = ServiceSpec::baseline();
        let request = ServiceRequest {
            bind: Some(vec!["/a:/b".to_string(), "/no-separator".to_string()]),
            ..Default::default()
        };

        let err = apply_binds(&request, &mut spec).unwrap_err();
        assert_eq!(err, ValidationError::InvalidBind("/no-separator".to_string()));
        assert!(err.to_string().contains("/no-separator"));
        assert!(spec.task.container.mounts.is_empty());
    }

    #[test]
    fn test_mount_volume_with_separator_fails() {
        let mut spec = ServiceSpec::baseline();
        let request = ServiceRequest {
            volume: Some(vec!["/host:/guest".to_string()]),
            ..Default::default()
        };

        assert_eq!(
            apply_volumes(&request, &mut spec),
            Err(ValidationError::InvalidVolume("/host:/guest".to_string()))
        );
    }

    #[test]
    fn test_mount_placement_replaces_constraints() {
        let mut spec = ServiceSpec::baseline();
        apply_placement(&ServiceRequest::default(), &mut spec);
        assert_eq!(spec.task.placement, None);

        let request = ServiceRequest {
            constraint: Some(vec!["node.role==worker".to_string()]),
            ..Default::default()
        };
        apply_placement(&request, &mut spec);

        assert_eq!(
            spec.task.placement,
            Some(Placement {
                constraints: vec!["node.role==worker".to_string()],
            })
        );
    }
}
