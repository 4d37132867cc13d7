use std::{fmt, str::FromStr};

use crate::{
    models::{Mount, MountKind},
    ValidationError,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A host path bound into the container.
///
/// ## Format
/// A bind pair is written `source:target`. The string is split on its first `:`, and both sides
/// must be non-empty.
///
/// ## Examples
///
/// ```
/// use swarmgate::config::BindPair;
///
/// let pair = "/var/data:/data".parse::<BindPair>().unwrap();
/// assert_eq!(pair.get_source(), "/var/data");
/// assert_eq!(pair.get_target(), "/data");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindPair {
    source: String,
    target: String,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl BindPair {
    /// Creates a new bind pair.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Returns the host path.
    pub fn get_source(&self) -> &str {
        &self.source
    }

    /// Returns the path inside the container.
    pub fn get_target(&self) -> &str {
        &self.target
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl FromStr for BindPair {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((source, target)) if !source.is_empty() && !target.is_empty() => {
                Ok(Self::new(source, target))
            }
            _ => Err(ValidationError::InvalidBind(s.to_string())),
        }
    }
}

impl fmt::Display for BindPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.target)
    }
}

impl From<BindPair> for Mount {
    fn from(pair: BindPair) -> Self {
        Mount {
            kind: MountKind::Bind,
            source: Some(pair.source),
            target: pair.target,
            writable: true,
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
    fn test_bind_pair_splits_on_first_separator() {
        let pair: BindPair = "/host:/guest:ro".parse().unwrap();
        assert_eq!(pair.get_source(), "/host");
        assert_eq!(pair.get_target(), "/guest:ro");
    }

    #[test]
    fn test_bind_pair_into_writable_mount() {
        let mount = Mount::from(BindPair::new("/a", "/b"));
        assert_eq!(mount.kind, MountKind::Bind);
        assert_eq!(mount.source.as_deref(), Some("/a"));
        assert_eq!(mount.target, "/b");
        assert!(mount.writable);
    }

    #[test]
    fn test_bind_pair_rejects_missing_side() {
        for input in ["/only-one-side", ":/b", "/a:", ":"] {
            assert_eq!(
                input.parse::<BindPair>(),
                Err(ValidationError::InvalidBind(input.to_string()))
            );
        }
    }
}
