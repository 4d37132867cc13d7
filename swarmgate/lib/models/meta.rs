use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use getset::Getters;
use serde::{Deserialize, Serialize};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A monotonic version stamp. Updates must echo the version observed at read time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    /// The store index at which the entity was last written.
    pub index: u64,
}

/// Bookkeeping attached to every entity by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[getset(get = "pub with_prefix")]
pub struct Meta {
    /// The current version stamp.
    pub(crate) version: Version,

    /// When the entity was created.
    pub(crate) created_at: DateTime<Utc>,

    /// When the entity was last updated.
    pub(crate) updated_at: DateTime<Utc>,
}

/// Name and labels shared by every specification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotations {
    /// The human name.
    pub name: String,

    /// Arbitrary key/value labels.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Version {
    /// Creates a version stamp at the given index.
    pub fn new(index: u64) -> Self {
        Self { index }
    }
}

impl Meta {
    /// Creates the metadata of a freshly created entity, at version 1.
    pub(crate) fn created_now() -> Self {
        let now = Utc::now();
        Self {
            version: Version::new(1),
            created_at: now,
            updated_at: now,
        }
    }

    /// Advances the version stamp and touches the update time.
    pub(crate) fn bump(&mut self) {
        self.version.index += 1;
        self.updated_at = Utc::now();
    }
}

impl Annotations {
    /// Creates annotations carrying only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            labels: BTreeMap::new(),
        }
    }
}
