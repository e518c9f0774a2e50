//! Mount point identity

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Page-unique element id a renderer draws into.
///
/// Generated once per web part instance and kept for its lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MountPoint {
    id: String,
}

impl MountPoint {
    /// Fresh random identity
    pub fn generate() -> Self {
        Self {
            id: Uuid::new_v4().hyphenated().to_string(),
        }
    }

    pub fn from_id(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Element id of the hidden gallery container
    pub fn gallery_element_id(&self) -> String {
        format!("{}-gallery", self.id)
    }
}

impl fmt::Display for MountPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}
