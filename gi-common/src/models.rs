//! Gallery and exhibition models

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::date_range::DateRange;
use crate::identity::{self, BYTE_ID_LEN, HASH_ID_LEN};
use crate::validation::{is_uuid, ValidationError};

/// A gallery, identified by an externally assigned UUID
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gallery {
    pub id: String,
    pub name: String,
    /// Schema-free metadata (address, opening hours, ...)
    pub meta: Value,
    pub about: String,
}

impl Gallery {
    /// Returns every failed field check; empty when the gallery is valid
    pub fn validate(&self) -> ValidationError {
        let mut err = ValidationError::new();
        if !is_uuid(&self.id) {
            err.append(format!("Invalid Id: {} is not an UUID", self.id));
        }
        err
    }
}

/// An exhibition, unique by (gallery_id, id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exhibition {
    pub id: String,
    pub gallery_id: String,
    pub title: String,
    pub description: String,
    pub date_range: DateRange,
}

impl Exhibition {
    /// Returns every failed field check; empty when the exhibition is valid
    pub fn validate(&self) -> ValidationError {
        validate_key(&self.gallery_id, &self.id)
    }

    /// Identity fingerprint, independent of the date range
    pub fn hash_id(&self) -> [u8; HASH_ID_LEN] {
        identity::hash_id(&self.gallery_id, &self.id)
    }

    /// Storage key, clustered by the range start
    pub fn byte_id(&self) -> [u8; BYTE_ID_LEN] {
        identity::byte_id(&self.gallery_id, &self.id, self.date_range.start)
    }
}

/// Structural checks on an exhibition's natural key
pub fn validate_key(gallery_id: &str, id: &str) -> ValidationError {
    let mut err = ValidationError::new();
    if id.is_empty() {
        err.append(format!("Invalid id: {} should not empty", id));
    }
    if !is_uuid(gallery_id) {
        err.append(format!("Invalid gallery_id: {} should be UUID", gallery_id));
    }
    err
}
