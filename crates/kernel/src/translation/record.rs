//! Translation record: one (owner, locale, field) → text tuple.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{TranslationError, TranslationResult};

/// Storage-assigned identifier of a catalog entity.
pub type OwnerId = i64;

/// A single persisted translation value.
///
/// The owner is referenced logically by type tag and id, never by a live
/// reference, so records stay serializable on their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TranslationRecord {
    id: Uuid,
    owner_type: String,
    owner_id: Option<OwnerId>,
    locale: String,
    field: String,
    value: Option<String>,
}

impl TranslationRecord {
    /// Create a new record with a fresh UUIDv7 identifier.
    pub fn new(
        owner_type: impl Into<String>,
        owner_id: Option<OwnerId>,
        locale: impl Into<String>,
        field: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            owner_type: owner_type.into(),
            owner_id,
            locale: locale.into(),
            field: field.into(),
            value,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn owner_type(&self) -> &str {
        &self.owner_type
    }

    pub fn owner_id(&self) -> Option<OwnerId> {
        self.owner_id
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn set_value(&mut self, value: Option<String>) {
        self.value = value;
    }

    /// Attach the record to its owner.
    ///
    /// Only legal while no owner id is set; a second assignment is a logic
    /// error in the caller.
    pub fn set_owner_id(&mut self, owner_id: OwnerId) -> TranslationResult<()> {
        if let Some(existing) = self.owner_id {
            return Err(TranslationError::OwnerAlreadyAssigned {
                record: self.id,
                owner_id: existing,
            });
        }
        self.owner_id = Some(owner_id);
        Ok(())
    }

    /// Whether this record holds the given (field, locale) slot.
    pub fn matches(&self, field: &str, locale: &str) -> bool {
        self.field == field && self.locale == locale
    }

    /// The (field, locale) key identifying the record within its owner.
    pub fn key(&self) -> (&str, &str) {
        (&self.field, &self.locale)
    }
}
