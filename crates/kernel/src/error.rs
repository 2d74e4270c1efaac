//! Translation subsystem error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the translation subsystem.
///
/// A missing translation is never an error; lookups return `Ok(None)`.
#[derive(Debug, Error)]
pub enum TranslationError {
    /// The record already belongs to an owner.
    #[error("translation {record} already belongs to owner {owner_id}")]
    OwnerAlreadyAssigned { record: Uuid, owner_id: i64 },

    /// The field is not declared translatable by the owning entity type.
    #[error("field '{field}' is not translatable on '{owner_type}'")]
    UnsupportedField {
        owner_type: &'static str,
        field: String,
    },

    /// The underlying storage call failed.
    #[error("translation storage error")]
    Storage(#[from] anyhow::Error),
}

/// Result type alias using TranslationError.
pub type TranslationResult<T> = Result<T, TranslationError>;
