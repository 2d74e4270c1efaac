//! Placeholder creation so that every field × locale has a bindable slot.

use tracing::debug;

use super::capability::Translatable;
use crate::error::{TranslationError, TranslationResult};
use crate::locale::LocaleSettings;

/// Ensure every declared field of `entity` has a record for every locale.
///
/// Missing slots get an empty-string placeholder; existing records are left
/// untouched. Returns the number of placeholders created.
pub async fn prepare(
    entity: &mut dyn Translatable,
    locales: &[String],
) -> TranslationResult<usize> {
    let fields = entity.translatable_fields();
    prepare_fields(entity, fields, locales).await
}

/// Like [`prepare`], restricted to `fields`.
///
/// Fails with [`TranslationError::UnsupportedField`] before touching the
/// store if any field is not declared by the entity.
pub async fn prepare_fields(
    entity: &mut dyn Translatable,
    fields: &[&str],
    locales: &[String],
) -> TranslationResult<usize> {
    if let Some(field) = fields.iter().find(|f| !entity.is_translatable_field(f)) {
        return Err(TranslationError::UnsupportedField {
            owner_type: entity.owner_type(),
            field: (*field).to_string(),
        });
    }

    entity.load_translations().await?;

    let mut created = 0;
    for field in fields {
        for locale in locales {
            if entity.translation_store().find(field, locale).is_none() {
                entity.add_or_update_translation(field, "", locale);
                created += 1;
            }
        }
    }

    if created > 0 {
        debug!(
            owner_type = entity.owner_type(),
            owner_id = ?entity.id(),
            created,
            "created translation placeholders"
        );
    }
    Ok(created)
}

/// [`prepare`] bound to the configured locales.
#[derive(Debug, Clone)]
pub struct TranslationInitializer {
    locales: Vec<String>,
}

impl TranslationInitializer {
    pub fn new(locales: Vec<String>) -> Self {
        Self { locales }
    }

    /// Use every supported locale, in configured order.
    pub fn from_settings(settings: &LocaleSettings) -> Self {
        Self::new(settings.supported().to_vec())
    }

    pub fn locales(&self) -> &[String] {
        &self.locales
    }

    pub async fn prepare(&self, entity: &mut dyn Translatable) -> TranslationResult<usize> {
        prepare(entity, &self.locales).await
    }
}
