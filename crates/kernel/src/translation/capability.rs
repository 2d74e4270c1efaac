//! The capability every translatable catalog entity implements.

use async_trait::async_trait;

use super::record::{OwnerId, TranslationRecord};
use super::store::{OwnerRef, TranslationStore};
use crate::error::TranslationResult;

/// A domain entity with per-locale text fields.
///
/// Implementors only expose their identity, their declared field set and
/// their [`TranslationStore`]; every store operation is a provided method, so
/// the synchronizer and initializer work against `dyn Translatable` without
/// knowing concrete entity types.
#[async_trait]
pub trait Translatable: Send + Sync {
    /// Type tag recorded as the owner type of every translation.
    fn owner_type(&self) -> &'static str;

    /// Storage-assigned id, `None` until the entity is first inserted.
    fn id(&self) -> Option<OwnerId>;

    /// Field names that may carry translations.
    fn translatable_fields(&self) -> &'static [&'static str];

    fn translation_store(&self) -> &TranslationStore;

    fn translation_store_mut(&mut self) -> &mut TranslationStore;

    /// Logical foreign key used by this entity's records.
    fn owner_ref(&self) -> OwnerRef<'static> {
        OwnerRef {
            owner_type: self.owner_type(),
            owner_id: self.id(),
        }
    }

    fn is_translatable_field(&self, field: &str) -> bool {
        self.translatable_fields().contains(&field)
    }

    /// Set the value for (field, locale), updating an existing record in place.
    fn add_or_update_translation(&mut self, field: &str, value: &str, locale: &str) {
        let owner = self.owner_ref();
        self.translation_store_mut()
            .add_or_update(owner, field, value, locale);
    }

    /// Look up a value; `None` means there is no translation.
    ///
    /// `locale` defaults to [`Translatable::default_locale`]. An empty store
    /// of a persisted entity is loaded lazily first.
    async fn translation_value(
        &mut self,
        field: &str,
        locale: Option<&str>,
    ) -> TranslationResult<Option<String>> {
        let owner = self.owner_ref();
        self.translation_store_mut()
            .value(owner, field, locale)
            .await
    }

    /// Whether a record exists for (field, locale), loading lazily first.
    async fn has_translation(&mut self, field: &str, locale: &str) -> TranslationResult<bool> {
        self.load_translations().await?;
        Ok(self.translation_store().find(field, locale).is_some())
    }

    /// Force the lazy load if it has not happened yet.
    async fn load_translations(&mut self) -> TranslationResult<()> {
        let owner = self.owner_ref();
        self.translation_store_mut().ensure_loaded(owner).await
    }

    /// Remove the record for (field, locale). Returns `false` on a miss.
    fn remove_translation(&mut self, field: &str, locale: &str) -> bool {
        self.translation_store_mut().remove(field, locale)
    }

    /// The live records of this entity.
    fn translations(&self) -> &[TranslationRecord] {
        self.translation_store().records()
    }

    /// (field, value) pairs for one locale, in store order.
    fn translations_for_locale(&self, locale: &str) -> Vec<(&str, Option<&str>)> {
        self.translations()
            .iter()
            .filter(|r| r.locale() == locale)
            .map(|r| (r.field(), r.value()))
            .collect()
    }

    /// Bulk-replace the records; no lazy load happens afterwards.
    fn set_translations_collection(&mut self, records: Vec<TranslationRecord>) {
        self.translation_store_mut().replace_all(records);
    }

    fn default_locale(&self) -> &str {
        self.translation_store().default_locale()
    }

    fn set_default_locale(&mut self, locale: &str) {
        self.translation_store_mut().set_default_locale(locale);
    }
}
