//! Per-entity in-memory translation store.

use std::sync::Arc;

use tracing::debug;

use super::record::{OwnerId, TranslationRecord};
use crate::error::TranslationResult;
use crate::storage::TranslationLoader;

/// Locale used when neither the caller nor the entity names one.
pub const FALLBACK_LOCALE: &str = "en";

/// Logical owner of a store: entity type tag plus storage id (if any).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerRef<'a> {
    pub owner_type: &'a str,
    pub owner_id: Option<OwnerId>,
}

/// Translation records owned by one entity instance.
///
/// Holds at most one record per (field, locale). The store is populated
/// eagerly through [`TranslationStore::replace_all`] or lazily on first read
/// through the injected loader.
#[derive(Clone)]
pub struct TranslationStore {
    records: Vec<TranslationRecord>,
    loaded: bool,
    default_locale: String,
    loader: Option<Arc<dyn TranslationLoader>>,
}

impl Default for TranslationStore {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            loaded: false,
            default_locale: FALLBACK_LOCALE.to_string(),
            loader: None,
        }
    }
}

impl TranslationStore {
    /// Inject the loader used for lazy loading.
    pub fn attach_loader(&mut self, loader: Arc<dyn TranslationLoader>) {
        self.loader = Some(loader);
    }

    pub fn has_loader(&self) -> bool {
        self.loader.is_some()
    }

    pub fn records(&self) -> &[TranslationRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [TranslationRecord] {
        &mut self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store was populated from storage (or deliberately set).
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    pub fn set_default_locale(&mut self, locale: impl Into<String>) {
        self.default_locale = locale.into();
    }

    /// Bulk-replace the records and mark the store loaded.
    ///
    /// Later duplicates of a (field, locale) key replace earlier ones.
    pub fn replace_all(&mut self, records: Vec<TranslationRecord>) {
        self.records.clear();
        for record in records {
            match self
                .records
                .iter()
                .position(|r| r.key() == record.key())
            {
                Some(index) => self.records[index] = record,
                None => self.records.push(record),
            }
        }
        self.loaded = true;
    }

    /// Find the record for a (field, locale) slot.
    pub fn find(&self, field: &str, locale: &str) -> Option<&TranslationRecord> {
        self.records.iter().find(|r| r.matches(field, locale))
    }

    /// Update the slot in place or append a new record for it.
    pub fn add_or_update(&mut self, owner: OwnerRef<'_>, field: &str, value: &str, locale: &str) {
        if let Some(record) = self.records.iter_mut().find(|r| r.matches(field, locale)) {
            record.set_value(Some(value.to_string()));
            return;
        }

        self.records.push(TranslationRecord::new(
            owner.owner_type,
            owner.owner_id,
            locale,
            field,
            Some(value.to_string()),
        ));
    }

    /// Remove the slot's record. Returns `false` when there was none.
    pub fn remove(&mut self, field: &str, locale: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| !r.matches(field, locale));
        self.records.len() != before
    }

    /// Load from storage if the store is empty, never loaded and the owner is
    /// persisted.
    pub async fn ensure_loaded(&mut self, owner: OwnerRef<'_>) -> TranslationResult<()> {
        if self.loaded || !self.records.is_empty() {
            return Ok(());
        }
        let Some(owner_id) = owner.owner_id else {
            return Ok(());
        };
        let Some(loader) = self.loader.clone() else {
            debug!(
                owner_type = owner.owner_type,
                owner_id, "no translation loader attached, skipping lazy load"
            );
            return Ok(());
        };

        let records = loader.find_by_owner(owner.owner_type, owner_id).await?;
        debug!(
            owner_type = owner.owner_type,
            owner_id,
            count = records.len(),
            "lazily loaded translations"
        );
        self.replace_all(records);
        Ok(())
    }

    /// Resolve a value, loading lazily first if needed.
    ///
    /// `locale` defaults to the store's default locale.
    pub async fn value(
        &mut self,
        owner: OwnerRef<'_>,
        field: &str,
        locale: Option<&str>,
    ) -> TranslationResult<Option<String>> {
        self.ensure_loaded(owner).await?;

        let locale = locale.unwrap_or(&self.default_locale);
        Ok(self
            .find(field, locale)
            .and_then(|r| r.value())
            .map(str::to_string))
    }

    /// Stamp `owner_id` onto every record that is still missing one.
    ///
    /// Returns the number of records stamped.
    pub fn stamp_owner_id(&mut self, owner_id: OwnerId) -> TranslationResult<usize> {
        let mut stamped = 0;
        for record in self.records.iter_mut().filter(|r| r.owner_id().is_none()) {
            record.set_owner_id(owner_id)?;
            stamped += 1;
        }
        Ok(stamped)
    }

    /// Fold persisted records into a store that was never loaded.
    ///
    /// In-memory records win over persisted ones with the same key. Returns
    /// the number of persisted records taken over.
    pub fn merge_persisted(&mut self, persisted: Vec<TranslationRecord>) -> usize {
        let mut merged = 0;
        for record in persisted {
            if self.find(record.field(), record.locale()).is_none() {
                self.records.push(record);
                merged += 1;
            }
        }
        self.loaded = true;
        merged
    }
}

impl std::fmt::Debug for TranslationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationStore")
            .field("records", &self.records)
            .field("loaded", &self.loaded)
            .field("default_locale", &self.default_locale)
            .field("has_loader", &self.loader.is_some())
            .finish()
    }
}
