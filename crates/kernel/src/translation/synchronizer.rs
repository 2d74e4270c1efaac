//! Persistence lifecycle hooks for translatable entities.
//!
//! A flush cycle runs in three steps:
//!
//! 1. [`TranslationSynchronizer::before_flush`] reconciles every tracked
//!    entity against storage, stages new entities as pending (their owner id
//!    is not known yet) and cascades deletions.
//! 2. The storage layer writes the owner rows; inserts receive their ids.
//! 3. [`TranslationSynchronizer::after_flush`] stamps the new ids onto the
//!    staged records and persists them.
//!
//! Every reconcile finishes before the first cascade delete starts.
//! Storage errors are returned as-is; the caller drops the transaction.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::capability::Translatable;
use super::record::{OwnerId, TranslationRecord};
use crate::error::TranslationResult;
use crate::storage::{TranslationLoader, TranslationWriter};

/// Entities taking part in one flush, grouped by what happens to them.
pub struct FlushBatch<'a, E: Translatable + ?Sized> {
    /// Already persisted entities that are being saved.
    pub tracked: Vec<&'a mut E>,

    /// New entities scheduled for insertion.
    pub inserts: Vec<&'a mut E>,

    /// Entities scheduled for deletion.
    pub deletes: Vec<&'a mut E>,
}

impl<E: Translatable + ?Sized> Default for FlushBatch<'_, E> {
    fn default() -> Self {
        Self {
            tracked: Vec::new(),
            inserts: Vec::new(),
            deletes: Vec::new(),
        }
    }
}

impl<E: Translatable + ?Sized> FlushBatch<'_, E> {
    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty() && self.inserts.is_empty() && self.deletes.is_empty()
    }
}

/// Inserted entities whose records wait for the owner id.
///
/// Produced by [`TranslationSynchronizer::before_flush`] and consumed by
/// [`TranslationSynchronizer::after_flush`].
#[derive(Debug, Default)]
#[must_use = "pending owners must be committed with after_flush"]
pub struct PendingOwners {
    indices: Vec<usize>,
}

impl PendingOwners {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Counts from one reconcile pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileStats {
    pub persisted: usize,
    pub deleted: usize,
}

/// Loads translations into entities and keeps storage in step on flush.
#[derive(Clone)]
pub struct TranslationSynchronizer {
    loader: Arc<dyn TranslationLoader>,
    locale: String,
}

impl TranslationSynchronizer {
    /// `locale` is the current request/process locale applied to loaded
    /// entities as their default.
    pub fn new(loader: Arc<dyn TranslationLoader>, locale: impl Into<String>) -> Self {
        Self {
            loader,
            locale: locale.into(),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Prepare an entity materialised without translations for lazy access.
    pub fn attach<E: Translatable + ?Sized>(&self, entity: &mut E) {
        entity.set_default_locale(&self.locale);
        entity
            .translation_store_mut()
            .attach_loader(self.loader.clone());
    }

    /// Load hook: populate the entity's store from storage.
    pub async fn on_load<E: Translatable + ?Sized>(&self, entity: &mut E) -> TranslationResult<()> {
        self.attach(entity);

        let Some(owner_id) = entity.id() else {
            return Ok(());
        };
        let records = self
            .loader
            .find_by_owner(entity.owner_type(), owner_id)
            .await?;
        debug!(
            owner_type = entity.owner_type(),
            owner_id,
            count = records.len(),
            "loaded translations"
        );
        entity.set_translations_collection(records);
        Ok(())
    }

    /// Populate a page of entities of one type with a single query.
    ///
    /// Every store is marked loaded, including those without records, so no
    /// lazy fetch follows.
    pub async fn eager_load<E: Translatable>(&self, entities: &mut [E]) -> TranslationResult<()> {
        let Some(first) = entities.first() else {
            return Ok(());
        };
        let owner_type = first.owner_type();
        let ids: Vec<OwnerId> = entities.iter().filter_map(|e| e.id()).collect();

        let records = if ids.is_empty() {
            Vec::new()
        } else {
            self.loader.find_by_owners(owner_type, &ids).await?
        };

        let mut by_owner: HashMap<OwnerId, Vec<TranslationRecord>> = HashMap::new();
        for record in records {
            if let Some(owner_id) = record.owner_id() {
                by_owner.entry(owner_id).or_default().push(record);
            }
        }

        for entity in entities.iter_mut() {
            self.attach(entity);
            let records = entity
                .id()
                .and_then(|id| by_owner.remove(&id))
                .unwrap_or_default();
            entity.set_translations_collection(records);
        }

        debug!(
            owner_type,
            entities = entities.len(),
            "eagerly loaded translations"
        );
        Ok(())
    }

    /// Pre-flush hook.
    ///
    /// Returns the inserted entities whose records must be stamped by
    /// [`Self::after_flush`] once their ids are known.
    pub async fn before_flush<W, E>(
        &self,
        writer: &mut W,
        batch: &mut FlushBatch<'_, E>,
    ) -> TranslationResult<PendingOwners>
    where
        W: TranslationWriter + ?Sized,
        E: Translatable + ?Sized,
    {
        // Tracked entities that were never loaded would otherwise have their
        // persisted records deleted as "removed".
        for entity in batch.tracked.iter_mut() {
            if entity.translation_store().is_loaded() {
                continue;
            }
            let Some(owner_id) = entity.id() else {
                continue;
            };
            let records = writer.find_by_owner(entity.owner_type(), owner_id).await?;
            let merged = entity.translation_store_mut().merge_persisted(records);
            debug!(
                owner_type = entity.owner_type(),
                owner_id, merged, "re-synced translations before flush"
            );
        }

        let mut totals = ReconcileStats::default();
        for entity in batch.tracked.iter_mut() {
            let stats = reconcile(&mut *writer, &mut **entity).await?;
            totals.persisted += stats.persisted;
            totals.deleted += stats.deleted;
        }

        let mut pending = PendingOwners::default();
        for (index, entity) in batch.inserts.iter().enumerate() {
            if entity.id().is_none() {
                pending.indices.push(index);
            } else {
                warn!(
                    owner_type = entity.owner_type(),
                    owner_id = ?entity.id(),
                    "entity scheduled for insertion already has an id"
                );
            }
        }

        let mut cascaded = 0;
        for entity in batch.deletes.iter() {
            let Some(owner_id) = entity.id() else {
                continue;
            };
            cascaded += writer
                .delete_by_owner(entity.owner_type(), owner_id)
                .await?;
        }

        debug!(
            persisted = totals.persisted,
            deleted = totals.deleted,
            pending = pending.len(),
            cascaded,
            "translations reconciled before flush"
        );
        Ok(pending)
    }

    /// Post-flush hook: stamp new owner ids onto staged records and persist
    /// them.
    ///
    /// Returns the number of records that received an owner id.
    pub async fn after_flush<W, E>(
        &self,
        writer: &mut W,
        batch: &mut FlushBatch<'_, E>,
        pending: PendingOwners,
    ) -> TranslationResult<usize>
    where
        W: TranslationWriter + ?Sized,
        E: Translatable + ?Sized,
    {
        let mut stamped = 0;
        for index in pending.indices {
            let Some(entity) = batch.inserts.get_mut(index) else {
                continue;
            };
            let Some(owner_id) = entity.id() else {
                warn!(
                    owner_type = entity.owner_type(),
                    "inserted entity has no id after flush, translations not stored"
                );
                continue;
            };

            let store = entity.translation_store_mut();
            stamped += store.stamp_owner_id(owner_id)?;
            for record in store.records() {
                writer.persist(record).await?;
            }
        }

        if stamped > 0 {
            info!(stamped, "assigned owner ids to new translations");
        }
        Ok(stamped)
    }
}

/// Diff one entity's store against storage: persist everything in memory,
/// delete persisted records whose key is gone from memory.
pub async fn reconcile<W, E>(writer: &mut W, entity: &mut E) -> TranslationResult<ReconcileStats>
where
    W: TranslationWriter + ?Sized,
    E: Translatable + ?Sized,
{
    let Some(owner_id) = entity.id() else {
        return Ok(ReconcileStats::default());
    };
    let owner_type = entity.owner_type();
    let persisted = writer.find_by_owner(owner_type, owner_id).await?;

    let store = entity.translation_store_mut();
    for record in store.records_mut() {
        if record.owner_id().is_none() {
            record.set_owner_id(owner_id)?;
        }
    }

    let mut stats = ReconcileStats::default();
    for record in store.records() {
        writer.persist(record).await?;
        stats.persisted += 1;
    }

    let present: HashSet<(&str, &str)> = store.records().iter().map(|r| r.key()).collect();
    for record in persisted.iter().filter(|r| !present.contains(&r.key())) {
        if writer.delete(record).await? {
            stats.deleted += 1;
        }
    }

    debug!(
        owner_type,
        owner_id,
        persisted = stats.persisted,
        deleted = stats.deleted,
        "reconciled translations"
    );
    Ok(stats)
}

impl std::fmt::Debug for TranslationSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationSynchronizer")
            .field("locale", &self.locale)
            .finish()
    }
}
