//! Unit of work: one transactional flush of pending catalog changes.

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::error::TranslationResult;
use crate::models::CatalogEntity;
use crate::storage::Storage;
use crate::translation::{FlushBatch, OwnerId, Translatable, TranslationSynchronizer};

/// Object-safe view of a [`CatalogEntity`] used by the flush.
pub trait PersistentEntity: Translatable {
    fn entity_type(&self) -> &'static str;

    /// The JSON document stored for the entity.
    fn to_document(&self) -> Result<serde_json::Value>;

    fn set_storage_id(&mut self, id: OwnerId);
}

impl<T: CatalogEntity> PersistentEntity for T {
    fn entity_type(&self) -> &'static str {
        T::ENTITY_TYPE
    }

    fn to_document(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self)
            .with_context(|| format!("failed to serialize {} document", T::ENTITY_TYPE))
    }

    fn set_storage_id(&mut self, id: OwnerId) {
        self.assign_id(id);
    }
}

/// What one flush wrote.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlushSummary {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,

    /// Translation records that received the id of a newly inserted owner.
    pub stamped: usize,
}

/// Pending saves and deletions, written in a single transaction by
/// [`UnitOfWork::flush`].
pub struct UnitOfWork<'a> {
    storage: &'a dyn Storage,
    synchronizer: &'a TranslationSynchronizer,
    batch: FlushBatch<'a, dyn PersistentEntity + 'a>,
}

impl<'a> UnitOfWork<'a> {
    pub fn new(storage: &'a dyn Storage, synchronizer: &'a TranslationSynchronizer) -> Self {
        Self {
            storage,
            synchronizer,
            batch: FlushBatch::default(),
        }
    }

    /// Schedule an entity for saving: insert when it has no id yet, update
    /// otherwise.
    ///
    /// An entity without a translation loader is attached to this catalog's
    /// locale and loader first.
    pub fn persist(&mut self, entity: &'a mut dyn PersistentEntity) {
        if !entity.translation_store().has_loader() {
            self.synchronizer.attach(&mut *entity);
        }
        if entity.id().is_some() {
            self.batch.tracked.push(entity);
        } else {
            self.batch.inserts.push(entity);
        }
    }

    /// Schedule an entity for deletion together with all its translations.
    ///
    /// An entity that was never inserted has nothing to delete.
    pub fn remove(&mut self, entity: &'a mut dyn PersistentEntity) {
        if entity.id().is_none() {
            debug!(
                entity_type = entity.entity_type(),
                "ignoring removal of unsaved entity"
            );
            return;
        }
        self.batch.deletes.push(entity);
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    /// Write everything in one transaction.
    ///
    /// On error nothing is committed; ids already assigned to inserted
    /// entities in memory refer to rolled-back rows.
    pub async fn flush(self) -> TranslationResult<FlushSummary> {
        let Self {
            storage,
            synchronizer,
            mut batch,
        } = self;

        let mut summary = FlushSummary::default();
        if batch.is_empty() {
            return Ok(summary);
        }

        let mut tx = storage.begin().await?;

        let pending = synchronizer.before_flush(&mut *tx, &mut batch).await?;

        for entity in batch.tracked.iter() {
            let Some(id) = entity.id() else {
                continue;
            };
            let document = entity.to_document()?;
            if tx.update_entity(entity.entity_type(), id, &document).await? {
                summary.updated += 1;
            } else {
                // Deleted concurrently: drop the records reconciled above.
                let removed = tx.delete_by_owner(entity.owner_type(), id).await?;
                warn!(
                    entity_type = entity.entity_type(),
                    id, removed, "saved entity no longer exists, translations dropped"
                );
            }
        }

        for entity in batch.inserts.iter_mut() {
            let document = entity.to_document()?;
            let id = tx.insert_entity(entity.entity_type(), &document).await?;
            entity.set_storage_id(id);
            summary.inserted += 1;
        }

        for entity in batch.deletes.iter() {
            let Some(id) = entity.id() else {
                continue;
            };
            if tx.delete_entity(entity.entity_type(), id).await? {
                summary.deleted += 1;
            }
        }

        summary.stamped = synchronizer
            .after_flush(&mut *tx, &mut batch, pending)
            .await?;

        tx.commit().await?;

        info!(
            inserted = summary.inserted,
            updated = summary.updated,
            deleted = summary.deleted,
            stamped = summary.stamped,
            "catalog flushed"
        );
        Ok(summary)
    }
}
