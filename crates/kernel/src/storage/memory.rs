//! In-memory storage backend.
//!
//! A transaction works on a copy of the shared state and records every write
//! as an operation; commit replays the operations onto the shared state under
//! its lock. Owner ids come from a shared sequence that is not rolled back,
//! like a PostgreSQL sequence.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use anyhow::{Result, bail};
use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use super::{
    EntityRow, EntityWriter, Pagination, SortOrder, Storage, StorageTransaction,
    TranslationLoader, TranslationWriter,
};
use crate::translation::{OwnerId, TranslationRecord};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    entities: BTreeMap<(String, OwnerId), serde_json::Value>,
    translations: Vec<TranslationRecord>,
}

#[derive(Debug, Clone)]
enum Op {
    PutEntity {
        entity_type: String,
        id: OwnerId,
        data: serde_json::Value,
    },
    DeleteEntity {
        entity_type: String,
        id: OwnerId,
    },
    PutRecord(TranslationRecord),
    DeleteRecord(TranslationRecord),
    DeleteOwner {
        owner_type: String,
        owner_id: OwnerId,
    },
}

fn same_key(a: &TranslationRecord, b: &TranslationRecord) -> bool {
    a.owner_type() == b.owner_type()
        && a.owner_id() == b.owner_id()
        && a.locale() == b.locale()
        && a.field() == b.field()
}

fn owned_by(record: &TranslationRecord, owner_type: &str, owner_id: OwnerId) -> bool {
    record.owner_type() == owner_type && record.owner_id() == Some(owner_id)
}

impl MemoryState {
    /// Apply one write and return the number of affected rows.
    fn apply(&mut self, op: &Op) -> u64 {
        match op {
            Op::PutEntity {
                entity_type,
                id,
                data,
            } => {
                self.entities
                    .insert((entity_type.clone(), *id), data.clone());
                1
            }
            Op::DeleteEntity { entity_type, id } => {
                u64::from(self.entities.remove(&(entity_type.clone(), *id)).is_some())
            }
            Op::PutRecord(record) => {
                match self.translations.iter_mut().find(|r| same_key(r, record)) {
                    Some(existing) => existing.set_value(record.value().map(str::to_string)),
                    None => self.translations.push(record.clone()),
                }
                1
            }
            Op::DeleteRecord(record) => {
                let before = self.translations.len();
                self.translations.retain(|r| !same_key(r, record));
                (before - self.translations.len()) as u64
            }
            Op::DeleteOwner {
                owner_type,
                owner_id,
            } => {
                let before = self.translations.len();
                self.translations
                    .retain(|r| !owned_by(r, owner_type, *owner_id));
                (before - self.translations.len()) as u64
            }
        }
    }

    fn records_of(&self, owner_type: &str, owner_id: OwnerId) -> Vec<TranslationRecord> {
        let mut records: Vec<TranslationRecord> = self
            .translations
            .iter()
            .filter(|r| owned_by(r, owner_type, owner_id))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.key().cmp(&b.key()));
        records
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    state: Mutex<MemoryState>,
    sequence: AtomicI64,
    queries: AtomicUsize,
}

/// Storage backend keeping everything in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<MemoryInner>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of translation queries served through [`TranslationLoader`].
    pub fn query_count(&self) -> usize {
        self.inner.queries.load(Ordering::Relaxed)
    }

    /// Every committed translation record.
    pub fn all_translations(&self) -> Vec<TranslationRecord> {
        self.inner.state.lock().translations.clone()
    }

    /// Number of committed owner rows of one type.
    pub fn entity_count(&self, entity_type: &str) -> usize {
        self.inner
            .state
            .lock()
            .entities
            .keys()
            .filter(|(t, _)| t == entity_type)
            .count()
    }
}

#[async_trait]
impl TranslationLoader for MemoryStorage {
    async fn find_by_owner(
        &self,
        owner_type: &str,
        owner_id: OwnerId,
    ) -> Result<Vec<TranslationRecord>> {
        self.inner.queries.fetch_add(1, Ordering::Relaxed);
        Ok(self.inner.state.lock().records_of(owner_type, owner_id))
    }

    async fn find_by_owners(
        &self,
        owner_type: &str,
        owner_ids: &[OwnerId],
    ) -> Result<Vec<TranslationRecord>> {
        self.inner.queries.fetch_add(1, Ordering::Relaxed);
        let state = self.inner.state.lock();
        Ok(state
            .translations
            .iter()
            .filter(|r| {
                r.owner_type() == owner_type
                    && r.owner_id().is_some_and(|id| owner_ids.contains(&id))
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn begin(&self) -> Result<Box<dyn StorageTransaction>> {
        let working = self.inner.state.lock().clone();
        Ok(Box::new(MemoryTransaction {
            inner: self.inner.clone(),
            working,
            ops: Vec::new(),
        }))
    }

    async fn find_entity(&self, entity_type: &str, id: OwnerId) -> Result<Option<EntityRow>> {
        let state = self.inner.state.lock();
        Ok(state
            .entities
            .get(&(entity_type.to_string(), id))
            .map(|data| EntityRow {
                id,
                data: data.clone(),
            }))
    }

    async fn list_entities(
        &self,
        entity_type: &str,
        pagination: Pagination,
    ) -> Result<Vec<EntityRow>> {
        let state = self.inner.state.lock();
        let mut rows: Vec<EntityRow> = state
            .entities
            .iter()
            .filter(|((t, _), _)| t == entity_type)
            .map(|((_, id), data)| EntityRow {
                id: *id,
                data: data.clone(),
            })
            .collect();

        if pagination.order == SortOrder::Descending {
            rows.reverse();
        }
        let rows = rows
            .into_iter()
            .skip(pagination.offset)
            .take(pagination.limit.unwrap_or(usize::MAX))
            .collect();
        Ok(rows)
    }

    async fn count_entities(&self, entity_type: &str) -> Result<u64> {
        Ok(self.entity_count(entity_type) as u64)
    }
}

/// One flush against [`MemoryStorage`]. Dropping it discards its writes.
struct MemoryTransaction {
    inner: Arc<MemoryInner>,
    working: MemoryState,
    ops: Vec<Op>,
}

impl MemoryTransaction {
    fn record(&mut self, op: Op) -> u64 {
        let affected = self.working.apply(&op);
        self.ops.push(op);
        affected
    }
}

#[async_trait]
impl TranslationWriter for MemoryTransaction {
    async fn find_by_owner(
        &mut self,
        owner_type: &str,
        owner_id: OwnerId,
    ) -> Result<Vec<TranslationRecord>> {
        Ok(self.working.records_of(owner_type, owner_id))
    }

    async fn persist(&mut self, record: &TranslationRecord) -> Result<()> {
        if record.owner_id().is_none() {
            bail!(
                "cannot persist translation {} of '{}' without an owner id",
                record.id(),
                record.owner_type()
            );
        }
        self.record(Op::PutRecord(record.clone()));
        Ok(())
    }

    async fn delete(&mut self, record: &TranslationRecord) -> Result<bool> {
        Ok(self.record(Op::DeleteRecord(record.clone())) > 0)
    }

    async fn delete_by_owner(&mut self, owner_type: &str, owner_id: OwnerId) -> Result<u64> {
        Ok(self.record(Op::DeleteOwner {
            owner_type: owner_type.to_string(),
            owner_id,
        }))
    }
}

#[async_trait]
impl EntityWriter for MemoryTransaction {
    async fn insert_entity(
        &mut self,
        entity_type: &str,
        data: &serde_json::Value,
    ) -> Result<OwnerId> {
        let id = self.inner.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        self.record(Op::PutEntity {
            entity_type: entity_type.to_string(),
            id,
            data: data.clone(),
        });
        Ok(id)
    }

    async fn update_entity(
        &mut self,
        entity_type: &str,
        id: OwnerId,
        data: &serde_json::Value,
    ) -> Result<bool> {
        if !self
            .working
            .entities
            .contains_key(&(entity_type.to_string(), id))
        {
            return Ok(false);
        }
        self.record(Op::PutEntity {
            entity_type: entity_type.to_string(),
            id,
            data: data.clone(),
        });
        Ok(true)
    }

    async fn delete_entity(&mut self, entity_type: &str, id: OwnerId) -> Result<bool> {
        Ok(self.record(Op::DeleteEntity {
            entity_type: entity_type.to_string(),
            id,
        }) > 0)
    }
}

#[async_trait]
impl StorageTransaction for MemoryTransaction {
    async fn commit(self: Box<Self>) -> Result<()> {
        let mut state = self.inner.state.lock();
        for op in &self.ops {
            state.apply(op);
        }
        debug!(ops = self.ops.len(), "memory transaction committed");
        Ok(())
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn record(owner_id: Option<OwnerId>, locale: &str, value: &str) -> TranslationRecord {
        TranslationRecord::new("wood", owner_id, locale, "description", Some(value.into()))
    }

    #[tokio::test]
    async fn uncommitted_writes_are_discarded() {
        let storage = MemoryStorage::new();

        let mut tx = storage.begin().await.unwrap();
        let id = tx
            .insert_entity("wood", &serde_json::json!({"name": "oak"}))
            .await
            .unwrap();
        tx.persist(&record(Some(id), "en", "Oak")).await.unwrap();
        drop(tx);

        assert_eq!(storage.entity_count("wood"), 0);
        assert!(storage.all_translations().is_empty());
    }

    #[tokio::test]
    async fn commit_applies_writes_and_upserts_by_key() {
        let storage = MemoryStorage::new();

        let mut tx = storage.begin().await.unwrap();
        let id = tx
            .insert_entity("wood", &serde_json::json!({"name": "oak"}))
            .await
            .unwrap();
        tx.persist(&record(Some(id), "en", "Oak")).await.unwrap();
        tx.persist(&record(Some(id), "en", "Oak tree")).await.unwrap();
        tx.commit().await.unwrap();

        let records = storage.find_by_owner("wood", id).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value(), Some("Oak tree"));
    }

    #[tokio::test]
    async fn persist_requires_owner_id() {
        let storage = MemoryStorage::new();
        let mut tx = storage.begin().await.unwrap();

        let err = tx.persist(&record(None, "en", "Oak")).await.unwrap_err();
        assert!(err.to_string().contains("without an owner id"));
    }

    #[tokio::test]
    async fn delete_by_owner_only_touches_that_owner() {
        let storage = MemoryStorage::new();
        let mut tx = storage.begin().await.unwrap();
        tx.persist(&record(Some(1), "en", "Oak")).await.unwrap();
        tx.persist(&record(Some(1), "cs", "Dub")).await.unwrap();
        tx.persist(&record(Some(2), "en", "Ash")).await.unwrap();

        assert_eq!(tx.delete_by_owner("wood", 1).await.unwrap(), 2);
        tx.commit().await.unwrap();

        assert!(storage.find_by_owner("wood", 1).await.unwrap().is_empty());
        assert_eq!(storage.find_by_owner("wood", 2).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_entities_paginates_and_sorts() {
        let storage = MemoryStorage::new();
        let mut tx = storage.begin().await.unwrap();
        for name in ["oak", "ash", "elm", "yew"] {
            tx.insert_entity("wood", &serde_json::json!({ "name": name }))
                .await
                .unwrap();
        }
        tx.commit().await.unwrap();

        let page = storage
            .list_entities("wood", Pagination::new().with_offset(1).with_limit(2))
            .await
            .unwrap();
        let ids: Vec<OwnerId> = page.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3]);

        let newest = storage
            .list_entities("wood", Pagination::new().descending().with_limit(1))
            .await
            .unwrap();
        assert_eq!(newest[0].data["name"], "yew");
        assert_eq!(storage.count_entities("wood").await.unwrap(), 4);
    }
}
