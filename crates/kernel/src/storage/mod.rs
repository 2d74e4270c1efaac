//! Storage layer consumed by the translation subsystem.
//!
//! The subsystem never talks to a database directly. It sees:
//!
//! - [`TranslationLoader`] - read access used for lazy and eager loading
//!   outside a flush.
//! - [`StorageTransaction`] - one flush cycle: record writes
//!   ([`TranslationWriter`]) and owner row writes ([`EntityWriter`]), made
//!   durable by [`StorageTransaction::commit`]. Dropping a transaction without
//!   committing discards its writes.
//!
//! Two backends implement [`Storage`]: [`PgStorage`] for PostgreSQL and
//! [`MemoryStorage`] for tests and embedding without a database.

mod memory;
mod postgres;

use anyhow::Result;
use async_trait::async_trait;

pub use memory::MemoryStorage;
pub use postgres::PgStorage;

use crate::translation::{OwnerId, TranslationRecord};

/// Sort direction for entity listings (by id).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Paging criteria for entity listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    /// Number of rows to skip.
    pub offset: usize,

    /// Maximum number of rows, unbounded when `None`.
    pub limit: Option<usize>,

    /// Sort direction by id.
    pub order: SortOrder,
}

impl Pagination {
    /// Create an unbounded ascending listing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit results.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip results.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Sort newest first.
    pub fn descending(mut self) -> Self {
        self.order = SortOrder::Descending;
        self
    }

    /// Build the pagination for a 1-based page number.
    pub fn page(page: usize, per_page: usize) -> Self {
        Self::new()
            .with_offset(page.saturating_sub(1).saturating_mul(per_page))
            .with_limit(per_page)
    }
}

/// A stored owner row: the storage id plus the entity's JSON document.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct EntityRow {
    pub id: OwnerId,
    pub data: serde_json::Value,
}

/// Read access to translation records outside a flush.
#[async_trait]
pub trait TranslationLoader: Send + Sync {
    /// All records belonging to one owner, ordered by field then locale.
    async fn find_by_owner(
        &self,
        owner_type: &str,
        owner_id: OwnerId,
    ) -> Result<Vec<TranslationRecord>>;

    /// All records belonging to any of the given owners of one type.
    async fn find_by_owners(
        &self,
        owner_type: &str,
        owner_ids: &[OwnerId],
    ) -> Result<Vec<TranslationRecord>>;
}

/// Translation record writes inside one flush.
#[async_trait]
pub trait TranslationWriter: Send {
    /// Persisted records for one owner as seen by this transaction.
    async fn find_by_owner(
        &mut self,
        owner_type: &str,
        owner_id: OwnerId,
    ) -> Result<Vec<TranslationRecord>>;

    /// Insert or update a record, keyed on (owner type, owner id, locale,
    /// field). The record must already carry an owner id.
    async fn persist(&mut self, record: &TranslationRecord) -> Result<()>;

    /// Delete the record holding the same key. Returns `true` if a row was
    /// removed.
    async fn delete(&mut self, record: &TranslationRecord) -> Result<bool>;

    /// Delete every record of one owner. Returns the number of removed rows.
    async fn delete_by_owner(&mut self, owner_type: &str, owner_id: OwnerId) -> Result<u64>;
}

/// Owner row writes inside one flush.
#[async_trait]
pub trait EntityWriter: Send {
    /// Insert a new owner row and return its storage-assigned id.
    async fn insert_entity(&mut self, entity_type: &str, data: &serde_json::Value)
    -> Result<OwnerId>;

    /// Replace an owner row's document. Returns `false` if the row is gone.
    async fn update_entity(
        &mut self,
        entity_type: &str,
        id: OwnerId,
        data: &serde_json::Value,
    ) -> Result<bool>;

    /// Delete an owner row. Returns `false` if it did not exist.
    async fn delete_entity(&mut self, entity_type: &str, id: OwnerId) -> Result<bool>;
}

/// One transactional flush cycle.
#[async_trait]
pub trait StorageTransaction: TranslationWriter + EntityWriter {
    /// Make every write of this transaction durable.
    async fn commit(self: Box<Self>) -> Result<()>;
}

/// A persistence backend.
#[async_trait]
pub trait Storage: TranslationLoader {
    /// Start a flush transaction.
    async fn begin(&self) -> Result<Box<dyn StorageTransaction>>;

    /// Load one owner row.
    async fn find_entity(&self, entity_type: &str, id: OwnerId) -> Result<Option<EntityRow>>;

    /// List owner rows of one type.
    async fn list_entities(
        &self,
        entity_type: &str,
        pagination: Pagination,
    ) -> Result<Vec<EntityRow>>;

    /// Count owner rows of one type.
    async fn count_entities(&self, entity_type: &str) -> Result<u64>;
}
