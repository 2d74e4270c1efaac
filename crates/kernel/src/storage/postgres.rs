//! PostgreSQL storage backend.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use super::{
    EntityRow, EntityWriter, Pagination, SortOrder, Storage, StorageTransaction,
    TranslationLoader, TranslationWriter,
};
use crate::translation::{OwnerId, TranslationRecord};

const RECORD_COLUMNS: &str = "id, owner_type, owner_id, locale, field, value";

/// Storage backed by the `catalog_entity` and `translation` tables.
#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TranslationLoader for PgStorage {
    async fn find_by_owner(
        &self,
        owner_type: &str,
        owner_id: OwnerId,
    ) -> Result<Vec<TranslationRecord>> {
        let records = sqlx::query_as::<_, TranslationRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM translation \
             WHERE owner_type = $1 AND owner_id = $2 ORDER BY field, locale"
        ))
        .bind(owner_type)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch translations by owner")?;

        Ok(records)
    }

    async fn find_by_owners(
        &self,
        owner_type: &str,
        owner_ids: &[OwnerId],
    ) -> Result<Vec<TranslationRecord>> {
        let records = sqlx::query_as::<_, TranslationRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM translation \
             WHERE owner_type = $1 AND owner_id = ANY($2) ORDER BY owner_id, field, locale"
        ))
        .bind(owner_type)
        .bind(owner_ids)
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch translations for owners")?;

        Ok(records)
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn begin(&self) -> Result<Box<dyn StorageTransaction>> {
        let tx = self
            .pool
            .begin()
            .await
            .context("failed to start transaction")?;
        Ok(Box::new(PgStorageTransaction { tx }))
    }

    async fn find_entity(&self, entity_type: &str, id: OwnerId) -> Result<Option<EntityRow>> {
        let row = sqlx::query_as::<_, EntityRow>(
            "SELECT id, data FROM catalog_entity WHERE entity_type = $1 AND id = $2",
        )
        .bind(entity_type)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch catalog entity")?;

        Ok(row)
    }

    async fn list_entities(
        &self,
        entity_type: &str,
        pagination: Pagination,
    ) -> Result<Vec<EntityRow>> {
        let order = match pagination.order {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        };
        let limit = pagination
            .limit
            .map(|l| i64::try_from(l).unwrap_or(i64::MAX));
        let offset = i64::try_from(pagination.offset).unwrap_or(i64::MAX);

        let rows = sqlx::query_as::<_, EntityRow>(&format!(
            "SELECT id, data FROM catalog_entity WHERE entity_type = $1 \
             ORDER BY id {order} LIMIT $2 OFFSET $3"
        ))
        .bind(entity_type)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .context("failed to list catalog entities")?;

        Ok(rows)
    }

    async fn count_entities(&self, entity_type: &str) -> Result<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM catalog_entity WHERE entity_type = $1")
                .bind(entity_type)
                .fetch_one(&self.pool)
                .await
                .context("failed to count catalog entities")?;

        Ok(u64::try_from(count).unwrap_or(0))
    }
}

/// One flush inside a PostgreSQL transaction.
///
/// Dropping it without [`StorageTransaction::commit`] rolls back.
struct PgStorageTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl TranslationWriter for PgStorageTransaction {
    async fn find_by_owner(
        &mut self,
        owner_type: &str,
        owner_id: OwnerId,
    ) -> Result<Vec<TranslationRecord>> {
        let records = sqlx::query_as::<_, TranslationRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM translation \
             WHERE owner_type = $1 AND owner_id = $2 ORDER BY field, locale"
        ))
        .bind(owner_type)
        .bind(owner_id)
        .fetch_all(&mut *self.tx)
        .await
        .context("failed to fetch translations by owner")?;

        Ok(records)
    }

    async fn persist(&mut self, record: &TranslationRecord) -> Result<()> {
        let Some(owner_id) = record.owner_id() else {
            bail!(
                "cannot persist translation {} of '{}' without an owner id",
                record.id(),
                record.owner_type()
            );
        };

        sqlx::query(
            r#"
            INSERT INTO translation (id, owner_type, owner_id, locale, field, value)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (owner_type, owner_id, locale, field) DO UPDATE SET
                value = EXCLUDED.value
            "#,
        )
        .bind(record.id())
        .bind(record.owner_type())
        .bind(owner_id)
        .bind(record.locale())
        .bind(record.field())
        .bind(record.value())
        .execute(&mut *self.tx)
        .await
        .context("failed to persist translation")?;

        debug!(
            owner_type = record.owner_type(),
            owner_id,
            locale = record.locale(),
            field = record.field(),
            "persisted translation"
        );
        Ok(())
    }

    async fn delete(&mut self, record: &TranslationRecord) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM translation
            WHERE owner_type = $1 AND owner_id = $2 AND locale = $3 AND field = $4
            "#,
        )
        .bind(record.owner_type())
        .bind(record.owner_id())
        .bind(record.locale())
        .bind(record.field())
        .execute(&mut *self.tx)
        .await
        .context("failed to delete translation")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_owner(&mut self, owner_type: &str, owner_id: OwnerId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM translation WHERE owner_type = $1 AND owner_id = $2")
            .bind(owner_type)
            .bind(owner_id)
            .execute(&mut *self.tx)
            .await
            .context("failed to delete translations by owner")?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl EntityWriter for PgStorageTransaction {
    async fn insert_entity(
        &mut self,
        entity_type: &str,
        data: &serde_json::Value,
    ) -> Result<OwnerId> {
        let now = Utc::now().timestamp();

        let id: OwnerId = sqlx::query_scalar(
            r#"
            INSERT INTO catalog_entity (entity_type, data, created, changed)
            VALUES ($1, $2, $3, $3)
            RETURNING id
            "#,
        )
        .bind(entity_type)
        .bind(data)
        .bind(now)
        .fetch_one(&mut *self.tx)
        .await
        .context("failed to insert catalog entity")?;

        Ok(id)
    }

    async fn update_entity(
        &mut self,
        entity_type: &str,
        id: OwnerId,
        data: &serde_json::Value,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE catalog_entity SET data = $1, changed = $2
            WHERE entity_type = $3 AND id = $4
            "#,
        )
        .bind(data)
        .bind(Utc::now().timestamp())
        .bind(entity_type)
        .bind(id)
        .execute(&mut *self.tx)
        .await
        .context("failed to update catalog entity")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_entity(&mut self, entity_type: &str, id: OwnerId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM catalog_entity WHERE entity_type = $1 AND id = $2")
            .bind(entity_type)
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .context("failed to delete catalog entity")?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl StorageTransaction for PgStorageTransaction {
    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx
            .commit()
            .await
            .context("failed to commit transaction")?;
        Ok(())
    }
}

impl std::fmt::Debug for PgStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgStorage").finish()
    }
}
