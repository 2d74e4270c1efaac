//! Catalog access: typed loading, listing and saving of catalog entities with
//! their translations.
//!
//! [`Catalog`] owns the storage backend and the translation synchronizer, so
//! every entity it hands out has its translations loaded (or a loader attached
//! for lazy access) and every save runs through the flush hooks.

mod unit_of_work;

use std::sync::Arc;

use anyhow::Context;

pub use unit_of_work::{FlushSummary, PersistentEntity, UnitOfWork};

use crate::error::TranslationResult;
use crate::locale::LocaleSettings;
use crate::models::CatalogEntity;
use crate::storage::{EntityRow, Pagination, Storage, TranslationLoader};
use crate::translation::{
    OwnerId, Translatable, TranslationInitializer, TranslationSynchronizer,
};

/// Entry point for reading and writing catalog entities.
#[derive(Clone)]
pub struct Catalog {
    storage: Arc<dyn Storage>,
    loader: Arc<dyn TranslationLoader>,
    synchronizer: TranslationSynchronizer,
    locales: LocaleSettings,
}

impl Catalog {
    /// Create a catalog working in the default locale.
    pub fn new<S: Storage + 'static>(storage: S, locales: LocaleSettings) -> Self {
        let storage = Arc::new(storage);
        let loader: Arc<dyn TranslationLoader> = storage.clone();
        let synchronizer =
            TranslationSynchronizer::new(loader.clone(), locales.default_locale());

        Self {
            storage,
            loader,
            synchronizer,
            locales,
        }
    }

    /// The same catalog for a request in `locale`.
    ///
    /// Unsupported locales fall back to the default.
    pub fn for_locale(&self, locale: &str) -> Self {
        let locale = self.locales.resolve(Some(locale)).to_string();
        Self {
            storage: self.storage.clone(),
            loader: self.loader.clone(),
            synchronizer: TranslationSynchronizer::new(self.loader.clone(), locale),
            locales: self.locales.clone(),
        }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn synchronizer(&self) -> &TranslationSynchronizer {
        &self.synchronizer
    }

    pub fn locales(&self) -> &LocaleSettings {
        &self.locales
    }

    /// Current locale applied as default to loaded entities.
    pub fn locale(&self) -> &str {
        self.synchronizer.locale()
    }

    /// Placeholder initializer over all supported locales.
    pub fn initializer(&self) -> TranslationInitializer {
        TranslationInitializer::from_settings(&self.locales)
    }

    /// Give a new entity this catalog's locale and loader.
    ///
    /// Saving does this too; call it when reading translations before the
    /// first save.
    pub fn attach<E: Translatable + ?Sized>(&self, entity: &mut E) {
        self.synchronizer.attach(entity);
    }

    /// Start collecting changes for a single flush.
    pub fn unit_of_work(&self) -> UnitOfWork<'_> {
        UnitOfWork::new(self.storage.as_ref(), &self.synchronizer)
    }

    /// Load an entity with all its translations.
    pub async fn find<T: CatalogEntity>(&self, id: OwnerId) -> TranslationResult<Option<T>> {
        let Some(row) = self.storage.find_entity(T::ENTITY_TYPE, id).await? else {
            return Ok(None);
        };
        let mut entity: T = materialize(row)?;
        self.synchronizer.on_load(&mut entity).await?;
        Ok(Some(entity))
    }

    /// Load an entity without translations; they are fetched on first read.
    pub async fn reference<T: CatalogEntity>(&self, id: OwnerId) -> TranslationResult<Option<T>> {
        let Some(row) = self.storage.find_entity(T::ENTITY_TYPE, id).await? else {
            return Ok(None);
        };
        let mut entity: T = materialize(row)?;
        self.synchronizer.attach(&mut entity);
        Ok(Some(entity))
    }

    /// List a page of entities, loading translations for the whole page in
    /// one query.
    pub async fn list<T: CatalogEntity>(&self, pagination: Pagination) -> TranslationResult<Vec<T>> {
        let rows = self
            .storage
            .list_entities(T::ENTITY_TYPE, pagination)
            .await?;
        let mut entities = rows
            .into_iter()
            .map(materialize::<T>)
            .collect::<anyhow::Result<Vec<T>>>()?;
        self.synchronizer.eager_load(&mut entities).await?;
        Ok(entities)
    }

    pub async fn count<T: CatalogEntity>(&self) -> TranslationResult<u64> {
        Ok(self.storage.count_entities(T::ENTITY_TYPE).await?)
    }

    /// Insert or update one entity and its translations.
    pub async fn save<T: CatalogEntity>(&self, entity: &mut T) -> TranslationResult<FlushSummary> {
        let mut unit = self.unit_of_work();
        unit.persist(entity);
        unit.flush().await
    }

    /// Delete one entity and all its translations.
    pub async fn delete<T: CatalogEntity>(&self, entity: &mut T) -> TranslationResult<FlushSummary> {
        let mut unit = self.unit_of_work();
        unit.remove(entity);
        unit.flush().await
    }
}

/// Build a typed entity from its stored row.
fn materialize<T: CatalogEntity>(row: EntityRow) -> anyhow::Result<T> {
    let mut entity: T = serde_json::from_value(row.data)
        .with_context(|| format!("failed to decode {} {}", T::ENTITY_TYPE, row.id))?;
    entity.assign_id(row.id);
    Ok(entity)
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("locale", &self.locale())
            .field("locales", &self.locales)
            .finish()
    }
}
