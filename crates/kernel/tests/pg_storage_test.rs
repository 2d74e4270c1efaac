#![allow(clippy::unwrap_used, clippy::expect_used)]
//! PostgreSQL storage tests.
//!
//! Run against the database in `DATABASE_URL`; each test returns early when
//! it is not set.

use atelier_kernel::locale::LocaleSettings;
use atelier_kernel::models::Wood;
use atelier_kernel::storage::{EntityWriter, PgStorage, Storage, TranslationLoader};
use atelier_kernel::translation::Translatable;
use atelier_kernel::{Catalog, db};
use atelier_test_utils::{test_pool, unique_name};

async fn pg_catalog() -> Option<(Catalog, PgStorage)> {
    let pool = test_pool().await?;
    db::run_migrations(&pool).await.expect("migrations failed");
    let settings = LocaleSettings::load(&pool)
        .await
        .expect("failed to load languages");
    let storage = PgStorage::new(pool);
    Some((Catalog::new(storage.clone(), settings), storage))
}

#[tokio::test]
async fn test_pg_save_and_reload_translations() {
    let Some((catalog, storage)) = pg_catalog().await else {
        return;
    };

    let mut oak = Wood::new(unique_name("oak"));
    oak.add_or_update_translation("description", "Oak", "en");
    oak.add_or_update_translation("description", "Dub", "cs");
    catalog.save(&mut oak).await.unwrap();
    let id = oak.id().unwrap();

    let records = storage.find_by_owner("wood", id).await.unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.owner_id() == Some(id)));

    let mut loaded = catalog
        .for_locale("cs")
        .find::<Wood>(id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.name, oak.name);
    assert_eq!(
        loaded.translation_value("description", None).await.unwrap(),
        Some("Dub".to_string())
    );

    catalog.delete(&mut loaded).await.unwrap();
    assert!(storage.find_by_owner("wood", id).await.unwrap().is_empty());
    assert!(storage.find_entity("wood", id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_pg_rollback_on_drop() {
    let Some((_catalog, storage)) = pg_catalog().await else {
        return;
    };

    let id = {
        let mut tx = storage.begin().await.unwrap();
        tx.insert_entity("wood", &serde_json::json!({ "name": unique_name("elm") }))
            .await
            .unwrap()
    };

    assert!(storage.find_entity("wood", id).await.unwrap().is_none());
}
