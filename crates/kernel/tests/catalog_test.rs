#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Catalog tests.
//!
//! End-to-end saves, loads and deletes through [`Catalog`] against the
//! in-memory backend.

use atelier_kernel::models::{Material, MaterialUnit, Product, ProductKind, Wood};
use atelier_kernel::storage::Pagination;
use atelier_kernel::translation::Translatable;

mod common;
use common::{memory_catalog, memory_catalog_with_default};

/// Create Wood "oak" with "Oak"/"Dub" descriptions and save it.
async fn saved_oak(catalog: &atelier_kernel::Catalog) -> Wood {
    let mut oak = Wood::new("oak").with_price(120);
    oak.add_or_update_translation("description", "Oak", "en");
    oak.add_or_update_translation("description", "Dub", "cs");
    catalog.save(&mut oak).await.expect("failed to save oak");
    oak
}

#[tokio::test]
async fn test_new_entity_translations_get_owner_id() {
    let (catalog, storage) = memory_catalog();

    let mut oak = Wood::new("oak");
    oak.add_or_update_translation("description", "Oak", "en");
    oak.add_or_update_translation("description", "Dub", "cs");
    assert!(oak.translations().iter().all(|r| r.owner_id().is_none()));

    let summary = catalog.save(&mut oak).await.unwrap();

    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.stamped, 2);
    let id = oak.id().expect("oak should have an id after save");
    assert!(oak.translations().iter().all(|r| r.owner_id() == Some(id)));
    assert_eq!(storage.all_translations().len(), 2);

    let mut loaded = catalog.find::<Wood>(id).await.unwrap().unwrap();
    assert_eq!(loaded.name, "oak");
    assert_eq!(
        loaded
            .translation_value("description", Some("cs"))
            .await
            .unwrap()
            .as_deref(),
        Some("Dub")
    );
    assert_eq!(
        loaded
            .translation_value("description", None)
            .await
            .unwrap()
            .as_deref(),
        Some("Oak")
    );
}

#[tokio::test]
async fn test_for_locale_sets_entity_default() {
    let (catalog, _storage) = memory_catalog();
    let oak = saved_oak(&catalog).await;
    let id = oak.id().unwrap();

    let mut czech = catalog.for_locale("cs").find::<Wood>(id).await.unwrap().unwrap();
    assert_eq!(czech.default_locale(), "cs");
    assert_eq!(
        czech.translation_value("description", None).await.unwrap(),
        Some("Dub".to_string())
    );

    // Unsupported locales resolve to the default.
    let german = catalog.for_locale("de");
    assert_eq!(german.locale(), "en");
}

#[tokio::test]
async fn test_reference_loads_translations_once() {
    let (catalog, storage) = memory_catalog();
    let id = saved_oak(&catalog).await.id().unwrap();

    let mut oak = catalog.reference::<Wood>(id).await.unwrap().unwrap();
    assert!(!oak.translation_store().is_loaded());
    let before = storage.query_count();

    let en = oak.translation_value("description", Some("en")).await.unwrap();
    let cs = oak.translation_value("description", Some("cs")).await.unwrap();
    let origin = oak.translation_value("place_of_origin", None).await.unwrap();

    assert_eq!(en.as_deref(), Some("Oak"));
    assert_eq!(cs.as_deref(), Some("Dub"));
    assert_eq!(origin, None);
    assert_eq!(storage.query_count(), before + 1);
}

#[tokio::test]
async fn test_list_loads_page_in_one_query() {
    let (catalog, storage) = memory_catalog();
    for name in ["oak", "ash", "elm"] {
        let mut wood = Wood::new(name);
        wood.add_or_update_translation("description", &name.to_uppercase(), "en");
        catalog.save(&mut wood).await.unwrap();
    }
    let mut bare = Wood::new("yew");
    catalog.save(&mut bare).await.unwrap();

    let before = storage.query_count();
    let mut woods = catalog.list::<Wood>(Pagination::new()).await.unwrap();
    assert_eq!(storage.query_count(), before + 1);
    assert_eq!(woods.len(), 4);
    assert_eq!(catalog.count::<Wood>().await.unwrap(), 4);

    for wood in woods.iter_mut() {
        assert!(wood.translation_store().is_loaded());
        let _ = wood.translation_value("description", None).await.unwrap();
    }
    assert_eq!(storage.query_count(), before + 1);
    assert!(woods[3].translations().is_empty());

    let page = catalog.list::<Wood>(Pagination::page(2, 3)).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].name, "yew");
}

#[tokio::test]
async fn test_update_reconciles_changed_and_removed_values() {
    let (catalog, storage) = memory_catalog();
    let id = saved_oak(&catalog).await.id().unwrap();

    let mut oak = catalog.find::<Wood>(id).await.unwrap().unwrap();
    oak.add_or_update_translation("description", "Dub letní", "cs");
    oak.add_or_update_translation("place_of_origin", "Europe", "en");
    assert!(oak.remove_translation("description", "en"));

    let summary = catalog.save(&mut oak).await.unwrap();
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.inserted, 0);

    let mut stored = storage.all_translations();
    stored.sort_by(|a, b| a.key().cmp(&b.key()));
    let keys: Vec<(&str, &str, Option<&str>)> = stored
        .iter()
        .map(|r| (r.field(), r.locale(), r.value()))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("description", "cs", Some("Dub letní")),
            ("place_of_origin", "en", Some("Europe")),
        ]
    );
}

#[tokio::test]
async fn test_saving_unloaded_reference_keeps_translations() {
    let (catalog, storage) = memory_catalog();
    let id = saved_oak(&catalog).await.id().unwrap();

    let mut oak = catalog.reference::<Wood>(id).await.unwrap().unwrap();
    oak.price_per_unit = 150;
    oak.add_or_update_translation("place_of_origin", "Evropa", "cs");
    catalog.save(&mut oak).await.unwrap();

    assert_eq!(storage.all_translations().len(), 3);
    let mut reloaded = catalog.find::<Wood>(id).await.unwrap().unwrap();
    assert_eq!(reloaded.price_per_unit, 150);
    assert_eq!(
        reloaded
            .translation_value("description", Some("en"))
            .await
            .unwrap()
            .as_deref(),
        Some("Oak")
    );
}

#[tokio::test]
async fn test_delete_cascades_to_translations() {
    let (catalog, storage) = memory_catalog();
    let mut oak = saved_oak(&catalog).await;
    let mut ash = Wood::new("ash");
    ash.add_or_update_translation("description", "Ash", "en");
    catalog.save(&mut ash).await.unwrap();

    let summary = catalog.delete(&mut oak).await.unwrap();

    assert_eq!(summary.deleted, 1);
    assert_eq!(storage.entity_count("wood"), 1);
    let remaining = storage.all_translations();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].owner_id(), ash.id());
    assert!(catalog.find::<Wood>(oak.id().unwrap()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_of_unsaved_entity_is_no_op() {
    let (catalog, storage) = memory_catalog();
    let mut draft = Wood::new("draft");
    draft.add_or_update_translation("description", "Draft", "en");

    let summary = catalog.delete(&mut draft).await.unwrap();

    assert_eq!(summary.deleted, 0);
    assert!(storage.all_translations().is_empty());
}

#[tokio::test]
async fn test_prepare_then_save_persists_placeholders() {
    let (catalog, storage) = memory_catalog();
    let id = saved_oak(&catalog).await.id().unwrap();

    let mut oak = catalog.reference::<Wood>(id).await.unwrap().unwrap();
    let created = catalog.initializer().prepare(&mut oak).await.unwrap();
    assert_eq!(created, 2);
    catalog.save(&mut oak).await.unwrap();

    let stored = storage.all_translations();
    assert_eq!(stored.len(), 4);
    assert_eq!(
        stored
            .iter()
            .filter(|r| r.field() == "place_of_origin")
            .map(|r| r.value())
            .collect::<Vec<_>>(),
        vec![Some(""), Some("")]
    );
}

#[tokio::test]
async fn test_unit_of_work_flushes_mixed_entity_types() {
    let (catalog, storage) = memory_catalog();
    let mut oak = saved_oak(&catalog).await;

    let mut linen = Material::new("linen", MaterialUnit::SquareMeter, 900);
    linen.add_or_update_translation("name", "Linen", "en");
    let mut flag = Product::new("flag-cz", ProductKind::Flag, 1500, 1000);
    flag.add_or_update_translation("name", "Czech flag", "en");
    flag.add_or_update_translation("name", "Česká vlajka", "cs");
    oak.add_or_update_translation("place_of_origin", "Europe", "en");

    let mut unit = catalog.unit_of_work();
    unit.persist(&mut linen);
    unit.persist(&mut flag);
    unit.persist(&mut oak);
    let summary = unit.flush().await.unwrap();

    assert_eq!(summary.inserted, 2);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.stamped, 3);
    assert_eq!(storage.all_translations().len(), 6);

    let mut loaded = catalog
        .for_locale("cs")
        .find::<Product>(flag.id().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        loaded.translation_value("name", None).await.unwrap(),
        Some("Česká vlajka".to_string())
    );
}

#[tokio::test]
async fn test_attach_applies_catalog_default_locale() {
    let (catalog, _storage) = memory_catalog_with_default("cs");
    let mut oak = Wood::new("oak");
    oak.add_or_update_translation("description", "Dub", "cs");
    assert_eq!(oak.default_locale(), "en");

    catalog.attach(&mut oak);

    assert_eq!(oak.default_locale(), "cs");
    assert_eq!(
        oak.translation_value("description", None).await.unwrap(),
        Some("Dub".to_string())
    );
}

#[tokio::test]
async fn test_save_attaches_new_entity_to_catalog() {
    let (catalog, _storage) = memory_catalog_with_default("cs");
    let mut oak = Wood::new("oak");
    oak.add_or_update_translation("description", "Dub", "cs");

    catalog.save(&mut oak).await.unwrap();

    assert_eq!(oak.default_locale(), "cs");
    assert!(oak.translation_store().has_loader());
    assert_eq!(
        oak.translation_value("description", None).await.unwrap(),
        Some("Dub".to_string())
    );
}

#[tokio::test]
async fn test_saved_entity_loads_lazily_afterwards() {
    let (catalog, storage) = memory_catalog();
    let mut ash = Wood::new("ash");
    catalog.save(&mut ash).await.unwrap();
    let id = ash.id().unwrap();

    let mut other = catalog.find::<Wood>(id).await.unwrap().unwrap();
    other.add_or_update_translation("description", "Ash", "en");
    catalog.save(&mut other).await.unwrap();

    let before = storage.query_count();
    assert_eq!(
        ash.translation_value("description", None).await.unwrap(),
        Some("Ash".to_string())
    );
    assert_eq!(storage.query_count(), before + 1);
}

#[tokio::test]
async fn test_saving_deleted_entity_drops_its_translations() {
    let (catalog, storage) = memory_catalog();
    let id = saved_oak(&catalog).await.id().unwrap();

    let mut first = catalog.find::<Wood>(id).await.unwrap().unwrap();
    let mut second = catalog.find::<Wood>(id).await.unwrap().unwrap();
    catalog.delete(&mut first).await.unwrap();

    second.add_or_update_translation("description", "Dub letní", "cs");
    let summary = catalog.save(&mut second).await.unwrap();

    assert_eq!(summary.updated, 0);
    assert_eq!(storage.entity_count("wood"), 0);
    assert!(storage.all_translations().is_empty());
}
