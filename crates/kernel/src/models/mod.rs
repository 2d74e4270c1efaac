//! Catalog data models.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::translation::{OwnerId, Translatable};

/// A catalog entity stored as a JSON document with a storage-assigned id.
pub trait CatalogEntity: Translatable + Serialize + DeserializeOwned + 'static {
    /// Type tag used as `entity_type` and as the translations' owner type.
    const ENTITY_TYPE: &'static str;

    /// Record the id assigned by storage on insert.
    fn assign_id(&mut self, id: OwnerId);
}

/// Implement [`Translatable`] and [`CatalogEntity`] for a model with
/// `id: Option<OwnerId>` and `translations: TranslationStore` fields.
macro_rules! translatable_entity {
    ($ty:ty, $tag:literal, $fields:expr) => {
        impl $crate::translation::Translatable for $ty {
            fn owner_type(&self) -> &'static str {
                $tag
            }

            fn id(&self) -> Option<$crate::translation::OwnerId> {
                self.id
            }

            fn translatable_fields(&self) -> &'static [&'static str] {
                $fields
            }

            fn translation_store(&self) -> &$crate::translation::TranslationStore {
                &self.translations
            }

            fn translation_store_mut(&mut self) -> &mut $crate::translation::TranslationStore {
                &mut self.translations
            }
        }

        impl $crate::models::CatalogEntity for $ty {
            const ENTITY_TYPE: &'static str = $tag;

            fn assign_id(&mut self, id: $crate::translation::OwnerId) {
                self.id = Some(id);
            }
        }
    };
}

pub mod color;
pub mod language;
pub mod material;
pub mod product;
pub mod wood;

pub use color::Color;
pub use language::Language;
pub use material::{Material, MaterialUnit};
pub use product::{MaterialUsage, Product, ProductKind};
pub use wood::Wood;
