//! Translatable entity subsystem.
//!
//! Attaches locale-keyed text fields to catalog entities through a side
//! table. Each entity owns a [`TranslationStore`]; the
//! [`TranslationSynchronizer`] loads it on entity load and reconciles it with
//! storage on flush, and [`initializer::prepare`] fills missing
//! field × locale slots with placeholders.
//!
//! # Usage
//!
//! ```ignore
//! let mut wood = Wood::new("oak");
//! wood.add_or_update_translation(wood::DESCRIPTION, "Oak", "en");
//! wood.add_or_update_translation(wood::DESCRIPTION, "Dub", "cs");
//! catalog.save(&mut wood).await?;
//!
//! let mut loaded: Wood = catalog.find(wood.id().unwrap()).await?.unwrap();
//! assert_eq!(loaded.translation_value(wood::DESCRIPTION, Some("cs")).await?, Some("Dub".into()));
//! ```

mod capability;
pub mod initializer;
mod record;
mod store;
pub mod synchronizer;

pub use capability::Translatable;
pub use initializer::{TranslationInitializer, prepare, prepare_fields};
pub use record::{OwnerId, TranslationRecord};
pub use store::{FALLBACK_LOCALE, OwnerRef, TranslationStore};
pub use synchronizer::{FlushBatch, PendingOwners, ReconcileStats, TranslationSynchronizer};
