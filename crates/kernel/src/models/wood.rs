//! Wood model.

use serde::{Deserialize, Serialize};

use crate::translation::{OwnerId, TranslationStore};

pub const DESCRIPTION: &str = "description";
pub const PLACE_OF_ORIGIN: &str = "place_of_origin";

/// Translatable fields of a wood.
pub const FIELDS: &[&str] = &[DESCRIPTION, PLACE_OF_ORIGIN];

/// A wood species used for reliefs and layered products.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Wood {
    #[serde(skip)]
    id: Option<OwnerId>,

    /// Machine name (e.g., "oak").
    pub name: String,

    /// Price per cubic decimetre in minor currency units.
    #[serde(default)]
    pub price_per_unit: i64,

    #[serde(skip)]
    translations: TranslationStore,
}

impl Wood {
    /// Create a new, unsaved wood.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_price(mut self, price_per_unit: i64) -> Self {
        self.price_per_unit = price_per_unit;
        self
    }
}

translatable_entity!(Wood, "wood", FIELDS);
