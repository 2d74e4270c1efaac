//! Material model: processed materials priced per unit.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::translation::{OwnerId, TranslationStore};

pub const NAME: &str = "name";
pub const DESCRIPTION: &str = "description";

/// Translatable fields of a material.
pub const FIELDS: &[&str] = &[NAME, DESCRIPTION];

/// Unit a material is sold and consumed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialUnit {
    #[default]
    Piece,
    Meter,
    SquareMeter,
    Kilogram,
}

impl fmt::Display for MaterialUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaterialUnit::Piece => write!(f, "pc"),
            MaterialUnit::Meter => write!(f, "m"),
            MaterialUnit::SquareMeter => write!(f, "m²"),
            MaterialUnit::Kilogram => write!(f, "kg"),
        }
    }
}

/// A processed material (fabric, plywood sheet, lacquer, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Material {
    #[serde(skip)]
    id: Option<OwnerId>,

    /// Stock code.
    pub code: String,

    pub unit: MaterialUnit,

    /// Price per unit in minor currency units.
    pub price_per_unit: i64,

    #[serde(skip)]
    translations: TranslationStore,
}

impl Material {
    /// Create a new, unsaved material.
    pub fn new(code: impl Into<String>, unit: MaterialUnit, price_per_unit: i64) -> Self {
        Self {
            code: code.into(),
            unit,
            price_per_unit,
            ..Self::default()
        }
    }

    /// Price of `quantity` units, rounded half away from zero.
    pub fn price_for(&self, quantity: f64) -> i64 {
        (self.price_per_unit as f64 * quantity).round() as i64
    }
}

translatable_entity!(Material, "material", FIELDS);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_for_rounds_to_minor_units() {
        let satin = Material::new("satin-red", MaterialUnit::SquareMeter, 34_900);
        assert_eq!(satin.price_for(1.0), 34_900);
        assert_eq!(satin.price_for(0.25), 8_725);
        assert_eq!(satin.price_for(0.0), 0);

        let grommet = Material::new("grommet", MaterialUnit::Piece, 5);
        assert_eq!(grommet.price_for(2.5), 13);
    }

    #[test]
    fn unit_serializes_as_snake_case() {
        let json = serde_json::to_value(MaterialUnit::SquareMeter).ok();
        assert_eq!(json, Some(serde_json::json!("square_meter")));
        assert_eq!(MaterialUnit::SquareMeter.to_string(), "m²");
    }
}
