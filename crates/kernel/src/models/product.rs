//! Product model: flags, reliefs and layered items built from materials.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::material::Material;
use crate::translation::{OwnerId, Translatable, TranslationStore};

pub const NAME: &str = "name";
pub const DESCRIPTION: &str = "description";

/// Translatable fields of a product.
pub const FIELDS: &[&str] = &[NAME, DESCRIPTION];

/// Product family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    #[default]
    Flag,
    Relief,
    Layered,
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductKind::Flag => write!(f, "flag"),
            ProductKind::Relief => write!(f, "relief"),
            ProductKind::Layered => write!(f, "layered"),
        }
    }
}

/// Quantity of one material consumed by a product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialUsage {
    pub material_id: OwnerId,
    pub quantity: f64,
}

/// A catalog product.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Product {
    #[serde(skip)]
    id: Option<OwnerId>,

    /// Catalog code (e.g., "FLAG-CZ-150").
    pub code: String,

    pub kind: ProductKind,

    pub width_mm: u32,

    pub height_mm: u32,

    /// Bill of materials.
    #[serde(default)]
    pub components: Vec<MaterialUsage>,

    #[serde(skip)]
    translations: TranslationStore,
}

impl Product {
    /// Create a new, unsaved product.
    pub fn new(code: impl Into<String>, kind: ProductKind, width_mm: u32, height_mm: u32) -> Self {
        Self {
            code: code.into(),
            kind,
            width_mm,
            height_mm,
            ..Self::default()
        }
    }

    /// Add `quantity` of a material to the bill of materials.
    ///
    /// Quantities of a material already listed are summed.
    pub fn add_component(&mut self, material_id: OwnerId, quantity: f64) {
        match self
            .components
            .iter_mut()
            .find(|c| c.material_id == material_id)
        {
            Some(usage) => usage.quantity += quantity,
            None => self.components.push(MaterialUsage {
                material_id,
                quantity,
            }),
        }
    }

    /// Face area in square metres.
    pub fn area_m2(&self) -> f64 {
        f64::from(self.width_mm) * f64::from(self.height_mm) / 1_000_000.0
    }

    /// Material cost in minor currency units.
    ///
    /// Returns `None` if a component references a material that is not in
    /// `materials`, or if the total overflows.
    pub fn price(&self, materials: &[Material]) -> Option<i64> {
        self.components.iter().try_fold(0i64, |total, usage| {
            let material = materials
                .iter()
                .find(|m| m.id() == Some(usage.material_id))?;
            total.checked_add(material.price_for(usage.quantity))
        })
    }
}

translatable_entity!(Product, "product", FIELDS);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatalogEntity, MaterialUnit};

    fn material(id: OwnerId, code: &str, unit: MaterialUnit, price: i64) -> Material {
        let mut material = Material::new(code, unit, price);
        material.assign_id(id);
        material
    }

    #[test]
    fn price_sums_components() {
        let materials = vec![
            material(1, "satin-red", MaterialUnit::SquareMeter, 34_900),
            material(2, "grommet", MaterialUnit::Piece, 5),
        ];

        let mut flag = Product::new("FLAG-CZ-150", ProductKind::Flag, 1500, 1000);
        flag.add_component(1, flag.area_m2());
        flag.add_component(2, 2.0);
        flag.add_component(2, 2.0);

        assert_eq!(flag.components.len(), 2);
        assert_eq!(flag.price(&materials), Some(52_350 + 20));
    }

    #[test]
    fn price_is_none_for_unknown_material() {
        let mut relief = Product::new("REL-1", ProductKind::Relief, 300, 300);
        relief.add_component(99, 1.0);

        assert_eq!(relief.price(&[]), None);
    }

    #[test]
    fn price_is_none_on_overflow() {
        let materials = vec![
            material(1, "gold-leaf", MaterialUnit::Piece, i64::MAX),
            material(2, "grommet", MaterialUnit::Piece, 5),
        ];
        let mut flag = Product::new("FLAG-GOLD", ProductKind::Flag, 100, 100);
        flag.add_component(1, 1.0);
        flag.add_component(2, 1.0);

        assert_eq!(flag.price(&materials), None);
    }

    #[test]
    fn empty_bill_of_materials_costs_nothing() {
        let layered = Product::new("LAY-1", ProductKind::Layered, 200, 200);
        assert_eq!(layered.price(&[]), Some(0));
        assert_eq!(layered.kind.to_string(), "layered");
    }
}
