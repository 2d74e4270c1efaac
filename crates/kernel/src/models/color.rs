//! Color model: paints and dyes applied to products.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::translation::{OwnerId, TranslationStore};

pub const DESCRIPTION: &str = "description";

/// Translatable fields of a color.
pub const FIELDS: &[&str] = &[DESCRIPTION];

/// A color.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Color {
    #[serde(skip)]
    id: Option<OwnerId>,

    /// Machine name (e.g., "royal_blue").
    pub name: String,

    /// Hex code in `#rrggbb` form, lowercase.
    pub hex: String,

    #[serde(skip)]
    translations: TranslationStore,
}

/// Validate and normalise a `#rrggbb` hex code.
fn normalize_hex(hex: &str) -> Result<String> {
    let trimmed = hex.trim();
    let Some(digits) = trimmed.strip_prefix('#') else {
        anyhow::bail!("color hex code must start with '#', got '{trimmed}'");
    };
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        anyhow::bail!("color hex code must have 6 hex digits, got '{trimmed}'");
    }
    Ok(format!("#{}", digits.to_ascii_lowercase()))
}

impl Color {
    /// Create a new, unsaved color.
    pub fn new(name: impl Into<String>, hex: &str) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            hex: normalize_hex(hex)?,
            ..Self::default()
        })
    }

    pub fn set_hex(&mut self, hex: &str) -> Result<()> {
        self.hex = normalize_hex(hex)?;
        Ok(())
    }

    /// Red, green and blue components.
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        let digits = self.hex.strip_prefix('#')?;
        let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
        Some((channel(0)?, channel(2)?, channel(4)?))
    }
}

translatable_entity!(Color, "color", FIELDS);
