//! Locale configuration: which locales the catalog is translated into and
//! which one is the default.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::config::Config;
use crate::models::Language;
use crate::models::language::validate_language_id;

/// Ordered supported locales plus the process default locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleSettings {
    supported: Vec<String>,
    default: String,
}

impl LocaleSettings {
    /// Validate and build the settings.
    ///
    /// Every locale must be a valid language ID, duplicates are dropped
    /// (first occurrence wins) and the default must be supported.
    pub fn new(supported: Vec<String>, default: impl Into<String>) -> Result<Self> {
        let default = default.into();

        let mut unique: Vec<String> = Vec::with_capacity(supported.len());
        for locale in supported {
            validate_language_id(&locale)?;
            if !unique.contains(&locale) {
                unique.push(locale);
            }
        }

        if unique.is_empty() {
            anyhow::bail!("at least one supported locale is required");
        }
        if !unique.contains(&default) {
            anyhow::bail!(
                "default locale '{default}' is not among the supported locales ({})",
                unique.join(", ")
            );
        }

        Ok(Self {
            supported: unique,
            default,
        })
    }

    /// Settings from `SUPPORTED_LOCALES` / `DEFAULT_LOCALE`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.supported_locales.clone(),
            config.default_locale.clone(),
        )
        .context("invalid locale configuration")
    }

    /// Settings from the `language` table, ordered by weight.
    pub async fn load(pool: &PgPool) -> Result<Self> {
        let languages = Language::list_all(pool).await?;
        let default = languages
            .iter()
            .find(|l| l.is_default)
            .or_else(|| languages.first())
            .map(|l| l.id.clone())
            .context("no languages configured")?;

        Self::new(languages.into_iter().map(|l| l.id).collect(), default)
    }

    pub fn supported(&self) -> &[String] {
        &self.supported
    }

    pub fn default_locale(&self) -> &str {
        &self.default
    }

    pub fn is_supported(&self, locale: &str) -> bool {
        self.supported.iter().any(|l| l == locale)
    }

    /// The given locale if supported, else the default.
    pub fn resolve<'a>(&'a self, locale: Option<&'a str>) -> &'a str {
        match locale {
            Some(l) if self.is_supported(l) => l,
            _ => &self.default,
        }
    }
}

impl Default for LocaleSettings {
    fn default() -> Self {
        Self {
            supported: vec!["en".to_string()],
            default: "en".to_string(),
        }
    }
}
