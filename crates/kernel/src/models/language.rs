//! Language model.
//!
//! Languages are the locales a catalog can be translated into. The
//! `language` table is seeded with English (default) and Czech.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Language record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Language {
    /// Language code (e.g., "en", "cs").
    pub id: String,

    /// Human-readable label (e.g., "English").
    pub label: String,

    /// Sort weight for language ordering.
    pub weight: i32,

    /// Whether this is the default language.
    pub is_default: bool,
}

/// Validate that a language ID follows BCP 47 primary subtag format.
///
/// Accepts: lowercase alpha 2-3 chars, optionally followed by hyphen-separated
/// alphanumeric subtags (e.g., "en", "cs", "pt-br", "zh-hans").
pub fn validate_language_id(id: &str) -> Result<()> {
    if id.is_empty() || id.len() > 12 {
        anyhow::bail!("language ID must be 1-12 characters, got '{id}'");
    }

    let mut parts = id.split('-');

    match parts.next() {
        Some(primary) if (2..=3).contains(&primary.len()) => {
            if !primary.bytes().all(|b| b.is_ascii_lowercase()) {
                anyhow::bail!("language ID primary subtag must be lowercase letters, got '{id}'");
            }
        }
        _ => {
            anyhow::bail!("language ID must start with a 2-3 letter primary subtag, got '{id}'");
        }
    }

    for subtag in parts {
        if subtag.is_empty()
            || subtag.len() > 8
            || !subtag.bytes().all(|b| b.is_ascii_alphanumeric())
        {
            anyhow::bail!(
                "language ID subtag must be 1-8 alphanumeric characters, got '{subtag}' in '{id}'"
            );
        }
    }

    Ok(())
}

impl Language {
    /// List all languages ordered by weight.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>> {
        let langs = sqlx::query_as::<_, Language>(
            "SELECT id, label, weight, is_default FROM language ORDER BY weight, id",
        )
        .fetch_all(pool)
        .await
        .context("failed to list languages")?;

        Ok(langs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_language_ids() {
        assert!(validate_language_id("en").is_ok());
        assert!(validate_language_id("cs").is_ok());
        assert!(validate_language_id("ast").is_ok());
        assert!(validate_language_id("pt-br").is_ok());
        assert!(validate_language_id("zh-hans").is_ok());
    }

    #[test]
    fn invalid_language_ids() {
        assert!(validate_language_id("").is_err());
        assert!(validate_language_id("e").is_err());
        assert!(validate_language_id("EN").is_err());
        assert!(validate_language_id("en-").is_err());
        assert!(validate_language_id("en_US").is_err());
        assert!(validate_language_id("toolonglanguage").is_err());
    }
}
