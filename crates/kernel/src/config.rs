//! Configuration loaded from environment variables.

use std::env;

use anyhow::{Context, Result};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// Locales the catalog is translated into, in display order
    /// (comma-separated, default: "en,cs").
    pub supported_locales: Vec<String>,

    /// Locale used when none is requested (default: "en").
    pub default_locale: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let supported_locales = env::var("SUPPORTED_LOCALES")
            .map(|v| parse_locale_list(&v))
            .unwrap_or_else(|_| vec!["en".to_string(), "cs".to_string()]);

        let default_locale = env::var("DEFAULT_LOCALE")
            .map(|v| v.trim().to_lowercase())
            .unwrap_or_else(|_| "en".to_string());

        Ok(Self {
            database_url,
            database_max_connections,
            supported_locales,
            default_locale,
        })
    }
}

/// Split a comma-separated locale list, trimming and lowercasing entries.
pub fn parse_locale_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
