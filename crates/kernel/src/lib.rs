//! Atelier Catalog Kernel Library
//!
//! Catalog entities (colors, woods, materials, products) with per-locale
//! translations stored in a side table. The administrative CLI is the
//! `atelier` binary.

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod locale;
pub mod models;
pub mod storage;
pub mod translation;

pub use catalog::Catalog;
pub use config::Config;
pub use error::{TranslationError, TranslationResult};
pub use locale::LocaleSettings;
