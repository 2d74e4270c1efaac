#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Tests run the real catalog and translation code against the in-memory
//! storage backend. The returned [`MemoryStorage`] shares state with the
//! catalog, so tests can inspect what was committed.

#![allow(dead_code)]

use atelier_kernel::Catalog;
use atelier_kernel::locale::LocaleSettings;
use atelier_kernel::storage::MemoryStorage;
use atelier_test_utils::locales;

/// Catalog over fresh in-memory storage, supporting "en" (default) and "cs".
pub fn memory_catalog() -> (Catalog, MemoryStorage) {
    memory_catalog_with_default("en")
}

/// Like [`memory_catalog`] with another default locale.
pub fn memory_catalog_with_default(default: &str) -> (Catalog, MemoryStorage) {
    let storage = MemoryStorage::new();
    let settings = LocaleSettings::new(locales(&["en", "cs"]), default).expect("valid locales");
    (Catalog::new(storage.clone(), settings), storage)
}
