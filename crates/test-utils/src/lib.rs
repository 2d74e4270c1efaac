//! Atelier test utilities.
//!
//! Helpers for integration testing: optional database access and unique
//! fixture names so parallel tests never collide.

use sqlx::PgPool;
use uuid::Uuid;

/// Connect to the database named by `DATABASE_URL`.
///
/// Returns `None` when the variable is unset so that database tests can skip
/// themselves on machines without PostgreSQL.
pub async fn test_pool() -> Option<PgPool> {
    let url = std::env::var("DATABASE_URL").ok()?;
    match PgPool::connect(&url).await {
        Ok(pool) => Some(pool),
        Err(e) => panic!("DATABASE_URL is set but unreachable: {e}"),
    }
}

/// A name that is unique across test runs, e.g. `oak-0190f3c2...`.
pub fn unique_name(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::now_v7().simple())
}

/// Owned locale list from string literals.
pub fn locales(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}
