//! Database module
//!
//! Owns the SQLite pool, the schema bootstrap, and the repositories built on
//! top of it. The schema is created at startup; the service aborts if the
//! database cannot be initialized.

pub mod models;
pub mod repositories;

pub use models::{CountryFilters, CountryRecord, NewCountry, RefreshMetadata, SortKey};
pub use repositories::CountryRepository;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

/// Connect to SQLite and bootstrap the schema.
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    // An in-memory database exists per connection, so it must not be pooled
    let max_connections = if database_url.contains(":memory:") { 1 } else { 10 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to database at {database_url}"))?;

    init_schema(&pool)
        .await
        .context("Failed to initialize database schema")?;

    Ok(pool)
}

/// Create the tables and seed the metadata singleton if missing.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS countries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            capital TEXT,
            region TEXT,
            population INTEGER NOT NULL,
            currency_code TEXT,
            exchange_rate REAL,
            estimated_gdp REAL,
            flag_url TEXT,
            last_refreshed_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_countries_region ON countries (region)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_countries_currency ON countries (currency_code)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS refresh_metadata (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            last_refreshed_at TEXT,
            total_countries INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Seed the singleton zero state once
    sqlx::query("INSERT OR IGNORE INTO refresh_metadata (id, total_countries) VALUES (1, 0)")
        .execute(pool)
        .await?;

    tracing::debug!("Database schema initialized");

    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    init_schema(&pool).await.unwrap();
    pool
}
