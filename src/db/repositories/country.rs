//! Country repository
//!
//! Data access layer for country rows and the refresh metadata singleton.
//! Each upsert is an independent statement keyed by the case-sensitive name;
//! there is no cross-record transaction, so a failure mid-pass leaves earlier
//! writes committed.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::db::models::{CountryFilters, CountryRecord, NewCountry, RefreshMetadata};

/// Repository for country operations
#[derive(Clone)]
pub struct CountryRepository {
    pool: SqlitePool,
}

impl CountryRepository {
    /// Create a new country repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or update one country, keyed by name.
    ///
    /// On conflict every mutable field is overwritten with the new values,
    /// including `last_refreshed_at` (assigned here, at write time).
    pub async fn upsert(&self, country: &NewCountry) -> Result<(), sqlx::Error> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO countries
                (name, capital, region, population, currency_code,
                 exchange_rate, estimated_gdp, flag_url, last_refreshed_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET
                capital = excluded.capital,
                region = excluded.region,
                population = excluded.population,
                currency_code = excluded.currency_code,
                exchange_rate = excluded.exchange_rate,
                estimated_gdp = excluded.estimated_gdp,
                flag_url = excluded.flag_url,
                last_refreshed_at = excluded.last_refreshed_at
            "#,
        )
        .bind(&country.name)
        .bind(&country.capital)
        .bind(&country.region)
        .bind(country.population)
        .bind(&country.currency_code)
        .bind(country.exchange_rate)
        .bind(country.estimated_gdp)
        .bind(&country.flag_url)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// List countries, optionally filtered by exact region and/or currency
    /// code (AND-combined) and ordered by an optional sort key. Without a
    /// sort key the order is whatever the store returns.
    pub async fn find_all(
        &self,
        filters: &CountryFilters,
    ) -> Result<Vec<CountryRecord>, sqlx::Error> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM countries WHERE 1=1");

        if let Some(region) = &filters.region {
            query.push(" AND region = ").push_bind(region);
        }

        if let Some(currency) = &filters.currency {
            query.push(" AND currency_code = ").push_bind(currency);
        }

        if let Some(sort) = filters.sort {
            query.push(" ORDER BY ").push(sort.order_clause());
        }

        query
            .build_query_as::<CountryRecord>()
            .fetch_all(&self.pool)
            .await
    }

    /// Case-insensitive lookup by name.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<CountryRecord>, sqlx::Error> {
        sqlx::query_as::<_, CountryRecord>(
            "SELECT * FROM countries WHERE LOWER(name) = LOWER(?) LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
    }

    /// Case-insensitive delete by name. Returns the number of rows removed
    /// (0 or 1, names are unique).
    pub async fn delete_by_name(&self, name: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM countries WHERE LOWER(name) = LOWER(?)")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Total number of country rows.
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM countries")
            .fetch_one(&self.pool)
            .await
    }

    /// Up to `limit` countries with a known estimated GDP, highest first.
    /// Ties are broken by name so the list is deterministic.
    pub async fn top_by_estimated_gdp(
        &self,
        limit: i64,
    ) -> Result<Vec<CountryRecord>, sqlx::Error> {
        sqlx::query_as::<_, CountryRecord>(
            r#"
            SELECT * FROM countries
            WHERE estimated_gdp IS NOT NULL
            ORDER BY estimated_gdp DESC, name ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// Overwrite the metadata singleton with the current row count and the
    /// current time. Called once per refresh pass, after all upserts.
    pub async fn recompute_metadata(&self) -> Result<RefreshMetadata, sqlx::Error> {
        let total = self.count().await?;
        let now = Utc::now();

        sqlx::query(
            "UPDATE refresh_metadata SET last_refreshed_at = ?, total_countries = ? WHERE id = 1",
        )
        .bind(now)
        .bind(total)
        .execute(&self.pool)
        .await?;

        Ok(RefreshMetadata {
            last_refreshed_at: Some(now),
            total_countries: total,
        })
    }

    /// Read the metadata singleton.
    pub async fn get_metadata(&self) -> Result<RefreshMetadata, sqlx::Error> {
        sqlx::query_as::<_, RefreshMetadata>(
            "SELECT last_refreshed_at, total_countries FROM refresh_metadata WHERE id = 1",
        )
        .fetch_one(&self.pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::SortKey;
    use crate::db::test_pool;

    fn country(name: &str) -> NewCountry {
        NewCountry {
            name: name.to_string(),
            capital: Some("Capital".to_string()),
            region: Some("Europe".to_string()),
            population: 1_000_000,
            currency_code: Some("EUR".to_string()),
            exchange_rate: Some(0.9),
            estimated_gdp: Some(1_500_000_000.0),
            flag_url: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_updates_in_place() {
        let repo = CountryRepository::new(test_pool().await);

        repo.upsert(&country("Japan")).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);

        let mut updated = country("Japan");
        updated.population = 125_000_000;
        updated.capital = Some("Tokyo".to_string());
        repo.upsert(&updated).await.unwrap();

        // Still exactly one row, carrying the latest field values
        assert_eq!(repo.count().await.unwrap(), 1);
        let stored = repo.find_by_name("Japan").await.unwrap().unwrap();
        assert_eq!(stored.population, 125_000_000);
        assert_eq!(stored.capital.as_deref(), Some("Tokyo"));
    }

    #[tokio::test]
    async fn test_count_tracks_distinct_names() {
        let repo = CountryRepository::new(test_pool().await);

        for name in ["France", "Germany", "Spain"] {
            repo.upsert(&country(name)).await.unwrap();
        }
        assert_eq!(repo.count().await.unwrap(), 3);

        repo.upsert(&country("France")).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_lookup_and_delete_are_case_insensitive() {
        let repo = CountryRepository::new(test_pool().await);
        repo.upsert(&country("Japan")).await.unwrap();

        let upper = repo.find_by_name("Japan").await.unwrap().unwrap();
        let lower = repo.find_by_name("japan").await.unwrap().unwrap();
        assert_eq!(upper.id, lower.id);

        assert_eq!(repo.delete_by_name("JAPAN").await.unwrap(), 1);
        assert!(repo.find_by_name("Japan").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_name_leaves_store_unchanged() {
        let repo = CountryRepository::new(test_pool().await);
        repo.upsert(&country("Japan")).await.unwrap();

        assert_eq!(repo.delete_by_name("Atlantis").await.unwrap(), 0);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_top_by_estimated_gdp_orders_and_limits() {
        let repo = CountryRepository::new(test_pool().await);

        for (name, gdp) in [
            ("Small", Some(10.0)),
            ("Large", Some(1000.0)),
            ("Medium", Some(100.0)),
            ("Unrated", None),
        ] {
            let mut c = country(name);
            c.estimated_gdp = gdp;
            c.exchange_rate = gdp.map(|_| 1.0);
            repo.upsert(&c).await.unwrap();
        }

        let top = repo.top_by_estimated_gdp(2).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "Large");
        assert_eq!(top[1].name, "Medium");
        assert!(top.iter().all(|c| c.estimated_gdp.is_some()));
    }

    #[tokio::test]
    async fn test_top_by_estimated_gdp_tie_breaks_by_name() {
        let repo = CountryRepository::new(test_pool().await);

        for name in ["Beta", "Alpha"] {
            let mut c = country(name);
            c.estimated_gdp = Some(500.0);
            repo.upsert(&c).await.unwrap();
        }

        let top = repo.top_by_estimated_gdp(5).await.unwrap();
        assert_eq!(top[0].name, "Alpha");
        assert_eq!(top[1].name, "Beta");
    }

    #[tokio::test]
    async fn test_find_all_filters_and_sorts() {
        let repo = CountryRepository::new(test_pool().await);

        let mut germany = country("Germany");
        germany.region = Some("Europe".to_string());
        let mut austria = country("Austria");
        austria.region = Some("Europe".to_string());
        let mut japan = country("Japan");
        japan.region = Some("Asia".to_string());
        japan.currency_code = Some("JPY".to_string());

        for c in [&germany, &austria, &japan] {
            repo.upsert(c).await.unwrap();
        }

        let filters = CountryFilters {
            region: Some("Europe".to_string()),
            currency: None,
            sort: Some(SortKey::NameAsc),
        };
        let europe = repo.find_all(&filters).await.unwrap();
        assert_eq!(europe.len(), 2);
        assert_eq!(europe[0].name, "Austria");
        assert_eq!(europe[1].name, "Germany");

        // Region and currency filters are AND-combined
        let filters = CountryFilters {
            region: Some("Europe".to_string()),
            currency: Some("JPY".to_string()),
            sort: None,
        };
        assert!(repo.find_all(&filters).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_all_sorts_by_estimated_gdp() {
        let repo = CountryRepository::new(test_pool().await);

        for (name, gdp) in [("Mid", 100.0), ("Rich", 1000.0), ("Poor", 10.0)] {
            let mut c = country(name);
            c.estimated_gdp = Some(gdp);
            repo.upsert(&c).await.unwrap();
        }

        let filters = CountryFilters {
            sort: Some(SortKey::GdpDesc),
            ..Default::default()
        };
        let descending = repo.find_all(&filters).await.unwrap();
        let names: Vec<_> = descending.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Rich", "Mid", "Poor"]);

        let filters = CountryFilters {
            sort: Some(SortKey::GdpAsc),
            ..Default::default()
        };
        let ascending = repo.find_all(&filters).await.unwrap();
        let names: Vec<_> = ascending.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Poor", "Mid", "Rich"]);
    }

    #[tokio::test]
    async fn test_metadata_starts_zeroed_and_recomputes() {
        let repo = CountryRepository::new(test_pool().await);

        let initial = repo.get_metadata().await.unwrap();
        assert_eq!(initial.total_countries, 0);
        assert!(initial.last_refreshed_at.is_none());

        repo.upsert(&country("France")).await.unwrap();
        repo.upsert(&country("Spain")).await.unwrap();
        repo.recompute_metadata().await.unwrap();

        let metadata = repo.get_metadata().await.unwrap();
        assert_eq!(metadata.total_countries, 2);
        assert!(metadata.last_refreshed_at.is_some());
    }
}
