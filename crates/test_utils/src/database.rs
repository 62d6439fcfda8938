//! Database Test Utilities
//!
//! Provides a PostgreSQL testcontainer with the four portfolio tables and a
//! helper to seed them from domain records. Tests that use it need Docker
//! and are marked `#[ignore]`.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};
use tokio::sync::OnceCell;

use domain_risk::PortfolioRecord;

/// Default PostgreSQL image for testing
const POSTGRES_IMAGE: &str = "postgres";
const POSTGRES_TAG: &str = "16-alpine";
const POSTGRES_USER: &str = "test_user";
const POSTGRES_PASSWORD: &str = "test_password";
const POSTGRES_DB: &str = "risk_analytics_test";

/// The portfolio tables as the analytics database defines them
pub const PORTFOLIO_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS customers (
    id BIGINT PRIMARY KEY,
    age TEXT,
    gender TEXT,
    income TEXT,
    credit_score DOUBLE PRECISION,
    postal_code TEXT
);

CREATE TABLE IF NOT EXISTS vehicles (
    id BIGINT PRIMARY KEY,
    vehicle_type TEXT,
    vehicle_year INTEGER,
    annual_mileage BIGINT
);

CREATE TABLE IF NOT EXISTS driving_history (
    id BIGINT PRIMARY KEY,
    driving_experience TEXT,
    speeding_violations INTEGER,
    duis INTEGER
);

CREATE TABLE IF NOT EXISTS claims (
    id BIGINT PRIMARY KEY,
    outcome INTEGER NOT NULL
);
"#;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Configuration for test database
#[derive(Debug, Clone)]
pub struct TestDatabaseConfig {
    pub user: String,
    pub password: String,
    pub database: String,
    pub host: String,
    pub port: u16,
}

impl Default for TestDatabaseConfig {
    fn default() -> Self {
        Self {
            user: POSTGRES_USER.to_string(),
            password: POSTGRES_PASSWORD.to_string(),
            database: POSTGRES_DB.to_string(),
            host: "localhost".to_string(),
            port: 5432,
        }
    }
}

impl TestDatabaseConfig {
    /// Creates the database connection URL
    pub fn connection_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

/// A wrapper around a PostgreSQL test container
pub struct TestDatabase {
    _container: ContainerAsync<GenericImage>,
    pub config: TestDatabaseConfig,
    pub pool: PgPool,
}

impl TestDatabase {
    /// Starts a new PostgreSQL container with the portfolio tables created
    ///
    /// # Errors
    ///
    /// Returns an error if the container fails to start or schema fails to initialize
    pub async fn new() -> Result<Self, BoxError> {
        let container = GenericImage::new(POSTGRES_IMAGE, POSTGRES_TAG)
            .with_exposed_port(5432.tcp())
            .with_wait_for(WaitFor::message_on_stderr("database system is ready to accept connections"))
            .with_env_var("POSTGRES_USER", POSTGRES_USER)
            .with_env_var("POSTGRES_PASSWORD", POSTGRES_PASSWORD)
            .with_env_var("POSTGRES_DB", POSTGRES_DB)
            .start()
            .await?;

        let port = container.get_host_port_ipv4(5432).await?;
        let host = container.get_host().await?.to_string();

        let config = TestDatabaseConfig {
            host,
            port,
            ..TestDatabaseConfig::default()
        };

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.connection_url())
            .await?;

        let test_db = Self {
            _container: container,
            config,
            pool,
        };

        test_db.init_schema().await?;

        Ok(test_db)
    }

    async fn init_schema(&self) -> Result<(), BoxError> {
        sqlx::raw_sql(PORTFOLIO_SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    /// Returns a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Inserts records into the four tables
    ///
    /// Vehicle and history rows are only written when present on the record.
    pub async fn seed(&self, records: &[PortfolioRecord]) -> Result<(), BoxError> {
        let mut tx = self.pool.begin().await?;

        for record in records {
            let customer = &record.customer;
            sqlx::query(
                "INSERT INTO customers (id, age, gender, income, credit_score, postal_code) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(customer.id.value())
            .bind(customer.age_band.map(|band| band.as_str()))
            .bind(customer.gender.as_deref())
            .bind(customer.income_band.map(|band| band.as_str()))
            .bind(customer.credit_score)
            .bind(customer.postal_code.as_deref())
            .execute(&mut *tx)
            .await?;

            if let Some(vehicle) = &record.vehicle {
                sqlx::query(
                    "INSERT INTO vehicles (id, vehicle_type, vehicle_year, annual_mileage) \
                     VALUES ($1, $2, $3, $4)",
                )
                .bind(vehicle.customer_id.value())
                .bind(vehicle.vehicle_type.as_deref())
                .bind(vehicle.vehicle_year)
                .bind(vehicle.annual_mileage)
                .execute(&mut *tx)
                .await?;
            }

            if let Some(history) = &record.history {
                sqlx::query(
                    "INSERT INTO driving_history (id, driving_experience, speeding_violations, duis) \
                     VALUES ($1, $2, $3, $4)",
                )
                .bind(history.customer_id.value())
                .bind(history.driving_experience.map(|band| band.as_str()))
                .bind(history.speeding_violations)
                .bind(history.dui_count)
                .execute(&mut *tx)
                .await?;
            }

            sqlx::query("INSERT INTO claims (id, outcome) VALUES ($1, $2)")
                .bind(record.claim.customer_id.value())
                .bind(i32::from(record.claim.outcome))
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Clears all data from the database while preserving the schema
    pub async fn clear_data(&self) -> Result<(), BoxError> {
        sqlx::raw_sql("TRUNCATE TABLE customers, vehicles, driving_history, claims")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Global test database for shared integration tests
static SHARED_TEST_DB: OnceCell<Arc<TestDatabase>> = OnceCell::const_new();

/// Gets or creates a shared test database instance
///
/// # Panics
///
/// Panics if the database fails to initialize
pub async fn get_shared_test_database() -> Arc<TestDatabase> {
    SHARED_TEST_DB
        .get_or_init(|| async {
            Arc::new(
                TestDatabase::new()
                    .await
                    .expect("Failed to create shared test database"),
            )
        })
        .await
        .clone()
}

/// Creates an isolated test database for a single test
pub async fn create_isolated_test_database() -> Result<TestDatabase, BoxError> {
    TestDatabase::new().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_connection_url() {
        let config = TestDatabaseConfig::default();
        let url = config.connection_url();

        assert!(url.starts_with("postgres://"));
        assert!(url.contains(POSTGRES_USER));
        assert!(url.contains(POSTGRES_DB));
    }

    #[test]
    fn test_schema_defines_every_table() {
        for table in ["customers", "vehicles", "driving_history", "claims"] {
            assert!(PORTFOLIO_SCHEMA.contains(&format!("CREATE TABLE IF NOT EXISTS {} (", table)));
        }
    }
}
