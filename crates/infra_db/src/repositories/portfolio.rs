//! Portfolio repository implementation
//!
//! One query joins every customer with its vehicle and driving history rows
//! (left joins, either may be absent) and its claim row (inner join, the
//! outcome is required). Segment predicates are appended as bound
//! parameters; no filter value is ever written into the SQL text.

use std::str::FromStr;
use std::time::Instant;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, instrument, warn};

use core_kernel::{CustomerId, DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_risk::{
    AgeBand, Customer, DrivingHistory, ExperienceBand, IncomeBand, PortfolioRecord, PortfolioSource,
    SegmentFilter, Vehicle,
};

use crate::error::DatabaseError;

const ADAPTER_ID: &str = "postgres-portfolio-repository";

const SELECT_PORTFOLIO: &str = r#"
    SELECT
        c.id,
        c.age,
        c.income,
        c.credit_score,
        c.gender,
        c.postal_code,
        v.id AS vehicle_id,
        v.vehicle_type,
        v.vehicle_year,
        v.annual_mileage,
        d.id AS history_id,
        d.driving_experience,
        d.speeding_violations,
        d.duis,
        cl.id AS claim_id,
        cl.outcome <> 0 AS outcome
    FROM customers c
    JOIN claims cl ON cl.id = c.id
    LEFT JOIN vehicles v ON v.id = c.id
    LEFT JOIN driving_history d ON d.id = c.id
    WHERE 1=1"#;

/// One joined row as stored
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PortfolioRow {
    pub id: i64,
    pub age: Option<String>,
    pub income: Option<String>,
    pub credit_score: Option<f64>,
    pub gender: Option<String>,
    pub postal_code: Option<String>,
    pub vehicle_id: Option<i64>,
    pub vehicle_type: Option<String>,
    pub vehicle_year: Option<i32>,
    pub annual_mileage: Option<i64>,
    pub history_id: Option<i64>,
    pub driving_experience: Option<String>,
    pub speeding_violations: Option<i32>,
    pub duis: Option<i32>,
    pub claim_id: i64,
    pub outcome: bool,
}

impl PortfolioRow {
    /// Maps the row to a domain record
    ///
    /// Categorical labels the domain does not know are treated as missing
    /// attributes, so the record is still scored.
    pub fn into_record(self) -> PortfolioRecord {
        let id = CustomerId::new(self.id);

        let customer = Customer {
            id,
            age_band: parse_label::<AgeBand>(id, "age", self.age.as_deref()),
            income_band: parse_label::<IncomeBand>(id, "income", self.income.as_deref()),
            credit_score: self.credit_score,
            gender: self.gender,
            postal_code: self.postal_code,
        };

        let vehicle = self.vehicle_id.map(|vehicle_id| Vehicle {
            customer_id: CustomerId::new(vehicle_id),
            vehicle_type: self.vehicle_type,
            vehicle_year: self.vehicle_year,
            annual_mileage: self.annual_mileage,
        });

        let history = self.history_id.map(|history_id| DrivingHistory {
            customer_id: CustomerId::new(history_id),
            driving_experience: parse_label::<ExperienceBand>(
                id,
                "driving_experience",
                self.driving_experience.as_deref(),
            ),
            speeding_violations: self.speeding_violations,
            dui_count: self.duis,
        });

        let mut record = PortfolioRecord::new(customer, self.outcome);
        record.claim.customer_id = CustomerId::new(self.claim_id);
        record.vehicle = vehicle;
        record.history = history;
        record
    }
}

fn parse_label<T: FromStr>(id: CustomerId, column: &'static str, value: Option<&str>) -> Option<T> {
    let value = value?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!(customer_id = %id, column, value, "Unknown category, treating as missing");
            None
        }
    }
}

/// Lower-cased labels for a case-insensitive `= ANY(...)` match
fn labels<T: ToString>(values: impl IntoIterator<Item = T>) -> Vec<String> {
    values
        .into_iter()
        .map(|value| value.to_string().to_lowercase())
        .collect()
}

/// Builds the portfolio query for a segment
///
/// The risk score range is not pushed down; scores do not exist in the
/// database and are applied after scoring.
pub fn build_portfolio_query(filter: &SegmentFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(SELECT_PORTFOLIO);

    if !filter.age_bands.is_empty() {
        builder.push(" AND LOWER(TRIM(c.age)) = ANY(");
        builder.push_bind(labels(filter.age_bands.iter()));
        builder.push(")");
    }

    if !filter.income_bands.is_empty() {
        builder.push(" AND LOWER(TRIM(c.income)) = ANY(");
        builder.push_bind(labels(filter.income_bands.iter()));
        builder.push(")");
    }

    if !filter.experience_bands.is_empty() {
        builder.push(" AND LOWER(TRIM(d.driving_experience)) = ANY(");
        builder.push_bind(labels(filter.experience_bands.iter()));
        builder.push(")");
    }

    if !filter.credit_score.is_unrestricted() {
        builder.push(" AND c.credit_score BETWEEN ");
        builder.push_bind(filter.credit_score.min);
        builder.push(" AND ");
        builder.push_bind(filter.credit_score.max);
    }

    builder.push(" ORDER BY c.id");
    builder
}

/// Repository over the four portfolio tables
///
/// Strictly read-only; the schema is owned elsewhere.
#[derive(Debug, Clone)]
pub struct PortfolioRepository {
    pool: PgPool,
}

impl PortfolioRepository {
    /// Creates a new PortfolioRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetches the raw joined rows of a segment
    pub async fn fetch_rows(&self, filter: &SegmentFilter) -> Result<Vec<PortfolioRow>, DatabaseError> {
        let mut builder = build_portfolio_query(filter);
        let rows = builder
            .build_query_as::<PortfolioRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

impl DomainPort for PortfolioRepository {}

#[async_trait]
impl HealthCheckable for PortfolioRepository {
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthCheckResult::healthy(ADAPTER_ID, latency_ms),
            Err(e) => HealthCheckResult::unhealthy(ADAPTER_ID, latency_ms, format!("Database error: {}", e)),
        }
    }
}

#[async_trait]
impl PortfolioSource for PortfolioRepository {
    #[instrument(skip(self, filter))]
    async fn fetch_records(&self, filter: &SegmentFilter) -> Result<Vec<PortfolioRecord>, PortError> {
        let rows = self.fetch_rows(filter).await?;
        debug!(rows = rows.len(), "Fetched portfolio rows");
        Ok(rows.into_iter().map(PortfolioRow::into_record).collect())
    }
}
