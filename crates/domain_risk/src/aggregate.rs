//! Grouped claim-rate aggregation
//!
//! `aggregate` groups scored records by zero or more dimensions and reports,
//! for every non-empty group, the record count, the number of filed claims
//! and the claim rate. Optional metrics add averages and portfolio share.
//! All derived figures are rounded half away from zero through
//! `core_kernel::rate`.
//!
//! Output order is fully determined by the query: rows are ordered by the
//! requested key, and rows that tie on it keep ascending dimension order.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::rate::{self, AVERAGE_DP, MILEAGE_DP, RATE_DP, SHARE_DP};
use crate::bands::{CreditBand, RiskTier};
use crate::record::{AgeBand, ExperienceBand, IncomeBand};
use crate::scoring::ScoredRecord;

/// An attribute records can be grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    RiskScore,
    RiskTier,
    AgeBand,
    IncomeBand,
    CreditBand,
    Gender,
    PostalCode,
    VehicleType,
    VehicleYear,
    DrivingExperience,
    Outcome,
}

impl Dimension {
    /// Reads this dimension's value from a record
    pub fn value_of(&self, record: &ScoredRecord) -> DimensionValue {
        let customer = &record.record.customer;
        let vehicle = record.record.vehicle.as_ref();
        let history = record.record.history.as_ref();

        let value = match self {
            Dimension::RiskScore => Some(DimensionValue::Score(record.score())),
            Dimension::RiskTier => Some(DimensionValue::Tier(record.tier())),
            Dimension::AgeBand => customer.age_band.map(DimensionValue::Age),
            Dimension::IncomeBand => customer.income_band.map(DimensionValue::Income),
            Dimension::CreditBand => record.credit_band().map(DimensionValue::Credit),
            Dimension::Gender => customer.gender.clone().map(DimensionValue::Text),
            Dimension::PostalCode => customer.postal_code.clone().map(DimensionValue::Text),
            Dimension::VehicleType => vehicle
                .and_then(|v| v.vehicle_type.clone())
                .map(DimensionValue::Text),
            Dimension::VehicleYear => vehicle
                .and_then(|v| v.vehicle_year)
                .map(DimensionValue::Year),
            Dimension::DrivingExperience => history
                .and_then(|h| h.driving_experience)
                .map(DimensionValue::Experience),
            Dimension::Outcome => Some(DimensionValue::Outcome(record.outcome())),
        };
        value.unwrap_or(DimensionValue::Unknown)
    }
}

/// The value of one dimension for a group
///
/// Serializes as the bare value; `Unknown` serializes as `null`. Values of a
/// single dimension order naturally, with `Unknown` last.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum DimensionValue {
    Score(u8),
    Tier(RiskTier),
    Age(AgeBand),
    Income(IncomeBand),
    Credit(CreditBand),
    Experience(ExperienceBand),
    Year(i32),
    Outcome(bool),
    Text(String),
    Unknown,
}

/// Optional metrics beyond count, claim count and claim rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Mean risk score, 2 dp
    AverageRiskScore,
    /// Mean annual mileage over records that report it, 0 dp
    AverageAnnualMileage,
    /// Mean credit score over records that report it, 2 dp
    AverageCreditScore,
    /// Group count as a percentage of all aggregated records, 1 dp
    ShareOfPortfolio,
}

/// What rows are ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    ClaimRate,
    Count,
    ClaimCount,
    Metric(Metric),
    Dimension(Dimension),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Row ordering; defaults to descending claim rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub key: SortKey,
    pub order: SortOrder,
}

impl Default for OrderBy {
    fn default() -> Self {
        Self {
            key: SortKey::ClaimRate,
            order: SortOrder::Descending,
        }
    }
}

/// Parameters of one aggregation call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationQuery {
    /// Group-by dimensions; empty means one portfolio-wide group
    pub dimensions: Vec<Dimension>,
    pub metrics: Vec<Metric>,
    pub order_by: OrderBy,
    /// Keep only the first `limit` rows after ordering
    pub limit: Option<usize>,
}

impl AggregationQuery {
    /// One row for the whole portfolio
    pub fn portfolio() -> Self {
        Self::default()
    }

    /// Groups by a single dimension
    pub fn by(dimension: Dimension) -> Self {
        Self {
            dimensions: vec![dimension],
            ..Self::default()
        }
    }

    /// Adds a further group-by dimension
    pub fn then_by(mut self, dimension: Dimension) -> Self {
        self.dimensions.push(dimension);
        self
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        if !self.metrics.contains(&metric) {
            self.metrics.push(metric);
        }
        self
    }

    pub fn order_by(mut self, key: SortKey, order: SortOrder) -> Self {
        self.order_by = OrderBy { key, order };
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn wants(&self, metric: Metric) -> bool {
        self.metrics.contains(&metric)
    }
}

/// One output group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRow {
    #[serde(flatten)]
    pub dimensions: BTreeMap<Dimension, DimensionValue>,
    pub count: u64,
    pub claim_count: u64,
    pub claim_rate: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_risk_score: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_annual_mileage: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_credit_score: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_of_portfolio: Option<Decimal>,
}

impl GroupRow {
    /// The group's value for a dimension
    pub fn value(&self, dimension: Dimension) -> Option<&DimensionValue> {
        self.dimensions.get(&dimension)
    }

    /// Reads a metric, if it was requested and defined for this group
    pub fn metric(&self, metric: Metric) -> Option<Decimal> {
        match metric {
            Metric::AverageRiskScore => self.average_risk_score,
            Metric::AverageAnnualMileage => self.average_annual_mileage,
            Metric::AverageCreditScore => self.average_credit_score,
            Metric::ShareOfPortfolio => self.share_of_portfolio,
        }
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    count: u64,
    claims: u64,
    score_sum: u64,
    mileage_sum: Decimal,
    mileage_count: u64,
    credit_sum: Decimal,
    credit_count: u64,
}

impl Accumulator {
    fn add(&mut self, record: &ScoredRecord) {
        self.count += 1;
        self.claims += u64::from(record.outcome());
        self.score_sum += u64::from(record.score());

        if let Some(mileage) = record.record.vehicle.as_ref().and_then(|v| v.annual_mileage) {
            self.mileage_sum += Decimal::from(mileage);
            self.mileage_count += 1;
        }
        if let Some(credit) = record.record.customer.credit_score.and_then(rate::decimal_from_f64) {
            self.credit_sum += credit;
            self.credit_count += 1;
        }
    }
}

/// Groups records and computes per-group claim statistics
///
/// Empty input yields no rows; a group only exists if at least one record
/// falls in it. Pure: the same records and query always give the same rows.
pub fn aggregate(records: &[ScoredRecord], query: &AggregationQuery) -> Vec<GroupRow> {
    let mut groups: BTreeMap<Vec<DimensionValue>, Accumulator> = BTreeMap::new();
    for record in records {
        let key = query
            .dimensions
            .iter()
            .map(|dimension| dimension.value_of(record))
            .collect();
        groups.entry(key).or_default().add(record);
    }

    let total = records.len() as u64;
    let mut rows: Vec<GroupRow> = groups
        .into_iter()
        .filter_map(|(key, acc)| build_row(query, key, acc, total))
        .collect();

    rows.sort_by(|a, b| compare_rows(a, b, &query.order_by));
    if let Some(limit) = query.limit {
        rows.truncate(limit);
    }

    debug!(
        dimensions = ?query.dimensions,
        records = total,
        groups = rows.len(),
        "Aggregated records"
    );
    rows
}

fn build_row(
    query: &AggregationQuery,
    key: Vec<DimensionValue>,
    acc: Accumulator,
    total: u64,
) -> Option<GroupRow> {
    // None only for an empty group, which is omitted
    let claim_rate = rate::ratio(acc.claims, acc.count, RATE_DP)?;

    let dimensions = query.dimensions.iter().copied().zip(key).collect();
    let average_risk_score = query
        .wants(Metric::AverageRiskScore)
        .then(|| rate::ratio(acc.score_sum, acc.count, AVERAGE_DP))
        .flatten();
    let average_annual_mileage = query
        .wants(Metric::AverageAnnualMileage)
        .then(|| rate::average(acc.mileage_sum, acc.mileage_count, MILEAGE_DP))
        .flatten();
    let average_credit_score = query
        .wants(Metric::AverageCreditScore)
        .then(|| rate::average(acc.credit_sum, acc.credit_count, AVERAGE_DP))
        .flatten();
    let share_of_portfolio = query
        .wants(Metric::ShareOfPortfolio)
        .then(|| rate::percentage(acc.count, total, SHARE_DP))
        .flatten();

    Some(GroupRow {
        dimensions,
        count: acc.count,
        claim_count: acc.claims,
        claim_rate,
        average_risk_score,
        average_annual_mileage,
        average_credit_score,
        share_of_portfolio,
    })
}

fn compare_rows(a: &GroupRow, b: &GroupRow, order_by: &OrderBy) -> Ordering {
    let ordering = match order_by.key {
        SortKey::ClaimRate => a.claim_rate.cmp(&b.claim_rate),
        SortKey::Count => a.count.cmp(&b.count),
        SortKey::ClaimCount => a.claim_count.cmp(&b.claim_count),
        SortKey::Metric(metric) => a.metric(metric).cmp(&b.metric(metric)),
        SortKey::Dimension(dimension) => a.value(dimension).cmp(&b.value(dimension)),
    };
    match order_by.order {
        SortOrder::Ascending => ordering,
        SortOrder::Descending => ordering.reverse(),
    }
}
