//! Portfolio reports
//!
//! Each report is a named call into [`aggregate`] (or a simple ordered
//! selection) over an already scored portfolio. Reports never fetch data;
//! callers load a [`ScoredPortfolio`] once and may run any number of reports
//! over it.

use std::cmp::Reverse;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use core_kernel::rate::{self, RATE_DP};
use core_kernel::CustomerId;
use crate::aggregate::{aggregate, AggregationQuery, Dimension, GroupRow, Metric, SortKey, SortOrder};
use crate::bands::HIGH_RISK_MIN_SCORE;
use crate::flags::{RiskFlag, RiskFlags};
use crate::score::RiskScore;
use crate::scoring::{ScoredPortfolio, ScoredRecord};

/// Rows returned by the component flags report when no limit is given
pub const DEFAULT_COMPONENT_LIMIT: usize = 50;
/// Rows returned by the high-risk customers report when no limit is given
pub const DEFAULT_HIGH_RISK_LIMIT: usize = 20;

/// Label of the score >= 3 group in the extremes comparison
pub const HIGH_RISK_GROUP: &str = "High Risk (3+)";
/// Label of the score <= 1 group in the extremes comparison
pub const LOW_RISK_GROUP: &str = "Low Risk (0-1)";

/// Headline figures for a set of customers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioKpis {
    pub total_customers: u64,
    pub total_claims: u64,
    /// Absent when there are no customers
    pub claim_rate: Option<Decimal>,
}

/// One side of the high/low risk comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtremeGroupRow {
    pub risk_group: &'static str,
    pub count: u64,
    pub claim_count: u64,
    pub claim_rate: Decimal,
}

/// Number of customers raising one flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlagCount {
    pub flag: RiskFlag,
    pub customers: u64,
}

/// Flag counts across the portfolio, in flag order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlagDistribution {
    pub total_customers: u64,
    pub flags: Vec<FlagCount>,
}

impl FlagDistribution {
    pub fn count(&self, flag: RiskFlag) -> u64 {
        self.flags
            .iter()
            .find(|entry| entry.flag == flag)
            .map_or(0, |entry| entry.customers)
    }
}

/// A customer listed by score with the outcome it is validated against
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighRiskCustomer {
    pub customer_id: CustomerId,
    pub risk_score: u8,
    pub outcome: bool,
    #[serde(flatten)]
    pub flags: RiskFlags,
}

impl From<&ScoredRecord> for HighRiskCustomer {
    fn from(record: &ScoredRecord) -> Self {
        Self {
            customer_id: record.customer_id(),
            risk_score: record.score(),
            outcome: record.outcome(),
            flags: *record.risk.flags(),
        }
    }
}

/// Summary metrics of a filtered segment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentSummary {
    pub customers: u64,
    pub average_risk_score: Option<Decimal>,
    pub claim_rate: Option<Decimal>,
    pub average_credit_score: Option<Decimal>,
}

/// Counts of a segment split along single attributes, each in natural order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentComposition {
    pub by_age: Vec<GroupRow>,
    pub by_risk_score: Vec<GroupRow>,
    pub by_income: Vec<GroupRow>,
    pub by_outcome: Vec<GroupRow>,
}

/// The scoring summary page: KPIs, tiers, distribution and extremes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskSummary {
    pub portfolio: PortfolioKpis,
    pub high_risk: PortfolioKpis,
    pub claim_rate_by_tier: Vec<GroupRow>,
    pub score_distribution: Vec<GroupRow>,
    pub score_vs_claim_rate: Vec<GroupRow>,
    pub claim_load_by_score: Vec<GroupRow>,
    pub extremes: Vec<ExtremeGroupRow>,
}

/// Exploratory breakdowns of the portfolio by customer and vehicle attributes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentOverview {
    pub by_postal_code: Vec<GroupRow>,
    pub by_income: Vec<GroupRow>,
    pub by_gender: Vec<GroupRow>,
    pub by_vehicle_type: Vec<GroupRow>,
    pub by_age: Vec<GroupRow>,
    pub by_age_and_income: Vec<GroupRow>,
    pub by_driving_experience: Vec<GroupRow>,
    pub by_vehicle_year: Vec<GroupRow>,
    pub by_risk_score: Vec<GroupRow>,
    pub by_credit_band: Vec<GroupRow>,
}

/// Report operations over a scored portfolio
#[derive(Debug, Clone, Copy)]
pub struct ReportService {
    component_limit: usize,
    high_risk_limit: usize,
}

impl Default for ReportService {
    fn default() -> Self {
        Self {
            component_limit: DEFAULT_COMPONENT_LIMIT,
            high_risk_limit: DEFAULT_HIGH_RISK_LIMIT,
        }
    }
}

impl ReportService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the default row limits of the listing reports
    pub fn with_limits(component_limit: usize, high_risk_limit: usize) -> Self {
        Self {
            component_limit,
            high_risk_limit,
        }
    }

    /// Total customers, total claims and overall claim rate
    pub fn portfolio_kpis(&self, portfolio: &ScoredPortfolio) -> PortfolioKpis {
        kpis(portfolio.records().iter())
    }

    /// The same figures restricted to High Risk customers
    pub fn high_risk_snapshot(&self, portfolio: &ScoredPortfolio) -> PortfolioKpis {
        kpis(
            portfolio
                .records()
                .iter()
                .filter(|r| r.score() >= HIGH_RISK_MIN_SCORE),
        )
    }

    /// Claim rate per risk tier, highest first
    pub fn claim_rate_by_tier(&self, portfolio: &ScoredPortfolio) -> Vec<GroupRow> {
        aggregate(portfolio.records(), &AggregationQuery::by(Dimension::RiskTier))
    }

    /// Customers per score with their share of the portfolio, highest score first
    pub fn score_distribution(&self, portfolio: &ScoredPortfolio) -> Vec<GroupRow> {
        let query = AggregationQuery::by(Dimension::RiskScore)
            .with_metric(Metric::ShareOfPortfolio)
            .order_by(SortKey::Dimension(Dimension::RiskScore), SortOrder::Descending);
        aggregate(portfolio.records(), &query)
    }

    /// Claim rate per score, lowest score first
    pub fn score_vs_claim_rate(&self, portfolio: &ScoredPortfolio) -> Vec<GroupRow> {
        let query = AggregationQuery::by(Dimension::RiskScore)
            .order_by(SortKey::Dimension(Dimension::RiskScore), SortOrder::Ascending);
        aggregate(portfolio.records(), &query)
    }

    /// Claims per score, most claims first
    pub fn claim_load_by_score(&self, portfolio: &ScoredPortfolio) -> Vec<GroupRow> {
        let query = AggregationQuery::by(Dimension::RiskScore)
            .order_by(SortKey::ClaimCount, SortOrder::Descending);
        aggregate(portfolio.records(), &query)
    }

    /// Compares score >= 3 against score <= 1; an empty side is omitted
    pub fn extremes_comparison(&self, portfolio: &ScoredPortfolio) -> Vec<ExtremeGroupRow> {
        let groups = [
            (HIGH_RISK_GROUP, portfolio.select(|r| r.score() >= HIGH_RISK_MIN_SCORE)),
            (LOW_RISK_GROUP, portfolio.select(|r| r.score() <= 1)),
        ];

        groups
            .into_iter()
            .filter_map(|(label, group)| {
                aggregate(group.records(), &AggregationQuery::portfolio())
                    .into_iter()
                    .next()
                    .map(|row| ExtremeGroupRow {
                        risk_group: label,
                        count: row.count,
                        claim_count: row.claim_count,
                        claim_rate: row.claim_rate,
                    })
            })
            .collect()
    }

    /// Number of customers raising each flag
    pub fn flag_distribution(&self, portfolio: &ScoredPortfolio) -> FlagDistribution {
        let mut counts = [0u64; 5];
        for record in portfolio.records() {
            for (count, bit) in counts.iter_mut().zip(record.risk.flags().as_bits()) {
                *count += u64::from(bit);
            }
        }

        FlagDistribution {
            total_customers: portfolio.len() as u64,
            flags: RiskFlag::ALL
                .iter()
                .zip(counts)
                .map(|(flag, customers)| FlagCount {
                    flag: *flag,
                    customers,
                })
                .collect(),
        }
    }

    /// Per-customer flags and score in customer id order
    pub fn component_flags(&self, portfolio: &ScoredPortfolio, limit: Option<usize>) -> Vec<RiskScore> {
        let mut scores: Vec<RiskScore> = portfolio.records().iter().map(|r| r.risk).collect();
        scores.sort_by_key(RiskScore::customer_id);
        scores.truncate(limit.unwrap_or(self.component_limit));
        scores
    }

    /// Customers by descending score, claimants first within a score
    pub fn high_risk_customers(
        &self,
        portfolio: &ScoredPortfolio,
        limit: Option<usize>,
    ) -> Vec<HighRiskCustomer> {
        let mut customers = ranked(portfolio);
        customers.truncate(limit.unwrap_or(self.high_risk_limit));
        customers
    }

    /// Every customer of a segment, ranked as in [`Self::high_risk_customers`]
    pub fn segment_records(&self, portfolio: &ScoredPortfolio) -> Vec<HighRiskCustomer> {
        ranked(portfolio)
    }

    /// Size, average score, claim rate and average credit of a segment
    pub fn segment_summary(&self, portfolio: &ScoredPortfolio) -> SegmentSummary {
        let query = AggregationQuery::portfolio()
            .with_metric(Metric::AverageRiskScore)
            .with_metric(Metric::AverageCreditScore);

        match aggregate(portfolio.records(), &query).into_iter().next() {
            Some(row) => SegmentSummary {
                customers: row.count,
                average_risk_score: row.average_risk_score,
                claim_rate: Some(row.claim_rate),
                average_credit_score: row.average_credit_score,
            },
            None => SegmentSummary {
                customers: 0,
                average_risk_score: None,
                claim_rate: None,
                average_credit_score: None,
            },
        }
    }

    /// Splits a segment by age, score, income and outcome
    pub fn segment_composition(&self, portfolio: &ScoredPortfolio) -> SegmentComposition {
        let by = |dimension| {
            let query = AggregationQuery::by(dimension)
                .order_by(SortKey::Dimension(dimension), SortOrder::Ascending);
            aggregate(portfolio.records(), &query)
        };

        SegmentComposition {
            by_age: by(Dimension::AgeBand),
            by_risk_score: by(Dimension::RiskScore),
            by_income: by(Dimension::IncomeBand),
            by_outcome: by(Dimension::Outcome),
        }
    }

    /// All figures of the scoring summary page
    pub fn risk_summary(&self, portfolio: &ScoredPortfolio) -> RiskSummary {
        let summary = RiskSummary {
            portfolio: self.portfolio_kpis(portfolio),
            high_risk: self.high_risk_snapshot(portfolio),
            claim_rate_by_tier: self.claim_rate_by_tier(portfolio),
            score_distribution: self.score_distribution(portfolio),
            score_vs_claim_rate: self.score_vs_claim_rate(portfolio),
            claim_load_by_score: self.claim_load_by_score(portfolio),
            extremes: self.extremes_comparison(portfolio),
        };
        debug!(customers = summary.portfolio.total_customers, "Built risk summary");
        summary
    }

    /// The exploratory breakdowns
    pub fn segment_overview(&self, portfolio: &ScoredPortfolio) -> SegmentOverview {
        let records = portfolio.records();
        let by_rate = |dimension| aggregate(records, &AggregationQuery::by(dimension));
        let by_average_score = |dimension| {
            let query = AggregationQuery::by(dimension)
                .with_metric(Metric::AverageRiskScore)
                .order_by(SortKey::Metric(Metric::AverageRiskScore), SortOrder::Descending);
            aggregate(records, &query)
        };

        SegmentOverview {
            by_postal_code: by_rate(Dimension::PostalCode),
            by_income: by_average_score(Dimension::IncomeBand),
            by_gender: by_average_score(Dimension::Gender),
            by_vehicle_type: aggregate(
                records,
                &AggregationQuery::by(Dimension::VehicleType)
                    .with_metric(Metric::AverageAnnualMileage)
                    .order_by(SortKey::Metric(Metric::AverageAnnualMileage), SortOrder::Descending),
            ),
            by_age: by_rate(Dimension::AgeBand),
            by_age_and_income: aggregate(
                records,
                &AggregationQuery::by(Dimension::AgeBand)
                    .then_by(Dimension::IncomeBand)
                    .order_by(SortKey::Dimension(Dimension::AgeBand), SortOrder::Ascending),
            ),
            by_driving_experience: by_rate(Dimension::DrivingExperience),
            by_vehicle_year: aggregate(
                records,
                &AggregationQuery::by(Dimension::VehicleYear).with_metric(Metric::AverageAnnualMileage),
            ),
            by_risk_score: self.score_distribution(portfolio),
            by_credit_band: aggregate(
                records,
                &AggregationQuery::by(Dimension::CreditBand).with_metric(Metric::AverageRiskScore),
            ),
        }
    }
}

fn kpis<'a>(records: impl Iterator<Item = &'a ScoredRecord>) -> PortfolioKpis {
    let (total_customers, total_claims) = records.fold((0u64, 0u64), |(count, claims), record| {
        (count + 1, claims + u64::from(record.outcome()))
    });
    PortfolioKpis {
        total_customers,
        total_claims,
        claim_rate: rate::ratio(total_claims, total_customers, RATE_DP),
    }
}

fn ranked(portfolio: &ScoredPortfolio) -> Vec<HighRiskCustomer> {
    let mut customers: Vec<HighRiskCustomer> =
        portfolio.records().iter().map(HighRiskCustomer::from).collect();
    customers.sort_by_key(|c| (Reverse(c.risk_score), Reverse(c.outcome), c.customer_id));
    customers
}
