//! Risk Scoring Domain
//!
//! This crate implements the rule-based risk model over the auto portfolio:
//! five independent risk flags per customer, a 0-5 score, tier and credit
//! banding, and grouped claim-rate aggregation used to validate the score
//! against claim outcomes.
//!
//! # Pipeline
//!
//! ```text
//! PortfolioSource -> validation -> flags -> score -> aggregate -> reports
//! ```
//!
//! Everything after the source is synchronous and pure.

pub mod record;
pub mod flags;
pub mod score;
pub mod bands;
pub mod validation;
pub mod scoring;
pub mod filter;
pub mod aggregate;
pub mod ports;
pub mod services;
pub mod error;

pub use record::{AgeBand, Claim, Customer, DrivingHistory, ExperienceBand, IncomeBand, PortfolioRecord, Vehicle};
pub use flags::{evaluate_flags, RiskFlag, RiskFlags};
pub use score::{compute_score, RiskScore, MAX_SCORE};
pub use bands::{bucket_credit, bucket_tier, CreditBand, RiskTier};
pub use validation::{DataQualityIssue, DataQualityReport};
pub use scoring::{score_portfolio, ScoredPortfolio, ScoredRecord};
pub use filter::{CreditRange, ScoreRange, SegmentFilter};
pub use aggregate::{aggregate, AggregationQuery, Dimension, DimensionValue, GroupRow, Metric, OrderBy, SortKey, SortOrder};
pub use ports::{load_scored_portfolio, PortfolioSource};
pub use services::ReportService;
pub use error::RiskError;
