//! Segment filters
//!
//! A `SegmentFilter` is the structured form of the dashboard's segment
//! controls. Data sources may push the attribute predicates down into their
//! own query (see [`SegmentFilter::matches_attributes`]); the score range can
//! only be checked once records are scored.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use core_kernel::CoreError;
use crate::error::RiskError;
use crate::record::{AgeBand, ExperienceBand, IncomeBand, PortfolioRecord};
use crate::score::MAX_SCORE;
use crate::scoring::ScoredRecord;

/// Inclusive risk score range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: u8,
    pub max: u8,
}

impl Default for ScoreRange {
    fn default() -> Self {
        Self { min: 0, max: MAX_SCORE }
    }
}

impl ScoreRange {
    pub fn contains(&self, score: u8) -> bool {
        (self.min..=self.max).contains(&score)
    }

    pub fn is_unrestricted(&self) -> bool {
        *self == Self::default()
    }
}

/// Inclusive credit score range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CreditRange {
    pub min: f64,
    pub max: f64,
}

impl Default for CreditRange {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

impl CreditRange {
    pub fn contains(&self, credit_score: f64) -> bool {
        credit_score >= self.min && credit_score <= self.max
    }

    pub fn is_unrestricted(&self) -> bool {
        *self == Self::default()
    }
}

/// Structured predicate selecting a customer segment
///
/// An empty band set places no restriction on that attribute. A record whose
/// attribute is missing only matches when the attribute is unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentFilter {
    pub risk_score: ScoreRange,
    pub age_bands: BTreeSet<AgeBand>,
    pub income_bands: BTreeSet<IncomeBand>,
    pub experience_bands: BTreeSet<ExperienceBand>,
    pub credit_score: CreditRange,
}

impl SegmentFilter {
    /// A filter matching every record
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_risk_scores(mut self, min: u8, max: u8) -> Self {
        self.risk_score = ScoreRange { min, max };
        self
    }

    pub fn with_age_bands(mut self, bands: impl IntoIterator<Item = AgeBand>) -> Self {
        self.age_bands = bands.into_iter().collect();
        self
    }

    pub fn with_income_bands(mut self, bands: impl IntoIterator<Item = IncomeBand>) -> Self {
        self.income_bands = bands.into_iter().collect();
        self
    }

    pub fn with_experience_bands(mut self, bands: impl IntoIterator<Item = ExperienceBand>) -> Self {
        self.experience_bands = bands.into_iter().collect();
        self
    }

    pub fn with_credit_scores(mut self, min: f64, max: f64) -> Self {
        self.credit_score = CreditRange { min, max };
        self
    }

    /// Checks the ranges are well formed
    ///
    /// # Errors
    ///
    /// Returns `RiskError::ScoreOutOfRange` for a score bound above 5,
    /// `RiskError::Core` for a credit bound outside 0..=1, and
    /// `RiskError::InvalidFilter` when a minimum exceeds its maximum.
    pub fn validate(&self) -> Result<(), RiskError> {
        let ScoreRange { min, max } = self.risk_score;
        if max > MAX_SCORE {
            return Err(RiskError::ScoreOutOfRange(max));
        }
        if min > max {
            return Err(RiskError::invalid_filter(format!(
                "risk score minimum {} exceeds maximum {}",
                min, max
            )));
        }

        let CreditRange { min, max } = self.credit_score;
        for (field, bound) in [("credit_score.min", min), ("credit_score.max", max)] {
            if !bound.is_finite() || !(0.0..=1.0).contains(&bound) {
                return Err(CoreError::out_of_range(field, bound).into());
            }
        }
        if min > max {
            return Err(RiskError::invalid_filter(format!(
                "credit score minimum {} exceeds maximum {}",
                min, max
            )));
        }
        Ok(())
    }

    /// Returns true when the filter selects every record
    pub fn is_unrestricted(&self) -> bool {
        self.risk_score.is_unrestricted() && self.attributes_unrestricted()
    }

    /// Returns true when no attribute predicate needs to be pushed down
    pub fn attributes_unrestricted(&self) -> bool {
        self.age_bands.is_empty()
            && self.income_bands.is_empty()
            && self.experience_bands.is_empty()
            && self.credit_score.is_unrestricted()
    }

    /// Checks the attribute predicates, which need no score
    pub fn matches_attributes(&self, record: &PortfolioRecord) -> bool {
        let customer = &record.customer;
        let experience = record.history.as_ref().and_then(|h| h.driving_experience);

        band_matches(&self.age_bands, customer.age_band)
            && band_matches(&self.income_bands, customer.income_band)
            && band_matches(&self.experience_bands, experience)
            && (self.credit_score.is_unrestricted()
                || customer
                    .credit_score
                    .is_some_and(|score| self.credit_score.contains(score)))
    }

    /// Checks every predicate, including the risk score range
    pub fn matches(&self, record: &ScoredRecord) -> bool {
        self.risk_score.contains(record.score()) && self.matches_attributes(&record.record)
    }
}

fn band_matches<T: Ord>(allowed: &BTreeSet<T>, value: Option<T>) -> bool {
    allowed.is_empty() || value.is_some_and(|v| allowed.contains(&v))
}
