//! Categorical mappers for reporting
//!
//! Neither band is stored; both are derived on demand for grouping.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Credit scores below this are "Very Low"
pub const CREDIT_VERY_LOW_BELOW: f64 = 0.4;
/// Credit scores below this are "Low"
pub const CREDIT_LOW_BELOW: f64 = 0.6;
/// Credit scores below this are "Medium"; anything else is "High"
pub const CREDIT_MEDIUM_BELOW: f64 = 0.8;

/// Scores at or above this are "High Risk"
pub const HIGH_RISK_MIN_SCORE: u8 = 3;
/// Scores equal to this are "Medium Risk"
pub const MEDIUM_RISK_SCORE: u8 = 2;

/// Credit score band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CreditBand {
    #[serde(rename = "Very Low")]
    VeryLow,
    #[serde(rename = "Low")]
    Low,
    #[serde(rename = "Medium")]
    Medium,
    #[serde(rename = "High")]
    High,
}

impl CreditBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreditBand::VeryLow => "Very Low",
            CreditBand::Low => "Low",
            CreditBand::Medium => "Medium",
            CreditBand::High => "High",
        }
    }
}

impl fmt::Display for CreditBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk tier derived from the risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    #[serde(rename = "Low Risk")]
    LowRisk,
    #[serde(rename = "Medium Risk")]
    MediumRisk,
    #[serde(rename = "High Risk")]
    HighRisk,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::LowRisk => "Low Risk",
            RiskTier::MediumRisk => "Medium Risk",
            RiskTier::HighRisk => "High Risk",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a credit score to its band
///
/// Lower bounds are inclusive: exactly 0.4 is `Low`, exactly 0.6 is `Medium`,
/// exactly 0.8 is `High`. Callers validate the score range beforehand.
pub fn bucket_credit(credit_score: f64) -> CreditBand {
    if credit_score < CREDIT_VERY_LOW_BELOW {
        CreditBand::VeryLow
    } else if credit_score < CREDIT_LOW_BELOW {
        CreditBand::Low
    } else if credit_score < CREDIT_MEDIUM_BELOW {
        CreditBand::Medium
    } else {
        CreditBand::High
    }
}

/// Maps a risk score to its tier
pub fn bucket_tier(score: u8) -> RiskTier {
    if score >= HIGH_RISK_MIN_SCORE {
        RiskTier::HighRisk
    } else if score == MEDIUM_RISK_SCORE {
        RiskTier::MediumRisk
    } else {
        RiskTier::LowRisk
    }
}
