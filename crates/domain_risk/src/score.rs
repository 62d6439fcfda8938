//! Risk score computation

use serde::Serialize;

use core_kernel::CustomerId;
use crate::bands::{bucket_tier, RiskTier};
use crate::flags::{evaluate_flags, RiskFlags};
use crate::record::PortfolioRecord;

/// Highest possible score: every flag raised
pub const MAX_SCORE: u8 = 5;

/// Sums the flags with equal weight
pub fn compute_score(flags: &RiskFlags) -> u8 {
    flags.as_bits().iter().sum()
}

/// A customer's derived risk score
///
/// Always recomputed from source attributes; there is no way to construct
/// one with a score that disagrees with its flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskScore {
    customer_id: CustomerId,
    #[serde(flatten)]
    flags: RiskFlags,
    risk_score: u8,
}

impl RiskScore {
    /// Scores a customer from already-evaluated flags
    pub fn from_flags(customer_id: CustomerId, flags: RiskFlags) -> Self {
        Self {
            customer_id,
            flags,
            risk_score: compute_score(&flags),
        }
    }

    /// Scores a joined record; the claim row is never consulted
    pub fn evaluate(record: &PortfolioRecord) -> Self {
        let flags = evaluate_flags(
            &record.customer,
            record.vehicle.as_ref(),
            record.history.as_ref(),
        );
        Self::from_flags(record.customer.id, flags)
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn flags(&self) -> &RiskFlags {
        &self.flags
    }

    pub fn score(&self) -> u8 {
        self.risk_score
    }

    pub fn tier(&self) -> RiskTier {
        bucket_tier(self.risk_score)
    }
}
