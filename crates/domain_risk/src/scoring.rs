//! Scoring pass over a set of portfolio records
//!
//! `score_portfolio` is the entry point between the data source and the
//! aggregator: it validates each record, drops the ones that cannot be
//! trusted (counting them), and attaches a [`RiskScore`] to the rest.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, warn};

use core_kernel::CustomerId;
use crate::bands::{bucket_credit, CreditBand, RiskTier};
use crate::filter::SegmentFilter;
use crate::record::PortfolioRecord;
use crate::score::RiskScore;
use crate::validation::{inspect_record, DataQualityIssue, DataQualityReport};

/// A validated record with its derived risk score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRecord {
    pub record: PortfolioRecord,
    pub risk: RiskScore,
}

impl ScoredRecord {
    /// Scores a single record without validating it
    pub fn new(record: PortfolioRecord) -> Self {
        let risk = RiskScore::evaluate(&record);
        Self { record, risk }
    }

    pub fn customer_id(&self) -> CustomerId {
        self.record.customer.id
    }

    pub fn score(&self) -> u8 {
        self.risk.score()
    }

    pub fn tier(&self) -> RiskTier {
        self.risk.tier()
    }

    pub fn outcome(&self) -> bool {
        self.record.claim.outcome
    }

    pub fn credit_band(&self) -> Option<CreditBand> {
        self.record.customer.credit_score.map(bucket_credit)
    }
}

/// The scored records of one fetch, with the data quality of the input
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoredPortfolio {
    records: Vec<ScoredRecord>,
    quality: DataQualityReport,
}

impl ScoredPortfolio {
    pub fn records(&self) -> &[ScoredRecord] {
        &self.records
    }

    pub fn quality(&self) -> &DataQualityReport {
        &self.quality
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Narrows to the records matching `filter`
    ///
    /// The data quality report still describes the whole input, since that
    /// is what was fetched and inspected.
    pub fn filter(&self, filter: &SegmentFilter) -> ScoredPortfolio {
        ScoredPortfolio {
            records: self
                .records
                .iter()
                .filter(|r| filter.matches(r))
                .cloned()
                .collect(),
            quality: self.quality.clone(),
        }
    }

    /// Narrows to the records satisfying an arbitrary predicate
    pub fn select(&self, predicate: impl Fn(&ScoredRecord) -> bool) -> ScoredPortfolio {
        ScoredPortfolio {
            records: self.records.iter().filter(|r| predicate(r)).cloned().collect(),
            quality: self.quality.clone(),
        }
    }
}

/// Validates and scores every record
///
/// Records with out-of-range values, mis-keyed joins or a customer id already
/// scored earlier in the input are excluded and counted. An excluded record
/// does not claim its id, so a later valid row for the same customer is kept. Records with missing
/// attributes are scored with the affected flags lowered.
pub fn score_portfolio(records: impl IntoIterator<Item = PortfolioRecord>) -> ScoredPortfolio {
    let mut quality = DataQualityReport::default();
    let mut seen = HashSet::new();
    let mut scored = Vec::new();

    for record in records {
        let mut issues = inspect_record(&record);
        if seen.contains(&record.customer.id) {
            issues.push(DataQualityIssue::DuplicateCustomer {
                customer_id: record.customer.id,
            });
        }

        let excluded = issues.iter().find(|issue| issue.excludes_record()).cloned();
        quality.record(issues);

        match excluded {
            Some(issue) => warn!(customer_id = %record.customer.id, %issue, "Excluding record from aggregation"),
            None => {
                seen.insert(record.customer.id);
                scored.push(ScoredRecord::new(record));
            }
        }
    }

    debug!(
        scored = quality.scored,
        excluded = quality.excluded,
        missing_attributes = quality.missing_attributes,
        "Scored portfolio"
    );

    ScoredPortfolio {
        records: scored,
        quality,
    }
}
