//! Shared DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use domain_risk::DataQualityReport;

/// `?limit=` on listing endpoints
#[derive(Debug, Default, Deserialize, Validate)]
pub struct LimitQuery {
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<usize>,
}

/// What the scoring pass did with the fetched rows
#[derive(Debug, Clone, Serialize)]
pub struct QualitySummary {
    pub scored: u64,
    pub excluded: u64,
    pub missing_attributes: u64,
}

impl From<&DataQualityReport> for QualitySummary {
    fn from(report: &DataQualityReport) -> Self {
        Self {
            scored: report.scored,
            excluded: report.excluded,
            missing_attributes: report.missing_attributes,
        }
    }
}

/// Every read response carries the data quality of the set it was computed from
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub generated_at: DateTime<Utc>,
    pub data_quality: QualitySummary,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(data: T, quality: &DataQualityReport) -> Self {
        Self {
            generated_at: Utc::now(),
            data_quality: quality.into(),
            data,
        }
    }
}
