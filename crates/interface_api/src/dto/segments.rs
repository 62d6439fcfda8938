//! Segment and aggregation DTOs

use serde::{Deserialize, Serialize};

use domain_risk::services::{HighRiskCustomer, SegmentComposition, SegmentSummary};
use domain_risk::{AggregationQuery, SegmentFilter};

/// Body of `POST /api/v1/aggregate`
///
/// Both parts are optional: an empty body aggregates the whole portfolio
/// into one row.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AggregateRequest {
    pub filter: SegmentFilter,
    pub query: AggregationQuery,
}

/// Response of `POST /api/v1/segments`
#[derive(Debug, Serialize)]
pub struct SegmentResponse {
    pub summary: SegmentSummary,
    pub composition: SegmentComposition,
    pub records: Vec<HighRiskCustomer>,
}
