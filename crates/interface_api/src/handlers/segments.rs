//! Segment explorer handler

use axum::{
    extract::{Query, State},
    Json,
};
use tracing::debug;
use validator::Validate;

use domain_risk::SegmentFilter;

use crate::dto::{Envelope, LimitQuery, SegmentResponse};
use crate::{error::ApiError, AppState};

/// Summary, composition and ranked records of a filtered segment
///
/// `?limit=` caps the record listing only; the summary and composition
/// always cover the whole segment.
pub async fn segment_report(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
    Json(filter): Json<SegmentFilter>,
) -> Result<Json<Envelope<SegmentResponse>>, ApiError> {
    query.validate()?;
    let segment = state.load(&filter).await?;

    let mut records = state.reports.segment_records(&segment);
    if let Some(limit) = query.limit {
        records.truncate(limit);
    }
    debug!(customers = segment.len(), "Built segment report");

    let response = SegmentResponse {
        summary: state.reports.segment_summary(&segment),
        composition: state.reports.segment_composition(&segment),
        records,
    };
    Ok(Json(Envelope::new(response, segment.quality())))
}
