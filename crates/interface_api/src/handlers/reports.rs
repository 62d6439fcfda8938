//! Portfolio report handlers

use axum::{extract::State, Json};

use domain_risk::services::{RiskSummary, SegmentOverview};
use domain_risk::SegmentFilter;

use crate::dto::Envelope;
use crate::{error::ApiError, AppState};

/// KPIs, tier rates, score distribution, claim load and the extremes comparison
pub async fn risk_summary(
    State(state): State<AppState>,
) -> Result<Json<Envelope<RiskSummary>>, ApiError> {
    let portfolio = state.load(&SegmentFilter::all()).await?;
    let summary = state.reports.risk_summary(&portfolio);
    Ok(Json(Envelope::new(summary, portfolio.quality())))
}

/// Claim rate and averages across each demographic and vehicle attribute
pub async fn segment_overview(
    State(state): State<AppState>,
) -> Result<Json<Envelope<SegmentOverview>>, ApiError> {
    let portfolio = state.load(&SegmentFilter::all()).await?;
    let overview = state.reports.segment_overview(&portfolio);
    Ok(Json(Envelope::new(overview, portfolio.quality())))
}
