//! Per-customer risk handlers

use axum::{
    extract::{Query, State},
    Json,
};
use validator::Validate;

use domain_risk::services::{FlagDistribution, HighRiskCustomer};
use domain_risk::{RiskScore, SegmentFilter};

use crate::dto::{Envelope, LimitQuery};
use crate::{error::ApiError, AppState};

/// Component flags and score per customer, in customer id order
pub async fn component_scores(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Envelope<Vec<RiskScore>>>, ApiError> {
    query.validate()?;
    let portfolio = state.load(&SegmentFilter::all()).await?;
    let rows = state.reports.component_flags(&portfolio, query.limit);
    Ok(Json(Envelope::new(rows, portfolio.quality())))
}

/// Highest-scoring customers with their outcomes
pub async fn high_risk_customers(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Envelope<Vec<HighRiskCustomer>>>, ApiError> {
    query.validate()?;
    let portfolio = state.load(&SegmentFilter::all()).await?;
    let rows = state.reports.high_risk_customers(&portfolio, query.limit);
    Ok(Json(Envelope::new(rows, portfolio.quality())))
}

/// How many customers raise each flag
pub async fn flag_distribution(
    State(state): State<AppState>,
) -> Result<Json<Envelope<FlagDistribution>>, ApiError> {
    let portfolio = state.load(&SegmentFilter::all()).await?;
    let distribution = state.reports.flag_distribution(&portfolio);
    Ok(Json(Envelope::new(distribution, portfolio.quality())))
}
