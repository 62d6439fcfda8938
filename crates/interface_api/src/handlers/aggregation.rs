//! Generic aggregation handler

use axum::{extract::State, Json};

use domain_risk::{aggregate, GroupRow};

use crate::dto::{AggregateRequest, Envelope};
use crate::{error::ApiError, AppState};

/// Groups a segment by the requested dimensions
pub async fn aggregate_portfolio(
    State(state): State<AppState>,
    Json(request): Json<AggregateRequest>,
) -> Result<Json<Envelope<Vec<GroupRow>>>, ApiError> {
    let portfolio = state.load(&request.filter).await?;
    let rows = aggregate(portfolio.records(), &request.query);
    Ok(Json(Envelope::new(rows, portfolio.quality())))
}
