//! HTTP API Layer
//!
//! This crate provides the read-only REST API of the risk analytics system
//! using Axum. Every endpoint fetches a segment from the configured
//! [`PortfolioSource`], scores it and answers from the scored set; nothing
//! is written.
//!
//! # Architecture
//!
//! - **Handlers**: health, per-customer risk, portfolio reports, segments, aggregation
//! - **Middleware**: tracing and request logging
//! - **DTOs**: request bodies and the response envelope
//! - **Error Handling**: consistent JSON error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(source, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_risk::services::{ReportService, DEFAULT_HIGH_RISK_LIMIT};
use domain_risk::{load_scored_portfolio, PortfolioSource, ScoredPortfolio, SegmentFilter};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::handlers::{aggregation, health, reports, risk, segments};
use crate::middleware::request_logging;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn PortfolioSource>,
    pub reports: ReportService,
    pub config: ApiConfig,
}

impl AppState {
    /// Fetches and scores the segment selected by `filter`
    pub async fn load(&self, filter: &SegmentFilter) -> Result<ScoredPortfolio, ApiError> {
        Ok(load_scored_portfolio(self.source.as_ref(), filter).await?)
    }
}

/// Creates the main API router
///
/// # Arguments
///
/// * `source` - Where portfolio records are read from
/// * `config` - API configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(source: Arc<dyn PortfolioSource>, config: ApiConfig) -> Router {
    let reports = ReportService::with_limits(config.default_limit, DEFAULT_HIGH_RISK_LIMIT);
    let state = AppState { source, reports, config };

    // Public routes
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Per-customer routes
    let risk_routes = Router::new()
        .route("/scores", get(risk::component_scores))
        .route("/high-risk", get(risk::high_risk_customers))
        .route("/flags", get(risk::flag_distribution));

    // Report routes
    let report_routes = Router::new()
        .route("/summary", get(reports::risk_summary))
        .route("/overview", get(reports::segment_overview));

    let api_routes = Router::new()
        .nest("/risk", risk_routes)
        .nest("/reports", report_routes)
        .route("/segments", post(segments::segment_report))
        .route("/aggregate", post(aggregation::aggregate_portfolio))
        .layer(axum_middleware::from_fn(request_logging));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}
