//! Risk Domain Ports
//!
//! The risk domain never talks to storage directly. Everything it scores
//! comes through a [`PortfolioSource`], which yields the joined
//! customer/vehicle/driving-history/claim rows for a segment.
//!
//! # Adapters
//!
//! - **PostgreSQL**: `infra_db::PortfolioRepository`
//! - **Cached**: `infra_db::CachedPortfolioSource`, wrapping any source
//! - **In-memory**: [`mock::InMemoryPortfolioSource`] for tests
//!
//! ```rust,ignore
//! let source: Arc<dyn PortfolioSource> = Arc::new(PortfolioRepository::new(pool));
//! let portfolio = load_scored_portfolio(source.as_ref(), &SegmentFilter::all()).await?;
//! ```

use async_trait::async_trait;
use tracing::debug;

use core_kernel::{DomainPort, HealthCheckable, PortError};

use crate::error::RiskError;
use crate::filter::SegmentFilter;
use crate::record::PortfolioRecord;
use crate::scoring::{score_portfolio, ScoredPortfolio};

/// Read-only supplier of joined portfolio records
///
/// Implementations may apply the attribute predicates of the filter
/// (age, income, experience, credit) at the source, but must not apply the
/// risk score range: scores only exist after scoring. Returning extra
/// records is harmless since the filter is re-applied after scoring.
#[async_trait]
pub trait PortfolioSource: DomainPort + HealthCheckable {
    /// Fetches one record per customer that has a claim row
    async fn fetch_records(&self, filter: &SegmentFilter) -> Result<Vec<PortfolioRecord>, PortError>;
}

/// Fetches, validates, scores and filters a segment of the portfolio
///
/// # Errors
///
/// Returns the filter's validation error before touching the source, or
/// `RiskError::Source` when the fetch fails.
pub async fn load_scored_portfolio(
    source: &dyn PortfolioSource,
    filter: &SegmentFilter,
) -> Result<ScoredPortfolio, RiskError> {
    filter.validate()?;

    let records = source.fetch_records(filter).await?;
    let fetched = records.len();
    let portfolio = score_portfolio(records).filter(filter);

    debug!(fetched, selected = portfolio.len(), "Loaded scored portfolio");
    Ok(portfolio)
}

#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    use core_kernel::HealthCheckResult;

    /// In-memory portfolio source
    ///
    /// Applies the attribute predicates the way a database adapter would, so
    /// callers see the same records from either.
    #[derive(Debug, Default)]
    pub struct InMemoryPortfolioSource {
        records: Vec<PortfolioRecord>,
        fetches: AtomicU64,
        unavailable: AtomicBool,
    }

    impl InMemoryPortfolioSource {
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a source serving the given records
        pub fn with_records(records: Vec<PortfolioRecord>) -> Self {
            Self {
                records,
                ..Self::default()
            }
        }

        /// Number of completed fetches
        pub fn fetch_count(&self) -> u64 {
            self.fetches.load(Ordering::SeqCst)
        }

        /// Makes every subsequent call fail as if the store were unreachable
        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }

        fn is_unavailable(&self) -> bool {
            self.unavailable.load(Ordering::SeqCst)
        }
    }

    impl DomainPort for InMemoryPortfolioSource {}

    #[async_trait]
    impl HealthCheckable for InMemoryPortfolioSource {
        async fn health_check(&self) -> HealthCheckResult {
            if self.is_unavailable() {
                HealthCheckResult::unhealthy("in-memory-portfolio", 0, "Source marked unavailable")
            } else {
                HealthCheckResult::healthy("in-memory-portfolio", 0)
            }
        }
    }

    #[async_trait]
    impl PortfolioSource for InMemoryPortfolioSource {
        async fn fetch_records(&self, filter: &SegmentFilter) -> Result<Vec<PortfolioRecord>, PortError> {
            if self.is_unavailable() {
                return Err(PortError::connection("in-memory portfolio source is unavailable"));
            }
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .records
                .iter()
                .filter(|record| filter.matches_attributes(record))
                .cloned()
                .collect())
        }
    }
}
