//! Fetch cache at the data source boundary
//!
//! Scoring and aggregation are cheap and need no cache; the database round
//! trip is what gets memoized. Entries are keyed by the attribute predicates
//! of the filter only. Sources never apply the risk score range, so filters
//! that differ only in their score range share one fetch.
//!
//! The cache holds at most `capacity` entries and evicts the oldest fill
//! first.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_risk::{PortfolioRecord, PortfolioSource, ScoreRange, SegmentFilter};

/// Entries kept when no capacity is given
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

#[derive(Debug, Default)]
struct Entries {
    records: HashMap<String, Arc<Vec<PortfolioRecord>>>,
    /// Keys in fill order, oldest first
    order: VecDeque<String>,
}

impl Entries {
    fn insert(&mut self, key: String, records: Arc<Vec<PortfolioRecord>>, capacity: usize) -> usize {
        if self.records.insert(key.clone(), records).is_none() {
            self.order.push_back(key);
        }

        let mut evicted = 0;
        while self.order.len() > capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.records.remove(&oldest);
                evicted += 1;
            }
        }
        evicted
    }

    fn clear(&mut self) {
        self.records.clear();
        self.order.clear();
    }
}

/// Memoizes another source's fetch results by filter
///
/// The cache is never invalidated on its own; callers that know the
/// underlying data changed call [`CachedPortfolioSource::invalidate`].
#[derive(Debug)]
pub struct CachedPortfolioSource<S> {
    inner: S,
    capacity: usize,
    entries: RwLock<Entries>,
}

impl<S: PortfolioSource> CachedPortfolioSource<S> {
    pub fn new(inner: S) -> Self {
        Self::with_capacity(inner, DEFAULT_CACHE_CAPACITY)
    }

    /// A cache holding at most `capacity` fetches (at least one)
    pub fn with_capacity(inner: S, capacity: usize) -> Self {
        Self {
            inner,
            capacity: capacity.max(1),
            entries: RwLock::new(Entries::default()),
        }
    }

    /// The wrapped source
    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every cached entry
    pub async fn invalidate(&self) {
        let mut entries = self.entries.write().await;
        let dropped = entries.records.len();
        entries.clear();
        info!(dropped, "Invalidated portfolio cache");
    }

    /// Number of cached fetches
    pub async fn len(&self) -> usize {
        self.entries.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.records.is_empty()
    }
}

/// The part of a filter a source can act on
fn fetch_filter(filter: &SegmentFilter) -> SegmentFilter {
    SegmentFilter {
        risk_score: ScoreRange::default(),
        ..filter.clone()
    }
}

fn cache_key(filter: &SegmentFilter) -> Result<String, PortError> {
    serde_json::to_string(filter).map_err(|e| PortError::Transformation {
        message: format!("Failed to build cache key: {}", e),
    })
}

impl<S: PortfolioSource> DomainPort for CachedPortfolioSource<S> {}

#[async_trait]
impl<S: PortfolioSource> HealthCheckable for CachedPortfolioSource<S> {
    async fn health_check(&self) -> HealthCheckResult {
        self.inner.health_check().await
    }
}

#[async_trait]
impl<S: PortfolioSource> PortfolioSource for CachedPortfolioSource<S> {
    async fn fetch_records(&self, filter: &SegmentFilter) -> Result<Vec<PortfolioRecord>, PortError> {
        let filter = fetch_filter(filter);
        let key = cache_key(&filter)?;

        if let Some(records) = self.entries.read().await.records.get(&key).cloned() {
            debug!(records = records.len(), "Portfolio cache hit");
            return Ok(records.as_ref().clone());
        }

        let records = self.inner.fetch_records(&filter).await?;
        let evicted = self
            .entries
            .write()
            .await
            .insert(key, Arc::new(records.clone()), self.capacity);
        info!(records = records.len(), evicted, "Caching portfolio fetch");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::CustomerId;
    use domain_risk::Customer;

    fn records(id: i64) -> Arc<Vec<PortfolioRecord>> {
        Arc::new(vec![PortfolioRecord::new(Customer::new(CustomerId::new(id)), false)])
    }

    #[test]
    fn test_score_range_is_not_part_of_the_key() {
        let narrow = SegmentFilter::all().with_risk_scores(4, 5);
        assert_eq!(
            cache_key(&fetch_filter(&narrow)).unwrap(),
            cache_key(&SegmentFilter::all()).unwrap()
        );

        let credit = SegmentFilter::all().with_credit_scores(0.0, 0.5);
        assert_ne!(
            cache_key(&fetch_filter(&credit)).unwrap(),
            cache_key(&SegmentFilter::all()).unwrap()
        );
    }

    #[test]
    fn test_entries_evict_oldest_first() {
        let mut entries = Entries::default();
        assert_eq!(entries.insert("a".to_string(), records(1), 2), 0);
        assert_eq!(entries.insert("b".to_string(), records(2), 2), 0);
        assert_eq!(entries.insert("c".to_string(), records(3), 2), 1);

        assert!(!entries.records.contains_key("a"));
        assert!(entries.records.contains_key("b"));
        assert!(entries.records.contains_key("c"));
        assert_eq!(entries.order, VecDeque::from(["b".to_string(), "c".to_string()]));
    }

    #[test]
    fn test_refilling_a_key_does_not_duplicate_its_slot() {
        let mut entries = Entries::default();
        entries.insert("a".to_string(), records(1), 2);
        entries.insert("a".to_string(), records(2), 2);
        assert_eq!(entries.order.len(), 1);
        assert_eq!(entries.records["a"][0].id(), CustomerId::new(2));
    }
}
