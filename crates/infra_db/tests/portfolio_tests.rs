//! Tests for the portfolio repository and the fetch cache
//!
//! Repository tests start a PostgreSQL container and are ignored by default:
//! run them with `cargo test -p infra_db -- --ignored`.

use std::sync::Arc;

use core_kernel::CustomerId;
use domain_risk::ports::mock::InMemoryPortfolioSource;
use domain_risk::{
    aggregate, load_scored_portfolio, AgeBand, AggregationQuery, Dimension, DimensionValue, IncomeBand,
    PortfolioSource, SegmentFilter,
};
use infra_db::{CachedPortfolioSource, PortfolioRepository, DEFAULT_CACHE_CAPACITY};
use test_utils::{
    assert_clean, assert_descending_rate, assert_group, assert_partition, create_isolated_test_database,
    get_shared_test_database, PortfolioFixtures, PortfolioRecordBuilder,
};

// ============================================================================
// Cache Tests
// ============================================================================

mod cache_tests {
    use super::*;

    fn cached() -> CachedPortfolioSource<InMemoryPortfolioSource> {
        CachedPortfolioSource::new(InMemoryPortfolioSource::with_records(
            PortfolioFixtures::sample_portfolio(),
        ))
    }

    #[tokio::test]
    async fn test_same_filter_fetches_once() {
        let source = cached();
        let filter = SegmentFilter::all().with_age_bands([AgeBand::Age16To25]);

        let first = source.fetch_records(&filter).await.unwrap();
        let second = source.fetch_records(&filter).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.inner().fetch_count(), 1);
        assert_eq!(source.len().await, 1);
    }

    #[tokio::test]
    async fn test_different_filters_are_separate_entries() {
        let source = cached();

        source.fetch_records(&SegmentFilter::all()).await.unwrap();
        source
            .fetch_records(&SegmentFilter::all().with_credit_scores(0.0, 0.5))
            .await
            .unwrap();

        assert_eq!(source.inner().fetch_count(), 2);
        assert_eq!(source.len().await, 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let source = cached();
        let filter = SegmentFilter::all();

        source.fetch_records(&filter).await.unwrap();
        source.invalidate().await;
        assert!(source.is_empty().await);

        source.fetch_records(&filter).await.unwrap();
        assert_eq!(source.inner().fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let source = cached();
        source.inner().set_unavailable(true);
        assert!(source.fetch_records(&SegmentFilter::all()).await.is_err());
        assert!(source.is_empty().await);

        source.inner().set_unavailable(false);
        assert_eq!(source.fetch_records(&SegmentFilter::all()).await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_cache_works_behind_trait_object() {
        let source: Arc<dyn PortfolioSource> = Arc::new(cached());
        let portfolio = load_scored_portfolio(source.as_ref(), &SegmentFilter::all().with_risk_scores(3, 5))
            .await
            .unwrap();
        assert_eq!(portfolio.len(), 3);
    }

    #[tokio::test]
    async fn test_cached_records_are_validated_downstream() {
        let mut records = PortfolioFixtures::sample_portfolio();
        records.push(PortfolioFixtures::invalid_customer(11));
        let source = CachedPortfolioSource::new(InMemoryPortfolioSource::with_records(records));

        let portfolio = load_scored_portfolio(&source, &SegmentFilter::all()).await.unwrap();
        assert_eq!(source.fetch_records(&SegmentFilter::all()).await.unwrap().len(), 11);
        assert_eq!(portfolio.len(), 10);
        assert_eq!(portfolio.quality().excluded, 1);
        assert!(portfolio.records().iter().all(|r| r.customer_id() != CustomerId::new(11)));

        let rows = aggregate(portfolio.records(), &AggregationQuery::by(Dimension::RiskScore));
        assert_partition(&rows, 10);
        assert_descending_rate(&rows);
    }

    #[tokio::test]
    async fn test_score_ranges_share_one_entry() {
        let source = cached();

        let mut sizes = Vec::new();
        for min in 0..=5 {
            let filter = SegmentFilter::all().with_risk_scores(min, 5);
            sizes.push(load_scored_portfolio(&source, &filter).await.unwrap().len());
        }

        assert_eq!(source.inner().fetch_count(), 1);
        assert_eq!(source.len().await, 1);
        // The range still narrows the scored result downstream
        assert_eq!(sizes[0], 10);
        assert_eq!(sizes[3], 3);
        assert!(sizes.windows(2).all(|w| w[0] >= w[1]));
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest_entry() {
        let source = CachedPortfolioSource::with_capacity(
            InMemoryPortfolioSource::with_records(PortfolioFixtures::sample_portfolio()),
            4,
        );
        let filter = |i: u32| SegmentFilter::all().with_credit_scores(0.0, 0.5 + f64::from(i) / 100.0);

        for i in 0..10 {
            source.fetch_records(&filter(i)).await.unwrap();
        }
        assert_eq!(source.len().await, 4);
        assert_eq!(source.inner().fetch_count(), 10);

        // Newest entries are still cached, the oldest was dropped
        source.fetch_records(&filter(9)).await.unwrap();
        assert_eq!(source.inner().fetch_count(), 10);
        source.fetch_records(&filter(0)).await.unwrap();
        assert_eq!(source.inner().fetch_count(), 11);
        assert_eq!(source.len().await, 4);
    }

    #[test]
    fn test_capacity_is_at_least_one() {
        let source = CachedPortfolioSource::with_capacity(InMemoryPortfolioSource::new(), 0);
        assert_eq!(source.capacity(), 1);
        assert_eq!(cached().capacity(), DEFAULT_CACHE_CAPACITY);
    }
}

// ============================================================================
// Repository Tests
// ============================================================================

mod repository_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_fetch_all_records() {
        let db = create_isolated_test_database().await.unwrap();
        db.seed(&PortfolioFixtures::sample_portfolio()).await.unwrap();
        let repo = PortfolioRepository::new(db.pool().clone());

        let records = repo.fetch_records(&SegmentFilter::all()).await.unwrap();

        assert_eq!(records.len(), 10);
        assert_eq!(records[0].id(), CustomerId::new(1));
        assert_eq!(records, PortfolioFixtures::sample_portfolio());
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_end_to_end_score_grouping() {
        let db = create_isolated_test_database().await.unwrap();
        db.seed(&PortfolioFixtures::sample_portfolio()).await.unwrap();
        let repo = PortfolioRepository::new(db.pool().clone());

        let portfolio = load_scored_portfolio(&repo, &SegmentFilter::all()).await.unwrap();
        assert_clean(portfolio.quality());
        let rows = aggregate(portfolio.records(), &AggregationQuery::by(Dimension::RiskScore));

        assert_partition(&rows, 10);
        assert_descending_rate(&rows);

        assert_group(&rows, Dimension::RiskScore, DimensionValue::Score(4), 2, "1.00");
        assert_group(&rows, Dimension::RiskScore, DimensionValue::Score(0), 3, "0.00");
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_attribute_filters_are_pushed_down() {
        let db = create_isolated_test_database().await.unwrap();
        db.seed(&PortfolioFixtures::sample_portfolio()).await.unwrap();
        let repo = PortfolioRepository::new(db.pool().clone());

        let filter = SegmentFilter::all()
            .with_age_bands([AgeBand::Age16To25])
            .with_income_bands([IncomeBand::MiddleClass, IncomeBand::WorkingClass]);
        let records = repo.fetch_records(&filter).await.unwrap();

        let ids: Vec<i64> = records.iter().map(|r| r.id().value()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_missing_rows_and_labels() {
        let db = create_isolated_test_database().await.unwrap();
        db.seed(&[
            PortfolioFixtures::sparse_customer(1),
            PortfolioRecordBuilder::new(2).build(),
        ])
        .await
        .unwrap();
        sqlx::query("UPDATE customers SET age = 'unspecified' WHERE id = 2")
            .execute(db.pool())
            .await
            .unwrap();
        let repo = PortfolioRepository::new(db.pool().clone());

        let records = repo.fetch_records(&SegmentFilter::all()).await.unwrap();

        assert!(records[0].vehicle.is_none());
        assert!(records[0].history.is_none());
        assert_eq!(records[1].customer.age_band, None);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_customers_without_claims_are_skipped() {
        let db = create_isolated_test_database().await.unwrap();
        db.seed(&[PortfolioFixtures::low_risk_customer(1)]).await.unwrap();
        sqlx::query("INSERT INTO customers (id, age) VALUES (2, '16-25')")
            .execute(db.pool())
            .await
            .unwrap();
        let repo = PortfolioRepository::new(db.pool().clone());

        let records = repo.fetch_records(&SegmentFilter::all()).await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_reseeding_shared_database() {
        let db = get_shared_test_database().await;
        db.clear_data().await.unwrap();
        let repo = PortfolioRepository::new(db.pool().clone());

        db.seed(&[PortfolioFixtures::high_risk_customer(1)]).await.unwrap();
        assert_eq!(repo.fetch_records(&SegmentFilter::all()).await.unwrap().len(), 1);

        db.clear_data().await.unwrap();
        assert!(repo.fetch_records(&SegmentFilter::all()).await.unwrap().is_empty());

        db.seed(&PortfolioFixtures::sample_portfolio()).await.unwrap();
        assert_eq!(repo.fetch_records(&SegmentFilter::all()).await.unwrap().len(), 10);
        db.clear_data().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_health_check() {
        use core_kernel::HealthCheckable;

        let db = create_isolated_test_database().await.unwrap();
        let repo = PortfolioRepository::new(db.pool().clone());
        assert!(repo.health_check().await.is_operational());
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod property_tests {
    use super::*;
    use infra_db::repositories::build_portfolio_query;
    use proptest::prelude::*;
    use test_utils::{portfolio_strategy, segment_filter_strategy};

    proptest! {
        #[test]
        fn prop_one_bind_per_pushed_down_predicate(filter in segment_filter_strategy()) {
            let builder = build_portfolio_query(&filter);
            let placeholders = builder.sql().matches('$').count();

            let bands = [
                filter.age_bands.is_empty(),
                filter.income_bands.is_empty(),
                filter.experience_bands.is_empty(),
            ]
            .iter()
            .filter(|empty| !**empty)
            .count();
            let credit = if filter.credit_score.is_unrestricted() { 0 } else { 2 };

            prop_assert_eq!(placeholders, bands + credit);
        }

        #[test]
        fn prop_cache_returns_what_the_source_returns(
            records in portfolio_strategy(12),
            filter in segment_filter_strategy(),
        ) {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            runtime.block_on(async {
                let direct = InMemoryPortfolioSource::with_records(records.clone());
                let cached = CachedPortfolioSource::new(InMemoryPortfolioSource::with_records(records));

                let expected = direct.fetch_records(&filter).await.unwrap();
                let first = cached.fetch_records(&filter).await.unwrap();
                let second = cached.fetch_records(&filter).await.unwrap();

                assert_eq!(first, expected);
                assert_eq!(second, expected);
                assert_eq!(cached.inner().fetch_count(), 1);
            });
        }
    }
}
