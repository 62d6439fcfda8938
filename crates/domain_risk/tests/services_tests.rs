//! Tests for the portfolio reports

use rust_decimal_macros::dec;

use core_kernel::CustomerId;

use domain_risk::aggregate::{Dimension, DimensionValue};
use domain_risk::bands::RiskTier;
use domain_risk::flags::RiskFlag;
use domain_risk::record::{AgeBand, Customer, DrivingHistory, ExperienceBand, IncomeBand, PortfolioRecord, Vehicle};
use domain_risk::scoring::{score_portfolio, ScoredPortfolio};
use domain_risk::services::{ReportService, HIGH_RISK_GROUP, LOW_RISK_GROUP};

/// Builds a record whose score equals the number of `true` knobs
fn record(id: i64, speeding: bool, dui: bool, low_credit: bool, outcome: bool) -> PortfolioRecord {
    let cid = CustomerId::new(id);
    let mut customer = Customer::new(cid);
    customer.age_band = Some(if id % 2 == 0 { AgeBand::Age26To39 } else { AgeBand::Age40To64 });
    customer.income_band = Some(IncomeBand::WorkingClass);
    customer.credit_score = Some(if low_credit { 0.2 } else { 0.7 });
    customer.gender = Some(if id % 2 == 0 { "male" } else { "female" }.to_string());
    customer.postal_code = Some("10238".to_string());

    let mut vehicle = Vehicle::new(cid);
    vehicle.vehicle_type = Some("sedan".to_string());
    vehicle.vehicle_year = Some(2019);
    vehicle.annual_mileage = Some(10_000 + id * 1_000);

    let mut history = DrivingHistory::new(cid);
    history.driving_experience = Some(ExperienceBand::Years10To19);
    history.speeding_violations = Some(if speeding { 8 } else { 0 });
    history.dui_count = Some(u8::from(dui).into());

    PortfolioRecord::new(customer, outcome)
        .with_vehicle(vehicle)
        .with_history(history)
}

/// Scores: 3, 3, 2, 1, 0, 0 with claims on the first, third and fourth
fn portfolio() -> ScoredPortfolio {
    score_portfolio(vec![
        record(1, true, true, true, true),
        record(2, true, true, true, false),
        record(3, true, false, true, true),
        record(4, false, false, true, true),
        record(5, false, false, false, false),
        record(6, false, false, false, false),
    ])
}

mod summary_tests {
    use super::*;

    #[test]
    fn test_portfolio_kpis() {
        let kpis = ReportService::new().portfolio_kpis(&portfolio());
        assert_eq!(kpis.total_customers, 6);
        assert_eq!(kpis.total_claims, 3);
        assert_eq!(kpis.claim_rate, Some(dec!(0.50)));
    }

    #[test]
    fn test_high_risk_snapshot() {
        let kpis = ReportService::new().high_risk_snapshot(&portfolio());
        assert_eq!(kpis.total_customers, 2);
        assert_eq!(kpis.total_claims, 1);
        assert_eq!(kpis.claim_rate, Some(dec!(0.50)));
    }

    #[test]
    fn test_claim_rate_by_tier_orders_by_rate() {
        let rows = ReportService::new().claim_rate_by_tier(&portfolio());

        // Medium 1/1, Low 1/3, High 1/2
        let tiers: Vec<_> = rows.iter().map(|r| r.value(Dimension::RiskTier).cloned()).collect();
        assert_eq!(
            tiers,
            vec![
                Some(DimensionValue::Tier(RiskTier::MediumRisk)),
                Some(DimensionValue::Tier(RiskTier::HighRisk)),
                Some(DimensionValue::Tier(RiskTier::LowRisk)),
            ]
        );
        assert_eq!(rows[2].claim_rate, dec!(0.33));
    }

    #[test]
    fn test_score_distribution_shares() {
        let rows = ReportService::new().score_distribution(&portfolio());

        assert_eq!(rows[0].value(Dimension::RiskScore), Some(&DimensionValue::Score(3)));
        assert_eq!(rows[0].share_of_portfolio, Some(dec!(33.3)));
        assert_eq!(rows.last().unwrap().value(Dimension::RiskScore), Some(&DimensionValue::Score(0)));
    }

    #[test]
    fn test_score_vs_claim_rate_ascends() {
        let rows = ReportService::new().score_vs_claim_rate(&portfolio());
        let scores: Vec<_> = rows.iter().map(|r| r.value(Dimension::RiskScore).cloned()).collect();
        assert_eq!(
            scores,
            [0u8, 1, 2, 3].map(|s| Some(DimensionValue::Score(s))).to_vec()
        );
    }

    #[test]
    fn test_claim_load_ties_fall_back_to_score() {
        let rows = ReportService::new().claim_load_by_score(&portfolio());
        // Scores 1, 2 and 3 each carry one claim, score 0 none
        assert_eq!(rows[0].value(Dimension::RiskScore), Some(&DimensionValue::Score(1)));
        assert_eq!(rows[3].claim_count, 0);
    }

    #[test]
    fn test_extremes_comparison() {
        let rows = ReportService::new().extremes_comparison(&portfolio());

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].risk_group, HIGH_RISK_GROUP);
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[1].risk_group, LOW_RISK_GROUP);
        assert_eq!(rows[1].count, 3);
        assert_eq!(rows[1].claim_rate, dec!(0.33));
    }

    #[test]
    fn test_extremes_omit_empty_side() {
        let only_low = score_portfolio(vec![record(1, false, false, false, true)]);
        let rows = ReportService::new().extremes_comparison(&only_low);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].risk_group, LOW_RISK_GROUP);
    }

    #[test]
    fn test_risk_summary_on_empty_portfolio() {
        let summary = ReportService::new().risk_summary(&ScoredPortfolio::default());
        assert_eq!(summary.portfolio.total_customers, 0);
        assert!(summary.claim_rate_by_tier.is_empty());
        assert!(summary.extremes.is_empty());
    }
}

mod listing_tests {
    use super::*;

    #[test]
    fn test_flag_distribution() {
        let distribution = ReportService::new().flag_distribution(&portfolio());

        assert_eq!(distribution.total_customers, 6);
        assert_eq!(distribution.count(RiskFlag::SpeedingRisk), 3);
        assert_eq!(distribution.count(RiskFlag::DuiRisk), 2);
        assert_eq!(distribution.count(RiskFlag::LowCreditRisk), 4);
        assert_eq!(distribution.count(RiskFlag::VehicleRisk), 0);
        assert_eq!(distribution.flags.len(), 5);
    }

    #[test]
    fn test_component_flags_in_id_order_with_limit() {
        let service = ReportService::with_limits(4, 20);
        let rows = service.component_flags(&portfolio(), None);

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].customer_id(), CustomerId::new(1));
        assert_eq!(rows[0].score(), 3);
        assert_eq!(service.component_flags(&portfolio(), Some(2)).len(), 2);
    }

    #[test]
    fn test_high_risk_customers_ranking() {
        let rows = ReportService::new().high_risk_customers(&portfolio(), None);
        let ids: Vec<i64> = rows.iter().map(|r| r.customer_id.value()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);

        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["risk_score"], 3);
        assert_eq!(json["outcome"], true);
        assert_eq!(json["dui_risk"], true);
    }
}

mod segment_tests {
    use super::*;
    use domain_risk::filter::SegmentFilter;

    #[test]
    fn test_segment_summary() {
        let segment = portfolio().filter(&SegmentFilter::all().with_age_bands([AgeBand::Age40To64]));
        let summary = ReportService::new().segment_summary(&segment);

        // Customers 1, 3, 5: scores 3, 2, 0; claims on 1 and 3
        assert_eq!(summary.customers, 3);
        assert_eq!(summary.average_risk_score, Some(dec!(1.67)));
        assert_eq!(summary.claim_rate, Some(dec!(0.67)));
        assert_eq!(summary.average_credit_score, Some(dec!(0.37)));
    }

    #[test]
    fn test_empty_segment_summary() {
        let summary = ReportService::new().segment_summary(&ScoredPortfolio::default());
        assert_eq!(summary.customers, 0);
        assert_eq!(summary.claim_rate, None);
    }

    #[test]
    fn test_segment_composition() {
        let composition = ReportService::new().segment_composition(&portfolio());

        assert_eq!(composition.by_age.len(), 2);
        assert_eq!(composition.by_age[0].value(Dimension::AgeBand), Some(&DimensionValue::Age(AgeBand::Age26To39)));
        assert_eq!(composition.by_income.len(), 1);
        assert_eq!(composition.by_outcome[0].value(Dimension::Outcome), Some(&DimensionValue::Outcome(false)));
        assert_eq!(composition.by_outcome[0].count, 3);
    }

    #[test]
    fn test_segment_overview_tables() {
        let overview = ReportService::new().segment_overview(&portfolio());

        assert_eq!(overview.by_postal_code.len(), 1);
        assert_eq!(overview.by_gender.len(), 2);
        assert!(overview.by_gender[0].average_risk_score.is_some());
        assert!(overview.by_vehicle_type[0].average_annual_mileage.is_some());
        assert_eq!(overview.by_age_and_income.len(), 2);
        assert_eq!(overview.by_vehicle_year[0].count, 6);
        assert!(!overview.by_credit_band.is_empty());
    }
}
