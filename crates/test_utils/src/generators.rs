//! Property-Based Test Generators
//!
//! Provides proptest strategies for portfolio records. Generated records are
//! always valid (they pass validation), but any attribute may be missing.

use proptest::prelude::*;

use core_kernel::CustomerId;
use domain_risk::{
    AgeBand, Customer, DrivingHistory, ExperienceBand, IncomeBand, PortfolioRecord, SegmentFilter,
    Vehicle,
};

/// Strategy for age bands
pub fn age_band_strategy() -> impl Strategy<Value = AgeBand> {
    proptest::sample::select(AgeBand::ALL.to_vec())
}

/// Strategy for income bands
pub fn income_band_strategy() -> impl Strategy<Value = IncomeBand> {
    proptest::sample::select(IncomeBand::ALL.to_vec())
}

/// Strategy for driving experience bands
pub fn experience_band_strategy() -> impl Strategy<Value = ExperienceBand> {
    proptest::sample::select(ExperienceBand::ALL.to_vec())
}

/// Strategy for credit scores on a 0.01 grid within 0.0..=1.0
pub fn credit_score_strategy() -> impl Strategy<Value = f64> {
    (0u32..=100).prop_map(|n| f64::from(n) / 100.0)
}

fn customer_strategy(id: i64) -> impl Strategy<Value = Customer> {
    (
        proptest::option::of(age_band_strategy()),
        proptest::option::of(income_band_strategy()),
        proptest::option::of(credit_score_strategy()),
        proptest::option::of(prop_oneof![Just("male".to_string()), Just("female".to_string())]),
        proptest::option::of(prop_oneof![Just("10238".to_string()), Just("32765".to_string()), Just("92101".to_string())]),
    )
        .prop_map(move |(age_band, income_band, credit_score, gender, postal_code)| Customer {
            id: CustomerId::new(id),
            age_band,
            income_band,
            credit_score,
            gender,
            postal_code,
        })
}

fn vehicle_strategy(id: i64) -> impl Strategy<Value = Vehicle> {
    (
        proptest::option::of(prop_oneof![Just("sedan".to_string()), Just("sports car".to_string())]),
        proptest::option::of(1995i32..2025),
        proptest::option::of(0i64..30_000),
    )
        .prop_map(move |(vehicle_type, vehicle_year, annual_mileage)| Vehicle {
            customer_id: CustomerId::new(id),
            vehicle_type,
            vehicle_year,
            annual_mileage,
        })
}

fn history_strategy(id: i64) -> impl Strategy<Value = DrivingHistory> {
    (
        proptest::option::of(experience_band_strategy()),
        proptest::option::of(0i32..15),
        proptest::option::of(0i32..4),
    )
        .prop_map(move |(driving_experience, speeding_violations, dui_count)| DrivingHistory {
            customer_id: CustomerId::new(id),
            driving_experience,
            speeding_violations,
            dui_count,
        })
}

/// Strategy for a single valid record with the given id
pub fn portfolio_record_strategy(id: i64) -> impl Strategy<Value = PortfolioRecord> {
    (
        customer_strategy(id),
        proptest::option::of(vehicle_strategy(id)),
        proptest::option::of(history_strategy(id)),
        any::<bool>(),
    )
        .prop_map(|(customer, vehicle, history, outcome)| {
            let mut record = PortfolioRecord::new(customer, outcome);
            record.vehicle = vehicle;
            record.history = history;
            record
        })
}

/// Strategy for a portfolio of up to `max_len` records with distinct ids
pub fn portfolio_strategy(max_len: usize) -> impl Strategy<Value = Vec<PortfolioRecord>> {
    (0..=max_len).prop_flat_map(|len| {
        (1..=len as i64)
            .map(portfolio_record_strategy)
            .collect::<Vec<_>>()
    })
}

/// Strategy for valid segment filters
pub fn segment_filter_strategy() -> impl Strategy<Value = SegmentFilter> {
    (
        (0u8..=5, 0u8..=5),
        proptest::collection::btree_set(age_band_strategy(), 0..3),
        proptest::collection::btree_set(income_band_strategy(), 0..3),
        proptest::collection::btree_set(experience_band_strategy(), 0..3),
        (credit_score_strategy(), credit_score_strategy()),
    )
        .prop_map(|((a, b), ages, incomes, experiences, (c, d))| {
            SegmentFilter::all()
                .with_risk_scores(a.min(b), a.max(b))
                .with_age_bands(ages)
                .with_income_bands(incomes)
                .with_experience_bands(experiences)
                .with_credit_scores(c.min(d), c.max(d))
        })
}
