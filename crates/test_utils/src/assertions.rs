//! Custom Test Assertions
//!
//! Provides assertion helpers for aggregation output that give more
//! meaningful failure messages than comparing whole rows.

use rust_decimal::Decimal;

use domain_risk::{DataQualityReport, Dimension, DimensionValue, GroupRow};

/// Asserts that a rate equals the expected value written as a string
///
/// Comparing against `"0.50"` also checks the scale, so a rate that would
/// print as `0.5` fails.
pub fn assert_rate(actual: Decimal, expected: &str) {
    assert_eq!(
        actual.to_string(),
        expected,
        "Rate mismatch: actual={}, expected={}",
        actual,
        expected
    );
}

/// Finds the row whose value for `dimension` is `value`
///
/// # Panics
///
/// Panics if no row matches
pub fn find_row<'a>(rows: &'a [GroupRow], dimension: Dimension, value: &DimensionValue) -> &'a GroupRow {
    rows.iter()
        .find(|row| row.value(dimension) == Some(value))
        .unwrap_or_else(|| panic!("No row with {:?} = {:?} in {} rows", dimension, value, rows.len()))
}

/// Asserts that a group exists with the given count and claim rate
pub fn assert_group(rows: &[GroupRow], dimension: Dimension, value: DimensionValue, count: u64, rate: &str) {
    let row = find_row(rows, dimension, &value);
    assert_eq!(row.count, count, "Count mismatch for {:?} = {:?}", dimension, value);
    assert_rate(row.claim_rate, rate);
}

/// Asserts that the groups account for every record exactly once
pub fn assert_partition(rows: &[GroupRow], total: usize) {
    let counted: u64 = rows.iter().map(|row| row.count).sum();
    assert_eq!(counted, total as u64, "Groups cover {} of {} records", counted, total);
    assert!(rows.iter().all(|row| row.count > 0), "Empty group in output");
}

/// Asserts that rows are in non-increasing claim rate order
pub fn assert_descending_rate(rows: &[GroupRow]) {
    for pair in rows.windows(2) {
        assert!(
            pair[0].claim_rate >= pair[1].claim_rate,
            "Rows out of order: {} before {}",
            pair[0].claim_rate,
            pair[1].claim_rate
        );
    }
}

/// Asserts that every input record was scored with all attributes present
pub fn assert_clean(quality: &DataQualityReport) {
    assert!(
        quality.is_clean(),
        "Expected clean data, got {} excluded and {} missing attributes: {:?}",
        quality.excluded,
        quality.missing_attributes,
        quality.issues
    );
}
