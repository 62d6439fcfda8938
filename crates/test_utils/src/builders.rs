//! Test Data Builders
//!
//! Provides a builder for portfolio records with sensible defaults. The
//! default record raises no flag; tests set only the attributes they are
//! about.

use core_kernel::CustomerId;
use domain_risk::{
    AgeBand, Customer, DrivingHistory, ExperienceBand, IncomeBand, PortfolioRecord, Vehicle,
};

/// Builder for constructing portfolio records
#[derive(Debug, Clone)]
pub struct PortfolioRecordBuilder {
    customer: Customer,
    vehicle: Option<Vehicle>,
    history: Option<DrivingHistory>,
    outcome: bool,
}

impl PortfolioRecordBuilder {
    /// Creates a builder for a complete, zero-score record
    pub fn new(id: i64) -> Self {
        let id = CustomerId::new(id);
        Self {
            customer: Customer {
                id,
                age_band: Some(AgeBand::Age40To64),
                income_band: Some(IncomeBand::MiddleClass),
                credit_score: Some(0.75),
                gender: Some("female".to_string()),
                postal_code: Some("10238".to_string()),
            },
            vehicle: Some(Vehicle {
                customer_id: id,
                vehicle_type: Some("sedan".to_string()),
                vehicle_year: Some(2019),
                annual_mileage: Some(11_000),
            }),
            history: Some(DrivingHistory {
                customer_id: id,
                driving_experience: Some(ExperienceBand::Years20To29),
                speeding_violations: Some(0),
                dui_count: Some(0),
            }),
            outcome: false,
        }
    }

    /// Sets the age band
    pub fn age(mut self, band: AgeBand) -> Self {
        self.customer.age_band = Some(band);
        self
    }

    /// Sets the income band
    pub fn income(mut self, band: IncomeBand) -> Self {
        self.customer.income_band = Some(band);
        self
    }

    /// Sets the credit score
    pub fn credit(mut self, score: f64) -> Self {
        self.customer.credit_score = Some(score);
        self
    }

    /// Sets the gender
    pub fn gender(mut self, gender: impl Into<String>) -> Self {
        self.customer.gender = Some(gender.into());
        self
    }

    /// Sets the postal code
    pub fn postal_code(mut self, code: impl Into<String>) -> Self {
        self.customer.postal_code = Some(code.into());
        self
    }

    /// Sets the vehicle type
    pub fn vehicle_type(mut self, vehicle_type: impl Into<String>) -> Self {
        self.vehicle_mut().vehicle_type = Some(vehicle_type.into());
        self
    }

    /// Sets the vehicle year and annual mileage
    pub fn vehicle(mut self, year: i32, mileage: i64) -> Self {
        let vehicle = self.vehicle_mut();
        vehicle.vehicle_year = Some(year);
        vehicle.annual_mileage = Some(mileage);
        self
    }

    /// Sets the driving experience band
    pub fn experience(mut self, band: ExperienceBand) -> Self {
        self.history_mut().driving_experience = Some(band);
        self
    }

    /// Sets the speeding violation count
    pub fn speeding(mut self, count: i32) -> Self {
        self.history_mut().speeding_violations = Some(count);
        self
    }

    /// Sets the DUI count
    pub fn duis(mut self, count: i32) -> Self {
        self.history_mut().dui_count = Some(count);
        self
    }

    /// Marks the customer as having filed a claim
    pub fn claimed(mut self) -> Self {
        self.outcome = true;
        self
    }

    /// Sets the claim outcome
    pub fn outcome(mut self, outcome: bool) -> Self {
        self.outcome = outcome;
        self
    }

    /// Drops the vehicle row
    pub fn without_vehicle(mut self) -> Self {
        self.vehicle = None;
        self
    }

    /// Drops the driving history row
    pub fn without_history(mut self) -> Self {
        self.history = None;
        self
    }

    /// Clears the customer's optional attributes
    pub fn sparse_customer(mut self) -> Self {
        self.customer = Customer::new(self.customer.id);
        self
    }

    /// Builds the record
    pub fn build(self) -> PortfolioRecord {
        let mut record = PortfolioRecord::new(self.customer, self.outcome);
        record.vehicle = self.vehicle;
        record.history = self.history;
        record
    }

    fn vehicle_mut(&mut self) -> &mut Vehicle {
        let id = self.customer.id;
        self.vehicle.get_or_insert_with(|| Vehicle::new(id))
    }

    fn history_mut(&mut self) -> &mut DrivingHistory {
        let id = self.customer.id;
        self.history.get_or_insert_with(|| DrivingHistory::new(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_risk::RiskScore;

    #[test]
    fn test_default_record_scores_zero() {
        let record = PortfolioRecordBuilder::new(1).build();
        assert_eq!(RiskScore::evaluate(&record).score(), 0);
        assert!(!record.outcome());
    }

    #[test]
    fn test_builder_sets_flags() {
        let record = PortfolioRecordBuilder::new(1)
            .speeding(7)
            .duis(1)
            .credit(0.2)
            .claimed()
            .build();
        assert_eq!(RiskScore::evaluate(&record).score(), 3);
        assert!(record.outcome());
    }

    #[test]
    fn test_setters_recreate_dropped_rows() {
        let record = PortfolioRecordBuilder::new(1)
            .without_vehicle()
            .vehicle(2010, 20_000)
            .build();
        let vehicle = record.vehicle.unwrap();
        assert_eq!(vehicle.customer_id, CustomerId::new(1));
        assert_eq!(vehicle.vehicle_type, None);
    }
}
