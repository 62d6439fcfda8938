//! Pre-built Test Fixtures
//!
//! Provides ready-to-use portfolio records whose scores and outcomes are
//! known, so tests can assert exact aggregation results.

use domain_risk::{AgeBand, ExperienceBand, IncomeBand, PortfolioRecord};

use crate::builders::PortfolioRecordBuilder;

/// Fixture for portfolio records
pub struct PortfolioFixtures;

impl PortfolioFixtures {
    /// Speeding, low credit, old high-mileage vehicle, young inexperienced
    /// driver: score 4, filed a claim
    pub fn high_risk_customer(id: i64) -> PortfolioRecord {
        PortfolioRecordBuilder::new(id)
            .age(AgeBand::Age16To25)
            .experience(ExperienceBand::Years0To9)
            .speeding(6)
            .credit(0.3)
            .vehicle(2010, 20_000)
            .claimed()
            .build()
    }

    /// No flag raised, no claim
    pub fn low_risk_customer(id: i64) -> PortfolioRecord {
        PortfolioRecordBuilder::new(id).credit(0.85).build()
    }

    /// A record without vehicle or history rows: five missing attributes
    pub fn sparse_customer(id: i64) -> PortfolioRecord {
        PortfolioRecordBuilder::new(id)
            .without_vehicle()
            .without_history()
            .build()
    }

    /// A record with negative mileage, which is excluded from aggregation
    pub fn invalid_customer(id: i64) -> PortfolioRecord {
        PortfolioRecordBuilder::new(id).vehicle(2018, -500).build()
    }

    /// Ten customers with scores 4, 4, 3, 2, 2, 1, 1, 0, 0, 0
    ///
    /// Claims are filed by customers 1, 2, 4 and 6: four claims in ten.
    pub fn sample_portfolio() -> Vec<PortfolioRecord> {
        vec![
            Self::high_risk_customer(1),
            PortfolioRecordBuilder::new(2)
                .age(AgeBand::Age16To25)
                .experience(ExperienceBand::Years0To9)
                .duis(2)
                .credit(0.45)
                .speeding(9)
                .income(IncomeBand::WorkingClass)
                .claimed()
                .build(),
            PortfolioRecordBuilder::new(3)
                .speeding(6)
                .duis(1)
                .credit(0.35)
                .gender("male")
                .build(),
            PortfolioRecordBuilder::new(4)
                .duis(1)
                .vehicle(2012, 18_000)
                .vehicle_type("sports car")
                .claimed()
                .build(),
            PortfolioRecordBuilder::new(5)
                .age(AgeBand::Age26To39)
                .credit(0.4)
                .speeding(8)
                .income(IncomeBand::Poverty)
                .build(),
            PortfolioRecordBuilder::new(6)
                .credit(0.49)
                .gender("male")
                .claimed()
                .build(),
            PortfolioRecordBuilder::new(7)
                .age(AgeBand::Age65Plus)
                .experience(ExperienceBand::Years30Plus)
                .speeding(6)
                .income(IncomeBand::UpperClass)
                .build(),
            Self::low_risk_customer(8),
            PortfolioRecordBuilder::new(9)
                .age(AgeBand::Age26To39)
                .experience(ExperienceBand::Years10To19)
                .credit(0.62)
                .gender("male")
                .build(),
            PortfolioRecordBuilder::new(10)
                .age(AgeBand::Age16To25)
                .experience(ExperienceBand::Years10To19)
                .income(IncomeBand::Poverty)
                .credit(0.91)
                .build(),
        ]
    }
}
