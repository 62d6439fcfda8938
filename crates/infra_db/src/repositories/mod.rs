//! Repository implementations
//!
//! Repositories encapsulate SQL and map between database rows and domain
//! records. The portfolio tables are only ever read.

pub mod portfolio;

pub use portfolio::{build_portfolio_query, PortfolioRepository, PortfolioRow};
