//! Infrastructure Database Layer
//!
//! This crate provides the PostgreSQL side of the risk analytics system:
//! connection pooling, the read-only portfolio repository that implements
//! `domain_risk::PortfolioSource`, and a caching wrapper for any source.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, CachedPortfolioSource, DatabaseConfig, PortfolioRepository};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/risk_analytics")).await?;
//! let source = CachedPortfolioSource::new(PortfolioRepository::new(pool));
//! ```

pub mod pool;
pub mod error;
pub mod cache;
pub mod repositories;

pub use pool::{DatabasePool, create_pool, DatabaseConfig};
pub use error::DatabaseError;
pub use cache::{CachedPortfolioSource, DEFAULT_CACHE_CAPACITY};
pub use repositories::{PortfolioRepository, PortfolioRow};
