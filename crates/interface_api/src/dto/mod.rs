//! Request and response bodies

pub mod common;
pub mod segments;

pub use common::{Envelope, LimitQuery, QualitySummary};
pub use segments::{AggregateRequest, SegmentResponse};
