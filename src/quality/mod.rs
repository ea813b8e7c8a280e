//! Quality analysis
//!
//! Combines per-cycle stat aggregates into unified quality snapshots and
//! recommends a publish resolution from observed outgoing bandwidth.

pub mod combiner;
pub mod recommend;

pub use combiner::{combine, QualityStats};
pub use recommend::{
    QualityTestResult, QualityThreshold, ResolutionRecommender, BITRATE_TOO_LOW,
};
