//! # Video call quality statistics pipeline
//!
//! `rtc-quality-core` turns raw WebRTC stat snapshots from a short loopback
//! test call into periodic quality reports and a final publish-resolution
//! recommendation.
//!
//! This crate provides:
//!
//! - Decoding of raw getStats-style record arrays
//! - Bitrate derivation from cumulative byte counters
//! - Windowed packet-loss and bitrate aggregation for the subscriber side
//! - Combined per-second quality snapshots
//! - A bandwidth-driven resolution recommender
//! - A session task orchestrating the whole pipeline on timers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rtc_quality_core::prelude::*;
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> rtc_quality_core::Result<()> {
//!     let (transport_tx, transport_rx) = mpsc::channel(8);
//!     transport_tx.send(TransportEvent::Connected).await.ok();
//!     transport_tx.send(TransportEvent::SubscriberConnected).await.ok();
//!
//!     let source = SimulatedStatsSource::new(42, 500.0);
//!     let session = QualityTestSession::start(source, transport_rx, QualityTestConfig::default());
//!     let result = session.wait_result().await?;
//!     println!("recommended: {}", result.recommended_setting);
//!     Ok(())
//! }
//! ```

// Error handling
pub mod error;

// Working modules
pub mod config;
pub mod quality;
pub mod session;
pub mod stats;

// Re-export common types
pub use config::QualityTestConfig;
pub use error::{Error, Result};

// Re-export the pipeline surface for consumers
pub use quality::{QualityStats, QualityTestResult, QualityThreshold, ResolutionRecommender};
pub use session::{
    QualityTestEvent, QualityTestSession, SimulatedStatsSource, StatsSource, TransportEvent,
};
pub use stats::{
    decode_report, DeltaRateCalculator, MediaStatsEntry, RawStatRecord, SubscriberAudioStats,
    SubscriberVideoStats, VideoQualityStats, WindowedAggregator,
};

/// Common imports for working with quality test sessions
pub mod prelude {
    pub use crate::config::QualityTestConfig;
    pub use crate::error::{Error, Result};
    pub use crate::quality::{
        combine, QualityStats, QualityTestResult, QualityThreshold, ResolutionRecommender,
        BITRATE_TOO_LOW,
    };
    pub use crate::session::{
        QualityTestEvent, QualityTestSession, SimulatedStatsSource, StatsSource, TransportEvent,
    };
    pub use crate::stats::{
        decode_report, parse_publisher_report, parse_subscriber_report, DeltaRateCalculator,
        MediaStatsEntry, RawStatRecord, StreamSample, SubscriberAudioStats, SubscriberReport,
        SubscriberVideoStats, VideoQualityStats, WindowedAggregate, WindowedAggregator,
    };
}
