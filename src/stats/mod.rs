//! Statistics pipeline
//!
//! Raw stat record model, snapshot parsing, per-SSRC delta-rate tracking, and
//! windowed aggregation of subscriber-side samples.

pub mod parser;
pub mod rate;
pub mod report;
pub mod types;
pub mod window;

pub use parser::{parse_publisher_report, parse_subscriber_report, SubscriberReport};
pub use rate::DeltaRateCalculator;
pub use report::{decode_report, CandidatePairRecord, RawStatRecord, RemoteInboundRecord, RtpStreamRecord, StatKind};
pub use types::{
    MediaStatsEntry, StreamSample, SubscriberAudioStats, SubscriberVideoStats, VideoQualityStats,
};
pub use window::{WindowedAggregate, WindowedAggregator};
