//! Typed stat aggregates
//!
//! This module defines the immutable value types produced by the parsing and
//! aggregation stages: per-SSRC media entries, per-cycle quality aggregates,
//! and the windowed subscriber-side aggregates.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Per-SSRC media statistics for one polling cycle
///
/// Immutable: one entry per active SSRC per poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaStatsEntry {
    /// Synchronization source identifier
    pub ssrc: u64,
    /// Encoder quality limitation reason ("none" when unconstrained)
    pub quality_limitation_reason: String,
    /// Frame resolution as "WxH" ("0x0" when not reported)
    pub resolution: String,
    /// Frames per second
    pub framerate: u32,
    /// Picture loss indication count
    pub pli_count: u32,
    /// Negative acknowledgement count
    pub nack_count: u32,
    /// Cumulative bytes sent on this SSRC
    pub bytes_sent: u64,
    /// Instantaneous bitrate in kbps, derived from two cumulative-byte
    /// samples. Signed: a counter reset produces one negative sample.
    pub bitrate_kbps: i64,
}

/// Aggregate video quality statistics for one polling cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoQualityStats {
    /// One entry per active video SSRC, in report order
    pub video_stats: Vec<MediaStatsEntry>,
    /// The audio entry, when an audio track was reported (last one wins)
    pub audio_stats: Option<MediaStatsEntry>,
    /// Jitter in seconds; -1.0 means unavailable and must not be treated as
    /// a real jitter value downstream
    pub jitter: f64,
    /// Round-trip time in milliseconds from the nominated candidate pair
    pub current_round_trip_time_ms: f64,
    /// Estimated available outgoing bitrate in bits/sec
    pub available_outgoing_bitrate: u64,
    /// Source clock timestamp in milliseconds
    pub timestamp: u64,
}

impl VideoQualityStats {
    /// Total video bitrate across all video SSRCs, in kbps
    pub fn total_video_bitrate_kbps(&self) -> i64 {
        self.video_stats.iter().map(|s| s.bitrate_kbps).sum()
    }

    /// Map of SSRC to resolution string
    pub fn resolution_by_ssrc(&self) -> HashMap<u64, String> {
        self.video_stats
            .iter()
            .map(|s| (s.ssrc, s.resolution.clone()))
            .collect()
    }

    /// Quality limitation reason of the first video entry ("none" when no
    /// video entry is present)
    pub fn quality_limitation_reason(&self) -> String {
        self.video_stats
            .first()
            .map(|s| s.quality_limitation_reason.clone())
            .unwrap_or_else(|| "none".to_string())
    }
}

/// Windowed subscriber-side video aggregate
///
/// One instance is created per accepted aggregation window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriberVideoStats {
    /// Received video bitrate over the window, in kbps
    pub bitrate_kbps: i64,
    /// Cumulative bytes received at the end of the window
    pub bytes_received: u64,
    /// Timestamp of the sample that closed the window, in milliseconds
    pub timestamp: f64,
    /// Packet loss ratio over the window, in [0, 1]
    pub packet_lost_ratio: f64,
}

/// Windowed subscriber-side audio aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriberAudioStats {
    /// Received audio bitrate over the window, in kbps
    pub bitrate_kbps: i64,
    /// Cumulative bytes received at the end of the window
    pub bytes_received: u64,
    /// Timestamp of the sample that closed the window, in milliseconds
    pub timestamp: f64,
    /// Packet loss ratio over the window, in [0, 1]
    pub packet_lost_ratio: f64,
}

/// One raw subscriber-side sample fed to the windowed aggregator
///
/// Counters are cumulative since stream start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamSample {
    /// Sample timestamp in milliseconds
    pub timestamp: f64,
    /// Cumulative packets lost
    pub packets_lost: u64,
    /// Cumulative packets received
    pub packets_received: u64,
    /// Cumulative bytes received
    pub bytes_received: u64,
}
