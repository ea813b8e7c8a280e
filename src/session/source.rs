//! Stats source abstraction
//!
//! The session polls raw stat snapshots through the [`StatsSource`] trait, so
//! the same pipeline runs against a live transport or against the simulated
//! source used by the demo binary and the integration tests.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;
use crate::stats::report::{
    CandidatePairRecord, RawStatRecord, RemoteInboundRecord, RtpStreamRecord, StatKind,
};

/// Provider of raw stat snapshots for a test session
///
/// Each call returns one polling cycle's snapshot as a JSON array of stat
/// records. Implementations are polled from a single task and may keep
/// mutable state between calls.
#[async_trait]
pub trait StatsSource: Send {
    /// Snapshot of the publisher-side peer connection
    async fn publisher_snapshot(&mut self) -> Result<String>;

    /// Snapshot of the loopback subscriber's peer connection
    async fn subscriber_snapshot(&mut self) -> Result<String>;
}

/// Synthetic stats source producing a plausible 720p call
///
/// Counters advance by a jittered per-poll amount so derived bitrates move
/// around a stable center. The clock advances a fixed step per publisher
/// poll, which keeps tests deterministic in shape if not in exact values.
pub struct SimulatedStatsSource {
    rng: StdRng,
    clock_ms: f64,
    step_ms: f64,
    video_bytes_sent: u64,
    audio_bytes_sent: u64,
    video_bytes_received: u64,
    audio_bytes_received: u64,
    video_packets_received: u64,
    video_packets_lost: u64,
    audio_packets_received: u64,
    audio_packets_lost: u64,
}

const VIDEO_SSRC_OUT: u64 = 1111;
const AUDIO_SSRC_OUT: u64 = 2222;
const VIDEO_SSRC_IN: u64 = 3333;
const AUDIO_SSRC_IN: u64 = 4444;

impl SimulatedStatsSource {
    /// Source advancing `step_ms` of simulated clock per publisher poll
    pub fn new(seed: u64, step_ms: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            clock_ms: 1_000.0,
            step_ms,
            video_bytes_sent: 0,
            audio_bytes_sent: 0,
            video_bytes_received: 0,
            audio_bytes_received: 0,
            video_packets_received: 0,
            video_packets_lost: 0,
            audio_packets_received: 0,
            audio_packets_lost: 0,
        }
    }

    fn video_record(&mut self) -> RtpStreamRecord {
        RtpStreamRecord {
            ssrc: VIDEO_SSRC_OUT,
            kind: StatKind::Video,
            frame_width: 1280,
            frame_height: 720,
            frames_per_second: 30,
            pli_count: self.rng.gen_range(0..3),
            nack_count: self.rng.gen_range(0..10),
            bytes_sent: self.video_bytes_sent,
            timestamp: self.clock_ms,
            ..Default::default()
        }
    }

    fn audio_record(&mut self) -> RtpStreamRecord {
        RtpStreamRecord {
            ssrc: AUDIO_SSRC_OUT,
            kind: StatKind::Audio,
            bytes_sent: self.audio_bytes_sent,
            timestamp: self.clock_ms,
            ..Default::default()
        }
    }
}

#[async_trait]
impl StatsSource for SimulatedStatsSource {
    async fn publisher_snapshot(&mut self) -> Result<String> {
        self.clock_ms += self.step_ms;
        let seconds = self.step_ms / 1000.0;
        // ~2 Mbps video, ~40 kbps audio, jittered
        self.video_bytes_sent += (self.rng.gen_range(220_000.0..280_000.0) * seconds) as u64;
        self.audio_bytes_sent += (self.rng.gen_range(4_500.0..5_500.0) * seconds) as u64;

        let records = vec![
            RawStatRecord::OutboundRtp(self.video_record()),
            RawStatRecord::OutboundRtp(self.audio_record()),
            RawStatRecord::CandidatePair(CandidatePairRecord {
                nominated: true,
                available_outgoing_bitrate: self.rng.gen_range(1_800_000..2_600_000),
                current_round_trip_time: self.rng.gen_range(0.020..0.060),
                timestamp: self.clock_ms,
            }),
            RawStatRecord::RemoteInboundRtp(RemoteInboundRecord {
                kind: StatKind::Video,
                jitter: Some(self.rng.gen_range(0.001..0.030)),
            }),
        ];
        Ok(serde_json::to_string(&records)?)
    }

    async fn subscriber_snapshot(&mut self) -> Result<String> {
        let seconds = self.step_ms / 1000.0;
        self.video_bytes_received += (self.rng.gen_range(210_000.0..270_000.0) * seconds) as u64;
        self.audio_bytes_received += (self.rng.gen_range(4_500.0..5_500.0) * seconds) as u64;
        self.video_packets_received += (self.rng.gen_range(180.0..220.0) * seconds) as u64;
        self.video_packets_lost += self.rng.gen_range(0..2);
        self.audio_packets_received += (self.rng.gen_range(45.0..55.0) * seconds) as u64;
        self.audio_packets_lost += self.rng.gen_range(0..2);

        let records = vec![
            RawStatRecord::InboundRtp(RtpStreamRecord {
                ssrc: VIDEO_SSRC_IN,
                kind: StatKind::Video,
                frame_width: 1280,
                frame_height: 720,
                frames_per_second: 30,
                bytes_received: self.video_bytes_received,
                packets_received: self.video_packets_received,
                packets_lost: self.video_packets_lost,
                jitter: Some(self.rng.gen_range(0.001..0.030)),
                timestamp: self.clock_ms,
                ..Default::default()
            }),
            RawStatRecord::InboundRtp(RtpStreamRecord {
                ssrc: AUDIO_SSRC_IN,
                kind: StatKind::Audio,
                bytes_received: self.audio_bytes_received,
                packets_received: self.audio_packets_received,
                packets_lost: self.audio_packets_lost,
                timestamp: self.clock_ms,
                ..Default::default()
            }),
        ];
        Ok(serde_json::to_string(&records)?)
    }
}
