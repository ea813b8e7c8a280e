//! Quality snapshot combination
//!
//! Merges the latest publisher-side, subscriber-side windowed video, and
//! subscriber-side windowed audio aggregates into one unified [`QualityStats`]
//! snapshot for the consumer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::stats::types::{SubscriberAudioStats, SubscriberVideoStats, VideoQualityStats};

/// Unified per-cycle quality snapshot
///
/// Constructed fresh each emission cycle and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityStats {
    /// Total sent video bitrate across SSRCs, in kbps
    pub sent_video_bitrate_kbps: i64,
    /// Sent audio bitrate, in kbps
    pub sent_audio_bitrate_kbps: i64,
    /// Received video bitrate over the last window, in kbps
    pub received_video_bitrate_kbps: i64,
    /// Received audio bitrate over the last window, in kbps
    pub received_audio_bitrate_kbps: i64,
    /// Round-trip time in milliseconds
    pub current_round_trip_time_ms: f64,
    /// Estimated available outgoing bitrate in bits/sec
    pub available_outgoing_bitrate: u64,
    /// Audio packet loss ratio in [0, 1]
    pub audio_packet_lost_ratio: f64,
    /// Video packet loss ratio in [0, 1]
    pub video_packet_lost_ratio: f64,
    /// Jitter in seconds (-1.0 = unavailable)
    pub jitter: f64,
    /// Publisher-side encoder quality limitation reason
    pub quality_limitation_reason: String,
    /// Sent video resolution by SSRC
    pub sent_video_resolution: HashMap<u64, String>,
    /// Received video resolution by SSRC
    pub received_video_resolution: HashMap<u64, String>,
    /// Source clock timestamp of the publisher aggregate, in milliseconds
    pub timestamp: u64,
}

/// Combine the latest elements of the four source lists into a snapshot
///
/// Emission requires the publisher video-quality list and both windowed
/// subscriber lists to be non-empty. The subscriber video-quality list (the
/// RTT/jitter source) is read but its absence does not block emission: jitter
/// then reports -1.0 and the received-resolution map is empty. When any
/// required source is empty, `None` is returned rather than a partial record.
pub fn combine(
    publisher_quality: &[VideoQualityStats],
    subscriber_quality: &[VideoQualityStats],
    subscriber_video: &[SubscriberVideoStats],
    subscriber_audio: &[SubscriberAudioStats],
) -> Option<QualityStats> {
    let publisher = publisher_quality.last()?;
    let video = subscriber_video.last()?;
    let audio = subscriber_audio.last()?;
    let subscriber = subscriber_quality.last();

    Some(QualityStats {
        sent_video_bitrate_kbps: publisher.total_video_bitrate_kbps(),
        sent_audio_bitrate_kbps: publisher
            .audio_stats
            .as_ref()
            .map(|a| a.bitrate_kbps)
            .unwrap_or(0),
        received_video_bitrate_kbps: video.bitrate_kbps,
        received_audio_bitrate_kbps: audio.bitrate_kbps,
        current_round_trip_time_ms: publisher.current_round_trip_time_ms,
        available_outgoing_bitrate: publisher.available_outgoing_bitrate,
        audio_packet_lost_ratio: audio.packet_lost_ratio,
        video_packet_lost_ratio: video.packet_lost_ratio,
        jitter: subscriber.map(|s| s.jitter).unwrap_or(-1.0),
        quality_limitation_reason: publisher.quality_limitation_reason(),
        sent_video_resolution: publisher.resolution_by_ssrc(),
        received_video_resolution: subscriber
            .map(|s| s.resolution_by_ssrc())
            .unwrap_or_default(),
        timestamp: publisher.timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::types::MediaStatsEntry;

    fn entry(ssrc: u64, bitrate: i64, resolution: &str, reason: &str) -> MediaStatsEntry {
        MediaStatsEntry {
            ssrc,
            quality_limitation_reason: reason.to_string(),
            resolution: resolution.to_string(),
            framerate: 30,
            pli_count: 0,
            nack_count: 0,
            bytes_sent: 0,
            bitrate_kbps: bitrate,
        }
    }

    fn publisher_stats() -> VideoQualityStats {
        VideoQualityStats {
            video_stats: vec![
                entry(1, 800, "1280x720", "bandwidth"),
                entry(2, 200, "640x360", "none"),
            ],
            audio_stats: Some(entry(3, 48, "0x0", "none")),
            jitter: -1.0,
            current_round_trip_time_ms: 42.0,
            available_outgoing_bitrate: 2_000_000,
            timestamp: 9000,
        }
    }

    fn subscriber_stats() -> VideoQualityStats {
        VideoQualityStats {
            video_stats: vec![entry(7, 750, "1280x720", "none")],
            audio_stats: None,
            jitter: 0.012,
            current_round_trip_time_ms: 40.0,
            available_outgoing_bitrate: 0,
            timestamp: 9001,
        }
    }

    fn windowed_video() -> SubscriberVideoStats {
        SubscriberVideoStats {
            bitrate_kbps: 760,
            bytes_received: 1_000_000,
            timestamp: 9000.0,
            packet_lost_ratio: 0.02,
        }
    }

    fn windowed_audio() -> SubscriberAudioStats {
        SubscriberAudioStats {
            bitrate_kbps: 40,
            bytes_received: 60_000,
            timestamp: 9000.0,
            packet_lost_ratio: 0.01,
        }
    }

    #[test]
    fn test_emits_none_when_required_source_empty() {
        let publisher = vec![publisher_stats()];
        let video = vec![windowed_video()];
        let audio = vec![windowed_audio()];

        assert!(combine(&[], &[], &video, &audio).is_none());
        assert!(combine(&publisher, &[], &[], &audio).is_none());
        assert!(combine(&publisher, &[], &video, &[]).is_none());
    }

    #[test]
    fn test_emits_without_subscriber_quality_list() {
        // The RTT/jitter source being empty does not block emission
        let publisher = vec![publisher_stats()];
        let video = vec![windowed_video()];
        let audio = vec![windowed_audio()];

        let stats = combine(&publisher, &[], &video, &audio).unwrap();
        assert_eq!(stats.jitter, -1.0);
        assert!(stats.received_video_resolution.is_empty());
        assert_eq!(stats.sent_video_bitrate_kbps, 1000);
    }

    #[test]
    fn test_field_passthrough() {
        let publisher = vec![publisher_stats()];
        let subscriber = vec![subscriber_stats()];
        let video = vec![windowed_video()];
        let audio = vec![windowed_audio()];

        let stats = combine(&publisher, &subscriber, &video, &audio).unwrap();
        assert_eq!(stats.sent_video_bitrate_kbps, 1000);
        assert_eq!(stats.sent_audio_bitrate_kbps, 48);
        assert_eq!(stats.received_video_bitrate_kbps, 760);
        assert_eq!(stats.received_audio_bitrate_kbps, 40);
        assert_eq!(stats.current_round_trip_time_ms, 42.0);
        assert_eq!(stats.available_outgoing_bitrate, 2_000_000);
        assert_eq!(stats.audio_packet_lost_ratio, 0.01);
        assert_eq!(stats.video_packet_lost_ratio, 0.02);
        assert_eq!(stats.jitter, 0.012);
        assert_eq!(stats.quality_limitation_reason, "bandwidth");
        assert_eq!(stats.sent_video_resolution[&1], "1280x720");
        assert_eq!(stats.sent_video_resolution[&2], "640x360");
        assert_eq!(stats.received_video_resolution[&7], "1280x720");
        assert_eq!(stats.timestamp, 9000);
    }

    #[test]
    fn test_uses_latest_list_elements() {
        let mut publisher = vec![publisher_stats()];
        let mut newer = publisher_stats();
        newer.timestamp = 9500;
        newer.available_outgoing_bitrate = 3_000_000;
        publisher.push(newer);

        let stats = combine(&publisher, &[], &[windowed_video()], &[windowed_audio()]).unwrap();
        assert_eq!(stats.timestamp, 9500);
        assert_eq!(stats.available_outgoing_bitrate, 3_000_000);
    }
}
