//! Stat snapshot parsing
//!
//! Reduces one polling cycle's raw record array into a typed
//! [`VideoQualityStats`] aggregate, routing cumulative byte counters through
//! the delta-rate calculator. Publisher- and subscriber-side reports differ
//! only in which RTP record type carries the media streams (`outbound-rtp`
//! vs `inbound-rtp`) and in the subscriber side additionally yielding raw
//! samples for the windowed aggregator.

use crate::stats::rate::DeltaRateCalculator;
use crate::stats::report::{RawStatRecord, RtpStreamRecord, StatKind};
use crate::stats::types::{MediaStatsEntry, StreamSample, VideoQualityStats};

/// Parsed subscriber-side report: the per-cycle aggregate plus the raw
/// cumulative samples feeding the windowed aggregator
#[derive(Debug, Clone)]
pub struct SubscriberReport {
    pub quality: VideoQualityStats,
    /// Video counters summed across active video SSRCs, when any
    pub video_sample: Option<StreamSample>,
    /// Audio counters, when an audio track was reported
    pub audio_sample: Option<StreamSample>,
}

fn media_entry(record: &RtpStreamRecord, bytes: u64, rates: &mut DeltaRateCalculator) -> MediaStatsEntry {
    let bitrate_kbps = rates.rate(record.ssrc, record.timestamp as u64, bytes);
    MediaStatsEntry {
        ssrc: record.ssrc,
        quality_limitation_reason: record.quality_limitation_reason.clone(),
        resolution: format!("{}x{}", record.frame_width, record.frame_height),
        framerate: record.frames_per_second,
        pli_count: record.pli_count,
        nack_count: record.nack_count,
        bytes_sent: bytes,
        bitrate_kbps,
    }
}

/// Parse a publisher-side report into a per-cycle aggregate
///
/// A single pass over the records: `outbound-rtp` entries of video/audio kind
/// become media entries (video appends, audio last-wins), the nominated
/// `candidate-pair` contributes bandwidth/RTT/timestamp, and a
/// `remote-inbound-rtp` video record contributes jitter. Records of other
/// types are skipped.
pub fn parse_publisher_report(
    records: &[RawStatRecord],
    rates: &mut DeltaRateCalculator,
) -> VideoQualityStats {
    let mut video_stats = Vec::new();
    let mut audio_stats = None;
    let mut jitter = -1.0;
    let mut available_outgoing_bitrate = 0;
    let mut current_round_trip_time_ms = 0.0;
    let mut timestamp = 0;

    for record in records {
        match record {
            RawStatRecord::OutboundRtp(r) => match r.kind {
                StatKind::Video => video_stats.push(media_entry(r, r.bytes_sent, rates)),
                StatKind::Audio => audio_stats = Some(media_entry(r, r.bytes_sent, rates)),
                StatKind::None => {}
            },
            RawStatRecord::CandidatePair(p) if p.nominated => {
                available_outgoing_bitrate = p.available_outgoing_bitrate;
                current_round_trip_time_ms = p.current_round_trip_time * 1000.0;
                timestamp = p.timestamp as u64;
            }
            RawStatRecord::RemoteInboundRtp(r) if r.kind == StatKind::Video => {
                jitter = r.jitter.unwrap_or(-1.0);
            }
            _ => {}
        }
    }

    VideoQualityStats {
        video_stats,
        audio_stats,
        jitter,
        current_round_trip_time_ms,
        available_outgoing_bitrate,
        timestamp,
    }
}

/// Parse a subscriber-side report
///
/// Same single-pass reduction over `inbound-rtp` records, additionally
/// extracting the cumulative loss/received counters as [`StreamSample`]s for
/// the windowed aggregator. Multiple video SSRCs sum into one video sample.
pub fn parse_subscriber_report(
    records: &[RawStatRecord],
    rates: &mut DeltaRateCalculator,
) -> SubscriberReport {
    let mut video_stats = Vec::new();
    let mut audio_stats = None;
    let mut jitter = -1.0;
    let mut available_outgoing_bitrate = 0;
    let mut current_round_trip_time_ms = 0.0;
    let mut timestamp = 0;
    let mut video_sample: Option<StreamSample> = None;
    let mut audio_sample = None;

    for record in records {
        match record {
            RawStatRecord::InboundRtp(r) => match r.kind {
                StatKind::Video => {
                    // Inbound direction: the received counter drives the rate
                    video_stats.push(media_entry(r, r.bytes_received, rates));
                    if let Some(j) = r.jitter {
                        jitter = j;
                    }
                    let sample = video_sample.get_or_insert(StreamSample {
                        timestamp: r.timestamp,
                        packets_lost: 0,
                        packets_received: 0,
                        bytes_received: 0,
                    });
                    sample.timestamp = sample.timestamp.max(r.timestamp);
                    sample.packets_lost += r.packets_lost;
                    sample.packets_received += r.packets_received;
                    sample.bytes_received += r.bytes_received;
                }
                StatKind::Audio => {
                    audio_stats = Some(media_entry(r, r.bytes_received, rates));
                    audio_sample = Some(StreamSample {
                        timestamp: r.timestamp,
                        packets_lost: r.packets_lost,
                        packets_received: r.packets_received,
                        bytes_received: r.bytes_received,
                    });
                }
                StatKind::None => {}
            },
            RawStatRecord::CandidatePair(p) if p.nominated => {
                available_outgoing_bitrate = p.available_outgoing_bitrate;
                current_round_trip_time_ms = p.current_round_trip_time * 1000.0;
                timestamp = p.timestamp as u64;
            }
            _ => {}
        }
    }

    SubscriberReport {
        quality: VideoQualityStats {
            video_stats,
            audio_stats,
            jitter,
            current_round_trip_time_ms,
            available_outgoing_bitrate,
            timestamp,
        },
        video_sample,
        audio_sample,
    }
}
