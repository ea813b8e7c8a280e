//! Raw WebRTC stat records
//!
//! This module models one polling cycle's array of heterogeneous stat records
//! as delivered by the transport layer. The schema is dictated by the WebRTC
//! statistics standard: records are discriminated by a `type` field and use
//! camelCase member names. Every field the pipeline reads is optional with a
//! defaulted value, so a sparse record never fails the whole snapshot.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;

/// Media kind tag carried by RTP stat records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKind {
    Video,
    Audio,
    /// Absent or unrecognized kind
    None,
}

impl Default for StatKind {
    fn default() -> Self {
        StatKind::None
    }
}

// Unrecognized kinds map to None instead of failing the snapshot
impl<'de> Deserialize<'de> for StatKind {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let kind = String::deserialize(deserializer)?;
        Ok(match kind.as_str() {
            "video" => StatKind::Video,
            "audio" => StatKind::Audio,
            _ => StatKind::None,
        })
    }
}

fn none_reason() -> String {
    "none".to_string()
}

/// Per-SSRC RTP stream record (`outbound-rtp` / `inbound-rtp`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtpStreamRecord {
    /// Synchronization source identifier
    #[serde(default)]
    pub ssrc: u64,
    #[serde(default)]
    pub kind: StatKind,
    /// Why the encoder is limiting quality ("none" when unconstrained)
    #[serde(default = "none_reason")]
    pub quality_limitation_reason: String,
    #[serde(default)]
    pub frame_width: u32,
    #[serde(default)]
    pub frame_height: u32,
    #[serde(default)]
    pub frames_per_second: u32,
    #[serde(default)]
    pub pli_count: u32,
    #[serde(default)]
    pub nack_count: u32,
    /// Cumulative bytes sent on this SSRC
    #[serde(default)]
    pub bytes_sent: u64,
    /// Cumulative bytes received on this SSRC
    #[serde(default)]
    pub bytes_received: u64,
    #[serde(default)]
    pub packets_lost: u64,
    #[serde(default)]
    pub packets_received: u64,
    /// Inter-arrival jitter in seconds, when reported
    #[serde(default)]
    pub jitter: Option<f64>,
    /// Source clock timestamp in milliseconds
    #[serde(default)]
    pub timestamp: f64,
}

impl Default for RtpStreamRecord {
    fn default() -> Self {
        Self {
            ssrc: 0,
            kind: StatKind::None,
            quality_limitation_reason: none_reason(),
            frame_width: 0,
            frame_height: 0,
            frames_per_second: 0,
            pli_count: 0,
            nack_count: 0,
            bytes_sent: 0,
            bytes_received: 0,
            packets_lost: 0,
            packets_received: 0,
            jitter: None,
            timestamp: 0.0,
        }
    }
}

/// ICE candidate-pair record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePairRecord {
    /// Whether this pair is the active ICE path
    #[serde(default)]
    pub nominated: bool,
    /// Estimated available outgoing bitrate in bits/sec
    #[serde(default)]
    pub available_outgoing_bitrate: u64,
    /// Current round-trip time in seconds
    #[serde(default)]
    pub current_round_trip_time: f64,
    #[serde(default)]
    pub timestamp: f64,
}

/// Remote-side inbound RTP record (`remote-inbound-rtp`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteInboundRecord {
    #[serde(default)]
    pub kind: StatKind,
    /// Remote-reported jitter in seconds, when available
    #[serde(default)]
    pub jitter: Option<f64>,
}

/// One loosely-typed stat record from a polling cycle
///
/// Record types the pipeline does not consume deserialize as `Unknown` and
/// are skipped during parsing instead of failing the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RawStatRecord {
    #[serde(rename = "outbound-rtp")]
    OutboundRtp(RtpStreamRecord),
    #[serde(rename = "inbound-rtp")]
    InboundRtp(RtpStreamRecord),
    #[serde(rename = "candidate-pair")]
    CandidatePair(CandidatePairRecord),
    #[serde(rename = "remote-inbound-rtp")]
    RemoteInboundRtp(RemoteInboundRecord),
    #[serde(other)]
    Unknown,
}

/// Decode a JSON array of stat records
///
/// A structurally invalid snapshot is a parse failure; the caller logs it and
/// skips the cycle.
pub fn decode_report(json: &str) -> Result<Vec<RawStatRecord>> {
    Ok(serde_json::from_str(json)?)
}
