//! Session event types
//!
//! Two event streams cross the session boundary: transport events flowing in
//! from the stats source, and quality test events flowing out to the
//! consumer.

use crate::error::Error;
use crate::quality::{QualityStats, QualityTestResult};

/// Events emitted by a running quality test session
#[derive(Debug, Clone)]
pub enum QualityTestEvent {
    /// Periodic combined quality snapshot
    Update(QualityStats),
    /// Final resolution recommendation, emitted once at the deadline
    Result(QualityTestResult),
    /// Transport or polling error surfaced to the consumer; the session
    /// keeps running and the next tick retries
    Error(Error),
}

/// Transport lifecycle events reported by the stats source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The publisher side is connected; publisher polling may begin
    Connected,
    /// The loopback subscriber is receiving; subscriber polling and quality
    /// emission may begin
    SubscriberConnected,
    /// The transport dropped; the session stops without a result
    Disconnected,
    /// Transport-level error with a human-readable description
    Error(String),
}
