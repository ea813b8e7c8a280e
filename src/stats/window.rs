//! Windowed aggregation
//!
//! Gates successive cumulative subscriber-side samples on a minimum time
//! window and reduces each accepted pair into packet-loss ratio and received
//! bitrate. One aggregator instance exists per stream kind (video, audio).

use std::time::Duration;

use crate::stats::types::{StreamSample, SubscriberAudioStats, SubscriberVideoStats};

/// Result of one accepted aggregation window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowedAggregate {
    pub bitrate_kbps: i64,
    pub bytes_received: u64,
    pub timestamp: f64,
    pub packet_lost_ratio: f64,
}

impl From<WindowedAggregate> for SubscriberVideoStats {
    fn from(w: WindowedAggregate) -> Self {
        Self {
            bitrate_kbps: w.bitrate_kbps,
            bytes_received: w.bytes_received,
            timestamp: w.timestamp,
            packet_lost_ratio: w.packet_lost_ratio,
        }
    }
}

impl From<WindowedAggregate> for SubscriberAudioStats {
    fn from(w: WindowedAggregate) -> Self {
        Self {
            bitrate_kbps: w.bitrate_kbps,
            bytes_received: w.bytes_received,
            timestamp: w.timestamp,
            packet_lost_ratio: w.packet_lost_ratio,
        }
    }
}

/// Minimum-window aggregator over cumulative stream samples
///
/// Holds at most one previous sample as the delta reference. A new sample
/// closer than the window to the reference is discarded without advancing the
/// reference, so emissions are never closer together than the window. The
/// cadence is approximately one aggregate per window but can lag when samples
/// arrive irregularly.
#[derive(Debug)]
pub struct WindowedAggregator {
    window_ms: f64,
    previous: Option<StreamSample>,
}

impl WindowedAggregator {
    /// Create an aggregator with the given minimum window
    pub fn new(window: Duration) -> Self {
        Self {
            window_ms: window.as_millis() as f64,
            previous: None,
        }
    }

    /// Offer a new cumulative sample
    ///
    /// Returns an aggregate only when the window since the reference sample
    /// has elapsed. The first sample only establishes the reference.
    pub fn offer(&mut self, sample: StreamSample) -> Option<WindowedAggregate> {
        let previous = match self.previous {
            Some(prev) => prev,
            None => {
                self.previous = Some(sample);
                return None;
            }
        };

        let elapsed_ms = sample.timestamp - previous.timestamp;
        if elapsed_ms < self.window_ms {
            return None;
        }

        let lost_interval = sample.packets_lost as i64 - previous.packets_lost as i64;
        let received_interval = sample.packets_received as i64 - previous.packets_received as i64;
        let total_interval = lost_interval + received_interval;
        let packet_lost_ratio = if total_interval > 0 {
            lost_interval as f64 / total_interval as f64
        } else {
            0.0
        };

        let bytes_delta = sample.bytes_received as i64 - previous.bytes_received as i64;
        let bitrate_kbps = (bytes_delta as f64 * 8.0 / (elapsed_ms / 1000.0) / 1000.0) as i64;

        self.previous = Some(sample);

        Some(WindowedAggregate {
            bitrate_kbps,
            bytes_received: sample.bytes_received,
            timestamp: sample.timestamp,
            packet_lost_ratio,
        })
    }

    /// Drop the reference sample
    pub fn reset(&mut self) {
        self.previous = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ts: f64, lost: u64, received: u64, bytes: u64) -> StreamSample {
        StreamSample {
            timestamp: ts,
            packets_lost: lost,
            packets_received: received,
            bytes_received: bytes,
        }
    }

    #[test]
    fn test_first_sample_emits_nothing() {
        let mut agg = WindowedAggregator::new(Duration::from_millis(1000));
        assert!(agg.offer(sample(0.0, 0, 0, 0)).is_none());
    }

    #[test]
    fn test_inside_window_discarded_without_advancing() {
        let mut agg = WindowedAggregator::new(Duration::from_millis(1000));
        agg.offer(sample(0.0, 0, 0, 0));
        // 500 ms later: inside the window, discarded
        assert!(agg.offer(sample(500.0, 0, 50, 5_000)).is_none());
        // 1000 ms after the ORIGINAL reference: accepted
        let agg_out = agg.offer(sample(1000.0, 0, 100, 125_000)).unwrap();
        assert_eq!(agg_out.bitrate_kbps, 1000);
    }

    #[test]
    fn test_emissions_never_closer_than_window() {
        let mut agg = WindowedAggregator::new(Duration::from_millis(1000));
        let mut last_emitted_ts: Option<f64> = None;
        for i in 0..40u64 {
            let ts = i as f64 * 300.0; // samples every 300 ms
            if let Some(out) = agg.offer(sample(ts, i, i * 10, i * 1000)) {
                if let Some(prev) = last_emitted_ts {
                    assert!(out.timestamp - prev >= 1000.0);
                }
                last_emitted_ts = Some(out.timestamp);
            }
        }
        assert!(last_emitted_ts.is_some());
    }

    #[test]
    fn test_packet_loss_ratio_bounds() {
        let mut agg = WindowedAggregator::new(Duration::from_millis(1000));
        agg.offer(sample(0.0, 0, 0, 0));
        let out = agg.offer(sample(1000.0, 25, 75, 10_000)).unwrap();
        assert!((out.packet_lost_ratio - 0.25).abs() < 1e-12);
        assert!((0.0..=1.0).contains(&out.packet_lost_ratio));
    }

    #[test]
    fn test_zero_denominator_ratio_is_zero() {
        let mut agg = WindowedAggregator::new(Duration::from_millis(1000));
        agg.offer(sample(0.0, 10, 100, 0));
        // No packets in the interval
        let out = agg.offer(sample(1500.0, 10, 100, 0)).unwrap();
        assert_eq!(out.packet_lost_ratio, 0.0);
        assert_eq!(out.bitrate_kbps, 0);
    }

    #[test]
    fn test_bitrate_formula() {
        let mut agg = WindowedAggregator::new(Duration::from_millis(1000));
        agg.offer(sample(0.0, 0, 0, 100_000));
        // 250_000 bytes over 2 seconds = 1_000_000 bits/sec = 1000 kbps
        let out = agg.offer(sample(2000.0, 0, 10, 350_000)).unwrap();
        assert_eq!(out.bitrate_kbps, 1000);
        assert_eq!(out.bytes_received, 350_000);
    }
}
