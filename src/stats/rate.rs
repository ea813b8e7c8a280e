//! Delta-rate calculation
//!
//! Derives instantaneous bitrate from successive cumulative byte counters,
//! tracked per SSRC across polling cycles.

use std::collections::HashMap;

/// Stateful per-SSRC byte-counter tracker
///
/// Holds the last observed (cumulative bytes, timestamp) pair for every SSRC.
/// State persists across polling cycles and is only cleared at session
/// teardown.
#[derive(Debug, Default)]
pub struct DeltaRateCalculator {
    last_seen: HashMap<u64, (u64, u64)>,
}

impl DeltaRateCalculator {
    /// Create a new calculator with no prior observations
    pub fn new() -> Self {
        Self {
            last_seen: HashMap::new(),
        }
    }

    /// Compute the instantaneous bitrate in kbps for one observation
    ///
    /// The first observation for an SSRC records the sample and returns 0 (no
    /// rate is derivable from a single point). Subsequent observations return
    /// `8 * delta_bytes / (elapsed_ms / 1000) / 1000`. Zero elapsed time
    /// returns 0. The stored sample is overwritten unconditionally, so a
    /// counter reset from a stream restart yields one negative sample and the
    /// tracker re-baselines on the same observation.
    pub fn rate(&mut self, ssrc: u64, timestamp_ms: u64, cumulative_bytes: u64) -> i64 {
        let bitrate_kbps = match self.last_seen.get(&ssrc) {
            Some(&(prev_bytes, prev_ts)) => {
                let elapsed_ms = timestamp_ms.saturating_sub(prev_ts);
                if elapsed_ms == 0 {
                    0
                } else {
                    let delta_bytes = cumulative_bytes as i64 - prev_bytes as i64;
                    let bits = delta_bytes as f64 * 8.0;
                    (bits / (elapsed_ms as f64 / 1000.0) / 1000.0) as i64
                }
            }
            None => 0,
        };
        self.last_seen.insert(ssrc, (cumulative_bytes, timestamp_ms));
        bitrate_kbps
    }

    /// Number of SSRCs currently tracked
    pub fn tracked_ssrcs(&self) -> usize {
        self.last_seen.len()
    }

    /// Drop all per-SSRC state
    pub fn clear(&mut self) {
        self.last_seen.clear();
    }
}
