//! Resolution recommendation
//!
//! Maintains a bounded rolling history of available-outgoing-bitrate samples
//! and maps its running mean through an ordered threshold table to a
//! recommended capture resolution/frame-rate tier.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Recommendation reported when the estimated bandwidth is below every tier
pub const BITRATE_TOO_LOW: &str = "Bitrate is too low for video";

/// Number of bitrate samples kept in the rolling window
const BITRATE_SAMPLE_WINDOW: usize = 5;

/// One resolution tier and its bitrate requirements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityThreshold {
    /// Minimum bitrate to stay on this tier, in bits/sec. This is the target
    /// bitrate the recommender compares against.
    pub min_bitrate_to_maintain: u64,
    /// Minimum bitrate to switch up into this tier, in bits/sec
    pub min_bitrate_to_switch_up: u64,
    /// Human-readable tier label, e.g. "1280x720 @ 30FPS"
    pub recommended_setting: String,
}

impl QualityThreshold {
    /// Create a threshold entry
    pub fn new(min_bitrate_to_maintain: u64, min_bitrate_to_switch_up: u64, recommended_setting: &str) -> Self {
        Self {
            min_bitrate_to_maintain,
            min_bitrate_to_switch_up,
            recommended_setting: recommended_setting.to_string(),
        }
    }

    /// The bitrate the recommender compares the running mean against
    pub fn target_bitrate(&self) -> u64 {
        self.min_bitrate_to_maintain
    }

    /// Built-in tier table, highest quality first
    pub fn default_table() -> Vec<QualityThreshold> {
        vec![
            QualityThreshold::new(4_000_000, 5_550_000, "1920x1080 @ 30FPS"),
            QualityThreshold::new(2_500_000, 3_150_000, "1280x720 @ 30FPS"),
            QualityThreshold::new(1_200_000, 1_550_000, "960x540 @ 30FPS"),
            QualityThreshold::new(500_000, 650_000, "640x360 @ 30FPS"),
            QualityThreshold::new(300_000, 350_000, "480x270 @ 30FPS"),
            QualityThreshold::new(150_000, 150_000, "320x180 @ 30FPS"),
        ]
    }
}

/// Final outcome of a quality test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityTestResult {
    /// Recommended capture setting label
    pub recommended_setting: String,
}

impl QualityTestResult {
    pub fn new(recommended_setting: &str) -> Self {
        Self {
            recommended_setting: recommended_setting.to_string(),
        }
    }
}

/// Bandwidth-based resolution recommender
///
/// Keeps the 5 most recent available-outgoing-bitrate samples (FIFO eviction)
/// and recommends the highest tier whose target bitrate the running mean
/// reaches.
#[derive(Debug)]
pub struct ResolutionRecommender {
    samples: VecDeque<u64>,
    thresholds: Vec<QualityThreshold>,
}

impl ResolutionRecommender {
    /// Create a recommender with an explicit threshold table (highest quality
    /// first)
    pub fn new(thresholds: Vec<QualityThreshold>) -> Self {
        Self {
            samples: VecDeque::with_capacity(BITRATE_SAMPLE_WINDOW),
            thresholds,
        }
    }

    /// Record one available-outgoing-bitrate sample in bits/sec
    ///
    /// The 6th insertion evicts the oldest sample.
    pub fn push(&mut self, available_outgoing_bitrate: u64) {
        if self.samples.len() == BITRATE_SAMPLE_WINDOW {
            self.samples.pop_front();
        }
        self.samples.push_back(available_outgoing_bitrate);
    }

    /// Number of samples currently held (at most 5)
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Running mean over the current window contents
    ///
    /// Computed incrementally (`mean += (x - mean) / i`) to preserve the
    /// accumulation order of the reference implementation.
    pub fn estimated_bitrate(&self) -> f64 {
        let mut mean = 0.0;
        for (i, &sample) in self.samples.iter().enumerate() {
            mean += (sample as f64 - mean) / (i + 1) as f64;
        }
        mean
    }

    /// Produce the recommendation for the current window
    pub fn recommend(&self) -> QualityTestResult {
        let estimate = self.estimated_bitrate();
        debug!("Estimated available outgoing bitrate: {:.0}", estimate);

        for threshold in &self.thresholds {
            if estimate >= threshold.target_bitrate() as f64 {
                debug!("Recommended setting: {}", threshold.recommended_setting);
                return QualityTestResult::new(&threshold.recommended_setting);
            }
        }
        debug!("{}", BITRATE_TOO_LOW);
        QualityTestResult::new(BITRATE_TOO_LOW)
    }
}

impl Default for ResolutionRecommender {
    fn default() -> Self {
        Self::new(QualityThreshold::default_table())
    }
}
