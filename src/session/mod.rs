//! Quality test session orchestration
//!
//! A session owns the whole stats pipeline on a single spawned task: it polls
//! the publisher and subscriber sides on their own cadences, feeds windowed
//! aggregation and the resolution recommender, emits periodic combined
//! snapshots, and produces the final recommendation when the test deadline
//! fires. All pipeline state lives on that one task; the consumer only sees
//! the event channel.

pub mod events;
pub mod source;

pub use events::{QualityTestEvent, TransportEvent};
pub use source::{SimulatedStatsSource, StatsSource};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::QualityTestConfig;
use crate::error::{Error, Result};
use crate::quality::{combine, QualityTestResult, ResolutionRecommender};
use crate::stats::{
    decode_report, parse_publisher_report, parse_subscriber_report, DeltaRateCalculator,
    SubscriberAudioStats, SubscriberVideoStats, VideoQualityStats, WindowedAggregator,
};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A running quality test
///
/// Dropping the session does not stop the pipeline task; use [`abort`] or let
/// the deadline finish it.
///
/// [`abort`]: QualityTestSession::abort
pub struct QualityTestSession {
    events: mpsc::Receiver<QualityTestEvent>,
    handle: JoinHandle<()>,
}

impl QualityTestSession {
    /// Start a test session over the given source and transport event stream
    pub fn start<S>(
        source: S,
        transport: mpsc::Receiver<TransportEvent>,
        config: QualityTestConfig,
    ) -> Self
    where
        S: StatsSource + 'static,
    {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let handle = tokio::spawn(run(source, transport, event_tx, config));
        Self {
            events: event_rx,
            handle,
        }
    }

    /// Next session event, or `None` once the pipeline task has finished
    pub async fn next_event(&mut self) -> Option<QualityTestEvent> {
        self.events.recv().await
    }

    /// Drain events until the final recommendation
    ///
    /// Intermediate updates are discarded and error events do not cut the
    /// wait short, since the pipeline keeps polling through them. Only a
    /// pipeline ending without a result becomes an `Err`: the last surfaced
    /// error, or `ChannelClosed` when there was none.
    pub async fn wait_result(mut self) -> Result<QualityTestResult> {
        let mut last_error = None;
        while let Some(event) = self.events.recv().await {
            match event {
                QualityTestEvent::Result(result) => return Ok(result),
                QualityTestEvent::Error(e) => last_error = Some(e),
                QualityTestEvent::Update(_) => {}
            }
        }
        Err(last_error.unwrap_or(Error::ChannelClosed))
    }

    /// Stop the pipeline task immediately, without a final result
    pub fn abort(&self) {
        self.handle.abort();
    }
}

/// Per-session pipeline state, owned entirely by the spawned task
struct Pipeline {
    publisher_rates: DeltaRateCalculator,
    subscriber_rates: DeltaRateCalculator,
    video_window: WindowedAggregator,
    audio_window: WindowedAggregator,
    publisher_quality: Vec<VideoQualityStats>,
    subscriber_quality: Vec<VideoQualityStats>,
    subscriber_video: Vec<SubscriberVideoStats>,
    subscriber_audio: Vec<SubscriberAudioStats>,
    recommender: ResolutionRecommender,
}

impl Pipeline {
    fn new(config: &QualityTestConfig) -> Self {
        Self {
            publisher_rates: DeltaRateCalculator::new(),
            subscriber_rates: DeltaRateCalculator::new(),
            video_window: WindowedAggregator::new(config.aggregation_window),
            audio_window: WindowedAggregator::new(config.aggregation_window),
            publisher_quality: Vec::new(),
            subscriber_quality: Vec::new(),
            subscriber_video: Vec::new(),
            subscriber_audio: Vec::new(),
            recommender: ResolutionRecommender::new(config.thresholds.clone()),
        }
    }

    fn ingest_publisher(&mut self, json: &str) -> Result<()> {
        let records = decode_report(json)?;
        let stats = parse_publisher_report(&records, &mut self.publisher_rates);
        self.recommender.push(stats.available_outgoing_bitrate);
        debug!(
            video_kbps = stats.total_video_bitrate_kbps(),
            bandwidth = stats.available_outgoing_bitrate,
            "publisher cycle"
        );
        self.publisher_quality.push(stats);
        Ok(())
    }

    fn ingest_subscriber(&mut self, json: &str) -> Result<()> {
        let records = decode_report(json)?;
        let report = parse_subscriber_report(&records, &mut self.subscriber_rates);
        self.subscriber_quality.push(report.quality);
        if let Some(sample) = report.video_sample {
            if let Some(aggregate) = self.video_window.offer(sample) {
                self.subscriber_video.push(aggregate.into());
            }
        }
        if let Some(sample) = report.audio_sample {
            if let Some(aggregate) = self.audio_window.offer(sample) {
                self.subscriber_audio.push(aggregate.into());
            }
        }
        Ok(())
    }
}

async fn run<S: StatsSource>(
    mut source: S,
    mut transport: mpsc::Receiver<TransportEvent>,
    events: mpsc::Sender<QualityTestEvent>,
    config: QualityTestConfig,
) {
    let mut pipeline = Pipeline::new(&config);
    let mut publisher_active = false;
    let mut subscriber_active = false;
    let mut transport_open = true;

    let mut publisher_tick = tokio::time::interval(config.publisher_poll_interval);
    let mut subscriber_tick = tokio::time::interval(config.subscriber_poll_interval);
    let mut quality_tick = tokio::time::interval(config.quality_emit_interval);
    publisher_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    subscriber_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    quality_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let deadline = tokio::time::sleep(config.test_duration);
    tokio::pin!(deadline);

    info!(duration = ?config.test_duration, "quality test started");

    loop {
        tokio::select! {
            _ = &mut deadline => {
                let result = pipeline.recommender.recommend();
                info!(setting = %result.recommended_setting, "quality test finished");
                let _ = events.send(QualityTestEvent::Result(result)).await;
                return;
            }

            event = transport.recv(), if transport_open => match event {
                Some(TransportEvent::Connected) => {
                    debug!("publisher connected");
                    publisher_active = true;
                }
                Some(TransportEvent::SubscriberConnected) => {
                    debug!("subscriber connected");
                    subscriber_active = true;
                }
                Some(TransportEvent::Disconnected) => {
                    warn!("transport disconnected before deadline");
                    let _ = events
                        .send(QualityTestEvent::Error(Error::Transport(
                            "disconnected before test completed".to_string(),
                        )))
                        .await;
                    return;
                }
                Some(TransportEvent::Error(msg)) => {
                    // Surfaced to the consumer; the next tick retries
                    warn!(error = %msg, "transport error");
                    let _ = events
                        .send(QualityTestEvent::Error(Error::Transport(msg)))
                        .await;
                }
                None => transport_open = false,
            },

            _ = publisher_tick.tick(), if publisher_active => {
                match source.publisher_snapshot().await {
                    Ok(json) => {
                        // A malformed snapshot skips the cycle only
                        if let Err(e) = pipeline.ingest_publisher(&json) {
                            warn!(error = %e, "skipping publisher cycle");
                        }
                    }
                    Err(e) => {
                        // A failed poll costs this cycle, not the session
                        warn!(error = %e, "publisher poll failed");
                        let _ = events.send(QualityTestEvent::Error(e)).await;
                    }
                }
            }

            _ = subscriber_tick.tick(), if subscriber_active => {
                match source.subscriber_snapshot().await {
                    Ok(json) => {
                        if let Err(e) = pipeline.ingest_subscriber(&json) {
                            warn!(error = %e, "skipping subscriber cycle");
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "subscriber poll failed");
                        let _ = events.send(QualityTestEvent::Error(e)).await;
                    }
                }
            }

            _ = quality_tick.tick(), if subscriber_active => {
                let snapshot = combine(
                    &pipeline.publisher_quality,
                    &pipeline.subscriber_quality,
                    &pipeline.subscriber_video,
                    &pipeline.subscriber_audio,
                );
                match snapshot {
                    Some(stats) => {
                        if events.send(QualityTestEvent::Update(stats)).await.is_err() {
                            debug!("event consumer dropped, stopping session");
                            return;
                        }
                    }
                    None => debug!("quality snapshot not ready yet"),
                }
            }
        }
    }
}
