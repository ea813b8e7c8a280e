//! Quality test demo
//!
//! Runs a full quality test session against the simulated stats source and
//! prints each combined snapshot followed by the final recommendation.

use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rtc_quality_core::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "quality_demo", about = "Run a simulated call quality test")]
struct Args {
    /// Test duration in seconds
    #[arg(long, default_value_t = 10)]
    duration: u64,

    /// Seed for the simulated stats source
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Print snapshots as JSON instead of a summary line
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let (transport_tx, transport_rx) = mpsc::channel(8);
    transport_tx
        .send(TransportEvent::Connected)
        .await
        .map_err(|_| Error::ChannelClosed)?;
    transport_tx
        .send(TransportEvent::SubscriberConnected)
        .await
        .map_err(|_| Error::ChannelClosed)?;

    let config = QualityTestConfig::with_duration(Duration::from_secs(args.duration));
    let source = SimulatedStatsSource::new(args.seed, 500.0);
    let mut session = QualityTestSession::start(source, transport_rx, config);

    info!(duration_secs = args.duration, "running simulated quality test");

    while let Some(event) = session.next_event().await {
        match event {
            QualityTestEvent::Update(stats) => {
                if args.json {
                    println!("{}", serde_json::to_string(&stats).map_err(Error::from)?);
                } else {
                    println!(
                        "t={}ms video {} kbps / audio {} kbps, loss v={:.3} a={:.3}, rtt {:.1} ms, bw {} bps",
                        stats.timestamp,
                        stats.sent_video_bitrate_kbps,
                        stats.sent_audio_bitrate_kbps,
                        stats.video_packet_lost_ratio,
                        stats.audio_packet_lost_ratio,
                        stats.current_round_trip_time_ms,
                        stats.available_outgoing_bitrate,
                    );
                }
            }
            QualityTestEvent::Result(result) => {
                println!("recommended setting: {}", result.recommended_setting);
                return Ok(());
            }
            QualityTestEvent::Error(e) => return Err(e),
        }
    }

    Err(Error::ChannelClosed)
}
