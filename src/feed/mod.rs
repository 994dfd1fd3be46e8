//! Synthetic Telemetry Feed
//!
//! Stands in for the renderer: a simulated frame loop running at the frame
//! cap moves a [`CameraRig`] along an orbit and times every frame with a
//! [`FrameTimer`]. Camera readouts and the averaged frame rate are
//! published through the [`ConnectionHub`] on their own cadences.

mod camera;
mod frame_timer;

pub use camera::CameraRig;
pub use frame_timer::{FrameTimer, DEFAULT_FRAME_CAP, FRAME_WINDOW};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

use crate::config::FeedConfig;
use crate::server::ConnectionHub;
use crate::telemetry::{TelemetryKind, TelemetryMessage};

/// Run the feed until `shutdown` resolves
pub async fn run_feed<F>(hub: Arc<ConnectionHub>, config: FeedConfig, shutdown: F)
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let mut camera = CameraRig::default();
    let mut timer = FrameTimer::new();

    let mut camera_ticker =
        tokio::time::interval(Duration::from_millis(config.camera_interval_ms.max(1)));
    camera_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut fps_ticker =
        tokio::time::interval(Duration::from_millis(config.fps_interval_ms.max(1)));
    fps_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut frame_start = Instant::now();
    let frame = tokio::time::sleep(FrameTimer::frame_budget(Duration::ZERO, config.frame_cap));
    tokio::pin!(frame);

    tracing::info!(
        frame_cap = config.frame_cap,
        camera_interval_ms = config.camera_interval_ms,
        fps_interval_ms = config.fps_interval_ms,
        "Telemetry feed started"
    );

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = &mut frame => {
                let now = Instant::now();
                let length = now - frame_start;
                frame_start = now;

                timer.record(length);
                camera.advance(length.as_secs_f64());

                let budget = FrameTimer::frame_budget(now.elapsed(), config.frame_cap);
                frame.as_mut().reset(now + budget);
            }
            _ = camera_ticker.tick() => {
                for message in camera.telemetry() {
                    hub.broadcast(&message).await;
                }
            }
            _ = fps_ticker.tick() => {
                // Nothing is published until the frame window has filled
                if let Some(fps) = timer.average_fps() {
                    hub.broadcast(&TelemetryMessage::number(TelemetryKind::TimerFps, fps)).await;
                }
            }
        }
    }

    tracing::info!(frames = timer.frames(), "Telemetry feed stopped");
}
