use std::time::Duration;

use image::DynamicImage;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::kernel::event::{Event, InputEvent};
use crate::kernel::time::SessionTimer;

/// Supplies the current video frame. Returning None means no frame was
/// available this tick; the poll is skipped, not failed.
pub trait FrameSource: Send {
    fn capture(&mut self) -> Option<DynamicImage>;
}

/// The face-detection capability. Opaque to the session: only the count of
/// detected faces crosses this seam.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &DynamicImage) -> anyhow::Result<usize>;
}

/// Polls the detector at a fixed interval and reports observations to the
/// kernel. Runs on a dedicated OS thread so image work never stalls the
/// async runtime; the token stops it when the session ends.
pub struct PresencePipeline {
    tx: mpsc::Sender<Event>,
    timer: SessionTimer,
    source: Box<dyn FrameSource>,
    detector: Box<dyn FaceDetector>,
    poll_interval: Duration,
    shutdown: CancellationToken,
}

impl PresencePipeline {
    pub fn new(
        tx: mpsc::Sender<Event>,
        timer: SessionTimer,
        source: Box<dyn FrameSource>,
        detector: Box<dyn FaceDetector>,
        poll_interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            tx,
            timer,
            source,
            detector,
            poll_interval,
            shutdown,
        }
    }

    pub fn run(mut self) {
        info!(
            "presence pipeline started ({}ms poll)",
            self.poll_interval.as_millis()
        );

        while !self.shutdown.is_cancelled() {
            if let Some(frame) = self.source.capture() {
                match self.detector.detect(&frame) {
                    Ok(count) => {
                        let event =
                            Event::Input(InputEvent::presence(count, self.timer.now_ms()));
                        if self.tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        // Detector hiccups are recovered locally: skip the
                        // tick, keep the last known presence state.
                        warn!("face detection failed, skipping tick: {}", e);
                    }
                }
            }

            std::thread::sleep(self.poll_interval);
        }

        info!("presence pipeline stopped");
    }
}
