use tracing::{info, warn};
use uuid::Uuid;

/// One captured candidate answer: every block heard between a start-capture
/// and stop-capture command. Ownership transfers to the orchestrator when
/// the recorder emits it.
#[derive(Debug, Clone)]
pub struct Utterance {
    pub id: Uuid,
    pub frames: Vec<f32>,
    pub sample_rate: u32,
    pub started_at_ms: u64,
    pub ended_at_ms: u64,
}

impl Utterance {
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        (self.frames.len() as u64 * 1000) / self.sample_rate as u64
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

struct ActiveCapture {
    id: Uuid,
    frames: Vec<f32>,
    started_at_ms: u64,
}

/// Buffers audio blocks into at most one utterance at a time. Capture never
/// touches the network; blocks are appended locally and the finished
/// utterance is handed off whole.
pub struct UtteranceRecorder {
    sample_rate: u32,
    active: Option<ActiveCapture>,
}

impl UtteranceRecorder {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            active: None,
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.active.is_some()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Begin accumulating a fresh utterance. Starting while a capture is
    /// already open is a caller bug; it is logged and ignored rather than
    /// silently merging two answers.
    pub fn start(&mut self, at_ms: u64) -> bool {
        if self.active.is_some() {
            warn!("recorder: start ignored, capture already in progress");
            return false;
        }
        self.active = Some(ActiveCapture {
            id: Uuid::new_v4(),
            frames: Vec::new(),
            started_at_ms: at_ms,
        });
        true
    }

    pub fn push(&mut self, samples: &[f32]) {
        if let Some(capture) = self.active.as_mut() {
            capture.frames.extend_from_slice(samples);
        }
    }

    /// Finalize the open capture and emit it. An instantaneous start/stop
    /// still yields a well-formed empty utterance so downstream handling
    /// stays uniform. Returns None only when nothing was being captured.
    pub fn stop(&mut self, at_ms: u64) -> Option<Utterance> {
        let capture = self.active.take()?;
        let utterance = Utterance {
            id: capture.id,
            frames: capture.frames,
            sample_rate: self.sample_rate,
            started_at_ms: capture.started_at_ms,
            ended_at_ms: at_ms,
        };
        info!(
            "recorder: utterance {} finalized ({}ms)",
            utterance.id,
            utterance.duration_ms()
        );
        Some(utterance)
    }

    /// Drop an open capture without emitting it. Used at teardown.
    pub fn discard(&mut self) {
        if let Some(capture) = self.active.take() {
            info!("recorder: discarding in-flight capture {}", capture.id);
        }
    }
}
