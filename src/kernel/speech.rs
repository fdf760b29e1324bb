use crate::kernel::event::SynthSignal;
use tracing::debug;

/// Tracks which synthesized utterance, if any, is currently audible.
///
/// `speak` cancels any in-flight playback, so started/finished signals from
/// the canceled child can still be in the queue when the new one begins.
/// Signals are matched by generation: a stale `Started` never re-raises the
/// gate and a stale `Finished` never clears it while a newer utterance is
/// playing. The kernel consults only the resulting boolean.
#[derive(Debug, Default)]
pub struct SpeechGate {
    generation: u64,
    active: Option<u64>,
}

impl SpeechGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new playback request. The most recent call wins; the
    /// returned generation tags the driver's lifecycle events.
    pub fn begin_utterance(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Apply a lifecycle signal. Returns false for stale signals.
    pub fn apply(&mut self, signal: SynthSignal) -> bool {
        match signal {
            SynthSignal::Started { generation } => {
                if generation == self.generation {
                    self.active = Some(generation);
                    true
                } else {
                    debug!("speech: stale started (gen {})", generation);
                    false
                }
            }
            SynthSignal::Finished { generation } => {
                if self.active == Some(generation) {
                    self.active = None;
                    true
                } else {
                    debug!("speech: stale finished (gen {})", generation);
                    false
                }
            }
        }
    }

    pub fn is_speaking(&self) -> bool {
        self.active.is_some()
    }
}
