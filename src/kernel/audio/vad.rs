use tracing::{debug, info, warn};

/// Turn-taking states. Exactly one instance exists per session, owned by
/// the reactor; nothing else mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VadState {
    /// Startup only. Left automatically once the session is armed.
    Idle,
    Listening,
    Speaking,
    /// Answer submitted, waiting on the remote round-trip.
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VadCommand {
    StartCapture,
    StopCapture,
}

#[derive(Debug, Clone)]
pub struct VadConfig {
    /// RMS energy above this counts as speech, on a [-1, 1] signal.
    pub energy_threshold: f32,
    /// Continuous sub-threshold time that ends an utterance.
    pub silence_window_ms: u64,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            energy_threshold: 0.02,
            silence_window_ms: 2000,
        }
    }
}

/// Energy-threshold voice activity machine.
///
/// While the interviewer's own synthesized voice is playing, every loudness
/// sample is discarded regardless of magnitude, so the microphone picking up
/// the speaker cannot read as the candidate talking. The gate is a plain
/// boolean checked per sample, not an ordering assumption on event delivery.
pub struct TurnDetector {
    config: VadConfig,
    state: VadState,
    /// When continuous silence began during Speaking. None while speech is
    /// being heard or outside Speaking.
    silence_since: Option<u64>,
    agent_speaking: bool,
}

impl TurnDetector {
    pub fn new(config: VadConfig) -> Self {
        Self {
            config,
            state: VadState::Idle,
            silence_since: None,
            agent_speaking: false,
        }
    }

    pub fn state(&self) -> VadState {
        self.state
    }

    pub fn agent_speaking(&self) -> bool {
        self.agent_speaking
    }

    pub fn set_agent_speaking(&mut self, speaking: bool) {
        if self.agent_speaking != speaking {
            debug!("vad: agent_speaking={}", speaking);
        }
        self.agent_speaking = speaking;
    }

    /// Idle -> Listening once initialization completes.
    pub fn arm(&mut self) {
        if self.state == VadState::Idle {
            info!("vad: armed, listening");
            self.state = VadState::Listening;
        }
    }

    /// One loudness sample. Returns a capture command on a state edge.
    pub fn on_loudness(&mut self, rms: f32, now_ms: u64) -> Option<VadCommand> {
        if self.state == VadState::Processing {
            return None;
        }
        if self.agent_speaking {
            return None;
        }

        if rms > self.config.energy_threshold {
            self.silence_since = None;
            match self.state {
                VadState::Listening => {
                    info!("vad: speech detected, capture starting");
                    self.state = VadState::Speaking;
                    Some(VadCommand::StartCapture)
                }
                VadState::Speaking => None,
                // Loud samples before arming are discarded; Processing
                // returned above.
                _ => None,
            }
        } else {
            if self.state != VadState::Speaking {
                return None;
            }
            match self.silence_since {
                None => {
                    self.silence_since = Some(now_ms);
                    None
                }
                Some(t0) if now_ms.saturating_sub(t0) >= self.config.silence_window_ms => {
                    info!(
                        "vad: {}ms of silence, capture stopping",
                        now_ms.saturating_sub(t0)
                    );
                    self.silence_since = None;
                    self.state = VadState::Processing;
                    Some(VadCommand::StopCapture)
                }
                Some(_) => None,
            }
        }
    }

    /// Processing -> Listening after the remote round-trip completes.
    /// Also the Idle -> Listening path used when the first prompt arrives.
    pub fn resume_listening(&mut self) {
        match self.state {
            VadState::Processing | VadState::Idle => {
                self.silence_since = None;
                self.state = VadState::Listening;
            }
            other => {
                warn!("vad: resume_listening ignored in {:?}", other);
            }
        }
    }

    /// Session teardown. Whatever the machine was doing, it stops reacting.
    pub fn halt(&mut self) {
        self.silence_since = None;
        self.state = VadState::Idle;
    }
}
