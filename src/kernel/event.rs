use crate::services::interview::types::Prompt;

/// Everything the kernel reacts to arrives as one of these on the session
/// channel. Producers never touch kernel state directly.
#[derive(Debug, Clone)]
pub enum Event {
    /// External signals (audio blocks, synthesis lifecycle, presence, timers).
    Input(InputEvent),
    /// Result of an answer round-trip with the interview service.
    Answer(AnswerSignal),
}

#[derive(Debug, Clone)]
pub struct InputEvent {
    pub source: String,
    pub content: InputContent,
}

#[derive(Debug, Clone)]
pub enum InputContent {
    Audio(AudioBlock),
    Synth(SynthSignal),
    Presence(PresenceSignal),
    Clock(ClockSignal),
    /// User asked to end the session early.
    EndRequested,
}

/// One fixed-size chunk of microphone samples, normalized to [-1, 1].
/// Ephemeral: consumed by the kernel on the tick it arrives.
#[derive(Debug, Clone)]
pub struct AudioBlock {
    pub samples: Vec<f32>,
    pub at_ms: u64,
}

/// Lifecycle of one synthesized interviewer utterance. The generation ties
/// the signal to the `speak` call that produced it, so signals from a
/// canceled playback can be recognized as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthSignal {
    Started { generation: u64 },
    Finished { generation: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceSignal {
    FacesDetected { count: usize, at_ms: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSignal {
    SecondElapsed,
}

#[derive(Debug, Clone)]
pub enum AnswerSignal {
    NextPrompt(Prompt),
    /// Server signaled end-of-interview (no further questions).
    InterviewFinished,
    SubmissionFailed(String),
}

impl InputEvent {
    pub fn audio(samples: Vec<f32>, at_ms: u64) -> Self {
        Self {
            source: "audio".to_string(),
            content: InputContent::Audio(AudioBlock { samples, at_ms }),
        }
    }

    pub fn synth(signal: SynthSignal) -> Self {
        Self {
            source: "synth".to_string(),
            content: InputContent::Synth(signal),
        }
    }

    pub fn presence(count: usize, at_ms: u64) -> Self {
        Self {
            source: "vision".to_string(),
            content: InputContent::Presence(PresenceSignal::FacesDetected { count, at_ms }),
        }
    }

    pub fn clock_second() -> Self {
        Self {
            source: "clock".to_string(),
            content: InputContent::Clock(ClockSignal::SecondElapsed),
        }
    }

    pub fn end_requested() -> Self {
        Self {
            source: "user".to_string(),
            content: InputContent::EndRequested,
        }
    }
}
