//! Session counters, aggregated once at shutdown.
//!
//! Read-only side layer: nothing in the kernel's decision logic may consult
//! these values, and no event carries candidate content (audio, transcripts),
//! only counts and durations.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TelemetryEvent {
    UtteranceCaptured { duration_ms: u64 },
    PromptSpoken,
    PresenceAlert,
    SynthesisDegraded,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionSummary {
    pub utterances_captured: u64,
    pub total_captured_ms: u64,
    pub prompts_spoken: u64,
    pub presence_alerts: u64,
    pub synthesis_degraded: u64,
    pub face_missing_seconds: u64,
}

#[derive(Debug, Default)]
pub struct TelemetryRecorder {
    summary: SessionSummary,
}

impl TelemetryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: TelemetryEvent) {
        match event {
            TelemetryEvent::UtteranceCaptured { duration_ms } => {
                self.summary.utterances_captured += 1;
                self.summary.total_captured_ms += duration_ms;
            }
            TelemetryEvent::PromptSpoken => self.summary.prompts_spoken += 1,
            TelemetryEvent::PresenceAlert => self.summary.presence_alerts += 1,
            TelemetryEvent::SynthesisDegraded => self.summary.synthesis_degraded += 1,
        }
    }

    /// Final aggregation, called once during teardown.
    pub fn aggregate_session(&self, face_missing_seconds: u64) -> SessionSummary {
        let mut summary = self.summary.clone();
        summary.face_missing_seconds = face_missing_seconds;
        summary
    }
}
