use tracing::{debug, info, warn};

use super::audio::energy;
use super::audio::recorder::{Utterance, UtteranceRecorder};
use super::audio::vad::{TurnDetector, VadCommand, VadConfig, VadState};
use super::clock::{ClockAction, SessionClock};
use super::event::{AnswerSignal, Event, InputContent, PresenceSignal};
use super::presence::{PresenceAction, PresenceConfig, PresenceTracker};
use super::speech::SpeechGate;
use super::telemetry::{SessionSummary, TelemetryEvent, TelemetryRecorder};
use super::time::Tick;
use crate::services::interview::types::Prompt;

#[derive(Debug, Clone)]
pub struct ReactorConfig {
    pub vad: VadConfig,
    pub presence: PresenceConfig,
    pub duration_secs: u64,
    pub sample_rate: u32,
}

/// Work the driver must perform on the kernel's behalf. The kernel itself
/// never awaits I/O.
#[derive(Debug, Clone)]
pub enum SideEffect {
    /// Play an interviewer prompt. Cancels any playback still in flight.
    Speak { generation: u64, text: String },
    /// Submit a finished utterance to the interview service.
    Submit(Utterance),
    /// Raise the candidate-absent alert.
    PresenceAlert,
    /// Refresh the countdown display.
    CountdownDisplay { remaining_secs: u64 },
    /// Run the termination sequence. Emitted at most once per session.
    Terminate(TerminationCause),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationCause {
    TimeExpired,
    InterviewComplete,
    UserEnded,
    SubmissionFailed(String),
}

/// Final numbers handed to the orchestrator during teardown.
#[derive(Debug, Clone)]
pub struct SessionStats {
    pub face_missing_seconds: u64,
    pub summary: SessionSummary,
}

/// The session kernel. All state lives here and is mutated only inside
/// `tick_step`, which runs on a single logical thread of control; the four
/// independently-clocked sources (audio blocks, synthesis lifecycle,
/// presence polls, the one-second clock) are serialized through the event
/// queue before they ever touch it.
pub struct Reactor {
    session_id: String,
    current_prompt: Option<Prompt>,
    vad: TurnDetector,
    recorder: UtteranceRecorder,
    gate: SpeechGate,
    presence: PresenceTracker,
    clock: SessionClock,
    telemetry: TelemetryRecorder,
    tick: Tick,
    terminating: bool,
}

impl Reactor {
    pub fn new(config: ReactorConfig, session_id: String) -> Self {
        Self {
            session_id,
            current_prompt: None,
            vad: TurnDetector::new(config.vad),
            recorder: UtteranceRecorder::new(config.sample_rate),
            gate: SpeechGate::new(),
            presence: PresenceTracker::new(config.presence, 0),
            clock: SessionClock::new(config.duration_secs),
            telemetry: TelemetryRecorder::new(),
            tick: Tick::new(),
            terminating: false,
        }
    }

    pub fn vad_state(&self) -> VadState {
        self.vad.state()
    }

    pub fn is_capturing(&self) -> bool {
        self.recorder.is_capturing()
    }

    pub fn is_terminating(&self) -> bool {
        self.terminating
    }

    pub fn current_prompt(&self) -> Option<&Prompt> {
        self.current_prompt.as_ref()
    }

    /// Advance one tick: apply every queued event, return the effects.
    /// MUST NOT await or block; the driver owns all I/O.
    pub fn tick_step(&mut self, events: Vec<Event>) -> Vec<SideEffect> {
        self.tick = self.tick.next();
        let mut effects = Vec::new();

        for event in events {
            match event {
                Event::Input(input) => self.apply_input(input.content, &mut effects),
                Event::Answer(signal) => self.apply_answer(signal, &mut effects),
            }
        }

        effects
    }

    fn apply_input(&mut self, content: InputContent, effects: &mut Vec<SideEffect>) {
        match content {
            InputContent::Audio(block) => {
                if self.terminating {
                    return;
                }
                // Buffer first so the block that completes the silence
                // window is part of the captured tail.
                if self.recorder.is_capturing() {
                    self.recorder.push(&block.samples);
                }
                let rms = energy::rms(&block.samples);
                match self.vad.on_loudness(rms, block.at_ms) {
                    Some(VadCommand::StartCapture) => {
                        if self.recorder.start(block.at_ms) {
                            // Include the block that tripped the detector.
                            self.recorder.push(&block.samples);
                        }
                    }
                    Some(VadCommand::StopCapture) => {
                        if let Some(utterance) = self.recorder.stop(block.at_ms) {
                            self.telemetry.record(TelemetryEvent::UtteranceCaptured {
                                duration_ms: utterance.duration_ms(),
                            });
                            effects.push(SideEffect::Submit(utterance));
                        }
                    }
                    None => {}
                }
            }
            InputContent::Synth(signal) => {
                if !self.gate.apply(signal) {
                    return;
                }
                self.vad.set_agent_speaking(self.gate.is_speaking());
                // Once the opening prompt has finished playing the machine
                // starts listening, if it was not armed earlier.
                if !self.gate.is_speaking() && self.vad.state() == VadState::Idle && !self.terminating
                {
                    self.vad.arm();
                }
            }
            InputContent::Presence(PresenceSignal::FacesDetected { count, at_ms }) => {
                if self.terminating {
                    return;
                }
                if let Some(PresenceAction::Alert) = self.presence.observe(count, at_ms) {
                    warn!("session {}: candidate absent, alerting", self.session_id);
                    self.telemetry.record(TelemetryEvent::PresenceAlert);
                    effects.push(SideEffect::PresenceAlert);
                }
            }
            InputContent::Clock(_) => {
                if self.terminating {
                    return;
                }
                match self.clock.tick() {
                    ClockAction::Countdown { remaining_secs } => {
                        effects.push(SideEffect::CountdownDisplay { remaining_secs });
                    }
                    ClockAction::Expired => {
                        info!("session {}: time is up", self.session_id);
                        self.begin_termination(TerminationCause::TimeExpired, effects);
                    }
                }
            }
            InputContent::EndRequested => {
                self.begin_termination(TerminationCause::UserEnded, effects);
            }
        }
    }

    fn apply_answer(&mut self, signal: AnswerSignal, effects: &mut Vec<SideEffect>) {
        if self.terminating {
            debug!("session {}: answer signal after termination, dropped", self.session_id);
            return;
        }
        match signal {
            AnswerSignal::NextPrompt(prompt) => {
                info!("session {}: next prompt received", self.session_id);
                self.current_prompt = Some(prompt.clone());
                self.vad.resume_listening();
                self.telemetry.record(TelemetryEvent::PromptSpoken);
                let generation = self.gate.begin_utterance();
                effects.push(SideEffect::Speak {
                    generation,
                    text: prompt.question_text,
                });
            }
            AnswerSignal::InterviewFinished => {
                info!("session {}: no more questions", self.session_id);
                self.begin_termination(TerminationCause::InterviewComplete, effects);
            }
            AnswerSignal::SubmissionFailed(reason) => {
                warn!("session {}: answer submission failed: {}", self.session_id, reason);
                self.begin_termination(TerminationCause::SubmissionFailed(reason), effects);
            }
        }
    }

    /// First step of teardown, on the kernel side: stop reacting, force-stop
    /// any open capture. Idempotent; only the first cause wins.
    fn begin_termination(&mut self, cause: TerminationCause, effects: &mut Vec<SideEffect>) {
        if self.terminating {
            debug!("session {}: termination already in progress", self.session_id);
            return;
        }
        info!("session {}: terminating ({:?})", self.session_id, cause);
        self.terminating = true;
        self.recorder.discard();
        self.vad.halt();
        effects.push(SideEffect::Terminate(cause));
    }

    /// Record a degraded (no-op) synthesis for the session summary.
    pub fn note_synthesis_degraded(&mut self) {
        self.telemetry.record(TelemetryEvent::SynthesisDegraded);
    }

    /// Kernel-side finalization: flush an open missing episode and produce
    /// the session stats. Called exactly once by the orchestrator while it
    /// runs the termination sequence.
    pub fn finalize(&mut self, now_ms: u64) -> SessionStats {
        self.terminating = true;
        self.recorder.discard();
        self.vad.halt();
        self.presence.flush_missing_episode(now_ms);
        let face_missing_seconds = self.presence.missing_seconds();
        SessionStats {
            face_missing_seconds,
            summary: self.telemetry.aggregate_session(face_missing_seconds),
        }
    }
}
