use std::path::PathBuf;

use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::audio::capture::AudioCapture;
use crate::audio::encode;
use crate::kernel::clock::SessionClock;
use crate::kernel::event::{AnswerSignal, Event};
use crate::kernel::reactor::{Reactor, SideEffect, TerminationCause};
use crate::kernel::time::{SessionTimer, TICK_MS};
use crate::outputs::synthesizer::{SpeechHandle, Synthesizer};
use crate::services::interview::client::InterviewClient;
use crate::services::interview::types::Prompt;

const FAREWELL: &str =
    "Thank you for your time. I am generating your feedback report now.";

/// The audio/video handles, owned here for the session lifetime. No other
/// component may acquire them independently; dropping this releases both.
pub struct DeviceHandles {
    pub capture: AudioCapture,
    pub shutdown: CancellationToken,
}

/// Top-level session driver. Drains the event queue on the kernel cadence,
/// lets the reactor decide, and executes the resulting effects. Network
/// round-trips always run as spawned tasks that report back through the
/// queue, never inline, so audio and timer callbacks keep firing during a
/// wait.
pub struct Orchestrator {
    reactor: Reactor,
    rx: mpsc::Receiver<Event>,
    tx: mpsc::Sender<Event>,
    api: InterviewClient,
    session_id: String,
    synthesizer: Box<dyn Synthesizer>,
    timer: SessionTimer,
    devices: Option<DeviceHandles>,
    current_speech: Option<SpeechHandle>,
    report_out: PathBuf,
}

impl Orchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reactor: Reactor,
        rx: mpsc::Receiver<Event>,
        tx: mpsc::Sender<Event>,
        api: InterviewClient,
        session_id: String,
        synthesizer: Box<dyn Synthesizer>,
        timer: SessionTimer,
        devices: DeviceHandles,
        report_out: PathBuf,
    ) -> Self {
        Self {
            reactor,
            rx,
            tx,
            api,
            session_id,
            synthesizer,
            timer,
            devices: Some(devices),
            current_speech: None,
            report_out,
        }
    }

    /// Feed the opening prompt through the same path every later prompt
    /// takes. Called once, before `run`.
    pub async fn bootstrap(&self, first_question: Prompt) -> anyhow::Result<()> {
        self.tx
            .send(Event::Answer(AnswerSignal::NextPrompt(first_question)))
            .await?;
        Ok(())
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        info!("session loop active ({}ms cadence)", TICK_MS);
        let mut cadence = interval(Duration::from_millis(TICK_MS));
        cadence.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            cadence.tick().await;

            let mut events = Vec::new();
            while let Ok(event) = self.rx.try_recv() {
                events.push(event);
            }

            let effects = self.reactor.tick_step(events);

            for effect in effects {
                match effect {
                    SideEffect::Speak { generation, text } => self.speak(generation, &text),
                    SideEffect::Submit(utterance) => self.submit(utterance),
                    SideEffect::PresenceAlert => {
                        // Terminal bell plus the log line; there is no richer
                        // surface on a CLI client.
                        print!("\x07");
                        warn!("candidate not visible for an extended period");
                    }
                    SideEffect::CountdownDisplay { remaining_secs } => {
                        info!("time remaining: {}", SessionClock::display(remaining_secs));
                    }
                    SideEffect::Terminate(cause) => {
                        self.terminate(cause).await;
                        return Ok(());
                    }
                }
            }
        }
    }

    fn speak(&mut self, generation: u64, text: &str) {
        // Most recent call wins: whatever is still playing gets canceled.
        if let Some(mut previous) = self.current_speech.take() {
            previous.cancel();
        }
        let handle = self.synthesizer.speak(text, generation);
        if handle.is_degraded() {
            self.reactor.note_synthesis_degraded();
        }
        self.current_speech = Some(handle);
    }

    /// Encode and ship one utterance without blocking the loop. The result
    /// comes back as an `AnswerSignal` event.
    fn submit(&self, utterance: crate::kernel::audio::recorder::Utterance) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        let session_id = self.session_id.clone();

        tokio::spawn(async move {
            let signal = match encode::utterance_to_wav(&utterance) {
                Ok(wav) => match api.submit_answer(&session_id, wav).await {
                    Ok(Some(prompt)) => AnswerSignal::NextPrompt(prompt),
                    Ok(None) => AnswerSignal::InterviewFinished,
                    Err(e) => AnswerSignal::SubmissionFailed(e.to_string()),
                },
                Err(e) => AnswerSignal::SubmissionFailed(e.to_string()),
            };
            let _ = tx.send(Event::Answer(signal)).await;
        });
    }

    /// Best-effort teardown. Every step runs even when an earlier one
    /// fails; nothing here may hang the session open.
    async fn terminate(&mut self, cause: TerminationCause) {
        info!("finalizing session {} ({:?})", self.session_id, cause);

        let stats = self.reactor.finalize(self.timer.now_ms());

        if let Some(mut playback) = self.current_speech.take() {
            playback.cancel();
        }
        // Generation 0 predates every real utterance, so the gate treats the
        // farewell's lifecycle events as stale even if any were still read.
        self.current_speech = Some(self.synthesizer.speak(FAREWELL, 0));

        self.release_devices();

        if let Err(e) = self
            .api
            .end_session(&self.session_id, stats.face_missing_seconds)
            .await
        {
            error!("failed to report session stats: {}", e);
        }

        match self.api.final_report(&self.session_id).await {
            Ok(bytes) => match std::fs::write(&self.report_out, &bytes) {
                Ok(()) => info!(
                    "report saved to {} ({} bytes)",
                    self.report_out.display(),
                    bytes.len()
                ),
                Err(e) => error!("failed to write report: {}", e),
            },
            Err(e) => error!("failed to fetch final report: {}", e),
        }

        info!(
            "session summary: {} answers ({}ms speech), {} prompts, {} presence alerts, {}s face missing",
            stats.summary.utterances_captured,
            stats.summary.total_captured_ms,
            stats.summary.prompts_spoken,
            stats.summary.presence_alerts,
            stats.summary.face_missing_seconds,
        );
    }

    /// Exactly-once release of the session's audio/video ownership. The
    /// second call is a no-op, not an error.
    fn release_devices(&mut self) {
        if let Some(handles) = self.devices.take() {
            handles.shutdown.cancel();
            drop(handles.capture);
            info!("capture devices released");
        }
    }
}
