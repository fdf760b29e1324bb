use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use crate::kernel::event::{Event, InputEvent, SynthSignal};

/// Cancels one in-flight playback. Dropping the handle cancels too.
pub struct SpeechHandle {
    stop: Option<oneshot::Sender<()>>,
    degraded: bool,
}

impl SpeechHandle {
    pub fn cancel(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }

    /// True when the platform speech capability was unavailable and this
    /// playback collapsed to an immediate started/finished pair.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}

/// Drives interviewer speech output. Implementations must emit `Started`
/// then `Finished` for every call (including canceled and degraded
/// playback) or the turn-taking gate would suppress input forever.
pub trait Synthesizer: Send {
    fn speak(&self, text: &str, generation: u64) -> SpeechHandle;
}

/// Text-to-speech through a spawned command (`say` on macOS, `espeak` and
/// friends elsewhere). One child at a time; cancellation kills it.
pub struct ProcessSynthesizer {
    program: String,
    tx: mpsc::Sender<Event>,
}

impl ProcessSynthesizer {
    pub fn new(program: String, tx: mpsc::Sender<Event>) -> Self {
        Self { program, tx }
    }
}

impl Synthesizer for ProcessSynthesizer {
    fn speak(&self, text: &str, generation: u64) -> SpeechHandle {
        let tx = self.tx.clone();

        match Command::new(&self.program)
            .arg(text)
            .kill_on_drop(true)
            .spawn()
        {
            Ok(mut child) => {
                let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
                tokio::spawn(async move {
                    let _ = tx
                        .send(Event::Input(InputEvent::synth(SynthSignal::Started {
                            generation,
                        })))
                        .await;

                    tokio::select! {
                        _ = child.wait() => {}
                        _ = &mut stop_rx => {
                            info!("speech: playback {} canceled", generation);
                            let _ = child.kill().await;
                        }
                    }

                    let _ = tx
                        .send(Event::Input(InputEvent::synth(SynthSignal::Finished {
                            generation,
                        })))
                        .await;
                });
                SpeechHandle {
                    stop: Some(stop_tx),
                    degraded: false,
                }
            }
            Err(e) => {
                // No synthesis on this platform. Emit the lifecycle pair
                // immediately so listening resumes without playback.
                warn!("speech: '{}' unavailable ({}), degrading to no-op", self.program, e);
                tokio::spawn(async move {
                    let _ = tx
                        .send(Event::Input(InputEvent::synth(SynthSignal::Started {
                            generation,
                        })))
                        .await;
                    let _ = tx
                        .send(Event::Input(InputEvent::synth(SynthSignal::Finished {
                            generation,
                        })))
                        .await;
                });
                SpeechHandle {
                    stop: None,
                    degraded: true,
                }
            }
        }
    }
}
