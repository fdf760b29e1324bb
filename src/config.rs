use std::path::PathBuf;

use clap::Parser;

use crate::kernel::audio::vad::VadConfig;
use crate::kernel::presence::PresenceConfig;

/// Run one AI interview session against a remote interview service.
///
/// Noise floors differ per room and microphone, so the detection constants
/// are flags (with env fallbacks) rather than code.
#[derive(Debug, Parser)]
#[command(name = "viva", version, about)]
pub struct Args {
    /// Base URL of the interview service.
    #[arg(long, env = "VIVA_SERVER", default_value = "http://localhost:8000")]
    pub server: String,

    /// Interviewer persona JSON, as produced by the persona-build endpoint.
    /// When omitted, --jd and --resume are uploaded to build one.
    #[arg(long, env = "VIVA_PERSONA")]
    pub persona: Option<PathBuf>,

    /// Job description document to upload (setup flow).
    #[arg(long, requires = "resume", conflicts_with = "persona")]
    pub jd: Option<PathBuf>,

    /// Resume document to upload (setup flow).
    #[arg(long, requires = "jd", conflicts_with = "persona")]
    pub resume: Option<PathBuf>,

    /// Requested interview length in minutes.
    #[arg(long, default_value_t = 10)]
    pub duration_minutes: u64,

    /// RMS energy above which a block counts as speech ([-1, 1] signal).
    #[arg(long, env = "VIVA_ENERGY_THRESHOLD", default_value_t = 0.02)]
    pub energy_threshold: f32,

    /// Continuous silence that ends an answer, in milliseconds.
    #[arg(long, env = "VIVA_SILENCE_MS", default_value_t = 2000)]
    pub silence_ms: u64,

    /// Samples per audio block fed to the detector.
    #[arg(long, default_value_t = 2048)]
    pub block_size: usize,

    /// Face-detection poll interval, in milliseconds.
    #[arg(long, default_value_t = 500)]
    pub presence_poll_ms: u64,

    /// Continuous absence before the one-shot alert, in milliseconds.
    #[arg(long, default_value_t = 5000)]
    pub presence_alert_ms: u64,

    /// Command used for speech synthesis (receives the prompt as its
    /// argument). Missing command degrades playback to a no-op.
    #[arg(long, env = "VIVA_TTS_COMMAND", default_value = "say")]
    pub tts_command: String,

    /// Where to write the final report.
    #[arg(long, default_value = "interview_report.pdf")]
    pub report_out: PathBuf,

    /// Per-request timeout for the interview service, in seconds.
    #[arg(long, default_value_t = 60)]
    pub request_timeout_secs: u64,
}

impl Args {
    pub fn vad_config(&self) -> VadConfig {
        VadConfig {
            energy_threshold: self.energy_threshold,
            silence_window_ms: self.silence_ms,
        }
    }

    pub fn presence_config(&self) -> PresenceConfig {
        PresenceConfig {
            alert_after_ms: self.presence_alert_ms,
        }
    }
}
