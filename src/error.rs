use thiserror::Error;

/// No microphone (or the stream refused to start). Fatal to session start;
/// surfaced to the user, never retried.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("no audio input device available")]
    NoInputDevice,
    #[error("unsupported sample rate {0}Hz (need 8k/16k/32k/44.1k/48k)")]
    UnsupportedRate(u32),
    #[error("unsupported sample format")]
    UnsupportedFormat,
    #[error("audio stream error: {0}")]
    Stream(String),
}

/// Failures talking to the interview service. Not retried; the session
/// surfaces them and still drives itself to a terminal state.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("resampling failed: {0}")]
    Resample(String),
    #[error("wav encoding failed: {0}")]
    Wav(#[from] hound::Error),
}
