use tracing::{info, warn};

/// Whether a face is currently visible to the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceState {
    Present,
    Missing,
}

#[derive(Debug, Clone)]
pub struct PresenceConfig {
    /// Continuous absence after which the one-shot alert fires.
    pub alert_after_ms: u64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self { alert_after_ms: 5000 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceAction {
    /// Raise the visual/audio absence alert. At most once per episode.
    Alert,
}

/// Tracks face visibility from periodic detector observations and
/// accumulates how long the candidate was away.
///
/// Missing time is folded into the cumulative total in exactly one place,
/// `flush_missing_episode`, called both when presence returns and at session
/// end (for an episode still open at teardown).
pub struct PresenceTracker {
    config: PresenceConfig,
    state: PresenceState,
    last_present_ms: u64,
    missing_since: Option<u64>,
    cumulative_missing_ms: u64,
    alerted_this_episode: bool,
}

impl PresenceTracker {
    pub fn new(config: PresenceConfig, now_ms: u64) -> Self {
        Self {
            config,
            state: PresenceState::Present,
            last_present_ms: now_ms,
            missing_since: None,
            cumulative_missing_ms: 0,
            alerted_this_episode: false,
        }
    }

    pub fn state(&self) -> PresenceState {
        self.state
    }

    pub fn cumulative_missing_ms(&self) -> u64 {
        self.cumulative_missing_ms
    }

    /// Total missing time rounded to whole seconds, as the session-end
    /// endpoint expects it.
    pub fn missing_seconds(&self) -> u64 {
        (self.cumulative_missing_ms + 500) / 1000
    }

    /// One detector observation: how many faces were seen at `now_ms`.
    pub fn observe(&mut self, faces: usize, now_ms: u64) -> Option<PresenceAction> {
        if faces > 0 {
            if self.state == PresenceState::Missing {
                let away = self.flush_missing_episode(now_ms);
                info!(
                    "presence: face returned after {}ms (total missing {}ms)",
                    away, self.cumulative_missing_ms
                );
            }
            self.state = PresenceState::Present;
            self.last_present_ms = now_ms;
            None
        } else {
            if self.state == PresenceState::Present {
                warn!("presence: face lost");
                self.state = PresenceState::Missing;
                self.missing_since = Some(now_ms);
            }
            let since_present = now_ms.saturating_sub(self.last_present_ms);
            if !self.alerted_this_episode && since_present > self.config.alert_after_ms {
                self.alerted_this_episode = true;
                return Some(PresenceAction::Alert);
            }
            None
        }
    }

    /// Close an open missing episode, folding its duration into the total.
    /// Safe to call when no episode is open. Returns the episode length.
    pub fn flush_missing_episode(&mut self, now_ms: u64) -> u64 {
        let Some(since) = self.missing_since.take() else {
            return 0;
        };
        let episode_ms = now_ms.saturating_sub(since);
        self.cumulative_missing_ms += episode_ms;
        self.alerted_this_episode = false;
        episode_ms
    }
}
