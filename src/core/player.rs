//! Player adapter around an opaque third-party video player.
//!
//! The player only exposes pull-style time queries plus a handful of
//! lifecycle events, so position is sampled on a timer. Every call into the
//! player may fail while it is still warming up; those failures are logged
//! at debug level and retried on the next sample.

use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

use crate::state::PlayerState;
use crate::utils::format_time;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlayerError {
    #[error("player not ready")]
    NotReady,
    #[error("player call failed: {0}")]
    Call(String),
}

/// The handful of player calls the review core needs.
pub trait PlayerCapability: Send {
    fn current_time(&self) -> Result<f64, PlayerError>;
    fn duration(&self) -> Result<f64, PlayerError>;
    fn seek_to(&mut self, seconds: f64, allow_seek_ahead: bool) -> Result<(), PlayerError>;
    fn play(&mut self) -> Result<(), PlayerError>;
}

/// The page-side platform that hosts players.
pub trait PlayerPlatform {
    /// True once the platform SDK is usable.
    fn sdk_loaded(&self) -> bool;
    /// Start loading the SDK. Called at most once per [`SdkLoader`].
    fn request_sdk_load(&mut self);
    fn has_host_element(&self, element_id: &str) -> bool;
    fn create_player(
        &mut self,
        element_id: &str,
        media_id: &str,
    ) -> Result<Box<dyn PlayerCapability>, PlayerError>;
}

/// Discrete lifecycle events pushed by the player.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    Ready,
    Error(String),
    StateChange(i32),
}

/// Page-scoped guard so the SDK script is injected exactly once.
#[derive(Debug, Default)]
pub struct SdkLoader {
    requested: AtomicBool,
}

impl SdkLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the SDK unless it is present or already requested.
    /// Returns true when this call issued the load.
    pub fn ensure_loaded(&self, platform: &mut dyn PlayerPlatform) -> bool {
        if platform.sdk_loaded() {
            return false;
        }
        if self.requested.swap(true, Ordering::SeqCst) {
            return false;
        }
        platform.request_sdk_load();
        true
    }
}

/// Result of trying to attach to the page's player element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    /// Player constructed; waiting for its ready event.
    Attached,
    /// SDK still loading; call [`PlayerAdapter::on_sdk_ready`] once it is.
    AwaitingSdk,
    /// The page did not render the host element. The feature is skipped.
    HostMissing,
    /// Player construction failed. Logged, not surfaced.
    Failed,
}

/// One sample of the polling loop.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSample {
    pub state: PlayerState,
    /// True only on the first sample that sees a positive duration.
    pub duration_discovered: bool,
    /// True when an already known duration changed since the previous sample.
    pub duration_changed: bool,
    pub time_display: String,
}

pub struct PlayerAdapter {
    media_id: String,
    host_id: String,
    player: Option<Box<dyn PlayerCapability>>,
    state: PlayerState,
}

impl PlayerAdapter {
    pub fn new(media_id: impl Into<String>, host_id: impl Into<String>) -> Self {
        Self {
            media_id: media_id.into(),
            host_id: host_id.into(),
            player: None,
            state: PlayerState::default(),
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn is_attached(&self) -> bool {
        self.player.is_some()
    }

    /// Attach to the page's player element, loading the SDK first if needed.
    pub fn initialize(&mut self, platform: &mut dyn PlayerPlatform, loader: &SdkLoader) -> AttachOutcome {
        if !platform.has_host_element(&self.host_id) {
            tracing::debug!(host_id = %self.host_id, "player host element not found");
            return AttachOutcome::HostMissing;
        }
        if !platform.sdk_loaded() {
            loader.ensure_loaded(platform);
            tracing::debug!("player SDK not yet loaded, waiting");
            return AttachOutcome::AwaitingSdk;
        }
        self.create(platform)
    }

    /// Finish a deferred [`initialize`](Self::initialize) once the SDK reports ready.
    pub fn on_sdk_ready(&mut self, platform: &mut dyn PlayerPlatform) -> AttachOutcome {
        if self.player.is_some() {
            return AttachOutcome::Attached;
        }
        if !platform.has_host_element(&self.host_id) {
            tracing::debug!(host_id = %self.host_id, "player host element not found");
            return AttachOutcome::HostMissing;
        }
        self.create(platform)
    }

    fn create(&mut self, platform: &mut dyn PlayerPlatform) -> AttachOutcome {
        match platform.create_player(&self.host_id, &self.media_id) {
            Ok(player) => {
                self.player = Some(player);
                AttachOutcome::Attached
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to create player");
                AttachOutcome::Failed
            }
        }
    }

    pub fn handle_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::Ready => {
                tracing::debug!(media_id = %self.media_id, "player ready");
                self.state.is_ready = true;
            }
            PlayerEvent::Error(code) => {
                tracing::warn!(code = %code, "player reported an error");
            }
            PlayerEvent::StateChange(_) => {}
        }
    }

    /// Sample the player. `None` means "try again next tick".
    pub fn sample(&mut self) -> Option<TickSample> {
        if !self.state.is_ready {
            return None;
        }
        let player = self.player.as_ref()?;

        let mut duration_discovered = false;
        let mut duration_changed = false;
        match player.duration() {
            Ok(duration) if duration.is_finite() && duration > 0.0 => {
                if !self.state.duration_known() {
                    duration_discovered = true;
                } else if duration != self.state.duration_seconds {
                    duration_changed = true;
                }
                self.state.duration_seconds = duration;
            }
            Ok(_) => {}
            Err(err) => tracing::debug!(error = %err, "duration not available"),
        }

        match player.current_time() {
            Ok(current) if current.is_finite() => {
                self.state.current_time_seconds = current.max(0.0);
            }
            Ok(_) => {}
            Err(err) => {
                tracing::debug!(error = %err, "current time not available yet");
                if !duration_discovered {
                    return None;
                }
            }
        }

        Some(TickSample {
            state: self.state,
            duration_discovered,
            duration_changed,
            time_display: format_time(self.state.current_whole_seconds()),
        })
    }

    /// Live playback position in whole seconds, when the player can tell.
    pub fn live_position(&self) -> Option<u64> {
        if !self.state.is_ready {
            return None;
        }
        let player = self.player.as_ref()?;
        match player.current_time() {
            Ok(current) if current.is_finite() => Some(current.max(0.0).floor() as u64),
            Ok(_) => None,
            Err(err) => {
                tracing::debug!(error = %err, "could not read live position");
                None
            }
        }
    }

    /// Best-effort seek. Returns whether the player accepted it.
    pub fn seek(&mut self, seconds: u64, autoplay: bool) -> bool {
        let Some(player) = self.player.as_mut() else {
            return false;
        };
        if let Err(err) = player.seek_to(seconds as f64, true) {
            tracing::debug!(error = %err, seconds, "seek ignored");
            return false;
        }
        if autoplay {
            if let Err(err) = player.play() {
                tracing::debug!(error = %err, "play ignored");
            }
        }
        true
    }
}
