use serde::{Deserialize, Serialize};

/// Lifecycle of a playback run.
///
/// Transitions only move forward, except for `Playing ↔ Paused`. `Finished`
/// is terminal: no operation leaves it.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    /// Constructed; no render thread exists yet.
    #[default]
    NotStarted,
    /// The render loop is advancing frames.
    Playing,
    /// The render loop is parked between frames.
    Paused,
    /// Playback ended, by exhaustion, error, or an explicit stop.
    Finished,
}

/// Reason a playback run reached [`PlayerState::Finished`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackEndReason {
    /// Natural end of stream.
    Eof,
    /// A frame failed to decode or render.
    Error,
    /// Playback was explicitly stopped or closed.
    Stopped,
}

/// Point-in-time playback status reported to callers.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerStatus {
    /// Current lifecycle state.
    pub state: PlayerState,
    /// Frames rendered so far in this run.
    pub frames_rendered: u64,
    /// Why the run ended, once it has. First recorded reason wins.
    pub end_reason: Option<PlaybackEndReason>,
}
