//! Pausable frame-by-frame playback control.
//!
//! A [`Player`] wraps a [`FrameRenderer`] and drives it from a dedicated
//! background thread. Callers flip playback state (`play`, `pause`, `resume`,
//! `stop`, `close`) from any thread; the render loop parks on a condvar while
//! paused and runs its cleanup exactly once when playback ends.

pub mod player;
pub mod renderer;

pub use frame_player_types::{PlaybackEndReason, PlayerState, PlayerStatus};
pub use player::Player;
pub use renderer::{FrameRenderer, FrameResult};
