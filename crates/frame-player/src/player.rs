//! Playback controller: state machine plus background render loop.
//!
//! One long-lived render thread advances the frame renderer; callers flip
//! playback state from any thread through [`Player`]. A single mutex/condvar
//! pair serializes state changes and implements the pause wait. The renderer
//! lives in its own slot so a slow frame render never blocks `pause`,
//! `resume`, or `stop`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::renderer::{FrameRenderer, FrameResult};
use frame_player_types::{PlaybackEndReason, PlayerState, PlayerStatus};

/// State shared between the controller handle and the render thread.
struct PlayerShared {
    inner: Mutex<PlayerInner>,
    cv: Condvar,
    /// Exclusive renderer slot. `take()` under this mutex makes release
    /// exactly-once; an empty slot tells the render loop to bail out.
    renderer: Mutex<Option<Box<dyn FrameRenderer>>>,
    frames_rendered: AtomicU64,
}

struct PlayerInner {
    state: PlayerState,
    end_reason: Option<PlaybackEndReason>,
}

impl PlayerShared {
    /// Status lock, recovering from poison: shutdown paths must keep working
    /// even if a renderer panic poisoned the mutex.
    fn lock_inner(&self) -> MutexGuard<'_, PlayerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state(&self) -> PlayerState {
        self.lock_inner().state
    }

    /// Flip to `Finished`, record `reason` unless one is already recorded,
    /// and wake every waiter. The signal is unconditional so a loop parked in
    /// the pause wait can never miss it.
    fn mark_finished(&self, reason: Option<PlaybackEndReason>) {
        {
            let mut st = self.lock_inner();
            st.state = PlayerState::Finished;
            if let Some(reason) = reason {
                st.end_reason.get_or_insert(reason);
            }
        }
        self.cv.notify_all();
    }

    /// Take the renderer out of its slot and release it.
    ///
    /// Exactly one caller ever gets `Some`. Release errors are swallowed,
    /// playback is over either way.
    fn release_renderer(&self) {
        let taken = self
            .renderer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(mut renderer) = taken {
            if let Err(e) = renderer.release() {
                tracing::debug!("renderer release failed during shutdown: {e:#}");
            }
        }
    }
}

/// Frame-by-frame playback controller.
///
/// Wraps an opened [`FrameRenderer`] and drives it from a dedicated
/// background thread. All control methods are safe to call from any thread,
/// concurrently with each other and with the render loop. Dropping the player
/// closes it.
pub struct Player {
    shared: Arc<PlayerShared>,
}

impl Player {
    /// Wrap an opened renderer. Playback does not start until [`Player::play`].
    pub fn new(renderer: Box<dyn FrameRenderer>) -> Self {
        Self {
            shared: Arc::new(PlayerShared {
                inner: Mutex::new(PlayerInner {
                    state: PlayerState::NotStarted,
                    end_reason: None,
                }),
                cv: Condvar::new(),
                renderer: Mutex::new(Some(renderer)),
                frames_rendered: AtomicU64::new(0),
            }),
        }
    }

    /// Start playback, or resume it when paused.
    ///
    /// The render thread is spawned on the first call only. `Playing` and
    /// `Finished` are no-ops, so a stopped or closed player stays stopped.
    /// Fails only if the OS refuses to spawn the render thread.
    pub fn play(&self) -> Result<()> {
        let mut st = self.shared.lock_inner();
        match st.state {
            PlayerState::NotStarted => {
                st.state = PlayerState::Playing;
                drop(st);
                self.spawn_render_thread()
            }
            PlayerState::Paused => {
                st.state = PlayerState::Playing;
                drop(st);
                self.shared.cv.notify_all();
                Ok(())
            }
            PlayerState::Playing | PlayerState::Finished => Ok(()),
        }
    }

    /// Pause playback. Returns `true` when the player is paused afterwards.
    ///
    /// A pure state flip: the render loop parks itself after the frame
    /// currently in flight. No signal is needed to pause.
    pub fn pause(&self) -> bool {
        let mut st = self.shared.lock_inner();
        if st.state == PlayerState::Playing {
            st.state = PlayerState::Paused;
        }
        st.state == PlayerState::Paused
    }

    /// Resume a paused player. Returns `true` when it is playing afterwards.
    pub fn resume(&self) -> bool {
        let mut st = self.shared.lock_inner();
        if st.state == PlayerState::Paused {
            st.state = PlayerState::Playing;
            drop(st);
            self.shared.cv.notify_all();
            return true;
        }
        st.state == PlayerState::Playing
    }

    /// Stop playback from any state. Idempotent.
    ///
    /// Only flips state and wakes the loop; the renderer itself is released
    /// by the render loop's cleanup, or by [`Player::close`] if the loop
    /// never ran.
    pub fn stop(&self) {
        self.shared.mark_finished(Some(PlaybackEndReason::Stopped));
    }

    /// Stop playback and release the renderer.
    ///
    /// Safe to call from any thread, any number of times. Release errors are
    /// swallowed: shutdown-time cleanup failures are not actionable.
    pub fn close(&self) {
        self.shared.mark_finished(Some(PlaybackEndReason::Stopped));
        self.shared.release_renderer();
    }

    /// Current playback state.
    pub fn state(&self) -> PlayerState {
        self.shared.state()
    }

    /// Point-in-time status snapshot for caller-side reporting.
    pub fn status(&self) -> PlayerStatus {
        let (state, end_reason) = {
            let st = self.shared.lock_inner();
            (st.state, st.end_reason)
        };
        PlayerStatus {
            state,
            frames_rendered: self.shared.frames_rendered.load(Ordering::Relaxed),
            end_reason,
        }
    }

    /// Block until the player reaches `Finished`.
    pub fn wait_until_finished(&self) {
        let mut st = self.shared.lock_inner();
        while st.state != PlayerState::Finished {
            st = self
                .shared
                .cv
                .wait(st)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Block until `Finished` or until `timeout` elapses.
    ///
    /// Returns `true` if the player finished in time.
    pub fn wait_until_finished_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut st = self.shared.lock_inner();
        while st.state != PlayerState::Finished {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _) = self
                .shared
                .cv
                .wait_timeout(st, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            st = guard;
        }
        true
    }

    fn spawn_render_thread(&self) -> Result<()> {
        let shared = self.shared.clone();
        let spawned = thread::Builder::new()
            .name("frame-player-render".to_string())
            .spawn(move || render_loop(&shared));
        if let Err(e) = spawned {
            // The run never got a thread; finish it so callers are not left
            // with a permanently `Playing` player.
            self.shared.mark_finished(Some(PlaybackEndReason::Error));
            self.shared.release_renderer();
            return Err(e).context("spawn render thread");
        }
        Ok(())
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.close();
    }
}

/// Body of the background render thread.
///
/// Drives the renderer one frame at a time, parking on the condvar while
/// paused. Exits when the state flips to `Finished`, the renderer reports end
/// of stream or fails, or the pause wait is torn down. Cleanup runs exactly
/// once on every exit path.
fn render_loop(shared: &Arc<PlayerShared>) {
    request_render_priority();

    let reason = 'run: loop {
        if shared.state() == PlayerState::Finished {
            break None; // stop()/close() already recorded why
        }

        // One frame, holding only the renderer slot: a slow render never
        // blocks pause/resume/stop.
        let rendered = {
            let mut slot = shared
                .renderer
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            match slot.as_mut() {
                Some(renderer) => renderer.render_frame(),
                // close() got here first and already took the renderer.
                None => break None,
            }
        };

        match rendered {
            Ok(FrameResult::Continue) => {
                shared.frames_rendered.fetch_add(1, Ordering::Relaxed);
            }
            Ok(FrameResult::EndOfStream) => break Some(PlaybackEndReason::Eof),
            Err(e) => {
                tracing::warn!("frame render failed, ending playback: {e:#}");
                break Some(PlaybackEndReason::Error);
            }
        }

        // Park while paused. resume()/stop()/close() signal unconditionally,
        // so there is no lost-wakeup window here.
        let mut st = match shared.inner.lock() {
            Ok(guard) => guard,
            Err(_) => break Some(PlaybackEndReason::Stopped),
        };
        while st.state == PlayerState::Paused {
            st = match shared.cv.wait(st) {
                Ok(guard) => guard,
                // A torn-down wait means terminate, never resume.
                Err(_) => break 'run Some(PlaybackEndReason::Stopped),
            };
        }
    };

    tracing::debug!(
        ?reason,
        frames = shared.frames_rendered.load(Ordering::Relaxed),
        "render loop exiting"
    );
    // Release before flipping state so a waiter that observes `Finished` can
    // rely on the renderer being gone.
    shared.release_renderer();
    shared.mark_finished(reason);
}

/// Ask the OS to boost the calling thread's scheduling priority.
///
/// Frame rendering is timing sensitive, so the render thread requests a
/// higher priority where the platform has a facility for it. Refusal leaves
/// the thread at default priority; platforms without a facility are a no-op.
fn request_render_priority() {
    #[cfg(unix)]
    {
        // SAFETY: setpriority(2) takes no pointers; PRIO_PROCESS with id 0
        // targets the calling thread on Linux and the process elsewhere.
        let rc = unsafe { libc::setpriority(libc::PRIO_PROCESS as _, 0, -10) };
        if rc != 0 {
            tracing::debug!("render thread priority boost refused, staying at default");
        }
    }
    #[cfg(not(unix))]
    tracing::debug!("no thread priority facility on this platform");
}
