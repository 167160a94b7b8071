//! Frame renderer capability.
//!
//! The controller treats decoding and output as an opaque collaborator: one
//! call renders one frame and says whether any remain. Opening the source and
//! building the renderer are the collaborator's business; the controller only
//! drives `render_frame` and calls `release` once at shutdown.

use anyhow::Result;

/// Outcome of rendering a single frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameResult {
    /// A frame was rendered and more remain.
    Continue,
    /// The stream is exhausted.
    EndOfStream,
}

/// One-frame-at-a-time decoder/renderer driven by the playback loop.
///
/// Implementations need no internal locking: once the render thread starts it
/// is the only caller of `render_frame`, and `release` runs exactly once when
/// playback shuts down.
pub trait FrameRenderer: Send {
    /// Decode and render exactly one frame.
    ///
    /// An error ends the playback run; a failed frame is never retried.
    fn render_frame(&mut self) -> Result<FrameResult>;

    /// Release the underlying source and output resources.
    ///
    /// Errors are logged and swallowed by the caller, playback is terminating
    /// regardless.
    fn release(&mut self) -> Result<()>;
}
