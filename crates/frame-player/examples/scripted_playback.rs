//! Drive the playback controller with a synthetic tone renderer.
//!
//! The renderer stands in for a real decoder/output pair: each call
//! synthesizes one frame of a sine wave and sleeps for the frame's wall-clock
//! duration instead of touching an audio device.
//!
//! Run with: `cargo run --example scripted_playback --package frame-player`

use std::thread;
use std::time::Duration;

use anyhow::Result;
use frame_player::{FrameRenderer, FrameResult, Player};
use tracing_subscriber::EnvFilter;

/// Samples per synthesized frame (MPEG layer III frame size).
const FRAME_SAMPLES: usize = 1152;

struct ToneRenderer {
    frames_left: u32,
    phase: f32,
    sample_rate: u32,
    frequency: f32,
}

impl ToneRenderer {
    fn new(seconds: f32, frequency: f32) -> Self {
        let sample_rate = 44_100u32;
        let frames_left = (seconds * sample_rate as f32 / FRAME_SAMPLES as f32).ceil() as u32;
        Self {
            frames_left,
            phase: 0.0,
            sample_rate,
            frequency,
        }
    }
}

impl FrameRenderer for ToneRenderer {
    fn render_frame(&mut self) -> Result<FrameResult> {
        if self.frames_left == 0 {
            return Ok(FrameResult::EndOfStream);
        }
        self.frames_left -= 1;

        let mut frame = [0.0f32; FRAME_SAMPLES];
        let step = 2.0 * std::f32::consts::PI * self.frequency / self.sample_rate as f32;
        for sample in frame.iter_mut() {
            *sample = self.phase.sin() * 0.3;
            self.phase += step;
        }
        let peak = frame.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
        tracing::trace!(peak, frames_left = self.frames_left, "frame rendered");

        // Stand in for the device write: one frame of wall-clock time.
        let frame_ms = 1000 * FRAME_SAMPLES as u64 / self.sample_rate as u64;
        thread::sleep(Duration::from_millis(frame_ms));
        Ok(FrameResult::Continue)
    }

    fn release(&mut self) -> Result<()> {
        tracing::info!("tone renderer released");
        Ok(())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let player = Player::new(Box::new(ToneRenderer::new(3.0, 440.0)));
    player.play()?;
    tracing::info!("playing");
    thread::sleep(Duration::from_millis(800));

    player.pause();
    tracing::info!(state = ?player.state(), "paused");
    thread::sleep(Duration::from_millis(500));

    player.resume();
    tracing::info!("resumed, waiting for end of stream");
    player.wait_until_finished();

    println!("{}", serde_json::to_string_pretty(&player.status())?);
    Ok(())
}
