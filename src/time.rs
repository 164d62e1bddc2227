//! Frame timing for hosts that drive the render loop.
//!
//! The render loop itself only ever sees deltas; [`FrameClock`] is what a
//! refresh-callback host uses to produce them from wall-clock time.
//!
//! # Example
//!
//! ```ignore
//! let mut clock = FrameClock::new();
//!
//! // In the redraw callback:
//! let delta = clock.tick();
//! render_loop.tick(delta);
//! ```

use std::time::{Duration, Instant};

/// Wall-clock delta source.
///
/// The first tick reports a zero delta, so time does not jump by however long
/// setup took before the first frame.
#[derive(Debug)]
pub struct FrameClock {
    /// When the last frame occurred, `None` until the first tick.
    last_frame: Option<Instant>,
    /// Time since last frame in seconds.
    delta_secs: f32,
    /// Total frames since start.
    frame_count: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    /// Frame count at last FPS update.
    fps_frame_count: u64,
    /// Time of last FPS calculation.
    fps_update_time: Option<Instant>,
    /// How often to update FPS calculation.
    fps_update_interval: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last_frame: None,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: None,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Advance to now. Returns the delta in seconds.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Advance to `now`. Returns the delta in seconds.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        self.delta_secs = match self.last_frame {
            Some(last) => now.saturating_duration_since(last).as_secs_f32(),
            None => 0.0,
        };
        self.last_frame = Some(now);
        self.frame_count += 1;

        match self.fps_update_time {
            None => {
                self.fps_frame_count = self.frame_count;
                self.fps_update_time = Some(now);
            }
            Some(since) => {
                let fps_elapsed = now.saturating_duration_since(since);
                if fps_elapsed >= self.fps_update_interval {
                    let frames_since = self.frame_count - self.fps_frame_count;
                    self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
                    self.fps_frame_count = self.frame_count;
                    self.fps_update_time = Some(now);
                }
            }
        }

        self.delta_secs
    }

    /// Time since last frame in seconds (delta time).
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Calculated frames per second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
