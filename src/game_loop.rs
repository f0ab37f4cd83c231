//! Frame clock and update-then-render driver
//!
//! The browser hands us a `requestAnimationFrame` timestamp per frame; the
//! driver turns that into a clamped delta, advances the target, renders it and
//! tells the host whether to schedule another frame. Keeping scheduling out of
//! here lets tests feed synthetic delta sequences.

use crate::consts::MAX_FRAME_DT;

/// Something the loop can drive
pub trait FrameTarget {
    /// Advance the simulation by `dt` seconds
    fn advance(&mut self, dt: f32);
    /// Draw the current state
    fn render(&mut self);
    /// Still worth ticking?
    fn is_live(&self) -> bool;
}

/// What the host should do after a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameControl {
    /// Request another animation frame
    Continue,
    /// Do not re-schedule; `arm` again to resume
    Stop,
}

/// Converts millisecond timestamps into clamped second deltas
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_dt: f32,
    // FPS tracking
    frame_times: [f64; 60],
    frame_index: usize,
    fps: u32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(MAX_FRAME_DT)
    }
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            last_ms: None,
            max_dt,
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
        }
    }

    /// Forget the previous timestamp so the next tick starts from zero
    pub fn reset(&mut self) {
        self.last_ms = None;
    }

    /// Seconds since the previous call, clamped to `[0, max_dt]`
    ///
    /// The first call after a reset yields 0. Long gaps (background tabs) are
    /// clamped so a stalled tab cannot teleport obstacles through the ninja.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) if now_ms.is_finite() => ((now_ms - last) / 1000.0) as f32,
            _ => 0.0,
        };
        if now_ms.is_finite() {
            self.last_ms = Some(now_ms);
            self.track_fps(now_ms);
        }
        dt.clamp(0.0, self.max_dt)
    }

    fn track_fps(&mut self, now_ms: f64) {
        self.frame_times[self.frame_index] = now_ms;
        self.frame_index = (self.frame_index + 1) % self.frame_times.len();

        // Oldest sample sits where the next write goes
        let oldest = self.frame_times[self.frame_index];
        if oldest > 0.0 {
            let elapsed = now_ms - oldest;
            if elapsed > 0.0 {
                self.fps = ((self.frame_times.len() - 1) as f64 * 1000.0 / elapsed).round() as u32;
            }
        }
    }

    /// Frames per second over the last 60 frames
    pub fn fps(&self) -> u32 {
        self.fps
    }
}

/// Runs the tick-then-render cycle while armed
#[derive(Debug, Clone, Default)]
pub struct LoopDriver {
    clock: FrameClock,
    armed: bool,
}

impl LoopDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume driving frames
    ///
    /// Returns `true` when the driver was idle, meaning the host must request
    /// the first animation frame itself.
    pub fn arm(&mut self) -> bool {
        if self.armed {
            return false;
        }
        self.armed = true;
        self.clock.reset();
        true
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn fps(&self) -> u32 {
        self.clock.fps()
    }

    /// Handle one animation frame at `now_ms`
    pub fn on_frame(&mut self, now_ms: f64, target: &mut impl FrameTarget) -> FrameControl {
        if !self.armed {
            return FrameControl::Stop;
        }
        let dt = self.clock.tick(now_ms);
        self.step(dt, target)
    }

    /// Handle one frame with an explicit delta (headless runs and tests)
    pub fn step(&mut self, dt: f32, target: &mut impl FrameTarget) -> FrameControl {
        if !self.armed || !target.is_live() {
            self.disarm();
            return FrameControl::Stop;
        }

        target.advance(dt);
        // Always draw the tick that ended the run, then stop
        target.render();

        if target.is_live() {
            FrameControl::Continue
        } else {
            self.disarm();
            FrameControl::Stop
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
        self.clock.reset();
    }
}
