//! Ninja Ascent - a two-lane endless runner
//!
//! Core modules:
//! - `sim`: Simulation (player, obstacle registry, difficulty, session state machine)
//! - `game_loop`: Frame clock and update-then-render driver
//! - `renderer`: Scene composition and the WebGPU sprite pipeline
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences
//! - `highscores`: Local best-distance store fed by the score callback

pub mod game_loop;
pub mod highscores;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use game_loop::{FrameControl, FrameTarget, LoopDriver};
pub use highscores::HighScores;
pub use settings::Settings;
pub use tuning::Tuning;

/// Fixed play-field geometry
pub mod consts {
    /// Logical play-field size; the renderer letterboxes it into the canvas
    pub const FIELD_WIDTH: f32 = 400.0;
    pub const FIELD_HEIGHT: f32 = 800.0;

    /// Translucent wall strip drawn along both field edges
    pub const WALL_STRIP_WIDTH: f32 = 10.0;

    /// Ninja defaults
    pub const NINJA_WIDTH: f32 = 50.0;
    pub const NINJA_HEIGHT: f32 = 50.0;
    /// Gap between the field edge and a lane slot
    pub const LANE_INSET: f32 = 10.0;
    /// Ninja top edge sits this far above the bottom of the field
    pub const NINJA_BOTTOM_OFFSET: f32 = 200.0;
    /// Base of the easing curve: fraction of the gap left after 1/4 second
    pub const LANE_EASE_BASE: f32 = 0.001;
    /// Easing exponent multiplier (per second)
    pub const LANE_EASE_RATE: f32 = 4.0;
    /// Snap distance that ends the asymptotic approach
    pub const LANE_SNAP: f32 = 1.0;

    /// Obstacle sizes (square)
    pub const BLADE_SIZE: f32 = 40.0;
    pub const ENEMY_SIZE: f32 = 50.0;
    pub const POWER_UP_SIZE: f32 = 30.0;
    /// Power-ups hug the wall at this distance
    pub const POWER_UP_INSET: f32 = 5.0;

    /// Spawn heights (above the visible field)
    pub const BLADE_SPAWN_Y: f32 = -50.0;
    pub const ENEMY_SPAWN_Y: f32 = -60.0;
    pub const POWER_UP_SPAWN_Y: f32 = -50.0;

    /// Loop driver clamps long frames (tab switches) to this many seconds
    pub const MAX_FRAME_DT: f32 = 0.1;
}
