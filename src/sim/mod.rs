//! Simulation module
//!
//! All gameplay logic lives here. This module must stay free of rendering and
//! platform dependencies:
//! - Variable timestep, driven by the host's frame clock
//! - Randomness only through an injected `RandomSource`
//! - Stable iteration order (spawn order)

pub mod autopilot;
pub mod collision;
pub mod difficulty;
pub mod event;
pub mod rng;
pub mod session;
pub mod spawn;
pub mod state;
pub mod world;

pub use autopilot::Autopilot;
pub use collision::{Aabb, hit_test};
pub use difficulty::{DifficultyController, DifficultyOutcome, classify};
pub use event::GameEvent;
pub use rng::{EntropySource, RandomSource, ScriptedRandom};
pub use session::{GameSession, InputResponse, ScoreReporter, SessionConfig};
pub use spawn::{Hazard, PowerUpDrop, SpawnPlan};
pub use state::{
    BladeMount, Effects, Lane, Lifecycle, Ninja, Obstacle, ObstacleKind, Phase, PowerUpKind,
};
pub use world::{World, WorldContext, WorldReport};
