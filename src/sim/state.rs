//! Entity types and session-level enums
//!
//! Everything the world update touches per tick lives here: the ninja, the
//! falling obstacles and the effect flags they toggle.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::consts::*;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Lifecycle {
    /// Created, waiting for the first start
    #[default]
    Idle,
    /// Simulation advancing every frame
    Running,
    /// Run ended; the next input restarts
    GameOver,
}

/// Difficulty tier, recomputed every tick from survived time and distance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Trial,
    Intro,
    Axis,
    Threat,
    Core,
    Intense,
    /// Distance-gated, overrides the time bands
    IceHell,
    /// Distance-gated, terminal
    Abyss,
}

impl Phase {
    /// Distance-gated super-phase?
    pub fn is_super(&self) -> bool {
        matches!(self, Phase::IceHell | Phase::Abyss)
    }

    /// HUD label
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Trial => "TRIAL",
            Phase::Intro => "INTRO",
            Phase::Axis => "AXIS",
            Phase::Threat => "THREAT",
            Phase::Core => "CORE",
            Phase::Intense => "INTENSE",
            Phase::IceHell => "ICE HELL",
            Phase::Abyss => "ABYSS",
        }
    }
}

/// One of the two lanes hugging the field walls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lane {
    #[default]
    Left,
    Right,
}

impl Lane {
    pub fn opposite(self) -> Lane {
        match self {
            Lane::Left => Lane::Right,
            Lane::Right => Lane::Left,
        }
    }

    /// Left edge of an entity of `width` flush against this lane's wall, `inset` away
    pub fn wall_x(self, width: f32, inset: f32) -> f32 {
        match self {
            Lane::Left => inset,
            Lane::Right => FIELD_WIDTH - width - inset,
        }
    }
}

/// The player
#[derive(Debug, Clone)]
pub struct Ninja {
    pub lane: Lane,
    /// Current left edge (eased)
    pub x: f32,
    /// Lane slot the ninja is easing toward
    pub target_x: f32,
    /// Fixed top edge
    pub y: f32,
    pub size: Vec2,
}

impl Default for Ninja {
    fn default() -> Self {
        let x = Lane::Left.wall_x(NINJA_WIDTH, LANE_INSET);
        Self {
            lane: Lane::Left,
            x,
            target_x: x,
            y: FIELD_HEIGHT - NINJA_BOTTOM_OFFSET,
            size: Vec2::new(NINJA_WIDTH, NINJA_HEIGHT),
        }
    }
}

impl Ninja {
    /// Flip to the other lane; re-triggering mid-transition just retargets
    pub fn switch_lane(&mut self) {
        self.lane = self.lane.opposite();
        self.target_x = self.lane.wall_x(self.size.x, LANE_INSET);
    }

    /// Frame-rate independent exponential ease toward the lane slot
    pub fn update(&mut self, dt: f32) {
        let blend = 1.0 - LANE_EASE_BASE.powf(dt.max(0.0) * LANE_EASE_RATE);
        self.x += (self.target_x - self.x) * blend;
        if (self.target_x - self.x).abs() < LANE_SNAP {
            self.x = self.target_x;
        }
        self.x = self.x.clamp(0.0, FIELD_WIDTH - self.size.x);
    }

    /// Still sliding between lanes?
    pub fn in_transit(&self) -> bool {
        self.x != self.target_x
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.size.x, self.size.y)
    }
}

/// Where a blade is mounted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BladeMount {
    Wall(Lane),
    MidField,
}

/// Beneficial pickups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUpKind {
    /// Absorbs one lethal hit
    Shield,
    /// Halves the simulation rate for a while
    TimeSlow,
}

/// What a falling entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    Blade(BladeMount),
    Enemy(Lane),
    PowerUp(PowerUpKind),
}

impl ObstacleKind {
    /// Lethal unless a shield absorbs it
    pub fn is_lethal(&self) -> bool {
        match self {
            ObstacleKind::Blade(_) | ObstacleKind::Enemy(_) => true,
            ObstacleKind::PowerUp(_) => false,
        }
    }
}

/// A falling entity
#[derive(Debug, Clone)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
}

impl Obstacle {
    /// Blade flush against a wall
    pub fn wall_blade(id: u32, lane: Lane) -> Self {
        Self {
            id,
            kind: ObstacleKind::Blade(BladeMount::Wall(lane)),
            pos: Vec2::new(lane.wall_x(BLADE_SIZE, 0.0), BLADE_SPAWN_Y),
            size: Vec2::splat(BLADE_SIZE),
        }
    }

    /// Blade centred on `center_x`
    pub fn mid_blade(id: u32, center_x: f32) -> Self {
        Self {
            id,
            kind: ObstacleKind::Blade(BladeMount::MidField),
            pos: Vec2::new(center_x - BLADE_SIZE / 2.0, BLADE_SPAWN_Y),
            size: Vec2::splat(BLADE_SIZE),
        }
    }

    pub fn enemy(id: u32, lane: Lane) -> Self {
        Self {
            id,
            kind: ObstacleKind::Enemy(lane),
            pos: Vec2::new(lane.wall_x(ENEMY_SIZE, 0.0), ENEMY_SPAWN_Y),
            size: Vec2::splat(ENEMY_SIZE),
        }
    }

    pub fn power_up(id: u32, kind: PowerUpKind, lane: Lane) -> Self {
        Self {
            id,
            kind: ObstacleKind::PowerUp(kind),
            pos: Vec2::new(lane.wall_x(POWER_UP_SIZE, POWER_UP_INSET), POWER_UP_SPAWN_Y),
            size: Vec2::splat(POWER_UP_SIZE),
        }
    }

    pub fn is_lethal(&self) -> bool {
        self.kind.is_lethal()
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }
}

/// Power-up effects; independent, may overlap
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Effects {
    pub shield_held: bool,
    /// Seconds of time-slow left; `None` when inactive
    pub time_slow_remaining: Option<f32>,
}

impl Effects {
    pub fn time_slow_active(&self) -> bool {
        self.time_slow_remaining.is_some()
    }

    /// Count down the time-slow by real seconds, clearing it at zero
    pub fn tick_time_slow(&mut self, dt: f32) {
        if let Some(remaining) = self.time_slow_remaining {
            let left = remaining - dt;
            self.time_slow_remaining = (left > 0.0).then_some(left);
        }
    }
}
