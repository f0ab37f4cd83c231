//! Scene composition
//!
//! Turns a session snapshot into an ordered list of rectangles in field
//! coordinates. Pure: the GPU backend only uploads what this produces, and
//! tests can inspect a frame without a device.

use super::assets::{AssetId, AssetSource};
use super::vertex::colors;
use crate::consts::*;
use crate::settings::Settings;
use crate::sim::{Aabb, GameSession, Lane, ObstacleKind, Phase, PowerUpKind};

/// HUD shield icon slot
const SHIELD_ICON: Aabb = Aabb {
    min: glam::Vec2::new(20.0, 60.0),
    size: glam::Vec2::new(40.0, 40.0),
};
/// Time-slow bar at full charge
const TIME_SLOW_BAR: Aabb = Aabb {
    min: glam::Vec2::new(20.0, 110.0),
    size: glam::Vec2::new(100.0, 6.0),
};

/// How a rectangle is filled
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Image(AssetId),
    Solid([f32; 4]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawOp {
    pub rect: Aabb,
    pub paint: Paint,
    /// Mirror horizontally
    pub flip_x: bool,
}

/// Back-to-front draw list for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub ops: Vec<DrawOp>,
}

impl Frame {
    fn push(&mut self, rect: Aabb, paint: Paint) {
        self.ops.push(DrawOp {
            rect,
            paint,
            flip_x: false,
        });
    }

    /// Image if it is ready, otherwise its placeholder colour
    fn sprite(&mut self, rect: Aabb, id: AssetId, assets: &dyn AssetSource, flip_x: bool) {
        let paint = if assets.is_ready(id) {
            Paint::Image(id)
        } else {
            Paint::Solid(id.placeholder())
        };
        self.ops.push(DrawOp { rect, paint, flip_x });
    }
}

fn full_field() -> Aabb {
    Aabb::new(0.0, 0.0, FIELD_WIDTH, FIELD_HEIGHT)
}

fn obstacle_asset(kind: ObstacleKind) -> AssetId {
    match kind {
        ObstacleKind::Blade(_) => AssetId::Blade,
        ObstacleKind::Enemy(_) => AssetId::Enemy,
        ObstacleKind::PowerUp(PowerUpKind::Shield) => AssetId::ShieldIcon,
        ObstacleKind::PowerUp(PowerUpKind::TimeSlow) => AssetId::TimeOrb,
    }
}

fn phase_tint(phase: Phase) -> Option<[f32; 4]> {
    match phase {
        Phase::Intense => Some(colors::INTENSE_TINT),
        Phase::IceHell => Some(colors::ICE_TINT),
        Phase::Abyss => Some(colors::ABYSS_TINT),
        _ => None,
    }
}

/// Build the draw list for the current state
pub fn compose(session: &GameSession, assets: &dyn AssetSource, settings: &Settings) -> Frame {
    let mut frame = Frame::default();
    let phase = session.phase();

    // Background
    let background = if phase.is_super() {
        AssetId::IceBackground
    } else {
        AssetId::Background
    };
    frame.sprite(full_field(), background, assets, false);

    if settings.effective_phase_tint()
        && let Some(tint) = phase_tint(phase)
    {
        frame.push(full_field(), Paint::Solid(tint));
    }
    if settings.effective_time_slow_tint() && session.effects().time_slow_active() {
        frame.push(full_field(), Paint::Solid(colors::TIME_SLOW_TINT));
    }

    // Lane walls
    let wall = Paint::Solid([1.0, 1.0, 1.0, settings.wall_alpha()]);
    frame.push(Aabb::new(0.0, 0.0, WALL_STRIP_WIDTH, FIELD_HEIGHT), wall);
    frame.push(
        Aabb::new(FIELD_WIDTH - WALL_STRIP_WIDTH, 0.0, WALL_STRIP_WIDTH, FIELD_HEIGHT),
        wall,
    );

    for obstacle in &session.world().obstacles {
        frame.sprite(obstacle.bounds(), obstacle_asset(obstacle.kind), assets, false);
    }

    let ninja = session.ninja();
    frame.sprite(ninja.bounds(), AssetId::Player, assets, ninja.lane == Lane::Right);

    // HUD
    let effects = session.effects();
    if effects.shield_held {
        frame.sprite(SHIELD_ICON, AssetId::ShieldIcon, assets, false);
    }
    if let Some(remaining) = effects.time_slow_remaining {
        let fraction = (remaining / session.tuning().time_slow_duration).clamp(0.0, 1.0);
        let mut bar = TIME_SLOW_BAR;
        bar.size.x *= fraction;
        frame.push(bar, Paint::Solid(colors::TIME_SLOW_BAR));
    }

    if session.lifecycle() == crate::sim::Lifecycle::GameOver {
        frame.push(full_field(), Paint::Solid(colors::GAME_OVER_DIM));
    }

    frame
}

/// Values the DOM HUD shows
#[derive(Debug, Clone, PartialEq)]
pub struct HudSnapshot {
    /// Whole metres
    pub distance: u64,
    pub best: u64,
    pub phase: &'static str,
    pub shield: bool,
    /// Seconds of time-slow left
    pub time_slow: Option<f32>,
    pub game_over: bool,
}

impl HudSnapshot {
    pub fn capture(session: &GameSession) -> Self {
        Self {
            distance: session.distance().floor() as u64,
            best: session.high_score().floor() as u64,
            phase: session.phase().label(),
            shield: session.effects().shield_held,
            time_slow: session.effects().time_slow_remaining,
            game_over: session.lifecycle() == crate::sim::Lifecycle::GameOver,
        }
    }
}
