//! Attract-mode autopilot
//!
//! Looks a short time ahead down the lane the ninja is heading for and asks
//! for a switch when a lethal obstacle will arrive there but the other lane
//! is clear over the same window.

use super::session::GameSession;
use super::state::{Lane, Obstacle};

#[derive(Debug, Clone, Copy)]
pub struct Autopilot {
    /// Seconds of scroll to look ahead
    pub reaction: f32,
}

impl Default for Autopilot {
    fn default() -> Self {
        // Roughly the time the lane ease needs to clear an obstacle's width
        Self { reaction: 0.45 }
    }
}

impl Autopilot {
    /// Should the host send a lane switch this frame?
    pub fn wants_switch(&self, session: &GameSession) -> bool {
        if !session.is_running() {
            return false;
        }

        let ninja = session.ninja();
        let lookahead = session.speed() * session.tuning().position_scale * self.reaction;
        let top = ninja.y - lookahead;
        let bottom = ninja.y + ninja.size.y;

        let threatens = |lane: Lane| {
            let left = lane.wall_x(ninja.size.x, crate::consts::LANE_INSET);
            let right = left + ninja.size.x;
            session.world().obstacles.iter().any(|o: &Obstacle| {
                o.is_lethal()
                    && o.pos.x < right
                    && o.pos.x + o.size.x > left
                    && o.pos.y + o.size.y > top
                    && o.pos.y < bottom
            })
        };

        threatens(ninja.lane) && !threatens(ninja.lane.opposite())
    }
}
