//! Phase-conditioned spawn policy
//!
//! Each spawn tick draws at most one hazard plus an independent, rarer
//! power-up. The plan type only has room for one hazard, so a single tick can
//! never drop two lethal entities that close both lanes at once.

use super::rng::RandomSource;
use super::state::{Lane, Obstacle, Phase, PowerUpKind};
use crate::consts::FIELD_WIDTH;

/// A lethal entity to drop this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hazard {
    WallBlade(Lane),
    MidBlade { center_x: f32 },
    Enemy(Lane),
}

/// A power-up to drop this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerUpDrop {
    pub kind: PowerUpKind,
    pub lane: Lane,
}

/// Everything spawned on one spawn tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpawnPlan {
    pub hazard: Option<Hazard>,
    pub power_up: Option<PowerUpDrop>,
}

impl SpawnPlan {
    pub fn is_empty(&self) -> bool {
        self.hazard.is_none() && self.power_up.is_none()
    }

    /// Materialize the plan, allocating ids through `next_id`
    pub fn into_obstacles(self, mut next_id: impl FnMut() -> u32) -> Vec<Obstacle> {
        let mut out = Vec::with_capacity(2);
        if let Some(hazard) = self.hazard {
            let id = next_id();
            out.push(match hazard {
                Hazard::WallBlade(lane) => Obstacle::wall_blade(id, lane),
                Hazard::MidBlade { center_x } => Obstacle::mid_blade(id, center_x),
                Hazard::Enemy(lane) => Obstacle::enemy(id, lane),
            });
        }
        if let Some(drop) = self.power_up {
            out.push(Obstacle::power_up(next_id(), drop.kind, drop.lane));
        }
        out
    }
}

/// Mid-field blade centred somewhere in `[margin, FIELD_WIDTH - margin)`
fn random_mid_blade(rng: &mut dyn RandomSource, margin: f32) -> Hazard {
    Hazard::MidBlade {
        center_x: rng.range(margin, FIELD_WIDTH - margin),
    }
}

fn centre_blade() -> Hazard {
    Hazard::MidBlade {
        center_x: FIELD_WIDTH / 2.0,
    }
}

/// Power-up chance per spawn tick
fn power_up_chance(phase: Phase) -> f32 {
    match phase {
        Phase::Trial | Phase::Intro | Phase::Axis => 0.0,
        Phase::Threat => 0.05,
        Phase::Core | Phase::Intense => 0.03,
        Phase::IceHell => 0.04,
        Phase::Abyss => 0.05,
    }
}

fn pick_hazard(phase: Phase, rng: &mut dyn RandomSource) -> Option<Hazard> {
    let r = rng.next_f32();
    let hazard = match phase {
        Phase::Trial => {
            if r < 0.6 {
                Hazard::WallBlade(rng.lane())
            } else {
                return None;
            }
        }
        Phase::Intro => {
            if r < 0.6 {
                centre_blade()
            } else {
                Hazard::WallBlade(rng.lane())
            }
        }
        Phase::Axis => random_mid_blade(rng, 50.0),
        Phase::Threat => {
            if r < 0.2 {
                Hazard::Enemy(rng.lane())
            } else {
                random_mid_blade(rng, 50.0)
            }
        }
        Phase::Core | Phase::Intense => {
            let enemy_below = if phase == Phase::Core { 0.25 } else { 0.3 };
            if r < enemy_below {
                Hazard::Enemy(rng.lane())
            } else if r < 0.7 {
                random_mid_blade(rng, 30.0)
            } else {
                Hazard::WallBlade(rng.lane())
            }
        }
        // Super-phases: one wall-side threat at a time, never compound patterns
        Phase::IceHell | Phase::Abyss => {
            let (enemy_below, wall_below) = if phase == Phase::Abyss {
                (0.4, 0.8)
            } else {
                (0.35, 0.75)
            };
            if r < enemy_below {
                Hazard::Enemy(rng.lane())
            } else if r < wall_below {
                Hazard::WallBlade(rng.lane())
            } else {
                centre_blade()
            }
        }
    };
    Some(hazard)
}

/// Decide what to spawn on this spawn tick
pub fn plan(phase: Phase, rng: &mut dyn RandomSource) -> SpawnPlan {
    let hazard = pick_hazard(phase, rng);

    let power_up = if rng.chance(power_up_chance(phase)) {
        let kind = if rng.chance(0.5) {
            PowerUpKind::Shield
        } else {
            PowerUpKind::TimeSlow
        };
        Some(PowerUpDrop {
            kind,
            lane: rng.lane(),
        })
    } else {
        None
    };

    SpawnPlan { hazard, power_up }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::rng::{EntropySource, ScriptedRandom};
    use proptest::prelude::*;

    const ALL_PHASES: [Phase; 8] = [
        Phase::Trial,
        Phase::Intro,
        Phase::Axis,
        Phase::Threat,
        Phase::Core,
        Phase::Intense,
        Phase::IceHell,
        Phase::Abyss,
    ];

    /// Would a ninja parked in `lane` overlap any lethal spawn horizontally?
    fn lane_blocked(obstacles: &[Obstacle], lane: Lane) -> bool {
        let left = lane.wall_x(NINJA_WIDTH, LANE_INSET);
        let right = left + NINJA_WIDTH;
        obstacles
            .iter()
            .filter(|o| o.is_lethal())
            .any(|o| o.pos.x < right && o.pos.x + o.size.x > left)
    }

    #[test]
    fn test_trial_can_skip() {
        let mut rng = ScriptedRandom::constant(0.9);
        let plan = plan(Phase::Trial, &mut rng);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_trial_wall_blade() {
        // r = 0.1 -> blade, lane draw 0.7 -> right, power-up chance is zero
        let mut rng = ScriptedRandom::new(vec![0.1, 0.7, 0.0]);
        let plan = plan(Phase::Trial, &mut rng);
        assert_eq!(plan.hazard, Some(Hazard::WallBlade(Lane::Right)));
        assert_eq!(plan.power_up, None);
    }

    #[test]
    fn test_intro_prefers_centre_blade() {
        let mut rng = ScriptedRandom::new(vec![0.3, 0.9]);
        let plan = plan(Phase::Intro, &mut rng);
        assert_eq!(
            plan.hazard,
            Some(Hazard::MidBlade {
                center_x: FIELD_WIDTH / 2.0
            })
        );
    }

    #[test]
    fn test_axis_mid_blade_stays_inside_margin() {
        let mut rng = EntropySource::seeded(7);
        for _ in 0..200 {
            match plan(Phase::Axis, &mut rng).hazard {
                Some(Hazard::MidBlade { center_x }) => {
                    assert!((50.0..FIELD_WIDTH - 50.0).contains(&center_x));
                }
                other => panic!("unexpected hazard {:?}", other),
            }
        }
    }

    #[test]
    fn test_threat_enemy_and_power_up() {
        // r = 0.1 -> enemy, lane 0.2 -> left, p = 0.01 -> drop, kind 0.2 -> shield, lane 0.9 -> right
        let mut rng = ScriptedRandom::new(vec![0.1, 0.2, 0.01, 0.2, 0.9]);
        let plan = plan(Phase::Threat, &mut rng);
        assert_eq!(plan.hazard, Some(Hazard::Enemy(Lane::Left)));
        assert_eq!(
            plan.power_up,
            Some(PowerUpDrop {
                kind: PowerUpKind::Shield,
                lane: Lane::Right
            })
        );
    }

    #[test]
    fn test_abyss_never_spawns_random_mid_blades() {
        let mut rng = EntropySource::seeded(42);
        for _ in 0..500 {
            if let Some(Hazard::MidBlade { center_x }) = plan(Phase::Abyss, &mut rng).hazard {
                assert_eq!(center_x, FIELD_WIDTH / 2.0);
            }
        }
    }

    #[test]
    fn test_ids_allocated_in_order() {
        let plan = SpawnPlan {
            hazard: Some(Hazard::Enemy(Lane::Left)),
            power_up: Some(PowerUpDrop {
                kind: PowerUpKind::TimeSlow,
                lane: Lane::Right,
            }),
        };
        let mut next = 10;
        let obstacles = plan.into_obstacles(|| {
            next += 1;
            next
        });
        assert_eq!(obstacles.len(), 2);
        assert_eq!(obstacles[0].id, 11);
        assert_eq!(obstacles[1].id, 12);
    }

    proptest! {
        #[test]
        fn prop_one_lethal_per_tick_leaves_a_lane_open(seed in any::<u64>(), phase_idx in 0usize..8) {
            let phase = ALL_PHASES[phase_idx];
            let mut rng = EntropySource::seeded(seed);
            for _ in 0..32 {
                let plan = plan(phase, &mut rng);
                let mut id = 0;
                let obstacles = plan.into_obstacles(|| { id += 1; id });
                prop_assert!(obstacles.iter().filter(|o| o.is_lethal()).count() <= 1);
                prop_assert!(!(lane_blocked(&obstacles, Lane::Left) && lane_blocked(&obstacles, Lane::Right)));
            }
        }
    }
}
