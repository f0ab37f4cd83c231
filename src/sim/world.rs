//! Obstacle and power-up registry
//!
//! Owns everything that falls. Each tick it counts down to the next spawn,
//! scrolls every entity toward the ninja, prunes what left the field and
//! resolves contacts. An entity leaves the registry exactly once: either by
//! falling off the bottom or by being resolved, never both.

use super::collision;
use super::rng::RandomSource;
use super::spawn;
use super::state::{Effects, Ninja, Obstacle, ObstacleKind, Phase, PowerUpKind};
use crate::consts::FIELD_HEIGHT;
use crate::tuning::Tuning;

/// Session state the world reads and the collisions it may mutate
pub struct WorldContext<'a> {
    pub phase: Phase,
    pub speed: f32,
    pub ninja: &'a Ninja,
    pub effects: &'a mut Effects,
    pub rng: &'a mut dyn RandomSource,
    pub tuning: &'a Tuning,
}

/// What happened during one world tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldReport {
    pub spawned: usize,
    /// Fell off the bottom of the field
    pub expired: usize,
    pub collected: Vec<PowerUpKind>,
    /// Lethal hits soaked by the shield
    pub absorbed: usize,
    /// Id of the unshielded lethal obstacle that ended the run
    pub fatal: Option<u32>,
}

/// How a single contact resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Collected(PowerUpKind),
    Absorbed,
    Fatal,
}

/// Apply the effect of touching `kind`
fn resolve(kind: ObstacleKind, effects: &mut Effects, tuning: &Tuning) -> Resolution {
    match kind {
        ObstacleKind::PowerUp(PowerUpKind::Shield) => {
            effects.shield_held = true;
            Resolution::Collected(PowerUpKind::Shield)
        }
        ObstacleKind::PowerUp(PowerUpKind::TimeSlow) => {
            // Refresh, never stack
            effects.time_slow_remaining = Some(tuning.time_slow_duration);
            Resolution::Collected(PowerUpKind::TimeSlow)
        }
        ObstacleKind::Blade(_) | ObstacleKind::Enemy(_) => {
            if effects.shield_held {
                effects.shield_held = false;
                Resolution::Absorbed
            } else {
                Resolution::Fatal
            }
        }
    }
}

/// Active falling entities plus the spawn countdown
#[derive(Debug, Clone, Default)]
pub struct World {
    /// Live entities in spawn order
    pub obstacles: Vec<Obstacle>,
    /// Seconds until the next spawn tick
    spawn_timer: f32,
    next_id: u32,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn_timer(&self) -> f32 {
        self.spawn_timer
    }

    /// Insert an entity built around a freshly allocated id
    pub fn spawn_with(&mut self, build: impl FnOnce(u32) -> Obstacle) -> u32 {
        let id = self.allocate_id();
        self.obstacles.push(build(id));
        id
    }

    fn allocate_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    /// Run the spawn policy and reset the countdown from the current speed
    fn spawn_tick(&mut self, ctx: &mut WorldContext<'_>) -> usize {
        let plan = spawn::plan(ctx.phase, &mut *ctx.rng);
        if !plan.is_empty() {
            log::debug!("{} spawn: {:?}", ctx.phase.label(), plan);
        }

        let before = self.obstacles.len();
        let obstacles = plan.into_obstacles(|| self.allocate_id());
        self.obstacles.extend(obstacles);

        // Faster scroll -> shorter countdown, so spacing on screen stays roughly even
        let speed_ratio = (ctx.speed / ctx.tuning.base_speed).max(ctx.tuning.min_speed_ratio);
        self.spawn_timer = ctx.tuning.spacing_for(ctx.phase) / speed_ratio;

        self.obstacles.len() - before
    }

    /// Advance the world by `dt` (already time-dilated) seconds
    pub fn update(&mut self, dt: f32, ctx: &mut WorldContext<'_>) -> WorldReport {
        let mut report = WorldReport::default();

        self.spawn_timer -= dt;
        if self.spawn_timer <= 0.0 {
            report.spawned = self.spawn_tick(ctx);
        }

        let ninja_bounds = ctx.ninja.bounds();
        let fall = ctx.speed * dt * ctx.tuning.position_scale;

        let mut i = 0;
        while i < self.obstacles.len() {
            let obstacle = &mut self.obstacles[i];
            obstacle.pos.y += fall;

            // Bounds first: an expired entity is never also charged a collision
            if obstacle.pos.y > FIELD_HEIGHT {
                self.obstacles.remove(i);
                report.expired += 1;
                continue;
            }

            if !collision::hit_test(&ninja_bounds, &obstacle.bounds()) {
                i += 1;
                continue;
            }

            match resolve(obstacle.kind, ctx.effects, ctx.tuning) {
                Resolution::Collected(kind) => {
                    log::info!("Collected {:?}", kind);
                    report.collected.push(kind);
                    self.obstacles.remove(i);
                }
                Resolution::Absorbed => {
                    log::info!("Shield absorbed {:?}", obstacle.kind);
                    report.absorbed += 1;
                    self.obstacles.remove(i);
                }
                Resolution::Fatal => {
                    // Leave the killer in place for the final frame
                    report.fatal = Some(obstacle.id);
                    break;
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::ScriptedRandom;
    use crate::sim::state::Lane;

    /// Trial phase with a high sample never spawns anything
    fn quiet_rng() -> ScriptedRandom {
        ScriptedRandom::constant(0.9)
    }

    fn on_ninja(ninja: &Ninja, mut obstacle: Obstacle) -> Obstacle {
        obstacle.pos.y = ninja.y;
        obstacle
    }

    struct Fixture {
        world: World,
        ninja: Ninja,
        effects: Effects,
        rng: ScriptedRandom,
        tuning: Tuning,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                world: World::new(),
                ninja: Ninja::default(),
                effects: Effects::default(),
                rng: quiet_rng(),
                tuning: Tuning::default(),
            }
        }

        fn tick(&mut self, dt: f32, phase: Phase, speed: f32) -> WorldReport {
            let mut ctx = WorldContext {
                phase,
                speed,
                ninja: &self.ninja,
                effects: &mut self.effects,
                rng: &mut self.rng,
                tuning: &self.tuning,
            };
            self.world.update(dt, &mut ctx)
        }
    }

    #[test]
    fn test_first_tick_spawns_and_sets_countdown() {
        let mut fx = Fixture::new();
        fx.rng = ScriptedRandom::new(vec![0.1, 0.7, 0.9]);
        let report = fx.tick(0.0, Phase::Trial, 3.0);
        assert_eq!(report.spawned, 1);
        assert_eq!(fx.world.obstacles.len(), 1);
        // TRIAL spacing 2.0 at base speed
        assert!((fx.world.spawn_timer() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_countdown_shrinks_with_speed() {
        let mut fx = Fixture::new();
        fx.tick(0.0, Phase::Core, 6.0);
        // CORE spacing 1.0, speed ratio 2.0
        assert!((fx.world.spawn_timer() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_speed_ratio_floor() {
        let mut fx = Fixture::new();
        fx.tick(0.0, Phase::Core, 0.0);
        assert!((fx.world.spawn_timer() - 1.0 / 0.1).abs() < 1e-4);
    }

    #[test]
    fn test_entities_fall_by_speed() {
        let mut fx = Fixture::new();
        fx.tick(0.0, Phase::Trial, 3.0);
        fx.world.spawn_with(|id| Obstacle::wall_blade(id, Lane::Right));
        fx.tick(0.1, Phase::Trial, 3.0);
        let blade = &fx.world.obstacles[0];
        assert!((blade.pos.y - (crate::consts::BLADE_SPAWN_Y + 3.0 * 0.1 * 100.0)).abs() < 1e-4);
    }

    #[test]
    fn test_off_field_entities_expire_without_contact() {
        let mut fx = Fixture::new();
        fx.tick(0.0, Phase::Trial, 3.0);
        fx.world.spawn_with(|id| {
            let mut blade = Obstacle::wall_blade(id, Lane::Left);
            blade.pos.y = FIELD_HEIGHT - 1.0;
            blade
        });
        let report = fx.tick(0.1, Phase::Trial, 3.0);
        assert_eq!(report.expired, 1);
        assert_eq!(report.fatal, None);
        assert!(fx.world.obstacles.is_empty());
    }

    #[test]
    fn test_unshielded_hit_is_fatal_and_leaves_entity() {
        let mut fx = Fixture::new();
        fx.tick(0.0, Phase::Trial, 3.0);
        let ninja = fx.ninja.clone();
        let id = fx.world.spawn_with(|id| on_ninja(&ninja, Obstacle::enemy(id, Lane::Left)));
        let report = fx.tick(0.0, Phase::Trial, 3.0);
        assert_eq!(report.fatal, Some(id));
        assert_eq!(fx.world.obstacles.len(), 1);
    }

    #[test]
    fn test_shield_absorbs_exactly_one_hit() {
        let mut fx = Fixture::new();
        fx.effects.shield_held = true;
        fx.tick(0.0, Phase::Trial, 3.0);
        let ninja = fx.ninja.clone();
        fx.world.spawn_with(|id| on_ninja(&ninja, Obstacle::enemy(id, Lane::Left)));
        let second = fx.world.spawn_with(|id| on_ninja(&ninja, Obstacle::wall_blade(id, Lane::Left)));

        let report = fx.tick(0.0, Phase::Trial, 3.0);
        assert_eq!(report.absorbed, 1);
        assert_eq!(report.fatal, Some(second));
        assert!(!fx.effects.shield_held);
        assert_eq!(fx.world.obstacles.len(), 1);
    }

    #[test]
    fn test_power_ups_refresh_without_stacking() {
        let mut fx = Fixture::new();
        fx.effects.shield_held = true;
        fx.effects.time_slow_remaining = Some(1.5);
        fx.tick(0.0, Phase::Trial, 3.0);
        let ninja = fx.ninja.clone();
        fx.world.spawn_with(|id| on_ninja(&ninja, Obstacle::power_up(id, PowerUpKind::Shield, Lane::Left)));
        fx.world.spawn_with(|id| on_ninja(&ninja, Obstacle::power_up(id, PowerUpKind::TimeSlow, Lane::Left)));

        let report = fx.tick(0.0, Phase::Trial, 3.0);
        assert_eq!(report.collected, vec![PowerUpKind::Shield, PowerUpKind::TimeSlow]);
        assert!(fx.effects.shield_held);
        assert_eq!(fx.effects.time_slow_remaining, Some(fx.tuning.time_slow_duration));
        assert!(fx.world.obstacles.is_empty());
    }

    #[test]
    fn test_other_lane_is_safe() {
        let mut fx = Fixture::new();
        fx.tick(0.0, Phase::Trial, 3.0);
        let ninja = fx.ninja.clone();
        fx.world.spawn_with(|id| on_ninja(&ninja, Obstacle::enemy(id, Lane::Right)));
        let report = fx.tick(0.0, Phase::Trial, 3.0);
        assert_eq!(report.fatal, None);
        assert_eq!(fx.world.obstacles.len(), 1);
    }

    #[test]
    fn test_each_entity_leaves_once() {
        let mut fx = Fixture::new();
        fx.rng = ScriptedRandom::new(vec![0.1, 0.2, 0.3, 0.8, 0.5, 0.05]);
        fx.effects.shield_held = true;
        let mut seen_ids = std::collections::HashSet::new();
        let mut removed = 0usize;
        let mut spawned = 0usize;
        for _ in 0..2_000 {
            fx.effects.shield_held = true;
            let before: Vec<u32> = fx.world.obstacles.iter().map(|o| o.id).collect();
            let report = fx.tick(1.0 / 60.0, Phase::Threat, 5.0);
            assert_eq!(report.fatal, None);
            spawned += report.spawned;
            removed += report.expired + report.absorbed + report.collected.len();
            let after: Vec<u32> = fx.world.obstacles.iter().map(|o| o.id).collect();
            for id in before.iter().filter(|id| !after.contains(id)) {
                assert!(seen_ids.insert(*id), "entity {} removed twice", id);
            }
        }
        assert_eq!(spawned, removed + fx.world.obstacles.len());
    }
}
