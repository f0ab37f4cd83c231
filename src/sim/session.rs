//! Game session state machine
//!
//! Top-level owner of one player's runs. The host creates a session once,
//! feeds it input and frame deltas, and drains [`GameEvent`]s after each
//! frame. Invalid transitions (updating while idle, starting while running)
//! are silent no-ops; nothing here can fail.

use super::difficulty::DifficultyController;
use super::event::GameEvent;
use super::rng::RandomSource;
use super::state::{Effects, Lifecycle, Ninja, Phase};
use super::world::{World, WorldContext};
use crate::tuning::Tuning;

/// Called with the final distance when a run beats the stored best
pub type ScoreReporter = Box<dyn FnMut(f64)>;

/// Everything a session needs from the host up front
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Opaque player identity, only used to label reports and logs
    pub user_id: Option<String>,
    /// Best distance so far; a run must strictly beat it to be reported
    pub high_score: f64,
    pub tuning: Tuning,
}

/// What a tap did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputResponse {
    /// Game over -> fresh run; the host should re-arm its frame loop
    Restarted,
    LaneSwitched,
    /// Not running yet
    Ignored,
}

pub struct GameSession {
    tuning: Tuning,
    user_id: Option<String>,
    lifecycle: Lifecycle,
    /// Seconds survived (dilated by time-slow)
    time_survived: f32,
    /// Metres travelled
    distance: f64,
    speed: f32,
    phase: Phase,
    effects: Effects,
    high_score: f64,
    ninja: Ninja,
    world: World,
    difficulty: DifficultyController,
    rng: Box<dyn RandomSource>,
    reporter: Option<ScoreReporter>,
    events: Vec<GameEvent>,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("lifecycle", &self.lifecycle)
            .field("time_survived", &self.time_survived)
            .field("distance", &self.distance)
            .field("speed", &self.speed)
            .field("phase", &self.phase)
            .field("effects", &self.effects)
            .field("high_score", &self.high_score)
            .field("obstacles", &self.world.obstacles.len())
            .finish_non_exhaustive()
    }
}

impl GameSession {
    /// Create an idle session
    pub fn new(config: SessionConfig, rng: impl RandomSource + 'static) -> Self {
        let SessionConfig {
            user_id,
            high_score,
            tuning,
        } = config;
        Self {
            speed: tuning.base_speed,
            tuning,
            user_id,
            lifecycle: Lifecycle::Idle,
            time_survived: 0.0,
            distance: 0.0,
            phase: Phase::default(),
            effects: Effects::default(),
            // A corrupt stored best must not block every future report
            high_score: if high_score.is_finite() { high_score.max(0.0) } else { 0.0 },
            ninja: Ninja::default(),
            world: World::new(),
            difficulty: DifficultyController::new(),
            rng: Box::new(rng),
            reporter: None,
            events: Vec::new(),
        }
    }

    /// Attach the callback that receives new best distances
    pub fn with_reporter(mut self, reporter: impl FnMut(f64) + 'static) -> Self {
        self.reporter = Some(Box::new(reporter));
        self
    }

    /// Begin a fresh run
    ///
    /// Returns `false` (and changes nothing) when a run is already in
    /// progress; `true` tells the host to arm its frame loop.
    pub fn start(&mut self) -> bool {
        if self.lifecycle == Lifecycle::Running {
            return false;
        }

        self.time_survived = 0.0;
        self.distance = 0.0;
        self.speed = self.tuning.base_speed;
        self.phase = Phase::default();
        self.effects = Effects::default();
        self.ninja = Ninja::default();
        self.world = World::new();
        self.difficulty = DifficultyController::new();
        self.lifecycle = Lifecycle::Running;
        self.events.push(GameEvent::Started);

        log::info!(
            "Run started (player {}, best {:.0} m)",
            self.user_id.as_deref().unwrap_or("guest"),
            self.high_score
        );
        true
    }

    /// Single control action: switch lanes, or restart after game over
    pub fn handle_input(&mut self) -> InputResponse {
        match self.lifecycle {
            Lifecycle::Running => {
                self.ninja.switch_lane();
                InputResponse::LaneSwitched
            }
            Lifecycle::GameOver => {
                self.start();
                InputResponse::Restarted
            }
            Lifecycle::Idle => InputResponse::Ignored,
        }
    }

    /// Advance the run by `dt` real seconds
    pub fn update(&mut self, dt: f32) {
        if self.lifecycle != Lifecycle::Running {
            return;
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        // Time dilation applies to this tick if the slow was active coming in
        let effective_dt = if self.effects.time_slow_active() {
            dt * self.tuning.time_slow_factor
        } else {
            dt
        };
        self.effects.tick_time_slow(dt);

        self.time_survived += effective_dt;
        self.distance += f64::from(self.speed * effective_dt) * f64::from(self.tuning.distance_scale);

        let outcome = self.difficulty.evaluate(
            self.time_survived,
            self.distance,
            dt,
            &mut self.speed,
            self.high_score,
            &self.tuning,
        );
        if outcome.phase != self.phase {
            log::info!("Phase {} -> {}", self.phase.label(), outcome.phase.label());
            self.events.push(GameEvent::PhaseChanged {
                from: self.phase,
                to: outcome.phase,
            });
            self.phase = outcome.phase;
        }
        if outcome.record_crossed {
            log::info!("New record at {:.0} m", self.distance);
            self.events.push(GameEvent::NewRecord {
                distance: self.distance,
            });
        }

        self.ninja.update(effective_dt);

        let mut ctx = WorldContext {
            phase: self.phase,
            speed: self.speed,
            ninja: &self.ninja,
            effects: &mut self.effects,
            rng: self.rng.as_mut(),
            tuning: &self.tuning,
        };
        let report = self.world.update(effective_dt, &mut ctx);

        self.events
            .extend(report.collected.iter().map(|kind| GameEvent::PowerUpCollected(*kind)));
        self.events
            .extend(std::iter::repeat_n(GameEvent::ShieldAbsorbed, report.absorbed));

        if report.fatal.is_some() {
            self.end_game();
        }
    }

    /// Finish the current run; no-op unless running
    pub fn end_game(&mut self) {
        if self.lifecycle != Lifecycle::Running {
            return;
        }
        self.lifecycle = Lifecycle::GameOver;

        let distance = self.distance;
        let new_best = distance > self.high_score;
        if new_best {
            self.high_score = distance;
            if let Some(report) = self.reporter.as_mut() {
                report(distance);
            }
        }
        log::info!(
            "Game over at {:.0} m after {:.1} s{}",
            distance,
            self.time_survived,
            if new_best { " (new best)" } else { "" }
        );
        self.events.push(GameEvent::GameOver { distance, new_best });
    }

    /// Take every event queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn time_survived(&self) -> f32 {
        self.time_survived
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn effects(&self) -> &Effects {
        &self.effects
    }

    pub fn high_score(&self) -> f64 {
        self.high_score
    }

    pub fn ninja(&self) -> &Ninja {
        &self.ninja
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::sim::rng::{EntropySource, ScriptedRandom};
    use crate::sim::state::{Lane, Obstacle, PowerUpKind};
    use proptest::prelude::*;

    /// Trial spawns nothing, later phases only drop right-wall or centre hazards
    fn calm_session(high_score: f64) -> GameSession {
        GameSession::new(
            SessionConfig {
                user_id: Some("tester".into()),
                high_score,
                tuning: Tuning::default(),
            },
            ScriptedRandom::constant(0.9),
        )
    }

    fn drop_on_ninja(session: &mut GameSession, build: impl FnOnce(u32) -> Obstacle) -> u32 {
        let y = session.ninja.y;
        session.world.spawn_with(|id| {
            let mut obstacle = build(id);
            obstacle.pos.y = y;
            obstacle
        })
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut session = calm_session(0.0);
        assert_eq!(session.lifecycle(), Lifecycle::Idle);
        assert_eq!(session.handle_input(), InputResponse::Ignored);

        session.update(0.1);
        assert_eq!(session.distance(), 0.0);

        assert!(session.start());
        assert!(!session.start());
        assert_eq!(session.handle_input(), InputResponse::LaneSwitched);
        assert_eq!(session.ninja().lane, Lane::Right);

        session.end_game();
        assert_eq!(session.lifecycle(), Lifecycle::GameOver);
        session.end_game();
        let over = session
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(over, 1);

        assert_eq!(session.handle_input(), InputResponse::Restarted);
        assert!(session.is_running());
    }

    #[test]
    fn test_invalid_dt_is_ignored() {
        let mut session = calm_session(0.0);
        session.start();
        session.update(f32::NAN);
        session.update(-1.0);
        session.update(f32::INFINITY);
        assert_eq!(session.distance(), 0.0);
        assert_eq!(session.time_survived(), 0.0);
    }

    #[test]
    fn test_eight_seconds_reaches_intro_with_ramp() {
        let mut session = calm_session(0.0);
        session.start();

        let mut expected = 0.0f64;
        for _ in 0..80 {
            expected += f64::from(session.speed() * 0.1) * f64::from(session.tuning().distance_scale);
            session.update(0.1);
        }

        assert!(session.is_running());
        assert_eq!(session.phase(), Phase::Intro);
        assert!(session.speed() > session.tuning().base_speed);
        assert!(session.speed() <= session.tuning().max_speed);
        assert!((session.distance() - expected).abs() < 1e-6);

        let events = session.drain_events();
        assert!(events.contains(&GameEvent::PhaseChanged {
            from: Phase::Trial,
            to: Phase::Intro
        }));
    }

    #[test]
    fn test_shield_absorbs_one_hit_then_death() {
        let mut session = calm_session(0.0);
        session.start();
        session.effects.shield_held = true;

        drop_on_ninja(&mut session, |id| Obstacle::enemy(id, Lane::Left));
        session.update(0.0);
        assert!(session.is_running());
        assert!(!session.effects().shield_held);
        assert!(session.world().obstacles.is_empty());

        drop_on_ninja(&mut session, |id| Obstacle::wall_blade(id, Lane::Left));
        session.update(0.0);
        assert_eq!(session.lifecycle(), Lifecycle::GameOver);
        assert_eq!(session.world().obstacles.len(), 1);

        let events = session.drain_events();
        assert!(events.contains(&GameEvent::ShieldAbsorbed));
    }

    #[test]
    fn test_power_ups_refresh() {
        let mut session = calm_session(0.0);
        session.start();
        session.effects.shield_held = true;

        drop_on_ninja(&mut session, |id| Obstacle::power_up(id, PowerUpKind::Shield, Lane::Left));
        session.update(0.0);
        assert!(session.effects().shield_held);
        assert!(session.world().obstacles.is_empty());

        session.effects.time_slow_remaining = Some(0.5);
        drop_on_ninja(&mut session, |id| Obstacle::power_up(id, PowerUpKind::TimeSlow, Lane::Left));
        session.update(0.0);
        assert_eq!(
            session.effects().time_slow_remaining,
            Some(session.tuning().time_slow_duration)
        );
    }

    #[test]
    fn test_time_slow_dilates_world_but_not_its_timer() {
        let mut session = calm_session(0.0);
        session.start();
        session.effects.time_slow_remaining = Some(1.0);

        session.update(0.2);
        assert!((session.time_survived() - 0.1).abs() < 1e-6);
        let remaining = session.effects().time_slow_remaining;
        assert!(remaining.is_some_and(|r| (r - 0.8).abs() < 1e-6));

        for _ in 0..5 {
            session.update(0.2);
        }
        assert!(!session.effects().time_slow_active());
    }

    #[test]
    fn test_restart_resets_run_state() {
        let mut session = calm_session(0.0);
        session.start();
        for _ in 0..30 {
            session.update(0.1);
        }
        session.handle_input();
        session.effects.shield_held = true;
        session.effects.time_slow_remaining = Some(2.0);
        session.world.spawn_with(|id| Obstacle::enemy(id, Lane::Right));
        session.end_game();
        let best = session.high_score();
        assert!(best > 0.0);

        assert_eq!(session.handle_input(), InputResponse::Restarted);
        assert_eq!(session.distance(), 0.0);
        assert_eq!(session.time_survived(), 0.0);
        assert_eq!(session.speed(), session.tuning().base_speed);
        assert_eq!(session.phase(), Phase::Trial);
        assert_eq!(*session.effects(), Effects::default());
        assert!(session.world().obstacles.is_empty());
        assert_eq!(session.ninja().lane, Lane::Left);
        assert_eq!(session.high_score(), best);
    }

    #[test]
    fn test_reporter_only_on_new_best() {
        let reported = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&reported);
        let mut session = calm_session(1_000.0).with_reporter(move |d| sink.borrow_mut().push(d));
        session.start();
        session.update(0.5);
        drop_on_ninja(&mut session, |id| Obstacle::enemy(id, Lane::Left));
        session.update(0.0);
        assert_eq!(session.lifecycle(), Lifecycle::GameOver);
        assert!(reported.borrow().is_empty());

        let sink = Rc::clone(&reported);
        let mut session = calm_session(10.0).with_reporter(move |d| sink.borrow_mut().push(d));
        session.start();
        session.update(0.5);
        drop_on_ninja(&mut session, |id| Obstacle::enemy(id, Lane::Left));
        session.update(0.0);
        let distance = session.distance();
        assert!(distance > 10.0);
        assert_eq!(*reported.borrow(), vec![distance]);
        assert_eq!(session.high_score(), distance);
        assert!(session.drain_events().contains(&GameEvent::GameOver {
            distance,
            new_best: true
        }));
    }

    #[test]
    fn test_new_record_event_once() {
        let mut session = calm_session(5.0);
        session.start();
        for _ in 0..30 {
            session.update(0.1);
        }
        let records = session
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::NewRecord { .. }))
            .count();
        assert_eq!(records, 1);
    }

    #[test]
    fn test_ice_hell_escalation_ignores_time() {
        let mut session = calm_session(0.0);
        session.start();
        session.distance = session.tuning().ice_threshold + 1.0;

        session.update(0.1);
        assert_eq!(session.phase(), Phase::IceHell);
        assert!(session.time_survived() < 1.0);

        for _ in 0..45 {
            session.update(0.1);
        }
        let expected = session.tuning().base_speed + session.tuning().ice.step;
        assert!((session.speed() - expected).abs() < 1e-4);

        session.speed = session.tuning().ice.cap - 0.1;
        for _ in 0..41 {
            session.update(0.1);
        }
        assert_eq!(session.speed(), session.tuning().ice.cap);
        assert!(session.is_running());
    }

    #[test]
    fn test_abyss_escalation_ignores_time() {
        let mut session = calm_session(0.0);
        session.start();
        session.distance = session.tuning().abyss_threshold + 1.0;

        for _ in 0..19 {
            session.update(0.1);
        }
        assert_eq!(session.phase(), Phase::Abyss);
        assert!(session.time_survived() < 2.0);
        assert_eq!(session.speed(), session.tuning().base_speed);

        for _ in 0..2 {
            session.update(0.1);
        }
        let expected = session.tuning().base_speed + session.tuning().abyss.step;
        assert!((session.speed() - expected).abs() < 1e-4);

        session.speed = session.tuning().abyss.cap - 0.1;
        for _ in 0..21 {
            session.update(0.1);
        }
        assert_eq!(session.speed(), session.tuning().abyss.cap);
        assert!(session.is_running());
    }

    #[test]
    fn test_corrupt_baseline_is_zeroed() {
        let session = calm_session(f64::NAN);
        assert_eq!(session.high_score(), 0.0);
    }

    proptest! {
        #[test]
        fn prop_distance_never_decreases(
            seed in any::<u64>(),
            dts in prop::collection::vec(0.0f32..0.1, 1..300)
        ) {
            let mut session = GameSession::new(SessionConfig::default(), EntropySource::seeded(seed));
            session.start();
            let mut last = session.distance();
            for dt in dts {
                session.update(dt);
                prop_assert!(session.distance() >= last);
                prop_assert!(session.speed() <= session.tuning().speed_cap(session.phase()) + 1e-4);
                last = session.distance();
            }
        }
    }
}
