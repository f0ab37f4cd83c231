//! Difficulty controller
//!
//! Phase is a pure function of survived time and distance. Speed is the only
//! carried state: it ramps linearly through the time bands and then climbs in
//! discrete steps once distance unlocks a super-phase.

use super::state::Phase;
use crate::tuning::Tuning;

/// Phase for a given survived time and distance
///
/// Super-phase distance gates win over the time bands unconditionally.
pub fn classify(t: f32, distance: f64, tuning: &Tuning) -> Phase {
    if distance > tuning.abyss_threshold {
        return Phase::Abyss;
    }
    if distance > tuning.ice_threshold {
        return Phase::IceHell;
    }

    let bands = &tuning.phase_bands;
    if t <= bands.trial_until {
        Phase::Trial
    } else if t <= bands.intro_until {
        Phase::Intro
    } else if t <= bands.axis_until {
        Phase::Axis
    } else if t <= bands.threat_until {
        Phase::Threat
    } else if t <= bands.core_until {
        Phase::Core
    } else {
        Phase::Intense
    }
}

/// Result of one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyOutcome {
    pub phase: Phase,
    /// Distance passed the baseline high score on this tick (fires once per run)
    pub record_crossed: bool,
}

/// Per-run difficulty state
#[derive(Debug, Clone, Default)]
pub struct DifficultyController {
    /// Seconds since the last super-phase speed bump
    escalation: f32,
    /// Super-phase the accumulator belongs to
    escalating_in: Option<Phase>,
    record_announced: bool,
}

impl DifficultyController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds accumulated toward the next super-phase bump
    pub fn escalation(&self) -> f32 {
        self.escalation
    }

    /// Recompute the phase and advance `speed` by one real-time step
    pub fn evaluate(
        &mut self,
        t: f32,
        distance: f64,
        dt: f32,
        speed: &mut f32,
        high_score: f64,
        tuning: &Tuning,
    ) -> DifficultyOutcome {
        let phase = classify(t, distance, tuning);
        let mut record_crossed = false;

        match phase {
            Phase::IceHell | Phase::Abyss => {
                let escalation = if phase == Phase::Abyss {
                    tuning.abyss
                } else {
                    tuning.ice
                };
                if self.escalating_in != Some(phase) {
                    self.escalating_in = Some(phase);
                    self.escalation = 0.0;
                }

                self.escalation += dt;
                if self.escalation >= escalation.interval {
                    *speed += escalation.step;
                    self.escalation = 0.0;
                    log::debug!("{} speed bump -> {:.2}", phase.label(), *speed);
                }
                *speed = speed.min(escalation.cap);
            }
            _ => {
                self.escalating_in = None;
                self.escalation = 0.0;

                if t > tuning.ramp_grace && *speed < tuning.max_speed {
                    let rate = if t > tuning.ramp_late_after {
                        tuning.ramp_rate_late
                    } else {
                        tuning.ramp_rate
                    };
                    *speed = (*speed + rate * dt).min(tuning.max_speed);
                }

                if !self.record_announced && high_score > 0.0 && distance > high_score {
                    self.record_announced = true;
                    record_crossed = true;
                }
            }
        }

        DifficultyOutcome {
            phase,
            record_crossed,
        }
    }
}
