//! Data-driven game balance
//!
//! Every number that shapes difficulty lives here so a build can be rebalanced
//! without touching the simulation. All fields default, so a JSON override only
//! needs the keys it changes.

use serde::{Deserialize, Serialize};

use crate::sim::Phase;

/// Inclusive upper bounds (seconds of survived time) of the time-banded phases
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseBands {
    pub trial_until: f32,
    pub intro_until: f32,
    pub axis_until: f32,
    pub threat_until: f32,
    pub core_until: f32,
}

impl Default for PhaseBands {
    fn default() -> Self {
        Self {
            trial_until: 5.0,
            intro_until: 10.0,
            axis_until: 20.0,
            threat_until: 35.0,
            core_until: 45.0,
        }
    }
}

/// Stepwise escalation used by a distance-gated super-phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Escalation {
    /// Seconds between speed bumps
    pub interval: f32,
    /// Speed added per bump
    pub step: f32,
    /// Hard speed cap while the phase is active
    pub cap: f32,
}

/// Spawn spacing multiplier per phase (bigger = sparser)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Spacing {
    pub trial: f32,
    pub intro: f32,
    pub axis: f32,
    pub threat: f32,
    pub core: f32,
    pub intense: f32,
    pub ice_hell: f32,
    pub abyss: f32,
}

impl Default for Spacing {
    fn default() -> Self {
        Self {
            trial: 2.0,
            intro: 1.5,
            axis: 1.25,
            threat: 1.15,
            core: 1.0,
            intense: 0.9,
            ice_hell: 0.8,
            abyss: 0.7,
        }
    }
}

/// Game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Scroll speed at the start of a run
    pub base_speed: f32,
    /// Speed cap for the time-banded phases
    pub max_speed: f32,
    /// Speed units to metres
    pub distance_scale: f32,
    /// Speed units to field pixels
    pub position_scale: f32,

    /// Time dilation while time-slow is active
    pub time_slow_factor: f32,
    /// Seconds a time orb lasts (refreshes, never stacks)
    pub time_slow_duration: f32,

    pub phase_bands: PhaseBands,

    /// Survived seconds before the speed ramp kicks in
    pub ramp_grace: f32,
    /// Speed units per second during the early ramp
    pub ramp_rate: f32,
    /// Survived seconds after which the late ramp rate applies
    pub ramp_late_after: f32,
    pub ramp_rate_late: f32,

    /// Distance (metres) beyond which ICE_HELL overrides the time bands
    pub ice_threshold: f64,
    pub ice: Escalation,
    /// Distance (metres) beyond which ABYSS overrides everything
    pub abyss_threshold: f64,
    pub abyss: Escalation,

    pub spacing: Spacing,
    /// Floor for speed / base_speed when deriving the spawn countdown
    pub min_speed_ratio: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            base_speed: 3.0,
            max_speed: 9.0,
            distance_scale: 10.0,
            position_scale: 100.0,

            time_slow_factor: 0.5,
            time_slow_duration: 5.0,

            phase_bands: PhaseBands::default(),

            ramp_grace: 2.0,
            ramp_rate: 0.05,
            ramp_late_after: 30.0,
            ramp_rate_late: 0.08,

            ice_threshold: 5_000.0,
            ice: Escalation {
                interval: 4.0,
                step: 0.4,
                cap: 16.0,
            },
            abyss_threshold: 10_000.0,
            abyss: Escalation {
                interval: 2.0,
                step: 0.8,
                cap: 25.0,
            },

            spacing: Spacing::default(),
            min_speed_ratio: 0.1,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON override on top of the defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Spawn spacing multiplier for a phase
    pub fn spacing_for(&self, phase: Phase) -> f32 {
        match phase {
            Phase::Trial => self.spacing.trial,
            Phase::Intro => self.spacing.intro,
            Phase::Axis => self.spacing.axis,
            Phase::Threat => self.spacing.threat,
            Phase::Core => self.spacing.core,
            Phase::Intense => self.spacing.intense,
            Phase::IceHell => self.spacing.ice_hell,
            Phase::Abyss => self.spacing.abyss,
        }
    }

    /// Speed cap that applies while `phase` is active
    pub fn speed_cap(&self, phase: Phase) -> f32 {
        match phase {
            Phase::IceHell => self.ice.cap,
            Phase::Abyss => self.abyss.cap,
            _ => self.max_speed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "base_speed": 4.0, "phase_bands": { "trial_until": 3.0 } }"#)
            .expect("valid json");
        assert_eq!(tuning.base_speed, 4.0);
        assert_eq!(tuning.phase_bands.trial_until, 3.0);
        assert_eq!(tuning.phase_bands.intro_until, 10.0);
        assert_eq!(tuning.max_speed, Tuning::default().max_speed);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(Tuning::from_json("{ not json").is_err());
    }

    #[test]
    fn test_spacing_tightens_with_difficulty() {
        let tuning = Tuning::default();
        assert!(tuning.spacing_for(Phase::Trial) > tuning.spacing_for(Phase::Core));
        assert!(tuning.spacing_for(Phase::Core) > tuning.spacing_for(Phase::IceHell));
        assert!(tuning.spacing_for(Phase::IceHell) > tuning.spacing_for(Phase::Abyss));
    }

    #[test]
    fn test_caps_increase_into_super_phases() {
        let tuning = Tuning::default();
        assert_eq!(tuning.speed_cap(Phase::Intense), 9.0);
        assert_eq!(tuning.speed_cap(Phase::IceHell), 16.0);
        assert_eq!(tuning.speed_cap(Phase::Abyss), 25.0);
        assert!(tuning.abyss_threshold > tuning.ice_threshold);
    }
}
