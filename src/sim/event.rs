//! Notifications raised during a tick, drained by the host once per frame

use super::state::{Phase, PowerUpKind};

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A new run began (first start or restart)
    Started,
    PhaseChanged { from: Phase, to: Phase },
    /// Distance passed the stored best for the first time this run
    NewRecord { distance: f64 },
    PowerUpCollected(PowerUpKind),
    /// The shield soaked a lethal hit
    ShieldAbsorbed,
    GameOver { distance: f64, new_best: bool },
}
