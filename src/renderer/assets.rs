//! Sprite identities and readiness
//!
//! Images load asynchronously in the browser. Until one has decoded and been
//! uploaded, the scene draws a flat-colour stand-in, so a missing or broken
//! file never stalls the game.

use std::collections::HashSet;

use super::vertex::colors;

/// Every image the game draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetId {
    Player,
    Blade,
    Enemy,
    ShieldIcon,
    TimeOrb,
    Background,
    IceBackground,
}

impl AssetId {
    pub const ALL: [AssetId; 7] = [
        AssetId::Player,
        AssetId::Blade,
        AssetId::Enemy,
        AssetId::ShieldIcon,
        AssetId::TimeOrb,
        AssetId::Background,
        AssetId::IceBackground,
    ];

    /// Path relative to the page
    pub fn path(&self) -> &'static str {
        match self {
            AssetId::Player => "assets/ninja.png",
            AssetId::Blade => "assets/blade.png",
            AssetId::Enemy => "assets/enemy.png",
            AssetId::ShieldIcon => "assets/shield.png",
            AssetId::TimeOrb => "assets/time_orb.png",
            AssetId::Background => "assets/background.png",
            AssetId::IceBackground => "assets/ice_background.png",
        }
    }

    /// Flat colour drawn while the image is unavailable
    pub fn placeholder(&self) -> [f32; 4] {
        match self {
            AssetId::Player => colors::PLAYER,
            AssetId::Blade | AssetId::Enemy => colors::HAZARD,
            AssetId::ShieldIcon => colors::SHIELD,
            AssetId::TimeOrb => colors::TIME_ORB,
            AssetId::Background => colors::BACKGROUND,
            AssetId::IceBackground => colors::ICE_BACKGROUND,
        }
    }
}

/// Anything that can tell whether an image is drawable yet
pub trait AssetSource {
    fn is_ready(&self, id: AssetId) -> bool;
}

/// Readiness bookkeeping without a GPU (headless runs, tests)
#[derive(Debug, Clone, Default)]
pub struct AssetSet {
    ready: HashSet<AssetId>,
}

impl AssetSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything ready
    pub fn all() -> Self {
        Self {
            ready: AssetId::ALL.into_iter().collect(),
        }
    }

    pub fn mark_ready(&mut self, id: AssetId) {
        self.ready.insert(id);
    }

    pub fn ready_count(&self) -> usize {
        self.ready.len()
    }
}

impl AssetSource for AssetSet {
    fn is_ready(&self, id: AssetId) -> bool {
        self.ready.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readiness() {
        let mut assets = AssetSet::new();
        assert!(!assets.is_ready(AssetId::Player));
        assets.mark_ready(AssetId::Player);
        assets.mark_ready(AssetId::Player);
        assert!(assets.is_ready(AssetId::Player));
        assert_eq!(assets.ready_count(), 1);
        assert_eq!(AssetSet::all().ready_count(), AssetId::ALL.len());
    }

    #[test]
    fn test_paths_are_distinct() {
        let paths: HashSet<_> = AssetId::ALL.iter().map(|id| id.path()).collect();
        assert_eq!(paths.len(), AssetId::ALL.len());
    }
}
