//! Player preferences
//!
//! Persisted in LocalStorage, separately from the high score table.

use serde::{Deserialize, Serialize};

/// Display preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,
    /// Show the current phase name
    pub show_phase: bool,

    // === Visual Effects ===
    /// Colour wash over the background in the harder phases
    pub phase_tint: bool,
    /// Blue wash while time-slow is active
    pub time_slow_tint: bool,

    // === Accessibility ===
    /// Reduced motion (no full-screen colour washes)
    pub reduced_motion: bool,
    /// High contrast mode
    pub high_contrast: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_fps: false,
            show_phase: true,

            phase_tint: true,
            time_slow_tint: true,

            reduced_motion: false,
            high_contrast: false,
        }
    }
}

impl Settings {
    /// Effective phase tint (respects reduced_motion)
    pub fn effective_phase_tint(&self) -> bool {
        self.phase_tint && !self.reduced_motion
    }

    /// Effective time-slow tint (respects reduced_motion)
    pub fn effective_time_slow_tint(&self) -> bool {
        self.time_slow_tint && !self.reduced_motion
    }

    /// Opacity of the lane wall strips
    pub fn wall_alpha(&self) -> f32 {
        if self.high_contrast { 0.35 } else { 0.1 }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "ninja_ascent_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage
            && let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY)
        {
            match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring stored settings: {}", e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage
            && let Ok(json) = serde_json::to_string(self)
        {
            let _ = storage.set_item(Self::STORAGE_KEY, &json);
            log::info!("Settings saved");
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduced_motion_disables_washes() {
        let settings = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        assert!(!settings.effective_phase_tint());
        assert!(!settings.effective_time_slow_tint());
        assert!(Settings::default().effective_phase_tint());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "high_contrast": true }"#).expect("valid json");
        assert!(settings.high_contrast);
        assert!(settings.show_phase);
        assert!(settings.wall_alpha() > Settings::default().wall_alpha());
    }
}
