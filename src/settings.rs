//! Game settings and preferences
//!
//! Persisted separately from high scores.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, load_json, save_json};
use crate::sim::Difficulty;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Last difficulty picked on the select screen
    pub difficulty: Difficulty,

    // === Audio ===
    /// Silence everything (music and effects)
    pub muted: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,

    // === Visual Effects ===
    /// Confetti when a round sets a new high score
    pub confetti: bool,
    /// Draw explosion flashes
    pub explosions: bool,

    /// Hold the round while the window is unfocused
    pub pause_on_blur: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Easy,

            // Audio - on by default, music under the effects
            muted: false,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.3,

            // Visual effects - all on by default
            confetti: true,
            explosions: true,

            pause_on_blur: true,
        }
    }
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "asteroid_blaster_settings";

    /// Clamp volumes into range (hand-edited storage can hold anything)
    pub fn sanitize(&mut self) {
        for vol in [
            &mut self.master_volume,
            &mut self.sfx_volume,
            &mut self.music_volume,
        ] {
            *vol = if vol.is_finite() { (*vol).clamp(0.0, 1.0) } else { 0.0 };
        }
    }

    /// Effective effects volume (respects mute)
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Effective music volume (respects mute)
    pub fn effective_music_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.music_volume
        }
    }

    /// Whether background music should play at all
    pub fn effective_music(&self) -> bool {
        self.effective_music_volume() > 0.0
    }

    /// Load settings, falling back to defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let mut settings: Settings = load_json(store, Self::STORAGE_KEY);
        settings.sanitize();
        log::info!("Loaded settings (difficulty: {})", settings.difficulty.as_str());
        settings
    }

    /// Save settings. Failures are logged, never fatal.
    pub fn save(&self, store: &mut dyn KeyValueStore) {
        match save_json(store, Self::STORAGE_KEY, self) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Failed to save settings: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_defaults_when_nothing_stored() {
        let store = MemoryStore::new();
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_save_and_load() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            difficulty: Difficulty::Hard,
            muted: true,
            ..Default::default()
        };
        settings.save(&mut store);
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let mut store = MemoryStore::new();
        store
            .set("asteroid_blaster_settings", r#"{"difficulty":"extreme"}"#)
            .unwrap();
        let settings = Settings::load(&store);
        assert_eq!(settings.difficulty, Difficulty::Extreme);
        assert_eq!(settings.music_volume, Settings::default().music_volume);
    }

    #[test]
    fn test_volumes_are_clamped() {
        let mut store = MemoryStore::new();
        store
            .set(
                "asteroid_blaster_settings",
                r#"{"master_volume":3.0,"sfx_volume":-1.0}"#,
            )
            .unwrap();
        let settings = Settings::load(&store);
        assert_eq!(settings.master_volume, 1.0);
        assert_eq!(settings.sfx_volume, 0.0);
    }

    #[test]
    fn test_mute_silences_everything() {
        let settings = Settings {
            muted: true,
            ..Default::default()
        };
        assert_eq!(settings.effective_sfx_volume(), 0.0);
        assert!(!settings.effective_music());
        assert!(Settings::default().effective_music());
    }

    #[test]
    fn test_effective_volumes_scale_by_master() {
        let settings = Settings {
            master_volume: 0.5,
            sfx_volume: 0.8,
            music_volume: 0.0,
            ..Default::default()
        };
        assert_eq!(settings.effective_sfx_volume(), 0.4);
        assert_eq!(settings.effective_music_volume(), 0.0);
        assert!(!settings.effective_music());
    }
}
