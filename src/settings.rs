//! Game settings and preferences
//!
//! Persisted in LocalStorage in the browser; read from an optional JSON
//! file on native. Physics is not configurable.

use serde::{Deserialize, Serialize};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    /// Stars in the night sky for this preset
    pub fn star_count(&self) -> usize {
        match self {
            QualityPreset::Low => 50,
            QualityPreset::Medium => 150,
            QualityPreset::High => 300,
        }
    }

    /// Drifting clouds for this preset
    pub fn cloud_count(&self) -> usize {
        match self {
            QualityPreset::Low => 3,
            QualityPreset::Medium | QualityPreset::High => 5,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Overrides the preset's star count
    pub star_count: Option<usize>,
    /// Overrides the preset's cloud count
    pub cloud_count: Option<usize>,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            star_count: None,
            cloud_count: None,

            show_fps: false,

            master_volume: 1.0,
            sfx_volume: 1.0,
            music_volume: 1.0,
            muted: false,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Effective star count
    pub fn stars(&self) -> usize {
        self.star_count.unwrap_or_else(|| self.quality.star_count())
    }

    /// Effective cloud count
    pub fn clouds(&self) -> usize {
        self.cloud_count.unwrap_or_else(|| self.quality.cloud_count())
    }

    /// Clamp volumes into range after loading
    pub fn sanitized(mut self) -> Self {
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self.music_volume = self.music_volume.clamp(0.0, 1.0);
        self
    }

    /// Flip the mute flag and return the new value
    pub fn toggle_muted(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    /// Parse settings JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Settings>(json).map(Settings::sanitized)
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "night_flap_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {e}"),
                }
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

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Settings file read by native builds
    #[cfg(not(target_arch = "wasm32"))]
    pub const SETTINGS_FILE: &'static str = "night-flap.json";

    /// Load settings from `night-flap.json` if present (native)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::load_from(Self::SETTINGS_FILE)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(_) => {
                log::debug!("No settings file at {}, using defaults", path.display());
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_counts() {
        assert_eq!(Settings::from_preset(QualityPreset::Low).stars(), 50);
        assert_eq!(Settings::from_preset(QualityPreset::Low).clouds(), 3);
        assert_eq!(Settings::default().stars(), 150);
        assert_eq!(Settings::default().clouds(), 5);
        assert_eq!(Settings::from_preset(QualityPreset::High).stars(), 300);
    }

    #[test]
    fn test_overrides_win_over_preset() {
        let settings = Settings::from_json(r#"{"quality": "Low", "star_count": 7}"#).unwrap();
        assert_eq!(settings.stars(), 7);
        assert_eq!(settings.clouds(), 3);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{"muted": true}"#).unwrap();
        assert!(settings.muted);
        assert_eq!(settings.quality, QualityPreset::Medium);
        assert_eq!(settings.master_volume, 1.0);
    }

    #[test]
    fn test_volumes_are_clamped() {
        let settings = Settings::from_json(r#"{"master_volume": 3.0, "sfx_volume": -1.0}"#).unwrap();
        assert_eq!(settings.master_volume, 1.0);
        assert_eq!(settings.sfx_volume, 0.0);
    }

    #[test]
    fn test_toggle_muted_flips_and_reports() {
        let mut settings = Settings::default();
        assert!(settings.toggle_muted());
        assert!(settings.muted);
        assert!(!settings.toggle_muted());
        assert!(!settings.muted);
    }

    #[test]
    fn test_muted_survives_json() {
        let mut settings = Settings::from_preset(QualityPreset::Low);
        settings.toggle_muted();
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_missing_file_gives_defaults() {
        assert_eq!(
            Settings::load_from("/definitely/not/here/night-flap.json"),
            Settings::default()
        );
    }
}
