//! Persisted editor settings

use egui::Color32;
use notecore::storage::{self, config_dir, StorageError};
use notecore::theme::{parse_hex, to_hex, Palette};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "notepad";
const MIN_AUTOSAVE_SECS: u64 = 5;

/// Settings that survive restarts
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub dark_mode: bool,
    /// Custom text area background as `#RRGGBB`; `None` follows the mode
    pub background: Option<String>,
    /// Base font size of the text area in points
    pub font_size: f32,
    pub word_wrap: bool,
    pub autosave_enabled: bool,
    pub autosave_interval_secs: u64,
    /// Autosave target, relative paths resolve against the working directory
    pub autosave_path: PathBuf,
    pub recent_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dark_mode: false,
            background: None,
            font_size: 14.0,
            word_wrap: true,
            autosave_enabled: true,
            autosave_interval_secs: 120,
            autosave_path: PathBuf::from("autosave.txt"),
            recent_limit: 10,
        }
    }
}

impl Settings {
    pub fn config_path() -> PathBuf {
        config_dir(APP_NAME).join("settings.json")
    }

    /// Load from the default location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match storage::load_json::<Settings>(path) {
            Ok(settings) => settings,
            Err(StorageError::NotFound(_)) => Self::default(),
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "bad settings file, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        self.save_to(&Self::config_path());
    }

    pub fn save_to(&self, path: &Path) {
        if let Err(e) = storage::save_json(path, self) {
            tracing::warn!(error = %e, "failed to save settings");
        }
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs.max(MIN_AUTOSAVE_SECS))
    }

    /// Text area colours for the current mode and background
    pub fn palette(&self) -> Palette {
        let base = Palette::for_mode(self.dark_mode);
        match self.background.as_deref().and_then(parse_hex) {
            Some(bg) => base.with_background(bg),
            None => base,
        }
    }

    pub fn set_background(&mut self, color: Color32) {
        self.background = Some(to_hex(color));
    }

    /// Flip light/dark; any custom background is dropped.
    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
        self.background = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notecore::theme::NoteColors;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Settings::load_from(&dir.path().join("none.json")), Settings::default());
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_round_trip_and_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut settings = Settings::default();
        settings.dark_mode = true;
        settings.autosave_interval_secs = 30;
        settings.save_to(&path);
        assert_eq!(Settings::load_from(&path), settings);

        std::fs::write(&path, r#"{ "font_size": 18.0 }"#).unwrap();
        let partial = Settings::load_from(&path);
        assert_eq!(partial.font_size, 18.0);
        assert_eq!(partial.autosave_path, PathBuf::from("autosave.txt"));
    }

    #[test]
    fn test_autosave_interval_has_floor() {
        let mut settings = Settings::default();
        assert_eq!(settings.autosave_interval(), Duration::from_secs(120));
        settings.autosave_interval_secs = 0;
        assert_eq!(settings.autosave_interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_palette_and_dark_toggle() {
        let mut settings = Settings::default();
        settings.set_background(NoteColors::FOUND);
        assert_eq!(settings.palette().background, NoteColors::FOUND);
        settings.toggle_dark_mode();
        assert!(settings.dark_mode);
        assert_eq!(settings.palette(), Palette::dark());
        settings.toggle_dark_mode();
        assert_eq!(settings.palette(), Palette::light());
    }
}
