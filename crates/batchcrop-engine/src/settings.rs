//! Persisted crop settings.
//!
//! The aspect ratio is the only state that survives a session. It lives in
//! a small JSON file in the per-user config directory, is read once when
//! the store opens, and is rewritten on every change. A missing or
//! unparsable file falls back to the square default rather than failing
//! startup.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ratio used when nothing has been persisted yet: square.
pub const DEFAULT_ASPECT_RATIO: f64 = 1.0;

/// Preset ratios offered by the crop tool, as `(label, width / height)`.
pub const ASPECT_RATIO_PRESETS: [(&str, f64); 5] = [
    ("16:9", 16.0 / 9.0),
    ("4:3", 4.0 / 3.0),
    ("1:1", 1.0),
    ("3:4", 3.0 / 4.0),
    ("9:16", 9.0 / 16.0),
];

const SETTINGS_FILE: &str = "settings.json";
const APP_DIR: &str = "batchcrop";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not write settings: {0}")]
    Write(#[from] io::Error),

    #[error("could not serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),

    /// No per-user config directory on this platform.
    #[error("no config directory available")]
    NoConfigDir,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedSettings {
    #[serde(rename = "aspectRatio")]
    aspect_ratio: f64,
}

/// Load-at-init / save-on-change store for the aspect ratio.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    aspect_ratio: f64,
}

impl SettingsStore {
    /// Open the store at the default per-user location.
    pub fn open_default() -> Result<Self, SettingsError> {
        let dir = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
        Ok(Self::open(dir.join(APP_DIR).join(SETTINGS_FILE)))
    }

    /// Open the store at an explicit path, reading any persisted ratio.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let aspect_ratio = load_ratio(&path).unwrap_or(DEFAULT_ASPECT_RATIO);
        Self { path, aspect_ratio }
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    /// Update the ratio and persist it immediately.
    pub fn set_aspect_ratio(&mut self, ratio: f64) -> Result<(), SettingsError> {
        self.aspect_ratio = ratio;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&PersistedSettings {
            aspect_ratio: ratio,
        })?;
        fs::write(&self.path, json)?;
        log::debug!("settings: aspect ratio {ratio} persisted");
        Ok(())
    }
}

fn load_ratio(path: &Path) -> Option<f64> {
    let content = fs::read_to_string(path).ok()?;
    let parsed: PersistedSettings = serde_json::from_str(&content).ok()?;
    (parsed.aspect_ratio.is_finite() && parsed.aspect_ratio > 0.0).then_some(parsed.aspect_ratio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings_path(dir: &TempDir) -> PathBuf {
        dir.path().join("nested").join(SETTINGS_FILE)
    }

    #[test]
    fn missing_file_defaults_to_square() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::open(settings_path(&dir));
        assert_eq!(store.aspect_ratio(), DEFAULT_ASPECT_RATIO);
    }

    #[test]
    fn ratio_round_trips_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = settings_path(&dir);

        let mut store = SettingsStore::open(&path);
        store.set_aspect_ratio(16.0 / 9.0).unwrap();
        drop(store);

        let reopened = SettingsStore::open(&path);
        assert_eq!(reopened.aspect_ratio(), 16.0 / 9.0);
    }

    #[test]
    fn every_change_is_persisted() {
        let dir = TempDir::new().unwrap();
        let path = settings_path(&dir);

        let mut store = SettingsStore::open(&path);
        for (_, ratio) in ASPECT_RATIO_PRESETS {
            store.set_aspect_ratio(ratio).unwrap();
            assert_eq!(SettingsStore::open(&path).aspect_ratio(), ratio);
        }
    }

    #[test]
    fn garbage_file_defaults_to_square() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "{not json at all").unwrap();
        assert_eq!(SettingsStore::open(&path).aspect_ratio(), DEFAULT_ASPECT_RATIO);
    }

    #[test]
    fn nonsense_ratio_defaults_to_square() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, r#"{"aspectRatio": -2.5}"#).unwrap();
        assert_eq!(SettingsStore::open(&path).aspect_ratio(), DEFAULT_ASPECT_RATIO);
    }

    #[test]
    fn file_uses_the_well_known_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILE);

        let mut store = SettingsStore::open(&path);
        store.set_aspect_ratio(0.75).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"aspectRatio\""));
    }
}
