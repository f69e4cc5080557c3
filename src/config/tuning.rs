use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::game::stats::types::SwordStats;

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialize: {0}")]
    Serialize(#[from] ron::Error),
}

/// All tunable forge parameters, loaded from tuning.ron.
#[derive(Debug, Clone, Resource, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub window_width: u32,
    pub window_height: u32,
    /// Owner recorded on newly forged swords.
    pub owner_id: String,
    /// Stat line of a fresh sword before any part is equipped.
    pub base_attack: i32,
    pub base_defense: i32,
    pub base_magic: i32,
    /// Seconds spent in each evolution phase before the next one fires.
    pub preparing_secs: f32,
    pub charging_secs: f32,
    pub transforming_secs: f32,
    /// Whether closing the evolution view before completion abandons it.
    /// When false the view stays open until the sequence completes.
    pub allow_cancel_evolution: bool,
    pub pixels_per_unit: f32,
    /// Pulse frequency of the sword visual while evolving.
    pub evolving_pulse_hz: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            window_width: 1000,
            window_height: 800,
            owner_id: "local-player".into(),
            base_attack: 10,
            base_defense: 5,
            base_magic: 0,
            preparing_secs: 1.2,
            charging_secs: 1.2,
            transforming_secs: 1.0,
            allow_cancel_evolution: true,
            pixels_per_unit: 40.0,
            evolving_pulse_hz: 2.5,
        }
    }
}

impl Tuning {
    pub fn base_stats(&self) -> SwordStats {
        SwordStats::new(self.base_attack, self.base_defense, self.base_magic)
    }

    /// Get the data directory for tuning files.
    pub fn data_dir() -> PathBuf {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("sword_forge")
    }

    /// Path to the tuning file.
    pub fn file_path() -> PathBuf {
        Self::data_dir().join("tuning.ron")
    }

    /// Load from file, or create default if not found.
    pub fn load_or_default() -> Self {
        let path = Self::file_path();
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match Self::parse(&contents) {
                    Ok(tuning) => return tuning,
                    Err(e) => {
                        warn!("Failed to parse tuning.ron: {e}, using defaults");
                    }
                },
                Err(e) => {
                    warn!("Failed to read tuning.ron: {e}, using defaults");
                }
            }
        }
        let tuning = Self::default();
        tuning.save();
        tuning
    }

    pub fn parse(contents: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(contents)
    }

    /// Save current tuning to file.
    pub fn save(&self) {
        let path = Self::file_path();
        if let Err(e) = self.write_to(&path) {
            warn!("Failed to save tuning to {}: {e}", path.display());
        }
    }

    fn write_to(&self, path: &Path) -> Result<(), TuningError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let pretty = ron::ser::PrettyConfig::default();
        std::fs::write(path, ron::ser::to_string_pretty(self, pretty)?)?;
        Ok(())
    }

    /// Reload from file (called by key press).
    pub fn reload(&mut self) {
        *self = Self::load_or_default();
        info!("Tuning reloaded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_falls_back_per_field() {
        let t = Tuning::parse("(charging_secs: 0.5, allow_cancel_evolution: false)").unwrap();
        assert_eq!(t.charging_secs, 0.5);
        assert!(!t.allow_cancel_evolution);
        assert_eq!(t.preparing_secs, Tuning::default().preparing_secs);
        assert_eq!(t.base_stats(), SwordStats::new(10, 5, 0));
    }

    #[test]
    fn pretty_output_parses_back() {
        let t = Tuning::default();
        let s = ron::ser::to_string_pretty(&t, ron::ser::PrettyConfig::default()).unwrap();
        let back = Tuning::parse(&s).unwrap();
        assert_eq!(back.owner_id, t.owner_id);
        assert_eq!(back.transforming_secs, t.transforming_secs);
    }

    #[test]
    fn write_reports_unusable_directory() {
        let root = std::env::temp_dir().join(format!("sword_forge_tuning_{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();
        let blocker = root.join("not_a_dir");
        std::fs::write(&blocker, "x").unwrap();

        let err = Tuning::default()
            .write_to(&blocker.join("tuning.ron"))
            .unwrap_err();
        assert!(matches!(err, TuningError::Io(_)));

        let ok = root.join("nested").join("tuning.ron");
        Tuning::default().write_to(&ok).unwrap();
        let back = Tuning::parse(&std::fs::read_to_string(&ok).unwrap()).unwrap();
        assert_eq!(back.base_stats(), Tuning::default().base_stats());

        std::fs::remove_dir_all(&root).unwrap();
    }
}
