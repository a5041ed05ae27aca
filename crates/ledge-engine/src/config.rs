//! Harness configuration.
//!
//! Simulation rates, the run length, asset paths and the embedded controller
//! tuning and bindings. Configuration can be loaded from and saved to a TOML
//! file.

use ledge_common::{LedgeError, LedgeResult};
use ledge_gameplay::{ControlSettings, KeyBindings, MovementTuning};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Harness configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Timing ===
    /// Fixed simulation ticks per second
    pub ticks_per_second: u32,
    /// Simulated render frames per second
    pub frame_rate: u32,
    /// Render frames to simulate
    pub frames: u32,
    /// Largest random deviation of a frame's length, as a fraction of it
    pub frame_jitter: f32,

    // === Run ===
    /// Seed for frame jitter and effect randomness
    pub seed: u64,
    /// ASCII level file (None = built-in demo level)
    pub level: Option<PathBuf>,
    /// Key script file (None = built-in demo script)
    pub script: Option<PathBuf>,
    /// Attach range of every grapple point in the level
    pub grapple_range: f32,

    // === Controller ===
    /// Movement tuning
    pub tuning: MovementTuning,
    /// Key bindings
    pub bindings: KeyBindings,
    /// Control settings
    pub settings: ControlSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 60,
            frame_rate: 60,
            frames: 600,
            frame_jitter: 0.2,

            seed: 0x1ed9e,
            level: None,
            script: None,
            grapple_range: 64.0,

            tuning: MovementTuning::default(),
            bindings: KeyBindings::default(),
            settings: ControlSettings::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a specific path.
    ///
    /// Missing or unreadable files fall back to defaults.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }

        match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read config file: {e}");
                    return Self::default();
                }

                match toml::from_str(&contents) {
                    Ok(config) => {
                        info!("Loaded config from {}", path.display());
                        config
                    },
                    Err(e) => {
                        warn!("Failed to parse config file: {e}");
                        Self::default()
                    },
                }
            },
            Err(e) => {
                warn!("Failed to open config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> LedgeResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| LedgeError::Serialization(e.to_string()))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp harness values to sensible ranges.
    ///
    /// Controller tuning is checked separately when the character spawns.
    pub fn validate(&mut self) {
        self.ticks_per_second = self.ticks_per_second.clamp(10, 240);
        self.frame_rate = self.frame_rate.clamp(1, 480);
        self.frames = self.frames.min(1_000_000);
        self.frame_jitter = self.frame_jitter.clamp(0.0, 0.9);
        self.grapple_range = self.grapple_range.max(1.0);
    }

    /// Length of one fixed tick in seconds.
    #[must_use]
    pub fn tick_seconds(&self) -> f32 {
        1.0 / self.ticks_per_second.max(1) as f32
    }

    /// Nominal length of one render frame in seconds.
    #[must_use]
    pub fn frame_seconds(&self) -> f32 {
        1.0 / self.frame_rate.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledge_gameplay::{Action, JumpToFallExit, KeyCode};
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.ticks_per_second, 60);
        assert_eq!(config.frame_rate, 60);
        assert!(config.level.is_none());
        assert_eq!(config.tuning, MovementTuning::default());
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();

        config.ticks_per_second = 0;
        config.frame_rate = 10_000;
        config.frame_jitter = 3.0;
        config.grapple_range = -5.0;

        config.validate();

        assert_eq!(config.ticks_per_second, 10);
        assert_eq!(config.frame_rate, 480);
        assert!((config.frame_jitter - 0.9).abs() < 0.001);
        assert!((config.grapple_range - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("ledge.toml");

        let mut config = EngineConfig::default();
        config.frames = 90;
        config.seed = 42;
        config.level = Some(PathBuf::from("levels/cave.txt"));
        config.tuning.jump_to_fall_exit = JumpToFallExit::AfterTicks(5);
        config.tuning.jump_force = 4.5;
        config.bindings.rebind(Action::Dash, vec![KeyCode::X]);
        config.settings.up_to_jump = true;

        config.save_to(&config_path).expect("Failed to save config");

        let loaded = EngineConfig::load_from(&config_path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("partial.toml");
        fs::write(
            &config_path,
            "frames = 30\n\n[tuning]\ngravity = 0.5\n",
        )
        .expect("Failed to write config");

        let loaded = EngineConfig::load_from(&config_path);
        assert_eq!(loaded.frames, 30);
        assert!((loaded.tuning.gravity - 0.5).abs() < f32::EPSILON);
        assert_eq!(
            loaded.tuning.jump_force,
            MovementTuning::default().jump_force
        );
        assert_eq!(loaded.bindings, KeyBindings::default());
    }

    #[test]
    fn test_config_load_missing_file() {
        let config = EngineConfig::load_from("/nonexistent/path/ledge.toml");
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_config_load_invalid_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("broken.toml");
        fs::write(&config_path, "frames = \"many\"").expect("Failed to write config");

        let config = EngineConfig::load_from(&config_path);
        assert_eq!(config.frames, EngineConfig::default().frames);
    }

    #[test]
    fn test_tick_seconds() {
        let mut config = EngineConfig::default();
        config.ticks_per_second = 50;
        assert!((config.tick_seconds() - 0.02).abs() < 1e-6);
        assert!((config.frame_seconds() - 1.0 / 60.0).abs() < 1e-6);
    }
}
