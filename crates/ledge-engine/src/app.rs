//! Headless run loop.
//!
//! Simulates render frames of jittered length, turns them into fixed ticks
//! and drives the character through a level with a key script.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use glam::Vec2;
use ledge_common::LedgeResult;
use ledge_gameplay::{
    Character, Controls, GrapplePoint, KeyboardState, LocomotionKind, ParticleLog, ParticleTag,
    TickContext,
};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::level::TileLevel;
use crate::script::InputScript;
use crate::timing::FixedStep;

const DEMO_LEVEL: &str = include_str!("../assets/levels/demo.txt");
const DEMO_SCRIPT: &str = include_str!("../assets/scripts/demo.txt");

/// Reads a level file, or the built-in demo level.
pub fn load_level(path: Option<&Path>) -> LedgeResult<TileLevel> {
    let text = match path {
        Some(path) => fs::read_to_string(path)?,
        None => DEMO_LEVEL.to_string(),
    };
    Ok(text.parse()?)
}

/// Reads a key script, or the built-in demo script.
pub fn load_script(path: Option<&Path>) -> LedgeResult<InputScript> {
    let text = match path {
        Some(path) => fs::read_to_string(path)?,
        None => DEMO_SCRIPT.to_string(),
    };
    Ok(text.parse()?)
}

/// Outcome of a headless run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Frames simulated
    pub frames: u32,
    /// Fixed ticks simulated
    pub ticks: u64,
    /// Final anchor position
    pub position: Vec2,
    /// Final locomotion state
    pub state: LocomotionKind,
    /// Locomotion changes observed between ticks
    pub transitions: u32,
    /// Dash burst particles emitted
    pub wind_particles: usize,
    /// Running dust particles emitted
    pub dust_particles: usize,
}

/// Everything a headless run owns.
pub struct Harness {
    config: EngineConfig,
    level: TileLevel,
    script: InputScript,
    grapples: Vec<GrapplePoint>,
    character: Character,
    keyboard: KeyboardState,
    particles: ParticleLog,
    step: FixedStep,
    rng: fastrand::Rng,
    transitions: u32,
}

impl Harness {
    /// Builds a harness from already loaded assets.
    pub fn new(config: EngineConfig, level: TileLevel, script: InputScript) -> Result<Self> {
        let anchor = level.spawn_anchor(config.tuning.box_offsets);
        let controls = Controls::new(config.bindings.clone(), config.settings);
        let character = Character::spawn(
            anchor,
            config.tuning.clone(),
            controls,
            &level,
            config.seed,
        )
        .with_context(|| format!("spawning character at {anchor}"))?;

        info!(
            width = level.width(),
            height = level.height(),
            spawn_x = level.spawn().x,
            spawn_y = level.spawn().y,
            segments = script.segments().len(),
            script_ticks = script.total_ticks(),
            "level loaded"
        );

        let step = FixedStep::new(config.tick_seconds());
        debug!(tick_seconds = step.fixed_dt(), "fixed step ready");

        Ok(Self {
            grapples: level.grapple_points(config.grapple_range),
            step,
            rng: fastrand::Rng::with_seed(config.seed),
            config,
            level,
            script,
            character,
            keyboard: KeyboardState::new(),
            particles: ParticleLog::new(),
            transitions: 0,
        })
    }

    /// Loads the configured level and script, then builds the harness.
    pub fn from_config(config: EngineConfig) -> Result<Self> {
        let level = load_level(config.level.as_deref()).context("loading level")?;
        let script = load_script(config.script.as_deref()).context("loading key script")?;
        Self::new(config, level, script)
    }

    /// The simulated character.
    #[must_use]
    pub fn character(&self) -> &Character {
        &self.character
    }

    /// Simulates one render frame, returning the ticks it covered.
    pub fn frame(&mut self) -> u32 {
        let jitter = self.config.frame_jitter * (self.rng.f32() * 2.0 - 1.0);
        let dt = self.config.frame_seconds() * (1.0 + jitter);
        let ticks = self.step.accumulate(dt);
        for _ in 0..ticks {
            self.tick();
        }
        ticks
    }

    /// Simulates one fixed tick with the scripted keys.
    pub fn tick(&mut self) {
        let held = self.script.held_at(self.character.tick_count());
        self.keyboard.apply_held(held);

        let before = self.character.kind();
        let ctx = TickContext::new(&mut self.keyboard, &self.level, &mut self.particles)
            .with_grapples(&self.grapples);
        self.character.tick(ctx);
        self.keyboard.end_tick();

        if self.character.kind() != before {
            self.transitions += 1;
        }
    }

    /// Runs every configured frame.
    pub fn run(&mut self) -> RunSummary {
        for frame in 0..self.config.frames {
            let ticks = self.frame();
            if ticks > 1 {
                debug!(frame, ticks, "frame covered several ticks");
            }
        }

        let summary = self.summary();
        info!(
            frames = summary.frames,
            ticks = summary.ticks,
            x = summary.position.x,
            y = summary.position.y,
            state = %summary.state,
            transitions = summary.transitions,
            wind = summary.wind_particles,
            dust = summary.dust_particles,
            "run finished"
        );
        summary
    }

    fn summary(&self) -> RunSummary {
        let character = self.character();
        RunSummary {
            frames: self.config.frames,
            ticks: self.step.total_ticks(),
            position: character.position(),
            state: character.kind(),
            transitions: self.transitions,
            wind_particles: self.particles.count_tagged(ParticleTag::Wind),
            dust_particles: self.particles.count_tagged(ParticleTag::Dust),
        }
    }
}

/// Loads the configuration named on the command line and runs it.
pub fn run() -> Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "ledge.toml".to_string());
    let mut config = EngineConfig::load_from(&config_path);
    config.validate();

    let mut harness = Harness::from_config(config)?;
    harness.run();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn flat_level() -> TileLevel {
        "\
..........
..........
..........
..@.......
##########
"
        .parse()
        .expect("valid level")
    }

    #[test]
    fn test_demo_assets_parse() {
        let level = load_level(None).expect("demo level");
        let script = load_script(None).expect("demo script");
        assert!(level.width() > 0);
        assert!(script.total_ticks() > 0);
    }

    #[test]
    fn test_load_missing_level_is_io_error() {
        let err = load_level(Some(Path::new("/nonexistent/level.txt")));
        assert!(matches!(err, Err(ledge_common::LedgeError::Io(_))));
    }

    #[test]
    fn test_load_level_from_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("level.txt");
        fs::write(&path, "..\n@x\n").expect("Failed to write level");
        let err = load_level(Some(&path));
        assert!(matches!(err, Err(ledge_common::LedgeError::Level(_))));
    }

    #[test]
    fn test_idle_run_stays_put() {
        let mut config = EngineConfig::default();
        config.frames = 30;
        config.frame_jitter = 0.0;
        let mut harness =
            Harness::new(config, flat_level(), InputScript::default()).expect("harness");
        let start = harness.character().position();

        let summary = harness.run();
        assert!(summary.ticks >= 28);
        assert_eq!(summary.position, start);
        assert_eq!(summary.state, LocomotionKind::Idle);
        assert_eq!(summary.wind_particles, 0);
    }

    #[test]
    fn test_scripted_run_moves_right() {
        let mut config = EngineConfig::default();
        config.frames = 40;
        let script: InputScript = "40 d\n".parse().expect("valid script");
        let mut harness = Harness::new(config, flat_level(), script).expect("harness");
        let start = harness.character().position();

        let summary = harness.run();
        assert!(summary.position.x > start.x);
        assert!(summary.transitions >= 1);
    }

    #[test]
    fn test_demo_run_completes() {
        let mut config = EngineConfig::default();
        config.frames = 240;
        let mut harness = Harness::from_config(config).expect("harness");
        let summary = harness.run();
        assert!(summary.ticks > 0);
        assert!(summary.position.is_finite());
    }
}
