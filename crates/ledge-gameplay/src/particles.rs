//! Particle descriptors handed to the external effects system.
//!
//! The controller never simulates particles itself. It describes each one
//! and forwards it through [`ParticleEmitter`], fire-and-forget.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Shape of a particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    /// Thin line along the velocity
    Streak {
        /// Length in pixels
        length: u32,
    },
    /// Square fleck
    Chunk {
        /// Side length in pixels
        size: u32,
    },
}

/// Grouping tag the effects system can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticleTag {
    /// Dash burst; wraps around the screen edges
    Wind,
    /// Running dust
    Dust,
}

/// Everything needed to spawn one particle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleDescriptor {
    /// Shape
    pub kind: ParticleKind,
    /// Spawn position
    pub position: Vec2,
    /// Velocity in pixels per tick
    pub velocity: Vec2,
    /// Constant acceleration
    pub gravity: Vec2,
    /// Lifetime in ticks
    pub lifetime: u32,
    /// RGB colour
    pub color: [u8; 3],
    /// Opacity in `[0, 1]`
    pub alpha: f32,
    /// Filter tag
    pub tag: ParticleTag,
}

/// Sink for particle descriptors.
pub trait ParticleEmitter {
    /// Spawns a particle. Nothing is returned to the controller.
    fn emit(&mut self, particle: ParticleDescriptor);
}

/// Emitter that drops every particle.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEmitter;

impl ParticleEmitter for NullEmitter {
    fn emit(&mut self, _particle: ParticleDescriptor) {}
}

/// Emitter that records every particle, for tests and headless hosts.
#[derive(Debug, Default, Clone)]
pub struct ParticleLog {
    particles: Vec<ParticleDescriptor>,
}

impl ParticleLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded particle in emission order.
    #[must_use]
    pub fn particles(&self) -> &[ParticleDescriptor] {
        &self.particles
    }

    /// Number of recorded particles carrying `tag`.
    #[must_use]
    pub fn count_tagged(&self, tag: ParticleTag) -> usize {
        self.particles.iter().filter(|p| p.tag == tag).count()
    }

    /// Number of recorded particles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Drops every recorded particle.
    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

impl ParticleEmitter for ParticleLog {
    fn emit(&mut self, particle: ParticleDescriptor) {
        self.particles.push(particle);
    }
}

/// Uniform integer in `[low, high)`, or `low` when the range is empty.
pub(crate) fn roll_range(rng: &mut fastrand::Rng, (low, high): (u32, u32)) -> u32 {
    if high > low {
        rng.u32(low..high)
    } else {
        low
    }
}

/// Uniform float in `[low, high)`.
pub(crate) fn roll_f32(rng: &mut fastrand::Rng, low: f32, high: f32) -> f32 {
    low + rng.f32() * (high - low)
}
