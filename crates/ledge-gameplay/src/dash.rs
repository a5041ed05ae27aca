//! Dash attack: windup direction capture, commit and burst.
//!
//! A dash runs in two phases. During the windup the held direction is
//! sampled every tick and the last non-zero sample wins. At the windup
//! boundary the dash commits once: the direction is finalised, a velocity is
//! picked from the dash table and combined with the current velocity so the
//! dash can only add momentum, and a particle burst is emitted.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::particles::{
    roll_f32, roll_range, ParticleDescriptor, ParticleEmitter, ParticleKind, ParticleTag,
};
use crate::tuning::{DashBurst, DashTable};

/// Transient data of a dash in progress. Reset on every entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashAttack {
    /// Captured direction, each axis in `-1..=1`
    pub direction: IVec2,
    /// Direction locked and impulse applied
    pub committed: bool,
    /// Ticks since entry
    pub frame: u32,
}

/// Direction class selecting a row of the dash table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DashClass {
    /// Left or right only
    Horizontal,
    /// Up plus left or right
    DiagonalUp,
    /// Straight up
    Up,
    /// Any direction with a downward component
    Down,
}

impl DashClass {
    /// Classifies a direction. Zero counts as horizontal.
    #[must_use]
    pub fn classify(direction: IVec2) -> Self {
        match (direction.x, direction.y) {
            (_, y) if y > 0 => Self::Down,
            (0, y) if y < 0 => Self::Up,
            (_, y) if y < 0 => Self::DiagonalUp,
            _ => Self::Horizontal,
        }
    }

    /// Table velocity for a direction of this class.
    #[must_use]
    pub fn velocity(self, direction: IVec2, table: &DashTable) -> Vec2 {
        let dx = direction.x as f32;
        match self {
            Self::Horizontal => Vec2::new(dx * table.horizontal.x, -table.horizontal.y),
            Self::DiagonalUp => Vec2::new(dx * table.diagonal_up.x, -table.diagonal_up.y),
            Self::Up => Vec2::new(table.up.x, -table.up.y),
            Self::Down => Vec2::new(table.down.x, table.down.y),
        }
    }
}

/// Combines a dash velocity with the current one on a single axis.
///
/// A positive table value never lowers a larger positive current speed, a
/// negative one never raises a more negative current speed, and zero stops
/// the axis.
#[must_use]
pub fn boost_axis(table: f32, current: f32) -> f32 {
    if table > 0.0 {
        table.max(current)
    } else if table < 0.0 {
        table.min(current)
    } else {
        0.0
    }
}

/// [`boost_axis`] on both axes.
#[must_use]
pub fn boost(table: Vec2, current: Vec2) -> Vec2 {
    Vec2::new(boost_axis(table.x, current.x), boost_axis(table.y, current.y))
}

/// Outcome of a dash commit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashCommit {
    /// Final direction
    pub direction: IVec2,
    /// Direction class
    pub class: DashClass,
    /// New velocity
    pub velocity: Vec2,
}

impl DashAttack {
    /// Fresh dash at frame zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Still capturing direction.
    #[must_use]
    pub fn in_windup(&self, windup_frames: u32) -> bool {
        !self.committed && self.frame < windup_frames
    }

    /// Overwrites the captured direction with a non-zero held direction
    /// while in windup.
    pub fn capture(&mut self, held: IVec2, windup_frames: u32) {
        if self.in_windup(windup_frames) && held != IVec2::ZERO {
            self.direction = held;
        }
    }

    /// Whether this tick is the commit tick.
    #[must_use]
    pub fn ready_to_commit(&self, windup_frames: u32) -> bool {
        !self.committed && self.frame >= windup_frames
    }

    /// Locks the direction and computes the boosted velocity.
    ///
    /// `facing_sign` is used when nothing was captured.
    pub fn commit(&mut self, facing_sign: i32, current: Vec2, table: &DashTable) -> DashCommit {
        self.committed = true;
        if self.direction == IVec2::ZERO {
            self.direction = IVec2::new(facing_sign, 0);
        }
        let class = DashClass::classify(self.direction);
        let velocity = boost(class.velocity(self.direction, table), current);
        debug!(?class, direction = ?self.direction, ?velocity, "dash committed");
        DashCommit {
            direction: self.direction,
            class,
            velocity,
        }
    }

    /// Advances the frame counter. Called once at the end of every tick.
    pub fn advance(&mut self) {
        self.frame = self.frame.saturating_add(1);
    }
}

/// Emits the streak and chunk burst for a committed dash.
///
/// Particles spawn inside `burst.spread` centred on `center` and travel
/// along the dash direction, chunks slower than streaks.
pub fn emit_burst<P: ParticleEmitter + ?Sized>(
    emitter: &mut P,
    rng: &mut fastrand::Rng,
    center: Vec2,
    commit: &DashCommit,
    burst: &DashBurst,
) {
    let heading = commit.direction.as_vec2().normalize_or_zero();
    let streak_velocity = heading * commit.velocity.length() * burst.speed_factor;
    let half = burst.spread * 0.5;

    let spawn_point = |rng: &mut fastrand::Rng| {
        center
            + Vec2::new(
                roll_f32(rng, -half.x, half.x).floor(),
                roll_f32(rng, -half.y, half.y).floor(),
            )
    };

    for _ in 0..burst.streak_count {
        let position = spawn_point(rng);
        let jitter = Vec2::new(
            roll_f32(rng, -burst.jitter, burst.jitter),
            roll_f32(rng, -burst.jitter, burst.jitter),
        );
        emitter.emit(ParticleDescriptor {
            kind: ParticleKind::Streak {
                length: roll_range(rng, burst.streak_length),
            },
            position,
            velocity: streak_velocity + jitter,
            gravity: Vec2::ZERO,
            lifetime: roll_range(rng, burst.streak_lifetime),
            color: [0xff, 0xff, 0xff],
            alpha: roll_f32(rng, 0.2, 0.55),
            tag: ParticleTag::Wind,
        });
    }

    let chunk_velocity = streak_velocity * burst.chunk_speed_factor;
    for _ in 0..burst.chunk_count {
        let position = spawn_point(rng);
        emitter.emit(ParticleDescriptor {
            kind: ParticleKind::Chunk {
                size: roll_range(rng, burst.chunk_size),
            },
            position,
            velocity: chunk_velocity,
            gravity: Vec2::ZERO,
            lifetime: roll_range(rng, burst.chunk_lifetime),
            color: burst.chunk_color,
            alpha: 1.0,
            tag: ParticleTag::Wind,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particles::ParticleLog;
    use proptest::prelude::*;

    #[test]
    fn test_classify() {
        assert_eq!(DashClass::classify(IVec2::new(1, 0)), DashClass::Horizontal);
        assert_eq!(DashClass::classify(IVec2::new(-1, -1)), DashClass::DiagonalUp);
        assert_eq!(DashClass::classify(IVec2::new(0, -1)), DashClass::Up);
        assert_eq!(DashClass::classify(IVec2::new(1, 1)), DashClass::Down);
        assert_eq!(DashClass::classify(IVec2::new(0, 1)), DashClass::Down);
    }

    #[test]
    fn test_windup_capture_keeps_last_nonzero() {
        let mut dash = DashAttack::new();
        dash.capture(IVec2::new(1, 0), 6);
        dash.frame = 3;
        dash.capture(IVec2::ZERO, 6);
        assert_eq!(dash.direction, IVec2::new(1, 0));
        dash.capture(IVec2::new(0, -1), 6);
        assert_eq!(dash.direction, IVec2::new(0, -1));

        dash.frame = 6;
        dash.capture(IVec2::new(-1, 0), 6);
        assert_eq!(dash.direction, IVec2::new(0, -1));
        assert!(dash.ready_to_commit(6));
    }

    #[test]
    fn test_commit_defaults_to_facing() {
        let mut dash = DashAttack {
            frame: 6,
            ..Default::default()
        };
        let commit = dash.commit(-1, Vec2::ZERO, &DashTable::default());
        assert_eq!(commit.direction, IVec2::new(-1, 0));
        assert_eq!(commit.class, DashClass::Horizontal);
        assert_eq!(commit.velocity, Vec2::new(-6.0, -4.8));
        assert!(dash.committed);
        assert!(!dash.ready_to_commit(6));
    }

    #[test]
    fn test_commit_never_slows() {
        let mut dash = DashAttack {
            direction: IVec2::new(1, 0),
            frame: 6,
            ..Default::default()
        };
        let commit = dash.commit(1, Vec2::new(7.5, -6.0), &DashTable::default());
        assert_eq!(commit.velocity, Vec2::new(7.5, -6.0));
    }

    #[test]
    fn test_burst_counts_and_tags() {
        let mut log = ParticleLog::new();
        let mut rng = fastrand::Rng::with_seed(1);
        let commit = DashCommit {
            direction: IVec2::new(1, -1),
            class: DashClass::DiagonalUp,
            velocity: Vec2::new(3.6, -7.2),
        };
        let burst = DashBurst::default();
        emit_burst(&mut log, &mut rng, Vec2::new(100.0, 100.0), &commit, &burst);

        assert_eq!(log.len(), 63);
        assert_eq!(log.count_tagged(ParticleTag::Wind), 63);
        let streaks = log
            .particles()
            .iter()
            .filter(|p| matches!(p.kind, ParticleKind::Streak { .. }))
            .count();
        assert_eq!(streaks, 50);
        for particle in log.particles() {
            assert!((particle.position.x - 100.0).abs() <= burst.spread.x / 2.0);
            assert!((particle.position.y - 100.0).abs() <= burst.spread.y / 2.0);
        }
    }

    proptest! {
        #[test]
        fn prop_boost_law(table in -12.0f32..12.0, current in -12.0f32..12.0) {
            let result = boost_axis(table, current);
            if table != 0.0 && table.signum() == current.signum() && current != 0.0 {
                prop_assert_eq!(result, table.abs().max(current.abs()) * table.signum());
            } else {
                prop_assert_eq!(result, table);
            }
        }

        #[test]
        fn prop_boost_never_reduces_same_sign_speed(table in 0.1f32..12.0, current in 0.0f32..12.0) {
            prop_assert!(boost_axis(table, current) >= current);
            prop_assert!(boost_axis(-table, -current) <= -current);
        }
    }
}
