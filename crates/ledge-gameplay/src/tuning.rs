//! Movement tuning.
//!
//! All rates are in pixels per tick (velocities) or pixels per tick per tick
//! (accelerations); all windows and frame thresholds are in ticks. The whole
//! record is serde-friendly so hosts can load it from a config file.

use glam::Vec2;
use ledge_common::MaterialId;
use serde::{Deserialize, Serialize};

use crate::collision_box::BoxOffsets;
use crate::error::{ControllerError, ControllerResult};

/// Dash velocity magnitudes per direction class.
///
/// Each entry is `(x, y)` as a positive magnitude; the commit applies the
/// sign from the captured direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashTable {
    /// Pure horizontal dash: `x` along the dash, `y` upward lift
    pub horizontal: Vec2,
    /// Diagonal-up dash
    pub diagonal_up: Vec2,
    /// Straight up dash
    pub up: Vec2,
    /// Any dash with a downward component
    pub down: Vec2,
}

impl Default for DashTable {
    fn default() -> Self {
        Self {
            horizontal: Vec2::new(6.0, 4.8),
            diagonal_up: Vec2::new(3.6, 7.2),
            up: Vec2::new(0.0, 9.6),
            down: Vec2::new(0.0, 12.0),
        }
    }
}

impl DashTable {
    /// Largest upward speed any dash can produce.
    #[must_use]
    pub fn rise_cap(&self) -> f32 {
        self.horizontal.y.max(self.diagonal_up.y).max(self.up.y)
    }

    /// Largest downward speed any dash can produce.
    #[must_use]
    pub fn fall_cap(&self) -> f32 {
        self.down.y
    }
}

/// Particle burst emitted when a dash commits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashBurst {
    /// Number of streak particles
    pub streak_count: u32,
    /// Number of chunk particles
    pub chunk_count: u32,
    /// Size of the rectangle, centred on the character, particles spawn in
    pub spread: Vec2,
    /// Streak speed as a multiple of the dash speed
    pub speed_factor: f32,
    /// Random per-axis jitter added to streak velocity
    pub jitter: f32,
    /// Chunk speed as a multiple of the streak speed
    pub chunk_speed_factor: f32,
    /// Streak lifetime range in ticks
    pub streak_lifetime: (u32, u32),
    /// Streak length range in pixels
    pub streak_length: (u32, u32),
    /// Chunk lifetime range in ticks
    pub chunk_lifetime: (u32, u32),
    /// Chunk size range in pixels
    pub chunk_size: (u32, u32),
    /// Chunk colour
    pub chunk_color: [u8; 3],
}

impl Default for DashBurst {
    fn default() -> Self {
        Self {
            streak_count: 50,
            chunk_count: 13,
            spread: Vec2::new(320.0, 180.0),
            speed_factor: 4.0,
            jitter: 0.5,
            chunk_speed_factor: 0.25,
            streak_lifetime: (5, 20),
            streak_length: (10, 20),
            chunk_lifetime: (30, 100),
            chunk_size: (2, 5),
            chunk_color: [0x28, 0x70, 0x13],
        }
    }
}

/// Forward-downward probe used before committing to Fall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgeProbe {
    /// Pixels ahead of the box middle, in the facing direction
    pub forward: i32,
    /// Pixels below the outside-bottom probe row
    pub depth: i32,
}

impl Default for LedgeProbe {
    fn default() -> Self {
        Self {
            forward: 0,
            depth: 20,
        }
    }
}

/// How the transitional JumpToFall state hands over to Fall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JumpToFallExit {
    /// Never exits on its own; only landing, wall contact, rising or a dash
    /// leave it
    #[default]
    Hold,
    /// Exits when its animation clip finishes
    AnimationEnd,
    /// Exits after the given number of ticks
    AfterTicks(u32),
}

/// Dust kicked up while running over a material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DustPalette {
    /// Ground material this palette applies to
    pub material: MaterialId,
    /// Main colour
    pub primary: [u8; 3],
    /// Main size range in pixels
    pub primary_size: (u32, u32),
    /// Occasional colour
    pub secondary: [u8; 3],
    /// Occasional size range in pixels
    pub secondary_size: (u32, u32),
    /// Chance a particle uses the primary colour
    pub primary_chance: f32,
}

impl DustPalette {
    /// Green grass with brown soil flecks.
    #[must_use]
    pub fn grass() -> Self {
        Self {
            material: MaterialId::GRASS,
            primary: [0x31, 0x93, 0x0f],
            primary_size: (1, 3),
            secondary: [0x96, 0x3e, 0x0a],
            secondary_size: (1, 1),
            primary_chance: 0.7,
        }
    }

    /// Red clay.
    #[must_use]
    pub fn red() -> Self {
        Self {
            material: MaterialId::RED,
            primary: [0xff, 0x00, 0x00],
            primary_size: (1, 1),
            secondary: [0xff, 0x00, 0x00],
            secondary_size: (1, 1),
            primary_chance: 1.0,
        }
    }
}

/// Every tunable of the character controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    /// Collision box corners relative to the position
    pub box_offsets: BoxOffsets,

    /// Horizontal acceleration on the ground
    pub ground_acceleration: f32,
    /// Horizontal acceleration in the air
    pub air_acceleration: f32,
    /// Horizontal deceleration on the ground
    pub ground_deceleration: f32,
    /// Horizontal deceleration in the air
    pub air_deceleration: f32,
    /// Maximum speed reachable from input alone
    pub max_run_speed: f32,
    /// Speed above which the character counts as running
    pub run_margin: f32,
    /// Speed above which facing follows velocity
    pub flip_margin: f32,

    /// Downward acceleration
    pub gravity: f32,
    /// Terminal fall speed in the air
    pub max_air_fall_speed: f32,
    /// Maximum upward speed outside a dash
    pub max_rise_speed: f32,
    /// Terminal fall speed while wall sliding
    pub max_wall_slide_fall_speed: f32,
    /// Rate at which a wall slide eases down to its cap
    pub wall_deceleration: f32,
    /// Upward speed of a jump
    pub jump_force: f32,
    /// Horizontal kick of a wall jump
    pub wall_jump_x: f32,
    /// Upward speed of a wall jump
    pub wall_jump_y: f32,

    /// Jump press buffer window
    pub jump_buffer_ticks: u32,
    /// Dash press buffer window
    pub dash_buffer_ticks: u32,
    /// Ground coyote window
    pub ground_coyote_ticks: u32,
    /// Wall coyote window
    pub wall_coyote_ticks: u32,
    /// Jump hold budget
    pub jump_hold_ticks: u32,

    /// Dash velocity table
    pub dash: DashTable,
    /// Dash frames spent capturing direction before the strike
    pub dash_windup_frames: u32,
    /// Dash frames during which velocity cannot flip facing
    pub dash_facing_lock_frames: u32,
    /// Dash frame after which landing refreshes the air dash
    pub dash_refresh_frame: u32,
    /// Dash frames until the state ends on its own
    pub dash_total_frames: u32,
    /// Particle burst at dash commit
    pub burst: DashBurst,

    /// Ledge check before Fall
    pub ledge_probe: LedgeProbe,
    /// JumpToFall exit policy
    pub jump_to_fall_exit: JumpToFallExit,

    /// Running dust palettes, first match wins
    pub dust: Vec<DustPalette>,
    /// Chance per tick of emitting a dust particle
    pub dust_chance: f32,
    /// Pixels below the outside-bottom row where the ground material is read
    pub dust_probe_depth: i32,

    /// Maximum pixels the resolver steps out per axis per call
    pub max_step_out: u32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            box_offsets: BoxOffsets::default(),
            ground_acceleration: 0.35,
            air_acceleration: 0.2,
            ground_deceleration: 0.3,
            air_deceleration: 0.15,
            max_run_speed: 2.5,
            run_margin: 0.1,
            flip_margin: 0.2,
            gravity: 0.25,
            max_air_fall_speed: 5.0,
            max_rise_speed: 8.0,
            max_wall_slide_fall_speed: 1.0,
            wall_deceleration: 0.3,
            jump_force: 3.2,
            wall_jump_x: 2.5,
            wall_jump_y: 3.2,
            jump_buffer_ticks: 8,
            dash_buffer_ticks: 8,
            ground_coyote_ticks: 6,
            wall_coyote_ticks: 6,
            jump_hold_ticks: 10,
            dash: DashTable::default(),
            dash_windup_frames: 6,
            dash_facing_lock_frames: 6,
            dash_refresh_frame: 7,
            dash_total_frames: 24,
            burst: DashBurst::default(),
            ledge_probe: LedgeProbe::default(),
            jump_to_fall_exit: JumpToFallExit::default(),
            dust: vec![DustPalette::grass(), DustPalette::red()],
            dust_chance: 0.3,
            dust_probe_depth: 14,
            max_step_out: 64,
        }
    }
}

fn positive(field: &'static str, value: f32) -> ControllerResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ControllerError::InvalidTuning {
            field,
            reason: format!("must be positive and finite, got {value}"),
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> ControllerResult<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ControllerError::InvalidTuning {
            field,
            reason: format!("must be non-negative and finite, got {value}"),
        })
    }
}

fn nonzero_ticks(field: &'static str, value: u32) -> ControllerResult<()> {
    if value == 0 {
        Err(ControllerError::InvalidTuning {
            field,
            reason: "must be at least one tick".to_string(),
        })
    } else {
        Ok(())
    }
}

impl MovementTuning {
    /// Checks every contract. Called once at spawn, never per tick.
    pub fn validate(&self) -> ControllerResult<()> {
        self.box_offsets.validate()?;

        positive("ground_acceleration", self.ground_acceleration)?;
        positive("air_acceleration", self.air_acceleration)?;
        positive("ground_deceleration", self.ground_deceleration)?;
        positive("air_deceleration", self.air_deceleration)?;
        positive("max_run_speed", self.max_run_speed)?;
        non_negative("run_margin", self.run_margin)?;
        non_negative("flip_margin", self.flip_margin)?;

        positive("gravity", self.gravity)?;
        positive("max_air_fall_speed", self.max_air_fall_speed)?;
        positive("max_rise_speed", self.max_rise_speed)?;
        positive("max_wall_slide_fall_speed", self.max_wall_slide_fall_speed)?;
        positive("wall_deceleration", self.wall_deceleration)?;
        positive("jump_force", self.jump_force)?;
        non_negative("wall_jump_x", self.wall_jump_x)?;
        positive("wall_jump_y", self.wall_jump_y)?;

        nonzero_ticks("jump_buffer_ticks", self.jump_buffer_ticks)?;
        nonzero_ticks("dash_buffer_ticks", self.dash_buffer_ticks)?;
        nonzero_ticks("ground_coyote_ticks", self.ground_coyote_ticks)?;
        nonzero_ticks("wall_coyote_ticks", self.wall_coyote_ticks)?;
        nonzero_ticks("jump_hold_ticks", self.jump_hold_ticks)?;
        nonzero_ticks("dash_total_frames", self.dash_total_frames)?;
        nonzero_ticks("max_step_out", self.max_step_out)?;

        if self.dash_windup_frames >= self.dash_total_frames {
            return Err(ControllerError::InvalidTuning {
                field: "dash_windup_frames",
                reason: format!(
                    "windup ({}) must end before the dash does ({})",
                    self.dash_windup_frames, self.dash_total_frames
                ),
            });
        }

        for (field, entry) in [
            ("dash.horizontal", self.dash.horizontal),
            ("dash.diagonal_up", self.dash.diagonal_up),
            ("dash.up", self.dash.up),
            ("dash.down", self.dash.down),
        ] {
            if !entry.is_finite() || entry.min_element() < 0.0 {
                return Err(ControllerError::InvalidTuning {
                    field,
                    reason: format!("magnitudes must be non-negative, got {entry}"),
                });
            }
        }

        if !(0.0..=1.0).contains(&self.dust_chance) {
            return Err(ControllerError::InvalidTuning {
                field: "dust_chance",
                reason: format!("must be a probability, got {}", self.dust_chance),
            });
        }

        Ok(())
    }

    /// Horizontal acceleration for the current contact.
    #[must_use]
    pub fn acceleration(&self, on_ground: bool) -> f32 {
        if on_ground {
            self.ground_acceleration
        } else {
            self.air_acceleration
        }
    }

    /// Horizontal deceleration for the current contact.
    #[must_use]
    pub fn deceleration(&self, on_ground: bool) -> f32 {
        if on_ground {
            self.ground_deceleration
        } else {
            self.air_deceleration
        }
    }

    /// Dust palette for a ground material, if any.
    #[must_use]
    pub fn dust_for(&self, material: MaterialId) -> Option<&DustPalette> {
        self.dust.iter().find(|palette| palette.material == material)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(MovementTuning::default().validate().is_ok());
    }

    #[test]
    fn test_zero_window_rejected() {
        let tuning = MovementTuning {
            ground_coyote_ticks: 0,
            ..Default::default()
        };
        let err = tuning.validate().unwrap_err();
        assert!(matches!(
            err,
            ControllerError::InvalidTuning {
                field: "ground_coyote_ticks",
                ..
            }
        ));
    }

    #[test]
    fn test_negative_gravity_rejected() {
        let tuning = MovementTuning {
            gravity: -0.1,
            ..Default::default()
        };
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_degenerate_box_rejected() {
        let tuning = MovementTuning {
            box_offsets: BoxOffsets::new(10, 10, 10, 20),
            ..Default::default()
        };
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_windup_must_end_before_dash() {
        let tuning = MovementTuning {
            dash_windup_frames: 24,
            ..Default::default()
        };
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_dash_caps() {
        let table = DashTable::default();
        assert_eq!(table.rise_cap(), 9.6);
        assert_eq!(table.fall_cap(), 12.0);
    }

    #[test]
    fn test_dust_lookup() {
        let tuning = MovementTuning::default();
        assert_eq!(
            tuning.dust_for(MaterialId::GRASS).map(|p| p.primary),
            Some([0x31, 0x93, 0x0f])
        );
        assert!(tuning.dust_for(MaterialId::STONE).is_none());
    }
}
