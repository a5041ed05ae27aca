//! Contact sampling, acceleration model and the penetration resolver.
//!
//! Motion is integrated one axis at a time, X before Y. After each axis the
//! resolver steps the box out of solid tiles one pixel at a time. This is
//! only correct while per-tick velocities stay small relative to the tile
//! size: a faster body could skip over a thin wall entirely. Every step-out
//! loop is capped by `max_step_out`.

use std::fmt;

use glam::Vec2;
use thiserror::Error;

use crate::collision_box::{CollisionBox, ProbeColumn, ProbeRow};
use crate::tuning::{LedgeProbe, MovementTuning};
use crate::world::TileWorld;

/// Resolution axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Left/right walls
    Horizontal,
    /// Ceiling and ground
    Vertical,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Horizontal => write!(f, "horizontal"),
            Self::Vertical => write!(f, "vertical"),
        }
    }
}

/// The resolver hit its step cap without leaving solid geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("penetration resolver gave up on the {axis} axis after {steps} steps")]
pub struct StepOutExceeded {
    /// Axis being resolved
    pub axis: Axis,
    /// Steps taken
    pub steps: u32,
}

/// Contact flags sampled from probe pixels.
///
/// `on_*` flags look one pixel outside the box and drive gameplay decisions;
/// `in_*` flags look at the box's own edge pixels and drive the resolver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contacts {
    /// Solid just below the bottom edge
    pub on_ground: bool,
    /// Bottom edge row overlaps solid
    pub in_ground: bool,
    /// Top edge row overlaps solid
    pub in_ceil: bool,
    /// Solid just left of the box
    pub on_left: bool,
    /// Left edge column overlaps solid
    pub in_left: bool,
    /// Solid just right of the box
    pub on_right: bool,
    /// Right edge column overlaps solid
    pub in_right: bool,
}

impl Contacts {
    /// Samples every contact flag for the box's current position.
    pub fn sample<W: TileWorld + ?Sized>(world: &W, collision: &CollisionBox) -> Self {
        Self {
            on_ground: on_ground(world, collision),
            in_ground: in_ground(world, collision),
            in_ceil: in_ceil(world, collision),
            on_left: side_contact(world, collision, ProbeColumn::OutsideLeft),
            in_left: side_contact(world, collision, ProbeColumn::InnerLeft),
            on_right: side_contact(world, collision, ProbeColumn::OutsideRight),
            in_right: side_contact(world, collision, ProbeColumn::InnerRight),
        }
    }

    /// Touching a wall on either side.
    #[must_use]
    pub fn on_wall(&self) -> bool {
        self.on_left || self.on_right
    }
}

fn inner_columns_hit<W: TileWorld + ?Sized>(world: &W, collision: &CollisionBox, row: ProbeRow) -> bool {
    let y = collision.probe_y(row);
    [ProbeColumn::InnerLeft, ProbeColumn::InnerRight]
        .into_iter()
        .any(|column| world.is_solid(collision.probe_x(column), y))
}

/// Solid just below either inner-bottom corner.
pub fn on_ground<W: TileWorld + ?Sized>(world: &W, collision: &CollisionBox) -> bool {
    inner_columns_hit(world, collision, ProbeRow::OutsideBottom)
}

/// Bottom pixel row overlaps solid at either inner corner.
pub fn in_ground<W: TileWorld + ?Sized>(world: &W, collision: &CollisionBox) -> bool {
    inner_columns_hit(world, collision, ProbeRow::InnerBottom)
}

/// Top pixel row overlaps solid at either inner corner.
pub fn in_ceil<W: TileWorld + ?Sized>(world: &W, collision: &CollisionBox) -> bool {
    inner_columns_hit(world, collision, ProbeRow::InnerTop)
}

/// Samples a column at the top, bottom and half-height rows, so a
/// one-tile ledge at head height still registers.
pub fn side_contact<W: TileWorld + ?Sized>(
    world: &W,
    collision: &CollisionBox,
    column: ProbeColumn,
) -> bool {
    let x = collision.probe_x(column);
    let top = collision.probe_y(ProbeRow::InnerTop);
    [
        top,
        collision.probe_y(ProbeRow::InnerBottom),
        top + collision.height() / 2,
    ]
    .into_iter()
    .any(|y| world.is_solid(x, y))
}

/// Solid ground a short way ahead of and below the box middle.
pub fn ground_ahead<W: TileWorld + ?Sized>(
    world: &W,
    collision: &CollisionBox,
    facing_sign: i32,
    probe: LedgeProbe,
) -> bool {
    let x = collision.middle().x + facing_sign * probe.forward;
    let y = collision.probe_y(ProbeRow::OutsideBottom) + probe.depth;
    world.is_solid(x, y)
}

/// Sign with zero mapped to zero.
pub(crate) fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Applies held horizontal input and deceleration to `velocity.x`.
///
/// Acceleration is skipped when it would push into a touched wall or leave
/// the run-speed band. Turning away from a touched wall zeroes any velocity
/// still pointing into it first. Deceleration stops exactly at zero.
pub fn apply_horizontal_input(
    velocity: &mut Vec2,
    input_x: i32,
    contacts: &Contacts,
    tuning: &MovementTuning,
) {
    let goal = input_x.signum() as f32 * tuning.acceleration(contacts.on_ground);
    let max = tuning.max_run_speed;

    let into_wall = (contacts.on_left && goal < 0.0) || (contacts.on_right && goal > 0.0);
    if !into_wall && (velocity.x + goal).abs() <= max {
        if (contacts.on_left && goal > 0.0 && velocity.x < 0.0)
            || (contacts.on_right && goal < 0.0 && velocity.x > 0.0)
        {
            velocity.x = 0.0;
        }
        velocity.x = (velocity.x + goal).clamp(-max, max);
    }

    let decelerate = goal == 0.0
        || sign(goal) != sign(velocity.x)
        || (contacts.on_right && velocity.x > 0.0)
        || (contacts.on_left && velocity.x < 0.0);
    if decelerate {
        let rate = tuning.deceleration(contacts.on_ground);
        if velocity.x > 0.0 {
            velocity.x = (velocity.x - rate).max(0.0);
        } else if velocity.x < 0.0 {
            velocity.x = (velocity.x + rate).min(0.0);
        }
    }
}

/// Accelerates `vy` by `gravity` without passing `cap`.
pub fn fall_toward(vy: &mut f32, gravity: f32, cap: f32) {
    if *vy < cap {
        *vy = (*vy + gravity).min(cap);
    }
}

/// Gravity for normal movement.
///
/// Airborne bodies fall toward the air cap; wall slides fall toward their
/// own cap and ease down to it when faster. Grounded bodies never keep
/// downward speed.
pub fn apply_gravity(velocity: &mut Vec2, on_ground: bool, wall_sliding: bool, tuning: &MovementTuning) {
    if on_ground {
        velocity.y = velocity.y.min(0.0);
    } else if wall_sliding {
        let cap = tuning.max_wall_slide_fall_speed;
        fall_toward(&mut velocity.y, tuning.gravity, cap);
        if velocity.y > cap {
            velocity.y = (velocity.y - tuning.wall_deceleration).max(cap);
        }
    } else {
        fall_toward(&mut velocity.y, tuning.gravity, tuning.max_air_fall_speed);
    }
}

/// Allowed range of vertical velocity for a locomotion mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalLimits {
    /// Most negative (fastest rising) value
    pub min: f32,
    /// Most positive (fastest falling) value
    pub max: f32,
}

impl VerticalLimits {
    /// Standing on ground: rising only.
    #[must_use]
    pub fn grounded(tuning: &MovementTuning) -> Self {
        Self {
            min: -tuning.max_rise_speed,
            max: 0.0,
        }
    }

    /// Airborne or wall sliding.
    #[must_use]
    pub fn airborne(tuning: &MovementTuning) -> Self {
        Self {
            min: -tuning.max_rise_speed,
            max: tuning.max_air_fall_speed,
        }
    }

    /// Dash attack, sized to the dash table.
    #[must_use]
    pub fn dash(tuning: &MovementTuning) -> Self {
        Self {
            min: -tuning.dash.rise_cap().max(tuning.max_rise_speed),
            max: tuning.dash.fall_cap().max(tuning.max_air_fall_speed),
        }
    }

    /// Clamps `vy` into the range.
    #[must_use]
    pub fn clamp(&self, vy: f32) -> f32 {
        vy.clamp(self.min, self.max)
    }
}

/// Steps the box by `delta` until `penetrating` clears. On failure the box
/// is put back where it started.
fn step_out<W, F>(
    world: &W,
    collision: &mut CollisionBox,
    axis: Axis,
    delta: Vec2,
    max_steps: u32,
    penetrating: F,
) -> Result<bool, StepOutExceeded>
where
    W: TileWorld + ?Sized,
    F: Fn(&W, &CollisionBox) -> bool,
{
    if !penetrating(world, collision) {
        return Ok(false);
    }
    let start = collision.anchor();
    collision.set_anchor(start.floor());
    let mut steps = 0;
    while penetrating(world, collision) {
        if steps == max_steps {
            collision.set_anchor(start);
            return Err(StepOutExceeded { axis, steps });
        }
        collision.translate(delta);
        steps += 1;
    }
    Ok(true)
}

fn in_left<W: TileWorld + ?Sized>(world: &W, collision: &CollisionBox) -> bool {
    side_contact(world, collision, ProbeColumn::InnerLeft)
}

fn in_right<W: TileWorld + ?Sized>(world: &W, collision: &CollisionBox) -> bool {
    side_contact(world, collision, ProbeColumn::InnerRight)
}

/// Pushes the box out of walls: leftward out of a right wall, then
/// rightward out of a left wall. Returns whether it moved.
pub fn resolve_walls<W: TileWorld + ?Sized>(
    world: &W,
    collision: &mut CollisionBox,
    max_steps: u32,
) -> Result<bool, StepOutExceeded> {
    let right = step_out(world, collision, Axis::Horizontal, Vec2::NEG_X, max_steps, in_right)?;
    let left = step_out(world, collision, Axis::Horizontal, Vec2::X, max_steps, in_left)?;
    Ok(right || left)
}

/// Pushes the box down out of a ceiling and kills upward speed.
pub fn resolve_ceiling<W: TileWorld + ?Sized>(
    world: &W,
    collision: &mut CollisionBox,
    velocity: &mut Vec2,
    max_steps: u32,
) -> Result<bool, StepOutExceeded> {
    let moved = step_out(world, collision, Axis::Vertical, Vec2::Y, max_steps, in_ceil)?;
    if moved {
        velocity.y = velocity.y.max(0.0);
    }
    Ok(moved)
}

/// Pushes the box up out of the ground and kills downward speed.
pub fn resolve_ground<W: TileWorld + ?Sized>(
    world: &W,
    collision: &mut CollisionBox,
    velocity: &mut Vec2,
    max_steps: u32,
) -> Result<bool, StepOutExceeded> {
    let moved = step_out(world, collision, Axis::Vertical, Vec2::NEG_Y, max_steps, in_ground)?;
    if moved {
        velocity.y = velocity.y.min(0.0);
    }
    Ok(moved)
}

/// Runs every resolver without moving the box first: ceiling and ground,
/// then walls. Used to settle a freshly placed box.
pub fn resolve_all<W: TileWorld + ?Sized>(
    world: &W,
    collision: &mut CollisionBox,
    velocity: &mut Vec2,
    max_steps: u32,
) -> Result<bool, StepOutExceeded> {
    let ceiling = resolve_ceiling(world, collision, velocity, max_steps)?;
    let ground = resolve_ground(world, collision, velocity, max_steps)?;
    let walls = resolve_walls(world, collision, max_steps)?;
    Ok(ceiling || ground || walls)
}

/// Moves the box by `velocity`, X then Y, resolving after each axis.
pub fn integrate<W: TileWorld + ?Sized>(
    world: &W,
    collision: &mut CollisionBox,
    velocity: &mut Vec2,
    max_steps: u32,
) -> Result<(), StepOutExceeded> {
    collision.translate(Vec2::new(velocity.x, 0.0));
    resolve_walls(world, collision, max_steps)?;

    collision.translate(Vec2::new(0.0, velocity.y));
    resolve_ceiling(world, collision, velocity, max_steps)?;
    resolve_ground(world, collision, velocity, max_steps)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision_box::BoxOffsets;
    use crate::world::MockTiles;
    use ledge_common::{MaterialId, TileCoord};
    use proptest::prelude::*;

    const GROUND: i32 = 160;

    fn flat_world() -> MockTiles {
        let mut world = MockTiles::new(16);
        world.set_ground_level(GROUND, MaterialId::STONE);
        world
    }

    /// Anchor y at which the default box rests exactly on `GROUND`.
    fn resting_y() -> f32 {
        (GROUND - BoxOffsets::default().y2) as f32
    }

    fn body(x: f32, y: f32) -> CollisionBox {
        CollisionBox::new(Vec2::new(x, y), BoxOffsets::default()).unwrap()
    }

    #[test]
    fn test_contacts_on_flat_ground() {
        let world = flat_world();
        let contacts = Contacts::sample(&world, &body(0.0, resting_y()));
        assert!(contacts.on_ground);
        assert!(!contacts.in_ground);
        assert!(!contacts.on_wall());

        let airborne = Contacts::sample(&world, &body(0.0, resting_y() - 1.0));
        assert!(!airborne.on_ground);
    }

    #[test]
    fn test_side_contact_detects_head_height_ledge() {
        let mut world = MockTiles::new(16);
        // One tile whose only overlap with the probe column is the top row.
        world.set_tile(TileCoord::new(3, 0), MaterialId::STONE);
        let collision = body(48.0 - 33.0, -8.0);
        assert_eq!(collision.top(), 4);
        assert_eq!(collision.probe_x(ProbeColumn::OutsideRight), 48);
        assert!(side_contact(&world, &collision, ProbeColumn::OutsideRight));
    }

    #[test]
    fn test_wall_resolution_steps_out() {
        let mut world = MockTiles::new(16);
        world.fill_tiles(TileCoord::new(4, -4), TileCoord::new(4, 8), MaterialId::STONE);
        // Right edge at 64 + 3 = three pixels into the wall column.
        let mut collision = body(64.0 - 33.0 + 3.5, 0.0);
        assert!(resolve_walls(&world, &mut collision, 64).unwrap());
        assert_eq!(collision.right(), 64);
        assert_eq!(collision.anchor().x, 31.0);
    }

    #[test]
    fn test_ground_resolution_zeroes_downward_speed() {
        let world = flat_world();
        let mut collision = body(0.0, resting_y() + 4.25);
        let mut velocity = Vec2::new(1.0, 3.0);
        assert!(resolve_ground(&world, &mut collision, &mut velocity, 64).unwrap());
        assert_eq!(collision.anchor().y, resting_y());
        assert_eq!(velocity, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_ceiling_resolution_zeroes_upward_speed() {
        let mut world = MockTiles::new(16);
        world.fill_tiles(TileCoord::new(-4, -4), TileCoord::new(8, -1), MaterialId::STONE);
        let mut collision = body(0.0, -12.0 - 2.0);
        let mut velocity = Vec2::new(0.0, -3.0);
        assert!(resolve_ceiling(&world, &mut collision, &mut velocity, 64).unwrap());
        assert_eq!(collision.top(), 0);
        assert_eq!(velocity.y, 0.0);
    }

    #[test]
    fn test_step_cap_is_enforced() {
        let mut world = MockTiles::new(16);
        world.fill_tiles(TileCoord::new(-20, -20), TileCoord::new(20, 20), MaterialId::STONE);
        let mut collision = body(0.0, 0.0);
        let err = resolve_walls(&world, &mut collision, 8).unwrap_err();
        assert_eq!(err, StepOutExceeded { axis: Axis::Horizontal, steps: 8 });
    }

    #[test]
    fn test_failed_step_out_leaves_box_in_place() {
        let mut world = MockTiles::new(16);
        world.fill_tiles(TileCoord::new(-20, -20), TileCoord::new(20, 20), MaterialId::STONE);
        let mut collision = body(3.5, 7.25);
        let mut velocity = Vec2::new(1.0, 2.0);

        assert!(resolve_ground(&world, &mut collision, &mut velocity, 8).is_err());
        assert_eq!(collision.anchor(), Vec2::new(3.5, 7.25));
        assert_eq!(velocity, Vec2::new(1.0, 2.0));

        assert!(resolve_walls(&world, &mut collision, 8).is_err());
        assert_eq!(collision.anchor(), Vec2::new(3.5, 7.25));
    }

    #[test]
    fn test_integrate_lands_on_ground() {
        let world = flat_world();
        let mut collision = body(0.0, resting_y() - 2.0);
        let mut velocity = Vec2::new(0.0, 5.0);
        integrate(&world, &mut collision, &mut velocity, 64).unwrap();
        assert_eq!(collision.anchor().y, resting_y());
        assert_eq!(velocity.y, 0.0);
    }

    #[test]
    fn test_acceleration_respects_run_cap() {
        let tuning = MovementTuning::default();
        let contacts = Contacts::default();
        let mut velocity = Vec2::ZERO;
        for _ in 0..100 {
            apply_horizontal_input(&mut velocity, 1, &contacts, &tuning);
            assert!(velocity.x <= tuning.max_run_speed);
        }
        assert!(velocity.x > 2.0);
    }

    #[test]
    fn test_no_acceleration_into_touched_wall() {
        let tuning = MovementTuning::default();
        let contacts = Contacts {
            on_right: true,
            on_ground: true,
            ..Default::default()
        };
        let mut velocity = Vec2::ZERO;
        apply_horizontal_input(&mut velocity, 1, &contacts, &tuning);
        assert_eq!(velocity.x, 0.0);
    }

    #[test]
    fn test_turning_away_from_wall_is_instant() {
        let tuning = MovementTuning::default();
        let contacts = Contacts {
            on_left: true,
            on_ground: true,
            ..Default::default()
        };
        let mut velocity = Vec2::new(-1.0, 0.0);
        apply_horizontal_input(&mut velocity, 1, &contacts, &tuning);
        assert_eq!(velocity.x, tuning.ground_acceleration);
    }

    #[test]
    fn test_deceleration_stops_at_zero() {
        let tuning = MovementTuning::default();
        let contacts = Contacts {
            on_ground: true,
            ..Default::default()
        };
        let mut velocity = Vec2::new(0.1, 0.0);
        apply_horizontal_input(&mut velocity, 0, &contacts, &tuning);
        assert_eq!(velocity.x, 0.0);

        let mut velocity = Vec2::new(-0.1, 0.0);
        apply_horizontal_input(&mut velocity, 0, &contacts, &tuning);
        assert_eq!(velocity.x, 0.0);
    }

    #[test]
    fn test_wall_slide_eases_to_cap() {
        let tuning = MovementTuning::default();
        let mut velocity = Vec2::new(0.0, 4.0);
        apply_gravity(&mut velocity, false, true, &tuning);
        assert!((velocity.y - 3.7).abs() < 1e-6);
        for _ in 0..20 {
            apply_gravity(&mut velocity, false, true, &tuning);
        }
        assert_eq!(velocity.y, tuning.max_wall_slide_fall_speed);
    }

    #[test]
    fn test_grounded_gravity_drops_downward_speed() {
        let tuning = MovementTuning::default();
        let mut velocity = Vec2::new(0.0, 2.0);
        apply_gravity(&mut velocity, true, false, &tuning);
        assert_eq!(velocity.y, 0.0);
    }

    #[test]
    fn test_ledge_probe() {
        let world = flat_world();
        let probe = LedgeProbe::default();
        assert!(ground_ahead(&world, &body(0.0, resting_y() - 10.0), 1, probe));
        assert!(!ground_ahead(&world, &body(0.0, resting_y() - 30.0), 1, probe));
    }

    proptest! {
        #[test]
        fn prop_resolvers_are_idempotent(
            x in -40.0f32..40.0,
            sink in 0.0f32..20.0,
        ) {
            let mut walled = MockTiles::new(16);
            walled.fill_tiles(TileCoord::new(4, 0), TileCoord::new(4, 9), MaterialId::STONE);
            let mut collision = body(x, 0.0);
            resolve_walls(&walled, &mut collision, 64).unwrap();
            let settled = collision;
            prop_assert!(!resolve_walls(&walled, &mut collision, 64).unwrap());
            prop_assert_eq!(collision, settled);

            let world = flat_world();
            let mut collision = body(x, resting_y() + sink);
            let mut velocity = Vec2::new(1.5, 2.0);
            resolve_ceiling(&world, &mut collision, &mut velocity, 64).unwrap();
            resolve_ground(&world, &mut collision, &mut velocity, 64).unwrap();
            let settled = (collision, velocity);
            prop_assert!(!resolve_ceiling(&world, &mut collision, &mut velocity, 64).unwrap());
            prop_assert!(!resolve_ground(&world, &mut collision, &mut velocity, 64).unwrap());
            prop_assert_eq!((collision, velocity), settled);
        }
    }
}
