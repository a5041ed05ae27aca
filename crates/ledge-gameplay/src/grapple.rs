//! Grapple movement.
//!
//! While attached, the character falls under gravity and moves without the
//! wall or ceiling resolver. The ground still holds it up, and the distance
//! to the grapple point never grows past the captured range. The range shrinks
//! whenever the character gets closer. There is no velocity redirect at the
//! range limit and no re-entry cooldown.

use glam::Vec2;
use ledge_common::GrappleId;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::collision_box::CollisionBox;
use crate::physics::{fall_toward, resolve_ground};
use crate::tuning::MovementTuning;
use crate::world::TileWorld;

/// A point in the world the character can latch onto.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrapplePoint {
    /// World position
    pub position: Vec2,
    /// Attach distance
    pub range: f32,
}

impl GrapplePoint {
    /// Creates a grapple point.
    #[must_use]
    pub fn new(position: Vec2, range: f32) -> Self {
        Self { position, range }
    }
}

/// Active attachment: a handle to the point plus the captured range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrappleLink {
    /// Point handle
    pub id: GrappleId,
    /// Current maximum distance
    pub range: f32,
}

/// Finds the point to attach to from pixel position `from`. When several
/// are in range the last one in the list wins.
#[must_use]
pub fn find_grapple(points: &[GrapplePoint], from: Vec2) -> Option<GrappleLink> {
    points
        .iter()
        .enumerate()
        .rev()
        .find_map(|(index, point)| {
            let distance = from.distance(point.position);
            (distance < point.range).then_some(GrappleLink {
                id: GrappleId::new(index),
                range: distance,
            })
        })
}

/// Result of one grapple tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrappleStep {
    /// Still attached
    Attached,
    /// Let go; normal movement resumes next tick
    Released,
}

/// Advances one tick of grapple movement.
///
/// The range clamp runs first and the ground resolver last, so the floor
/// wins when both constrain the box.
pub fn grapple_step<W: TileWorld + ?Sized>(
    world: &W,
    link: &mut GrappleLink,
    points: &[GrapplePoint],
    collision: &mut CollisionBox,
    velocity: &mut Vec2,
    jump_held: bool,
    tuning: &MovementTuning,
) -> GrappleStep {
    fall_toward(&mut velocity.y, tuning.gravity, tuning.max_air_fall_speed);
    collision.translate(*velocity);

    let step = match points.get(link.id.index()) {
        _ if !jump_held => {
            debug!(id = link.id.index(), "grapple released");
            GrappleStep::Released
        }
        None => {
            debug!(id = link.id.index(), "grapple point vanished");
            GrappleStep::Released
        }
        Some(point) => {
            let center = collision.center();
            let distance = center.distance(point.position);
            if distance > link.range {
                let clamped =
                    point.position + (center - point.position).normalize_or_zero() * link.range;
                collision.translate(clamped - center);
            } else {
                link.range = distance;
            }
            GrappleStep::Attached
        }
    };

    if let Err(err) = resolve_ground(world, collision, velocity, tuning.max_step_out) {
        error!(%err, "grapple ground resolver exceeded its step cap");
        *velocity = Vec2::ZERO;
    }
    step
}
