//! Pixel collision box anchored to a moving position.
//!
//! The box is described by two corner offsets relative to its anchor. All
//! edge and probe queries floor the anchor first, so sub-pixel motion never
//! changes which pixels are sampled until a whole pixel boundary is crossed.

use glam::Vec2;
use ledge_common::PixelCoord;
use serde::{Deserialize, Serialize};

use crate::error::{ControllerError, ControllerResult};

/// Corner offsets of a collision box relative to its anchor.
///
/// `(x1, y1)` is the top-left pixel, `(x2, y2)` is one past the bottom-right
/// pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxOffsets {
    /// Left offset
    pub x1: i32,
    /// Top offset
    pub y1: i32,
    /// Right offset (exclusive)
    pub x2: i32,
    /// Bottom offset (exclusive)
    pub y2: i32,
}

impl BoxOffsets {
    /// Creates new offsets.
    #[must_use]
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    /// Fails unless both extents are strictly positive.
    pub fn validate(&self) -> ControllerResult<()> {
        if self.width() <= 0 {
            return Err(ControllerError::InvalidTuning {
                field: "box_offsets.x2",
                reason: format!("box width must be positive, got {}", self.width()),
            });
        }
        if self.height() <= 0 {
            return Err(ControllerError::InvalidTuning {
                field: "box_offsets.y2",
                reason: format!("box height must be positive, got {}", self.height()),
            });
        }
        Ok(())
    }
}

impl Default for BoxOffsets {
    fn default() -> Self {
        Self::new(23, 12, 33, 43)
    }
}

/// Probe column, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeColumn {
    /// One pixel left of the box
    OutsideLeft,
    /// Leftmost pixel column of the box
    InnerLeft,
    /// Rightmost pixel column of the box
    InnerRight,
    /// One pixel right of the box
    OutsideRight,
}

/// Probe row, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeRow {
    /// One pixel above the box
    OutsideTop,
    /// Topmost pixel row of the box
    InnerTop,
    /// Bottom pixel row of the box
    InnerBottom,
    /// One pixel below the box
    OutsideBottom,
}

/// Axis-aligned collision box owned by a character.
///
/// The anchor is the character's position; the box is the only holder of it,
/// so the geometry can never drift out of sync with the position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionBox {
    /// Reference point the offsets are measured from
    anchor: Vec2,
    /// Corner offsets
    offsets: BoxOffsets,
}

impl CollisionBox {
    /// Creates a box at `anchor`. Fails on zero or negative extents.
    pub fn new(anchor: Vec2, offsets: BoxOffsets) -> ControllerResult<Self> {
        offsets.validate()?;
        Ok(Self { anchor, offsets })
    }

    /// Returns the anchor position (sub-pixel precision).
    #[must_use]
    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    /// Returns the corner offsets.
    #[must_use]
    pub fn offsets(&self) -> BoxOffsets {
        self.offsets
    }

    pub(crate) fn set_anchor(&mut self, anchor: Vec2) {
        self.anchor = anchor;
    }

    pub(crate) fn translate(&mut self, delta: Vec2) {
        self.anchor += delta;
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> i32 {
        self.offsets.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> i32 {
        self.offsets.height()
    }

    fn floored_anchor(&self) -> PixelCoord {
        PixelCoord::new(self.anchor.x.floor() as i32, self.anchor.y.floor() as i32)
    }

    /// Left edge (first pixel column inside the box).
    #[must_use]
    pub fn left(&self) -> i32 {
        self.floored_anchor().x + self.offsets.x1
    }

    /// Right edge (one past the last pixel column).
    #[must_use]
    pub fn right(&self) -> i32 {
        self.left() + self.width()
    }

    /// Top edge (first pixel row inside the box).
    #[must_use]
    pub fn top(&self) -> i32 {
        self.floored_anchor().y + self.offsets.y1
    }

    /// Bottom edge (one past the last pixel row).
    #[must_use]
    pub fn bottom(&self) -> i32 {
        self.top() + self.height()
    }

    /// Absolute x of a probe column.
    #[must_use]
    pub fn probe_x(&self, column: ProbeColumn) -> i32 {
        let w = self.width();
        self.left()
            + match column {
                ProbeColumn::OutsideLeft => -1,
                ProbeColumn::InnerLeft => 0,
                ProbeColumn::InnerRight => w - 1,
                ProbeColumn::OutsideRight => w,
            }
    }

    /// Absolute y of a probe row.
    #[must_use]
    pub fn probe_y(&self, row: ProbeRow) -> i32 {
        let h = self.height();
        self.top()
            + match row {
                ProbeRow::OutsideTop => -1,
                ProbeRow::InnerTop => 0,
                ProbeRow::InnerBottom => h - 1,
                ProbeRow::OutsideBottom => h,
            }
    }

    /// Absolute pixel sampled by a probe column/row pair.
    #[must_use]
    pub fn probe(&self, column: ProbeColumn, row: ProbeRow) -> PixelCoord {
        PixelCoord::new(self.probe_x(column), self.probe_y(row))
    }

    /// Geometric middle of the box, floored to a pixel.
    #[must_use]
    pub fn middle(&self) -> PixelCoord {
        PixelCoord::new(
            self.left() + self.width() / 2,
            self.top() + self.height() / 2,
        )
    }

    /// Continuous centre of the box, without flooring.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.anchor
            + Vec2::new(
                self.offsets.x1 as f32 + self.width() as f32 / 2.0,
                self.offsets.y1 as f32 + self.height() as f32 / 2.0,
            )
    }

    /// Checks if this box overlaps another. Touching edges do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &CollisionBox) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}
