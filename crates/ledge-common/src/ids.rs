//! ID types for tile materials and world handles.

use serde::{Deserialize, Serialize};

/// Identifier of a tile material in the collision tile map.
///
/// Empty space has no material; lookups return `Option<MaterialId>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialId(u16);

impl MaterialId {
    /// Plain solid rock.
    pub const STONE: Self = Self(1);
    /// Grass-topped ground (kicks up green dust).
    pub const GRASS: Self = Self(2);
    /// Red clay.
    pub const RED: Self = Self(0);

    /// Creates a material ID from a raw value.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

/// Handle to a grapple point owned by the surrounding game.
///
/// The character stores the handle, never the point itself; the point list
/// is passed in again on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GrappleId(usize);

impl GrappleId {
    /// Creates a grapple handle from an index into the game's point list.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the index into the point list.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}
