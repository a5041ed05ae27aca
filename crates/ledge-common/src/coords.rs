//! Coordinate types for pixel and tile positions.

use serde::{Deserialize, Serialize};

/// Absolute world coordinate in art pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelCoord {
    /// X coordinate in pixels (grows right)
    pub x: i32,
    /// Y coordinate in pixels (grows down)
    pub y: i32,
}

impl PixelCoord {
    /// Creates a new pixel coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Converts to the tile containing this pixel.
    ///
    /// Negative pixels map to negative tiles (floor division).
    #[must_use]
    pub const fn to_tile_coord(self, tile_size: u32) -> TileCoord {
        let size = tile_size as i32;
        TileCoord {
            x: self.x.div_euclid(size),
            y: self.y.div_euclid(size),
        }
    }
}

/// Tile coordinate in a tile map grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TileCoord {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Converts to pixel coordinate (top-left corner of the tile).
    #[must_use]
    pub const fn to_pixel_coord(self, tile_size: u32) -> PixelCoord {
        let size = tile_size as i32;
        PixelCoord {
            x: self.x * size,
            y: self.y * size,
        }
    }

    /// Converts to a row-major index into a map `width` tiles wide.
    ///
    /// Returns `None` for coordinates outside `0..width` / `0..height`.
    #[must_use]
    pub fn to_index(self, width: usize, height: usize) -> Option<usize> {
        let x = usize::try_from(self.x).ok()?;
        let y = usize::try_from(self.y).ok()?;
        (x < width && y < height).then_some(y * width + x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_pixel_lies_inside_its_tile(x in -10_000i32..10_000, y in -10_000i32..10_000, size in 1u32..64) {
            let origin = PixelCoord::new(x, y).to_tile_coord(size).to_pixel_coord(size);
            let size = size as i32;
            prop_assert!(origin.x <= x && x < origin.x + size);
            prop_assert!(origin.y <= y && y < origin.y + size);
        }
    }

    #[test]
    fn test_negative_pixels_floor_to_negative_tiles() {
        assert_eq!(PixelCoord::new(-1, -16).to_tile_coord(16), TileCoord::new(-1, -1));
        assert_eq!(PixelCoord::new(-17, 0).to_tile_coord(16), TileCoord::new(-2, 0));
    }

    #[test]
    fn test_tile_index_bounds() {
        assert_eq!(TileCoord::new(2, 1).to_index(4, 3), Some(6));
        assert_eq!(TileCoord::new(4, 0).to_index(4, 3), None);
        assert_eq!(TileCoord::new(0, -1).to_index(4, 3), None);
    }
}
