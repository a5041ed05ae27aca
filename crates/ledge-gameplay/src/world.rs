//! Tile-map query contract.
//!
//! The controller never queries ranges: every ground, wall and ceiling test
//! reduces to single-pixel material lookups at box probe coordinates.

use std::collections::HashMap;

use ledge_common::{MaterialId, PixelCoord, TileCoord};

/// Single-pixel material lookup provided by the surrounding game.
pub trait TileWorld {
    /// Material of the tile covering pixel `(x, y)`, `None` for empty space.
    fn material_at(&self, x: i32, y: i32) -> Option<MaterialId>;

    /// Checks if the pixel is covered by any material.
    fn is_solid(&self, x: i32, y: i32) -> bool {
        self.material_at(x, y).is_some()
    }
}

/// In-memory tile map for tests and tooling.
#[derive(Debug, Clone)]
pub struct MockTiles {
    /// Tile edge length in pixels
    tile_size: u32,
    /// Explicit tiles
    tiles: HashMap<TileCoord, MaterialId>,
    /// Ground level: every pixel at y >= this is solid
    ground_level: Option<(i32, MaterialId)>,
}

impl Default for MockTiles {
    fn default() -> Self {
        Self::new(16)
    }
}

impl MockTiles {
    /// Creates an empty map with the given tile size.
    #[must_use]
    pub fn new(tile_size: u32) -> Self {
        Self {
            tile_size: tile_size.max(1),
            tiles: HashMap::new(),
            ground_level: None,
        }
    }

    /// Returns the tile size in pixels.
    #[must_use]
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Sets a single tile.
    pub fn set_tile(&mut self, tile: TileCoord, material: MaterialId) {
        self.tiles.insert(tile, material);
    }

    /// Fills an inclusive rectangle of tiles.
    pub fn fill_tiles(&mut self, from: TileCoord, to: TileCoord, material: MaterialId) {
        for y in from.y.min(to.y)..=from.y.max(to.y) {
            for x in from.x.min(to.x)..=from.x.max(to.x) {
                self.tiles.insert(TileCoord::new(x, y), material);
            }
        }
    }

    /// Removes a tile.
    pub fn clear_tile(&mut self, tile: TileCoord) {
        self.tiles.remove(&tile);
    }

    /// Makes every pixel at `y >= pixel_y` solid.
    pub fn set_ground_level(&mut self, pixel_y: i32, material: MaterialId) {
        self.ground_level = Some((pixel_y, material));
    }

    /// Removes the ground level.
    pub fn clear_ground_level(&mut self) {
        self.ground_level = None;
    }
}

impl TileWorld for MockTiles {
    fn material_at(&self, x: i32, y: i32) -> Option<MaterialId> {
        if let Some((level, material)) = self.ground_level {
            if y >= level {
                return Some(material);
            }
        }
        let tile = PixelCoord::new(x, y).to_tile_coord(self.tile_size);
        self.tiles.get(&tile).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_tiles_lookup() {
        let mut tiles = MockTiles::new(16);
        tiles.set_tile(TileCoord::new(2, 3), MaterialId::GRASS);

        assert_eq!(tiles.material_at(32, 48), Some(MaterialId::GRASS));
        assert_eq!(tiles.material_at(47, 63), Some(MaterialId::GRASS));
        assert_eq!(tiles.material_at(48, 48), None);
        assert!(!tiles.is_solid(31, 48));
    }

    #[test]
    fn test_mock_tiles_ground_level() {
        let mut tiles = MockTiles::new(16);
        tiles.set_ground_level(100, MaterialId::STONE);

        assert!(!tiles.is_solid(0, 99));
        assert!(tiles.is_solid(0, 100));
        assert!(tiles.is_solid(-500, 400));
    }

    #[test]
    fn test_fill_and_clear() {
        let mut tiles = MockTiles::new(8);
        tiles.fill_tiles(TileCoord::new(0, 0), TileCoord::new(1, 1), MaterialId::RED);
        assert!(tiles.is_solid(15, 15));

        tiles.clear_tile(TileCoord::new(1, 1));
        assert!(!tiles.is_solid(15, 15));
        assert!(tiles.is_solid(7, 15));
    }
}
