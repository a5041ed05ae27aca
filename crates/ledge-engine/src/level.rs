//! ASCII tile levels.
//!
//! One character per tile, one line per tile row:
//!
//! | char      | tile                    |
//! |-----------|-------------------------|
//! | `.` / ` ` | empty                   |
//! | `#`       | stone                   |
//! | `g`       | grass                   |
//! | `r`       | red clay                |
//! | `@`       | spawn point (empty)     |
//! | `o`       | grapple point (empty)   |
//!
//! Everything outside the grid is empty space.

use std::str::FromStr;

use glam::Vec2;
use ledge_common::{LevelError, MaterialId, PixelCoord, TileCoord};
use ledge_gameplay::{BoxOffsets, GrapplePoint, TileWorld};

/// Tile edge length in pixels.
pub const TILE_SIZE: u32 = 16;

/// A parsed tile level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLevel {
    /// Width in tiles
    width: usize,
    /// Height in tiles
    height: usize,
    /// Row-major tile materials
    tiles: Vec<Option<MaterialId>>,
    /// Spawn tile
    spawn: TileCoord,
    /// Grapple tiles in reading order
    grapples: Vec<TileCoord>,
}

impl TileLevel {
    /// Width in tiles.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in tiles.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Spawn tile.
    #[must_use]
    pub fn spawn(&self) -> TileCoord {
        self.spawn
    }

    /// Material of a tile, `None` when empty or outside the grid.
    #[must_use]
    pub fn tile(&self, tile: TileCoord) -> Option<MaterialId> {
        let index = tile.to_index(self.width, self.height)?;
        self.tiles.get(index).copied().flatten()
    }

    /// Anchor that rests a box with `offsets` on the bottom of the spawn
    /// tile, centred horizontally in it.
    #[must_use]
    pub fn spawn_anchor(&self, offsets: BoxOffsets) -> Vec2 {
        let size = TILE_SIZE as i32;
        let origin = self.spawn.to_pixel_coord(TILE_SIZE);
        let box_center = (offsets.x1 + offsets.x2) / 2;
        Vec2::new(
            (origin.x + size / 2 - box_center) as f32,
            (origin.y + size - offsets.y2) as f32,
        )
    }

    /// Grapple points at the centres of the `o` tiles.
    #[must_use]
    pub fn grapple_points(&self, range: f32) -> Vec<GrapplePoint> {
        let half = TILE_SIZE as f32 / 2.0;
        self.grapples
            .iter()
            .map(|tile| {
                let origin = tile.to_pixel_coord(TILE_SIZE);
                GrapplePoint::new(
                    Vec2::new(origin.x as f32 + half, origin.y as f32 + half),
                    range,
                )
            })
            .collect()
    }
}

impl FromStr for TileLevel {
    type Err = LevelError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .collect();
        let rows = match rows.iter().rposition(|row| !row.is_empty()) {
            Some(last) => &rows[..=last],
            None => return Err(LevelError::Empty),
        };

        let width = rows[0].chars().count();
        let mut tiles = Vec::with_capacity(width * rows.len());
        let mut spawn = None;
        let mut grapples = Vec::new();

        for (y, row) in rows.iter().enumerate() {
            let actual = row.chars().count();
            if actual != width {
                return Err(LevelError::Ragged {
                    line: y + 1,
                    expected: width,
                    actual,
                });
            }

            for (x, ch) in row.chars().enumerate() {
                let coord = TileCoord::new(x as i32, y as i32);
                let material = match ch {
                    '.' | ' ' => None,
                    '#' => Some(MaterialId::STONE),
                    'g' => Some(MaterialId::GRASS),
                    'r' => Some(MaterialId::RED),
                    '@' => {
                        if spawn.is_some() {
                            return Err(LevelError::MultipleSpawns {
                                line: y + 1,
                                column: x + 1,
                            });
                        }
                        spawn = Some(coord);
                        None
                    },
                    'o' => {
                        grapples.push(coord);
                        None
                    },
                    _ => {
                        return Err(LevelError::UnknownTile {
                            ch,
                            line: y + 1,
                            column: x + 1,
                        })
                    },
                };
                tiles.push(material);
            }
        }

        Ok(Self {
            width,
            height: rows.len(),
            tiles,
            spawn: spawn.ok_or(LevelError::MissingSpawn)?,
            grapples,
        })
    }
}

impl TileWorld for TileLevel {
    fn material_at(&self, x: i32, y: i32) -> Option<MaterialId> {
        self.tile(PixelCoord::new(x, y).to_tile_coord(TILE_SIZE))
    }
}
