//! Maze generation and tile queries.

use bevy_ecs::resource::Resource;
use glam::{IVec2, Vec2};
use tracing::debug;

use crate::constants::{spawn, MapTile};
use crate::map::direction::Direction;

/// Order in which [`Maze::find_nearest_walkable`] probes around a tile.
const NEAREST_PROBES: [IVec2; 5] = [IVec2::ZERO, IVec2::X, IVec2::NEG_X, IVec2::Y, IVec2::NEG_Y];

/// The static tile grid every actor moves on.
///
/// Tiles are stored row-major. Anything outside the grid reads as a wall, so
/// movement queries fail closed at the edges.
#[derive(Resource, Debug, Clone)]
pub struct Maze {
    cols: i32,
    rows: i32,
    tile_size: u32,
    tiles: Vec<MapTile>,
}

impl Maze {
    /// Generates the maze for a play field of `width`x`height` pixels.
    ///
    /// Generation is deterministic: a border of walls, a lattice of short wall
    /// pieces, then a cleared room in the middle where the ghosts spawn. Wall
    /// pieces that would land outside a very small grid are skipped.
    pub fn new(width: u32, height: u32, tile_size: u32) -> Maze {
        let cols = (width / tile_size.max(1)) as i32;
        let rows = (height / tile_size.max(1)) as i32;
        let mut maze = Maze {
            cols,
            rows,
            tile_size,
            tiles: vec![MapTile::Path; (cols.max(0) * rows.max(0)) as usize],
        };

        maze.build_border();
        maze.build_lattice();
        maze.clear_spawn_zone();

        debug!(cols, rows, tile_size, walls = maze.wall_count(), "Maze generated");
        maze
    }

    fn build_border(&mut self) {
        for x in 0..self.cols {
            self.set_tile(x, 0, MapTile::Wall);
            self.set_tile(x, self.rows - 1, MapTile::Wall);
        }
        for y in 0..self.rows {
            self.set_tile(0, y, MapTile::Wall);
            self.set_tile(self.cols - 1, y, MapTile::Wall);
        }
    }

    fn build_lattice(&mut self) {
        let mid = self.center();

        // Vertical pieces: every third row, on three fixed columns
        for y in (2..self.rows - 2).filter(|y| y % 3 == 0) {
            for x in [mid.x, mid.x - 5, mid.x + 5] {
                self.set_tile(x, y, MapTile::Wall);
            }
        }

        // Horizontal pieces: every fourth column, on three fixed rows
        for x in (2..self.cols - 2).filter(|x| x % 4 == 0) {
            for y in [3, mid.y, self.rows - 4] {
                self.set_tile(x, y, MapTile::Wall);
            }
        }
    }

    fn clear_spawn_zone(&mut self) {
        let (min, max) = self.spawn_zone();
        for y in min.y..=max.y {
            for x in min.x..=max.x {
                self.set_tile(x, y, MapTile::Path);
            }
        }
    }

    /// Number of columns in the grid.
    pub fn cols(&self) -> i32 {
        self.cols
    }

    /// Number of rows in the grid.
    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// The middle tile of the grid (rounded towards the top-left).
    pub fn center(&self) -> IVec2 {
        IVec2::new(self.cols / 2, self.rows / 2)
    }

    /// Inclusive corners of the ghost spawn room, clamped to the grid interior.
    pub fn spawn_zone(&self) -> (IVec2, IVec2) {
        let mid = self.center();
        let half = IVec2::new(spawn::ROOM_HALF_WIDTH, spawn::ROOM_HALF_HEIGHT);
        let interior_min = IVec2::ONE;
        let interior_max = IVec2::new(self.cols - 2, self.rows - 2);
        ((mid - half).max(interior_min), (mid + half).min(interior_max))
    }

    /// The four interior corner tiles, clockwise from the top-left.
    pub fn corners(&self) -> [IVec2; 4] {
        [
            IVec2::new(1, 1),
            IVec2::new(self.cols - 2, 1),
            IVec2::new(self.cols - 2, self.rows - 2),
            IVec2::new(1, self.rows - 2),
        ]
    }

    fn index(&self, col: i32, row: i32) -> Option<usize> {
        if col < 0 || col >= self.cols || row < 0 || row >= self.rows {
            None
        } else {
            Some((row * self.cols + col) as usize)
        }
    }

    /// Returns the tile at a grid position; out-of-bounds positions are walls.
    pub fn tile(&self, col: i32, row: i32) -> MapTile {
        self.index(col, row).map_or(MapTile::Wall, |i| self.tiles[i])
    }

    /// Overwrites a tile. Out-of-bounds writes are ignored.
    pub fn set_tile(&mut self, col: i32, row: i32, tile: MapTile) {
        if let Some(i) = self.index(col, row) {
            self.tiles[i] = tile;
        }
    }

    /// True only for in-bounds path tiles.
    pub fn is_walkable(&self, col: i32, row: i32) -> bool {
        self.tile(col, row) == MapTile::Path
    }

    pub fn is_walkable_at(&self, tile: IVec2) -> bool {
        self.is_walkable(tile.x, tile.y)
    }

    /// Whether stepping once from `tile` towards `direction` lands on a walkable tile.
    pub fn can_step(&self, tile: IVec2, direction: Direction) -> bool {
        self.is_walkable_at(tile + direction.as_ivec2())
    }

    /// Tests a pixel-space axis-aligned box against the grid.
    ///
    /// Returns true if any tile the box touches (edges included) is not walkable.
    pub fn check_collision(&self, x: f32, y: f32, width: f32, height: f32) -> bool {
        let ts = self.tile_size as f32;
        let left = (x / ts).floor() as i32;
        let right = ((x + width) / ts).floor() as i32;
        let top = (y / ts).floor() as i32;
        let bottom = ((y + height) / ts).floor() as i32;

        (left..=right).any(|col| (top..=bottom).any(|row| !self.is_walkable(col, row)))
    }

    /// Snaps a pixel position to the center of a nearby walkable tile.
    ///
    /// Probes the containing tile, then its right, left, lower and upper
    /// neighbours. If none of them is walkable the input is returned unchanged.
    pub fn find_nearest_walkable(&self, x: f32, y: f32) -> Vec2 {
        let origin = self.pixel_to_tile(Vec2::new(x, y));
        NEAREST_PROBES
            .iter()
            .map(|offset| origin + *offset)
            .find(|tile| self.is_walkable_at(*tile))
            .map_or(Vec2::new(x, y), |tile| self.tile_center(tile))
    }

    /// Like [`find_nearest_walkable`](Self::find_nearest_walkable), in tiles.
    pub fn nearest_walkable_tile(&self, tile: IVec2) -> IVec2 {
        let center = self.tile_center(tile);
        self.pixel_to_tile(self.find_nearest_walkable(center.x, center.y))
    }

    /// The tile containing a pixel position.
    pub fn pixel_to_tile(&self, pixel: Vec2) -> IVec2 {
        (pixel / self.tile_size as f32).floor().as_ivec2()
    }

    /// The pixel center of a tile.
    pub fn tile_center(&self, tile: IVec2) -> Vec2 {
        let ts = self.tile_size as f32;
        tile.as_vec2() * ts + Vec2::splat(ts / 2.0)
    }

    /// Iterates over every in-bounds tile position, row by row.
    pub fn positions(&self) -> impl Iterator<Item = IVec2> + '_ {
        (0..self.rows).flat_map(move |y| (0..self.cols).map(move |x| IVec2::new(x, y)))
    }

    pub fn wall_count(&self) -> usize {
        self.tiles.iter().filter(|t| **t == MapTile::Wall).count()
    }
}
