use glam::{IVec2, Vec2};
use pachorman::config::GameConfig;
use pachorman::constants::{spawn, MapTile};
use pachorman::map::{Direction, Maze};
use pachorman::systems::{ghost_spawn_tile, player_start_tile, Settings};
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

fn default_maze() -> Maze {
    Maze::new(800, 600, 32)
}

#[test]
fn test_border_is_walled() {
    let maze = default_maze();
    for x in 0..maze.cols() {
        assert_that(&maze.is_walkable(x, 0)).is_false();
        assert_that(&maze.is_walkable(x, maze.rows() - 1)).is_false();
    }
    for y in 0..maze.rows() {
        assert_that(&maze.is_walkable(0, y)).is_false();
        assert_that(&maze.is_walkable(maze.cols() - 1, y)).is_false();
    }
}

#[test]
fn test_spawn_zone_is_clear() {
    let maze = default_maze();
    let (min, max) = maze.spawn_zone();
    assert_eq!((min, max), (IVec2::new(9, 7), IVec2::new(15, 11)));
    for y in min.y..=max.y {
        for x in min.x..=max.x {
            assert!(maze.is_walkable(x, y), "({x}, {y}) should be walkable");
        }
    }
}

#[test]
fn test_lattice_pieces() {
    let maze = default_maze();
    // Horizontal pieces on rows 3, 9 and 14
    assert_eq!(maze.tile(4, 3), MapTile::Wall);
    assert_eq!(maze.tile(4, 9), MapTile::Wall);
    assert_eq!(maze.tile(20, 14), MapTile::Wall);
    // Vertical pieces on columns 7, 12 and 17
    assert_eq!(maze.tile(12, 6), MapTile::Wall);
    assert_eq!(maze.tile(7, 9), MapTile::Wall);
    assert_eq!(maze.tile(17, 15), MapTile::Wall);
    // Inside the spawn room the lattice is cleared
    assert_eq!(maze.tile(12, 9), MapTile::Path);
    // Untouched corridor
    assert_eq!(maze.tile(5, 5), MapTile::Path);
}

#[test]
fn test_generation_is_deterministic() {
    let a = default_maze();
    let b = default_maze();
    let walls_a: Vec<IVec2> = a.positions().filter(|t| !a.is_walkable_at(*t)).collect();
    let walls_b: Vec<IVec2> = b.positions().filter(|t| !b.is_walkable_at(*t)).collect();
    assert_eq!(walls_a, walls_b);
}

#[test]
fn test_out_of_bounds_is_wall() {
    let maze = default_maze();
    assert_eq!(maze.tile(-1, 5), MapTile::Wall);
    assert_eq!(maze.tile(5, 100), MapTile::Wall);
    assert_that(&maze.is_walkable(25, 1)).is_false();
    assert_that(&maze.can_step(IVec2::new(1, 1), Direction::Up)).is_false();
}

#[test]
fn test_set_tile_ignores_out_of_bounds() {
    let mut maze = default_maze();
    let walls = maze.wall_count();
    maze.set_tile(-3, 2, MapTile::Wall);
    maze.set_tile(40, 40, MapTile::Wall);
    assert_eq!(maze.wall_count(), walls);

    maze.set_tile(5, 5, MapTile::Wall);
    assert_that(&maze.is_walkable(5, 5)).is_false();
}

#[test]
fn test_check_collision() {
    let maze = default_maze();
    // Fully inside a corridor tile
    assert_that(&maze.check_collision(165.0, 165.0, 10.0, 10.0)).is_false();
    // Touching the border
    assert_that(&maze.check_collision(2.0, 40.0, 10.0, 10.0)).is_true();
    // Straddling corridor (11, 15) and wall (12, 15)
    assert_that(&maze.check_collision(12.0 * 32.0 - 5.0, 15.0 * 32.0 + 5.0, 10.0, 10.0)).is_true();
}

#[test]
fn test_find_nearest_walkable() {
    let maze = default_maze();
    // Already walkable: snapped to the tile center
    assert_eq!(maze.find_nearest_walkable(165.0, 170.0), Vec2::new(176.0, 176.0));
    // (12, 15) is a wall, its right neighbour is free
    assert_eq!(maze.find_nearest_walkable(400.0, 500.0), Vec2::new(13.0 * 32.0 + 16.0, 15.0 * 32.0 + 16.0));
}

#[test]
fn test_find_nearest_walkable_gives_up() {
    let mut maze = default_maze();
    for tile in [IVec2::new(5, 5), IVec2::new(6, 5), IVec2::new(4, 5), IVec2::new(5, 6), IVec2::new(5, 4)] {
        maze.set_tile(tile.x, tile.y, MapTile::Wall);
    }
    assert_eq!(maze.find_nearest_walkable(170.0, 170.0), Vec2::new(170.0, 170.0));
}

#[test]
fn test_tiny_grid_generates() {
    let maze = Maze::new(160, 160, 32);
    assert_eq!((maze.cols(), maze.rows()), (5, 5));
    assert_eq!(maze.tile(0, 0), MapTile::Wall);
    assert_that(&maze.is_walkable(2, 2)).is_true();
}

#[test]
fn test_coordinate_conversion() {
    let maze = default_maze();
    let tile = IVec2::new(6, 5);
    assert_eq!(maze.tile_center(tile), Vec2::new(208.0, 176.0));
    assert_eq!(maze.pixel_to_tile(Vec2::new(208.0, 176.0)), tile);
    assert_eq!(maze.pixel_to_tile(Vec2::new(192.0, 160.0)), tile);
}

/// Field sizes and tile sizes well away from the default 800x600 at 32px.
const FIELDS: [(u32, u32, u32); 13] = [
    (800, 600, 16),
    (800, 600, 20),
    (800, 600, 40),
    (800, 600, 50),
    (640, 480, 32),
    (1024, 768, 32),
    (1280, 720, 16),
    (320, 240, 32),
    (480, 480, 24),
    (1000, 1000, 25),
    (160, 160, 32),
    (200, 160, 20),
    (960, 540, 30),
];

#[test]
fn test_layout_holds_across_fields() {
    for (width, height, tile_size) in FIELDS {
        let maze = Maze::new(width, height, tile_size);
        let field = format!("{width}x{height}@{tile_size}");
        assert_eq!(maze.cols(), (width / tile_size) as i32, "{field}");
        assert_eq!(maze.rows(), (height / tile_size) as i32, "{field}");

        for x in 0..maze.cols() {
            assert!(!maze.is_walkable(x, 0), "{field}: top border open at column {x}");
            assert!(!maze.is_walkable(x, maze.rows() - 1), "{field}: bottom border open at column {x}");
        }
        for y in 0..maze.rows() {
            assert!(!maze.is_walkable(0, y), "{field}: left border open at row {y}");
            assert!(!maze.is_walkable(maze.cols() - 1, y), "{field}: right border open at row {y}");
        }

        let (min, max) = maze.spawn_zone();
        assert_that(&min.cmpge(IVec2::ONE).all()).is_true();
        assert_that(&max.cmple(IVec2::new(maze.cols() - 2, maze.rows() - 2)).all()).is_true();
        for y in min.y..=max.y {
            for x in min.x..=max.x {
                assert!(maze.is_walkable(x, y), "{field}: spawn room blocked at ({x}, {y})");
            }
        }

        let settings = Settings(GameConfig {
            width,
            height,
            tile_size,
            ..GameConfig::default()
        });
        let start = player_start_tile(&maze, &settings);
        assert!(maze.is_walkable_at(start), "{field}: player starts on a wall at {start}");

        for index in 0..8 {
            let tile = ghost_spawn_tile(&maze, index);
            assert!(maze.is_walkable_at(tile), "{field}: ghost {index} spawns on a wall at {tile}");
            assert!(tile.cmpge(min).all() && tile.cmple(max).all(), "{field}: ghost {index} outside the room");
        }

        let boss = maze.nearest_walkable_tile(spawn::BOSS_TILE);
        assert!(maze.is_walkable_at(boss), "{field}: boss spawns on a wall at {boss}");
    }
}
