//! Tile-grid collision and navigation for 2D levels.
//!
//! A [`Level`] owns a [`Grid`] of typed tiles. `rebuild` derives an
//! [`OccupancyMesh`] and [`PathGraph`] from it; after that the level answers
//! continuous collision queries ([`classify`]) and discrete path queries.

mod collision;
pub mod content;
mod level;
pub mod nav;
mod tile;

pub use collision::{classify, is_blocked};
pub use content::{
    demo_grid, demo_level, export_level, level_from_file, load_level, parse_level_file,
    read_level_file, save_level, write_level_file, LevelFile, LevelFileError, PathMatrixEntry,
    DEMO_LEVEL_SIZE, LEVEL_FILE_FORMAT_VERSION,
};
pub use level::{Level, LevelError, DEFAULT_TILE_SIZE};
pub use nav::{
    build, Connectivity, NavConfig, NavError, NavSnapshot, NavigationPath, OccupancyMesh,
    PathEdge, PathGraph, PathQuery,
};
pub use tile::{AssetRef, CellCoord, CollisionType, Grid, GridError, Tile, Vec2};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_to_end_scenario_matches_documented_route() {
        let mut level = Level::empty(3, 3);
        level.set_collision(CellCoord::new(1, 1), CollisionType::Full);
        level.rebuild();
        let path = level
            .shortest_path(CellCoord::new(0, 0), CellCoord::new(2, 2))
            .expect("path");
        let expected: Vec<CellCoord> = [(0, 0), (1, 0), (2, 0), (2, 1), (2, 2)]
            .into_iter()
            .map(|(x, y)| CellCoord::new(x, y))
            .collect();
        assert_eq!(path, expected);
    }
}
