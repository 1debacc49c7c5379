use crate::level::Level;
use crate::tile::{CellCoord, CollisionType, Grid};

pub const DEMO_LEVEL_SIZE: u32 = 10;

/// The editor's sample map: an open 10x10 room with a 2x2 cluster of corner
/// tiles near the top-left.
pub fn demo_grid() -> Grid {
    let mut grid = Grid::new(DEMO_LEVEL_SIZE, DEMO_LEVEL_SIZE);
    for (x, y, collision) in [
        (1, 1, CollisionType::CornerLowerRight),
        (2, 2, CollisionType::CornerUpperLeft),
        (1, 2, CollisionType::CornerLowerLeft),
        (2, 1, CollisionType::CornerUpperRight),
    ] {
        grid.set_collision(CellCoord::new(x, y), collision);
    }
    grid
}

pub fn demo_level() -> Level {
    let mut level = Level::empty(0, 0);
    level.replace_grid(demo_grid());
    level
}
