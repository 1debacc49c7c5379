use crate::tile::{CellCoord, CollisionType, Grid, Vec2};

impl CollisionType {
    /// Whether a point at `local` (normalized to the cell, `[0,1)` per axis)
    /// lies inside this shape. Points exactly on a diagonal are open.
    pub fn blocks_local(self, local: Vec2) -> bool {
        match self {
            CollisionType::Empty => false,
            CollisionType::Full => true,
            CollisionType::CornerUpperRight => local.y < local.x,
            CollisionType::CornerLowerLeft => local.y > local.x,
            CollisionType::CornerLowerRight => local.y > 1.0 - local.x,
            CollisionType::CornerUpperLeft => local.y < 1.0 - local.x,
        }
    }
}

/// Classifies a world position against the grid.
///
/// Returns the tile's collision type when the position is obstructed and
/// `Empty` otherwise. Anything outside the grid, including non-finite input,
/// is `Empty`. Never allocates.
pub fn classify(grid: &Grid, tile_size: f32, pos: Vec2) -> CollisionType {
    let Some(cell) = containing_cell(grid, tile_size, pos) else {
        return CollisionType::Empty;
    };
    let Some(cell_type) = grid.collision_at(cell) else {
        return CollisionType::Empty;
    };

    let local = Vec2 {
        x: (pos.x - cell.x as f32 * tile_size) / tile_size,
        y: (pos.y - cell.y as f32 * tile_size) / tile_size,
    };
    if cell_type.blocks_local(local) {
        cell_type
    } else {
        CollisionType::Empty
    }
}

pub fn is_blocked(grid: &Grid, tile_size: f32, pos: Vec2) -> bool {
    classify(grid, tile_size, pos) != CollisionType::Empty
}

fn containing_cell(grid: &Grid, tile_size: f32, pos: Vec2) -> Option<CellCoord> {
    if !pos.is_finite() || !(tile_size > 0.0) {
        return None;
    }
    let cell_x = (pos.x / tile_size).floor();
    let cell_y = (pos.y / tile_size).floor();
    if cell_x < 0.0 || cell_y < 0.0 {
        return None;
    }
    if cell_x >= grid.width() as f32 || cell_y >= grid.height() as f32 {
        return None;
    }
    Some(CellCoord {
        x: cell_x as u32,
        y: cell_y as u32,
    })
}
