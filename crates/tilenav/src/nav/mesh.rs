use crate::tile::{CellCoord, CollisionType, Grid};

/// Coarse blocked/open grid for path planning, same dimensions as the source
/// grid. Only `Full` tiles block; corner tiles stay open here and are left to
/// the collision classifier.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OccupancyMesh {
    width: u32,
    height: u32,
    blocked: Vec<bool>,
}

pub fn blocks_navigation(collision: CollisionType) -> bool {
    matches!(collision, CollisionType::Full)
}

impl OccupancyMesh {
    pub fn from_grid(grid: &Grid) -> Self {
        let blocked = grid
            .cells()
            .map(|cell| grid.collision_at(cell).is_some_and(blocks_navigation))
            .collect();
        Self {
            width: grid.width(),
            height: grid.height(),
            blocked,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    /// `None` outside the mesh.
    pub fn is_blocked(&self, cell: CellCoord) -> Option<bool> {
        if !self.contains(cell) {
            return None;
        }
        let index = cell.x as usize * self.height as usize + cell.y as usize;
        self.blocked.get(index).copied()
    }

    pub fn is_open(&self, cell: CellCoord) -> bool {
        self.is_blocked(cell) == Some(false)
    }

    pub fn open_cell_count(&self) -> usize {
        self.blocked.iter().filter(|blocked| !**blocked).count()
    }

    /// `columns[x][y]`, the layout level files use.
    pub fn to_columns(&self) -> Vec<Vec<bool>> {
        if self.height == 0 {
            return Vec::new();
        }
        self.blocked
            .chunks(self.height as usize)
            .map(<[bool]>::to_vec)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_full_tiles_block() {
        let grid = Grid::from_collision_columns(&[
            vec![CollisionType::Empty, CollisionType::Full],
            vec![CollisionType::CornerUpperLeft, CollisionType::CornerLowerRight],
            vec![CollisionType::CornerUpperRight, CollisionType::CornerLowerLeft],
        ])
        .expect("grid");
        let mesh = OccupancyMesh::from_grid(&grid);
        assert_eq!(mesh.is_blocked(CellCoord::new(0, 0)), Some(false));
        assert_eq!(mesh.is_blocked(CellCoord::new(0, 1)), Some(true));
        for x in 1..3 {
            for y in 0..2 {
                assert!(mesh.is_open(CellCoord::new(x, y)), "corner at ({x}, {y})");
            }
        }
        assert_eq!(mesh.is_blocked(CellCoord::new(3, 0)), None);
        assert_eq!(mesh.open_cell_count(), 5);
    }

    #[test]
    fn all_full_grid_is_all_blocked() {
        let grid = Grid::from_collision_columns(&vec![vec![CollisionType::Full; 4]; 3])
            .expect("grid");
        let mesh = OccupancyMesh::from_grid(&grid);
        assert_eq!(mesh.open_cell_count(), 0);
        assert!(mesh.to_columns().iter().flatten().all(|blocked| *blocked));
        assert_eq!(mesh.to_columns().len(), 3);
    }
}
