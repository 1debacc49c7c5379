use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-tile occupation shape.
///
/// Corner variants occupy a right triangle of the tile. The name gives the
/// corner the triangle sits in, with `y` growing downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CollisionType {
    #[default]
    Empty,
    Full,
    CornerUpperLeft,
    CornerUpperRight,
    CornerLowerLeft,
    CornerLowerRight,
}

impl CollisionType {
    pub const ALL: [CollisionType; 6] = [
        CollisionType::Empty,
        CollisionType::Full,
        CollisionType::CornerUpperLeft,
        CollisionType::CornerUpperRight,
        CollisionType::CornerLowerLeft,
        CollisionType::CornerLowerRight,
    ];

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            CollisionType::CornerUpperLeft
                | CollisionType::CornerUpperRight
                | CollisionType::CornerLowerLeft
                | CollisionType::CornerLowerRight
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            CollisionType::Empty => "Empty",
            CollisionType::Full => "Full",
            CollisionType::CornerUpperLeft => "CornerUpperLeft",
            CollisionType::CornerUpperRight => "CornerUpperRight",
            CollisionType::CornerLowerLeft => "CornerLowerLeft",
            CollisionType::CornerLowerRight => "CornerLowerRight",
        }
    }

    pub(crate) fn fingerprint_byte(self) -> u8 {
        match self {
            CollisionType::Empty => 0,
            CollisionType::Full => 1,
            CollisionType::CornerUpperLeft => 2,
            CollisionType::CornerUpperRight => 3,
            CollisionType::CornerLowerLeft => 4,
            CollisionType::CornerLowerRight => 5,
        }
    }
}

/// Opaque handle to a tile's visual asset. Only ever stored and echoed back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRef(pub String);

impl AssetRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tile {
    #[serde(default)]
    pub collision: CollisionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<AssetRef>,
}

impl Tile {
    pub fn new(collision: CollisionType, asset: Option<AssetRef>) -> Self {
        Self { collision, asset }
    }

    pub fn with_collision(collision: CollisionType) -> Self {
        Self {
            collision,
            asset: None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct CellCoord {
    pub x: u32,
    pub y: u32,
}

impl CellCoord {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for CellCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("malformed grid: column {column} has {actual} tiles, expected {expected}")]
    MalformedGrid {
        column: usize,
        expected: usize,
        actual: usize,
    },
    #[error("grid dimension {len} does not fit in u32")]
    TooLarge { len: usize },
}

/// Rectangular tile grid addressed as `grid[x][y]`.
///
/// Storage is column-major: the tile at `(x, y)` lives at `x * height + y`.
/// A grid with either dimension zero has no valid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl Grid {
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = if width == 0 || height == 0 {
            (0, 0)
        } else {
            (width, height)
        };
        Self {
            width,
            height,
            tiles: vec![Tile::default(); width as usize * height as usize],
        }
    }

    /// Builds a grid from `columns[x][y]`, rejecting jagged input.
    pub fn from_columns(columns: Vec<Vec<Tile>>) -> Result<Self, GridError> {
        let width = u32::try_from(columns.len()).map_err(|_| GridError::TooLarge {
            len: columns.len(),
        })?;
        let expected = columns.first().map(Vec::len).unwrap_or(0);
        let height =
            u32::try_from(expected).map_err(|_| GridError::TooLarge { len: expected })?;
        for (column, tiles) in columns.iter().enumerate() {
            if tiles.len() != expected {
                return Err(GridError::MalformedGrid {
                    column,
                    expected,
                    actual: tiles.len(),
                });
            }
        }
        if height == 0 {
            return Ok(Self::new(0, 0));
        }

        Ok(Self {
            width,
            height,
            tiles: columns.into_iter().flatten().collect(),
        })
    }

    pub fn from_collision_columns(columns: &[Vec<CollisionType>]) -> Result<Self, GridError> {
        Self::from_columns(
            columns
                .iter()
                .map(|column| column.iter().copied().map(Tile::with_collision).collect())
                .collect(),
        )
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    pub fn index_of(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        Some(cell.x as usize * self.height as usize + cell.y as usize)
    }

    pub fn tile_at(&self, cell: CellCoord) -> Option<&Tile> {
        self.index_of(cell).and_then(|index| self.tiles.get(index))
    }

    pub fn collision_at(&self, cell: CellCoord) -> Option<CollisionType> {
        self.tile_at(cell).map(|tile| tile.collision)
    }

    /// Replaces the tile at `cell`, returning the previous one.
    pub fn set_tile(&mut self, cell: CellCoord, tile: Tile) -> Option<Tile> {
        let index = self.index_of(cell)?;
        let slot = self.tiles.get_mut(index)?;
        Some(std::mem::replace(slot, tile))
    }

    pub fn set_collision(&mut self, cell: CellCoord, collision: CollisionType) -> bool {
        let Some(index) = self.index_of(cell) else {
            return false;
        };
        match self.tiles.get_mut(index) {
            Some(tile) => {
                tile.collision = collision;
                true
            }
            None => false,
        }
    }

    /// Cells in canonical order: x-major, then y.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let height = self.height;
        (0..self.width).flat_map(move |x| (0..height).map(move |y| CellCoord { x, y }))
    }

    pub fn to_columns(&self) -> Vec<Vec<Tile>> {
        if self.height == 0 {
            return Vec::new();
        }
        self.tiles
            .chunks(self.height as usize)
            .map(<[Tile]>::to_vec)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tile_is_empty_without_asset() {
        let tile = Tile::default();
        assert_eq!(tile.collision, CollisionType::Empty);
        assert!(tile.asset.is_none());
    }

    #[test]
    fn from_columns_rejects_jagged_rows() {
        let columns = vec![
            vec![Tile::default(), Tile::default()],
            vec![Tile::default()],
        ];
        let err = Grid::from_columns(columns).expect_err("jagged");
        assert_eq!(
            err,
            GridError::MalformedGrid {
                column: 1,
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn from_columns_indexes_as_x_then_y() {
        let grid = Grid::from_collision_columns(&[
            vec![CollisionType::Empty, CollisionType::Full, CollisionType::Empty],
            vec![
                CollisionType::CornerLowerLeft,
                CollisionType::Empty,
                CollisionType::Empty,
            ],
        ])
        .expect("grid");
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.collision_at(CellCoord::new(0, 1)), Some(CollisionType::Full));
        assert_eq!(
            grid.collision_at(CellCoord::new(1, 0)),
            Some(CollisionType::CornerLowerLeft)
        );
        assert_eq!(grid.collision_at(CellCoord::new(2, 0)), None);
        assert_eq!(grid.collision_at(CellCoord::new(0, 3)), None);
    }

    #[test]
    fn zero_sized_grids_have_no_cells() {
        for grid in [
            Grid::new(0, 5),
            Grid::new(5, 0),
            Grid::from_columns(Vec::new()).expect("empty"),
            Grid::from_columns(vec![Vec::new(), Vec::new()]).expect("no rows"),
        ] {
            assert!(grid.is_empty());
            assert_eq!(grid.cells().count(), 0);
            assert!(!grid.contains(CellCoord::new(0, 0)));
        }
    }

    #[test]
    fn set_tile_replaces_and_reports_previous() {
        let mut grid = Grid::new(2, 2);
        let previous = grid
            .set_tile(
                CellCoord::new(1, 1),
                Tile::new(CollisionType::Full, Some(AssetRef::new("wall.png"))),
            )
            .expect("in bounds");
        assert_eq!(previous, Tile::default());
        assert_eq!(grid.collision_at(CellCoord::new(1, 1)), Some(CollisionType::Full));
        assert!(grid.set_tile(CellCoord::new(2, 0), Tile::default()).is_none());
        assert!(!grid.set_collision(CellCoord::new(0, 2), CollisionType::Full));
    }

    #[test]
    fn to_columns_round_trips_layout() {
        let mut grid = Grid::new(3, 2);
        grid.set_collision(CellCoord::new(2, 1), CollisionType::CornerUpperRight);
        let rebuilt = Grid::from_columns(grid.to_columns()).expect("grid");
        assert_eq!(rebuilt, grid);
    }

    #[test]
    fn collision_type_serializes_by_name() {
        let json = serde_json::to_string(&CollisionType::CornerLowerRight).expect("encode");
        assert_eq!(json, "\"CornerLowerRight\"");
        for kind in CollisionType::ALL {
            assert_eq!(format!("\"{}\"", kind.name()), serde_json::to_string(&kind).expect("encode"));
        }
    }
}
