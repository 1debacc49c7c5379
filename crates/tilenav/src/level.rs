use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::collision;
use crate::nav::{
    grid_fingerprint, NavConfig, NavError, NavSnapshot, NavigationPath, OccupancyMesh, PathGraph,
};
use crate::tile::{CellCoord, CollisionType, Grid, Tile, Vec2};

pub const DEFAULT_TILE_SIZE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum LevelError {
    #[error("tile size must be finite and greater than zero, got {tile_size}")]
    InvalidTileSize { tile_size: f32 },
}

/// Owns one grid and the navigation data derived from it.
///
/// Grid coordinates: tile `(x, y)` covers world `[x, x+1) * tile_size` by
/// `[y, y+1) * tile_size`, with `y` growing downward. Derived data is
/// published as a whole `Arc<NavSnapshot>` on every rebuild, so a caller
/// holding an older snapshot keeps a consistent mesh/graph pair.
#[derive(Debug, Clone)]
pub struct Level {
    grid: Grid,
    tile_size: f32,
    config: NavConfig,
    nav: Option<Arc<NavSnapshot>>,
    nav_stale: bool,
}

impl Default for Level {
    fn default() -> Self {
        Self::empty(0, 0)
    }
}

impl Level {
    pub fn new(grid: Grid, tile_size: f32) -> Result<Self, LevelError> {
        validate_tile_size(tile_size)?;
        Ok(Self {
            grid,
            tile_size,
            config: NavConfig::default(),
            nav: None,
            nav_stale: false,
        })
    }

    /// All-`Empty` level with the default tile size.
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            grid: Grid::new(width, height),
            tile_size: DEFAULT_TILE_SIZE,
            config: NavConfig::default(),
            nav: None,
            nav_stale: false,
        }
    }

    pub fn with_config(mut self, config: NavConfig) -> Self {
        self.set_config(config);
        self
    }

    pub fn set_config(&mut self, config: NavConfig) {
        if self.config != config {
            self.config = config;
            self.mark_stale();
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn config(&self) -> NavConfig {
        self.config
    }

    pub fn set_tile(&mut self, cell: CellCoord, tile: Tile) -> Option<Tile> {
        let previous = self.grid.set_tile(cell, tile)?;
        self.mark_stale();
        Some(previous)
    }

    pub fn set_collision(&mut self, cell: CellCoord, collision: CollisionType) -> bool {
        let changed = self.grid.set_collision(cell, collision);
        if changed {
            self.mark_stale();
        }
        changed
    }

    pub fn replace_grid(&mut self, grid: Grid) -> Grid {
        self.mark_stale();
        std::mem::replace(&mut self.grid, grid)
    }

    /// Recomputes the occupancy mesh and path graph from the current grid
    /// and publishes them together.
    pub fn rebuild(&mut self) -> Arc<NavSnapshot> {
        let snapshot = Arc::new(NavSnapshot::build(&self.grid, self.config));
        info!(
            width = self.grid.width(),
            height = self.grid.height(),
            open_cells = snapshot.mesh().open_cell_count(),
            nodes = snapshot.graph().node_count(),
            edges = snapshot.graph().edge_count(),
            "nav_rebuilt"
        );
        self.nav = Some(Arc::clone(&snapshot));
        self.nav_stale = false;
        snapshot
    }

    pub fn is_built(&self) -> bool {
        self.nav.is_some()
    }

    /// True when the grid or config changed after the last rebuild.
    pub fn is_nav_stale(&self) -> bool {
        self.nav_stale
    }

    pub fn nav_snapshot(&self) -> Result<Arc<NavSnapshot>, NavError> {
        self.nav.clone().ok_or(NavError::NotInitialized)
    }

    pub fn mesh(&self) -> Result<&OccupancyMesh, NavError> {
        Ok(self.snapshot_ref()?.mesh())
    }

    pub fn graph(&self) -> Result<&PathGraph, NavError> {
        Ok(self.snapshot_ref()?.graph())
    }

    pub fn grid_fingerprint(&self) -> String {
        grid_fingerprint(&self.grid)
    }

    /// Collision test against the live grid. Outside the grid is `Empty`.
    pub fn classify(&self, pos: Vec2) -> Result<CollisionType, NavError> {
        self.snapshot_ref()?;
        Ok(collision::classify(&self.grid, self.tile_size, pos))
    }

    pub fn is_blocked(&self, pos: Vec2) -> Result<bool, NavError> {
        Ok(self.classify(pos)? != CollisionType::Empty)
    }

    pub fn is_open(&self, cell: CellCoord) -> Result<bool, NavError> {
        self.snapshot_ref()?.query().is_open(cell)
    }

    pub fn shortest_path(
        &self,
        from: CellCoord,
        to: CellCoord,
    ) -> Result<Vec<CellCoord>, NavError> {
        self.snapshot_ref()?.query().shortest_path(from, to)
    }

    pub fn is_reachable(&self, from: CellCoord, to: CellCoord) -> Result<bool, NavError> {
        self.snapshot_ref()?.query().is_reachable(from, to)
    }

    pub fn reachable_from(&self, from: CellCoord) -> Result<BTreeSet<CellCoord>, NavError> {
        self.snapshot_ref()?.query().reachable_from(from)
    }

    /// Cell containing `pos`, clamped into the grid on each axis
    /// independently. `None` only for a grid without cells or a NaN input.
    pub fn world_to_cell(&self, pos: Vec2) -> Option<CellCoord> {
        if self.grid.is_empty() || pos.x.is_nan() || pos.y.is_nan() {
            return None;
        }
        Some(CellCoord {
            x: clamp_axis(pos.x / self.tile_size, self.grid.width()),
            y: clamp_axis(pos.y / self.tile_size, self.grid.height()),
        })
    }

    /// Cell containing `pos`, or `None` when `pos` is outside the level.
    pub fn world_to_cell_strict(&self, pos: Vec2) -> Option<CellCoord> {
        if !self.contains_world(pos) {
            return None;
        }
        self.world_to_cell(pos)
    }

    /// Half-open bounds check in world units.
    pub fn contains_world(&self, pos: Vec2) -> bool {
        pos.x >= 0.0
            && pos.y >= 0.0
            && pos.x < self.grid.width() as f32 * self.tile_size
            && pos.y < self.grid.height() as f32 * self.tile_size
    }

    pub fn cell_center_world(&self, cell: CellCoord) -> Vec2 {
        Vec2 {
            x: (cell.x as f32 + 0.5) * self.tile_size,
            y: (cell.y as f32 + 0.5) * self.tile_size,
        }
    }

    /// Plans a route between two world positions as cell-center waypoints.
    pub fn plan_route(
        &self,
        start_world: Vec2,
        goal_world: Vec2,
    ) -> Result<NavigationPath, NavError> {
        let snapshot = self.snapshot_ref()?;
        let start = self.endpoint_cell(start_world)?;
        let goal = self.endpoint_cell(goal_world)?;
        let cells = snapshot.query().shortest_path(start, goal)?;
        debug!(
            start = %start,
            goal = %goal,
            steps = cells.len().saturating_sub(1),
            "route_planned"
        );
        NavigationPath::from_cells(cells, |cell| self.cell_center_world(cell))
            .ok_or(NavError::NotFound {
                from: start,
                to: goal,
            })
    }

    fn endpoint_cell(&self, pos: Vec2) -> Result<CellCoord, NavError> {
        self.world_to_cell_strict(pos).ok_or_else(|| NavError::InvalidEndpoint {
            cell: self.world_to_cell(pos).unwrap_or_default(),
        })
    }

    fn snapshot_ref(&self) -> Result<&NavSnapshot, NavError> {
        self.nav.as_deref().ok_or(NavError::NotInitialized)
    }

    fn mark_stale(&mut self) {
        if self.nav.is_some() && !self.nav_stale {
            debug!("nav_marked_stale");
        }
        self.nav_stale = self.nav.is_some();
    }
}

fn validate_tile_size(tile_size: f32) -> Result<(), LevelError> {
    if tile_size.is_finite() && tile_size > 0.0 {
        Ok(())
    } else {
        Err(LevelError::InvalidTileSize { tile_size })
    }
}

fn clamp_axis(scaled: f32, len: u32) -> u32 {
    let last = len.saturating_sub(1);
    let floored = scaled.floor();
    if floored <= 0.0 {
        0
    } else if floored >= last as f32 {
        last
    } else {
        floored as u32
    }
}
