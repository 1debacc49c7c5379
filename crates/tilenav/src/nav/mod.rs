mod fingerprint;
mod graph;
mod mesh;
mod query;
mod route;

use thiserror::Error;

use crate::tile::{CellCoord, Grid};

pub use fingerprint::grid_fingerprint;
pub use graph::{
    build, Connectivity, NavConfig, PathEdge, PathGraph, DIAGONAL_COST, ORTHOGONAL_COST,
};
pub use mesh::{blocks_navigation, OccupancyMesh};
pub use query::PathQuery;
pub use route::NavigationPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NavError {
    #[error("cell {cell} is outside the {width}x{height} grid")]
    OutOfBounds {
        cell: CellCoord,
        width: u32,
        height: u32,
    },
    #[error("path endpoint {cell} is blocked or outside the grid")]
    InvalidEndpoint { cell: CellCoord },
    #[error("no path from {from} to {to}")]
    NotFound { from: CellCoord, to: CellCoord },
    #[error("navigation data has not been built; call rebuild first")]
    NotInitialized,
}

/// One complete, immutable build of the derived navigation data.
#[derive(Debug, Clone, PartialEq)]
pub struct NavSnapshot {
    mesh: OccupancyMesh,
    graph: PathGraph,
    config: NavConfig,
    grid_fingerprint: String,
}

impl NavSnapshot {
    pub fn build(grid: &Grid, config: NavConfig) -> Self {
        let (mesh, graph) = build(grid, config);
        Self {
            mesh,
            graph,
            config,
            grid_fingerprint: grid_fingerprint(grid),
        }
    }

    pub fn mesh(&self) -> &OccupancyMesh {
        &self.mesh
    }

    pub fn graph(&self) -> &PathGraph {
        &self.graph
    }

    pub fn config(&self) -> NavConfig {
        self.config
    }

    pub fn grid_fingerprint(&self) -> &str {
        &self.grid_fingerprint
    }

    pub fn query(&self) -> PathQuery<'_> {
        PathQuery::new(&self.mesh, &self.graph)
    }
}
