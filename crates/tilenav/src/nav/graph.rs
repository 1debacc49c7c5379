use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::mesh::OccupancyMesh;
use crate::tile::{CellCoord, Grid};

pub const ORTHOGONAL_COST: f32 = 1.0;
pub const DIAGONAL_COST: f32 = std::f32::consts::SQRT_2;

// Visitation order with y growing downward: up, right, down, left.
const ORTHOGONAL_STEPS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];
const EIGHT_WAY_STEPS: [(i32, i32); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Connectivity {
    #[default]
    Four,
    Eight,
}

impl Connectivity {
    fn steps(self) -> &'static [(i32, i32)] {
        match self {
            Connectivity::Four => &ORTHOGONAL_STEPS,
            Connectivity::Eight => &EIGHT_WAY_STEPS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavConfig {
    pub connectivity: Connectivity,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathEdge {
    pub to: CellCoord,
    pub cost: f32,
}

/// Adjacency over open cells. Every edge has a reciprocal with equal cost;
/// each node's edges are kept in visitation order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathGraph {
    nodes: BTreeMap<CellCoord, Vec<PathEdge>>,
}

impl PathGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Undirected edge count.
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(Vec::len).sum::<usize>() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, cell: CellCoord) -> bool {
        self.nodes.contains_key(&cell)
    }

    pub fn neighbors(&self, cell: CellCoord) -> &[PathEdge] {
        self.nodes.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn edge_cost(&self, from: CellCoord, to: CellCoord) -> Option<f32> {
        self.neighbors(from)
            .iter()
            .find(|edge| edge.to == to)
            .map(|edge| edge.cost)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &[PathEdge])> + '_ {
        self.nodes
            .iter()
            .map(|(cell, edges)| (*cell, edges.as_slice()))
    }

    pub(crate) fn from_nodes(nodes: BTreeMap<CellCoord, Vec<PathEdge>>) -> Self {
        Self { nodes }
    }
}

/// Derives the occupancy mesh and path graph from a grid in one pass.
pub fn build(grid: &Grid, config: NavConfig) -> (OccupancyMesh, PathGraph) {
    let mesh = OccupancyMesh::from_grid(grid);
    let graph = build_graph(&mesh, config);
    debug!(
        width = mesh.width(),
        height = mesh.height(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        connectivity = ?config.connectivity,
        "path_graph_built"
    );
    (mesh, graph)
}

pub(crate) fn build_graph(mesh: &OccupancyMesh, config: NavConfig) -> PathGraph {
    let mut nodes = BTreeMap::new();
    for x in 0..mesh.width() {
        for y in 0..mesh.height() {
            let cell = CellCoord { x, y };
            if !mesh.is_open(cell) {
                continue;
            }
            let edges = config
                .connectivity
                .steps()
                .iter()
                .filter_map(|&(dx, dy)| edge_toward(mesh, cell, dx, dy))
                .collect();
            nodes.insert(cell, edges);
        }
    }
    PathGraph::from_nodes(nodes)
}

fn edge_toward(mesh: &OccupancyMesh, cell: CellCoord, dx: i32, dy: i32) -> Option<PathEdge> {
    let to = offset(cell, dx, dy)?;
    if !mesh.is_open(to) {
        return None;
    }
    if dx != 0 && dy != 0 {
        // No squeezing between two orthogonal cells unless both are open.
        let side_x = offset(cell, dx, 0)?;
        let side_y = offset(cell, 0, dy)?;
        if !mesh.is_open(side_x) || !mesh.is_open(side_y) {
            return None;
        }
        return Some(PathEdge {
            to,
            cost: DIAGONAL_COST,
        });
    }
    Some(PathEdge {
        to,
        cost: ORTHOGONAL_COST,
    })
}

fn offset(cell: CellCoord, dx: i32, dy: i32) -> Option<CellCoord> {
    Some(CellCoord {
        x: cell.x.checked_add_signed(dx)?,
        y: cell.y.checked_add_signed(dy)?,
    })
}
