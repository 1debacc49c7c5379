use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeSet, BinaryHeap, HashMap, VecDeque};

use super::graph::PathGraph;
use super::mesh::OccupancyMesh;
use super::NavError;
use crate::tile::CellCoord;

/// Read-only queries against one built mesh/graph pair.
#[derive(Debug, Clone, Copy)]
pub struct PathQuery<'a> {
    mesh: &'a OccupancyMesh,
    graph: &'a PathGraph,
}

impl<'a> PathQuery<'a> {
    pub fn new(mesh: &'a OccupancyMesh, graph: &'a PathGraph) -> Self {
        Self { mesh, graph }
    }

    pub fn is_open(&self, cell: CellCoord) -> Result<bool, NavError> {
        self.mesh
            .is_blocked(cell)
            .map(|blocked| !blocked)
            .ok_or(NavError::OutOfBounds {
                cell,
                width: self.mesh.width(),
                height: self.mesh.height(),
            })
    }

    /// Cheapest route from `from` to `to`, both ends included.
    ///
    /// Ties are broken by discovery order, and neighbors are discovered in
    /// the graph's visitation order, so with uniform costs the result is the
    /// breadth-first path.
    pub fn shortest_path(
        &self,
        from: CellCoord,
        to: CellCoord,
    ) -> Result<Vec<CellCoord>, NavError> {
        self.check_endpoint(from)?;
        self.check_endpoint(to)?;
        if from == to {
            return Ok(vec![from]);
        }

        let mut best_cost = HashMap::<CellCoord, f32>::new();
        let mut parent = HashMap::<CellCoord, CellCoord>::new();
        let mut open = BinaryHeap::new();
        let mut next_insertion = 0u64;

        best_cost.insert(from, 0.0);
        open.push(Reverse(OpenNode {
            cost: 0.0,
            insertion_order: next_insertion,
            cell: from,
        }));

        while let Some(Reverse(current)) = open.pop() {
            if best_cost
                .get(&current.cell)
                .is_some_and(|cost| current.cost > *cost)
            {
                continue;
            }
            if current.cell == to {
                return Ok(reconstruct_path(&parent, from, to));
            }

            for edge in self.graph.neighbors(current.cell) {
                let tentative = current.cost + edge.cost;
                if best_cost
                    .get(&edge.to)
                    .is_some_and(|known| tentative >= *known)
                {
                    continue;
                }
                best_cost.insert(edge.to, tentative);
                parent.insert(edge.to, current.cell);
                next_insertion = next_insertion.saturating_add(1);
                open.push(Reverse(OpenNode {
                    cost: tentative,
                    insertion_order: next_insertion,
                    cell: edge.to,
                }));
            }
        }

        Err(NavError::NotFound { from, to })
    }

    /// Sum of edge costs along `path`, or `None` if two consecutive cells are
    /// not connected.
    pub fn path_cost(&self, path: &[CellCoord]) -> Option<f32> {
        path.windows(2)
            .map(|pair| self.graph.edge_cost(pair[0], pair[1]))
            .sum()
    }

    pub fn is_reachable(&self, from: CellCoord, to: CellCoord) -> Result<bool, NavError> {
        self.check_endpoint(to)?;
        Ok(self.reachable_from(from)?.contains(&to))
    }

    /// The connected component containing `from`.
    pub fn reachable_from(&self, from: CellCoord) -> Result<BTreeSet<CellCoord>, NavError> {
        self.check_endpoint(from)?;
        let mut seen = BTreeSet::from([from]);
        let mut queue = VecDeque::from([from]);
        while let Some(cell) = queue.pop_front() {
            for edge in self.graph.neighbors(cell) {
                if seen.insert(edge.to) {
                    queue.push_back(edge.to);
                }
            }
        }
        Ok(seen)
    }

    fn check_endpoint(&self, cell: CellCoord) -> Result<(), NavError> {
        if self.mesh.is_open(cell) && self.graph.contains(cell) {
            Ok(())
        } else {
            Err(NavError::InvalidEndpoint { cell })
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenNode {
    cost: f32,
    insertion_order: u64,
    cell: CellCoord,
}

impl OpenNode {
    fn order_key(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then(self.insertion_order.cmp(&other.insertion_order))
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.order_key(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order_key(other)
    }
}

fn reconstruct_path(
    parent: &HashMap<CellCoord, CellCoord>,
    from: CellCoord,
    to: CellCoord,
) -> Vec<CellCoord> {
    let mut cursor = to;
    let mut path = vec![cursor];
    while cursor != from {
        let Some(previous) = parent.get(&cursor) else {
            break;
        };
        cursor = *previous;
        path.push(cursor);
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::graph::{build, Connectivity, NavConfig};
    use crate::tile::{CollisionType, Grid};

    fn built(grid: &Grid, connectivity: Connectivity) -> (OccupancyMesh, PathGraph) {
        build(grid, NavConfig { connectivity })
    }

    fn cells(raw: &[(u32, u32)]) -> Vec<CellCoord> {
        raw.iter().map(|&(x, y)| CellCoord::new(x, y)).collect()
    }

    #[test]
    fn routes_around_blocked_center() {
        let mut grid = Grid::new(3, 3);
        grid.set_collision(CellCoord::new(1, 1), CollisionType::Full);
        let (mesh, graph) = built(&grid, Connectivity::Four);
        let query = PathQuery::new(&mesh, &graph);

        let path = query
            .shortest_path(CellCoord::new(0, 0), CellCoord::new(2, 2))
            .expect("path");
        assert_eq!(path, cells(&[(0, 0), (1, 0), (2, 0), (2, 1), (2, 2)]));
        assert!(!path.contains(&CellCoord::new(1, 1)));
        assert_eq!(query.path_cost(&path), Some(4.0));
    }

    #[test]
    fn same_cell_path_is_single_element_when_open() {
        let mut grid = Grid::new(2, 2);
        grid.set_collision(CellCoord::new(1, 1), CollisionType::Full);
        let (mesh, graph) = built(&grid, Connectivity::Four);
        let query = PathQuery::new(&mesh, &graph);

        let a = CellCoord::new(0, 1);
        assert_eq!(query.shortest_path(a, a), Ok(vec![a]));
        let blocked = CellCoord::new(1, 1);
        assert_eq!(
            query.shortest_path(blocked, blocked),
            Err(NavError::InvalidEndpoint { cell: blocked })
        );
    }

    #[test]
    fn endpoints_outside_grid_are_invalid() {
        let grid = Grid::new(2, 2);
        let (mesh, graph) = built(&grid, Connectivity::Four);
        let query = PathQuery::new(&mesh, &graph);
        let outside = CellCoord::new(5, 0);
        assert_eq!(
            query.shortest_path(CellCoord::new(0, 0), outside),
            Err(NavError::InvalidEndpoint { cell: outside })
        );
        assert_eq!(
            query.is_open(outside),
            Err(NavError::OutOfBounds {
                cell: outside,
                width: 2,
                height: 2
            })
        );
        assert_eq!(query.is_open(CellCoord::new(1, 1)), Ok(true));
    }

    #[test]
    fn solid_wall_column_splits_components() {
        let mut grid = Grid::new(5, 4);
        for y in 0..4 {
            grid.set_collision(CellCoord::new(2, y), CollisionType::Full);
        }
        let (mesh, graph) = built(&grid, Connectivity::Eight);
        let query = PathQuery::new(&mesh, &graph);

        for left_y in 0..4 {
            for right_y in 0..4 {
                let from = CellCoord::new(0, left_y);
                let to = CellCoord::new(4, right_y);
                assert_eq!(
                    query.shortest_path(from, to),
                    Err(NavError::NotFound { from, to })
                );
            }
        }
        let component = query.reachable_from(CellCoord::new(1, 3)).expect("component");
        assert_eq!(component.len(), 8);
        assert!(component.iter().all(|cell| cell.x < 2));
        assert_eq!(
            query.is_reachable(CellCoord::new(0, 0), CellCoord::new(3, 0)),
            Ok(false)
        );
        assert_eq!(
            query.is_reachable(CellCoord::new(0, 0), CellCoord::new(1, 3)),
            Ok(true)
        );
    }

    #[test]
    fn corner_tiles_are_traversable_for_planning() {
        let grid = Grid::from_collision_columns(&[
            vec![CollisionType::Empty],
            vec![CollisionType::CornerLowerRight],
            vec![CollisionType::Empty],
        ])
        .expect("grid");
        let (mesh, graph) = built(&grid, Connectivity::Four);
        let query = PathQuery::new(&mesh, &graph);
        assert_eq!(
            query.shortest_path(CellCoord::new(0, 0), CellCoord::new(2, 0)),
            Ok(cells(&[(0, 0), (1, 0), (2, 0)]))
        );
    }

    #[test]
    fn eight_way_prefers_diagonals_by_cost() {
        let grid = Grid::new(4, 4);
        let (mesh, graph) = built(&grid, Connectivity::Eight);
        let query = PathQuery::new(&mesh, &graph);
        let path = query
            .shortest_path(CellCoord::new(0, 0), CellCoord::new(3, 3))
            .expect("path");
        assert_eq!(path, cells(&[(0, 0), (1, 1), (2, 2), (3, 3)]));
        let cost = query.path_cost(&path).expect("connected");
        assert!((cost - 3.0 * std::f32::consts::SQRT_2).abs() < 1e-5);
    }

    #[test]
    fn repeated_queries_are_identical() {
        let mut grid = Grid::new(5, 5);
        grid.set_collision(CellCoord::new(2, 2), CollisionType::Full);
        let (mesh, graph) = built(&grid, Connectivity::Four);
        let query = PathQuery::new(&mesh, &graph);
        let first = query.shortest_path(CellCoord::new(0, 2), CellCoord::new(4, 2));
        let second = query.shortest_path(CellCoord::new(0, 2), CellCoord::new(4, 2));
        assert_eq!(first, second);
        assert_eq!(first.expect("path").len(), 7);
    }

    #[test]
    fn path_cost_rejects_disconnected_steps() {
        let grid = Grid::new(3, 1);
        let (mesh, graph) = built(&grid, Connectivity::Four);
        let query = PathQuery::new(&mesh, &graph);
        assert_eq!(query.path_cost(&cells(&[(0, 0), (2, 0)])), None);
        assert_eq!(query.path_cost(&cells(&[(1, 0)])), Some(0.0));
    }
}
