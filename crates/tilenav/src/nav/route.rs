use serde::Serialize;

use crate::tile::{CellCoord, Vec2};

/// World-space waypoints toward a goal cell, consumed one at a time by a
/// moving entity. The start cell itself is not a waypoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationPath {
    goal: CellCoord,
    cells: Vec<CellCoord>,
    waypoints_world: Vec<Vec2>,
    next_waypoint_index: usize,
}

impl NavigationPath {
    pub(crate) fn from_cells(
        cells: Vec<CellCoord>,
        center_of: impl Fn(CellCoord) -> Vec2,
    ) -> Option<Self> {
        let goal = *cells.last()?;
        let waypoints_world = if cells.len() == 1 {
            vec![center_of(goal)]
        } else {
            cells.iter().skip(1).map(|cell| center_of(*cell)).collect()
        };
        Some(Self {
            goal,
            cells,
            waypoints_world,
            next_waypoint_index: 0,
        })
    }

    pub fn goal(&self) -> CellCoord {
        self.goal
    }

    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    pub fn waypoints_world(&self) -> &[Vec2] {
        &self.waypoints_world
    }

    pub fn current_waypoint(&self) -> Option<Vec2> {
        self.waypoints_world.get(self.next_waypoint_index).copied()
    }

    pub fn advance_waypoint(&mut self) {
        if self.next_waypoint_index < self.waypoints_world.len() {
            self.next_waypoint_index = self.next_waypoint_index.saturating_add(1);
        }
    }

    pub fn is_complete(&self) -> bool {
        self.next_waypoint_index >= self.waypoints_world.len()
    }
}
