//! A* pathfinding on the maze grid
//!
//! Hop-count A* with a Manhattan heuristic over 4-connected cells. Expansion
//! only crosses open sides, so every returned path is walkable. Search is
//! bounded by an iteration budget proportional to the grid size; running out
//! of budget or frontier counts as "no path".

use std::fmt;

use glam::Vec3;
use rustc_hash::FxHashMap;

use super::open_set::OpenSet;
use crate::maze::{Cell, Grid};

/// Default iteration budget per grid cell
pub const DEFAULT_ITERATION_FACTOR: usize = 20;

/// Ordered sequence of 4-connected cells from a start to a goal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    cells: Vec<Cell>,
    /// Set when the search failed and this is a stand-in
    fallback: bool,
}

impl Path {
    /// Wrap a list of cells
    #[must_use]
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            fallback: false,
        }
    }

    /// Single-cell stand-in pointing straight at the goal
    #[must_use]
    pub fn direct(goal: Cell) -> Self {
        Self {
            cells: vec![goal],
            fallback: true,
        }
    }

    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of edges traversed
    #[must_use]
    pub fn hop_count(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    /// Check if this path came from a failed search
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    #[must_use]
    pub fn start(&self) -> Option<Cell> {
        self.cells.first().copied()
    }

    #[must_use]
    pub fn goal(&self) -> Option<Cell> {
        self.cells.last().copied()
    }

    /// Check that consecutive cells are open neighbors on `grid`
    #[must_use]
    pub fn is_walkable(&self, grid: &Grid) -> bool {
        self.cells
            .windows(2)
            .all(|pair| grid.open_neighbors(pair[0]).contains(&pair[1]))
    }

    /// Cell centers in world space at height `y`
    #[must_use]
    pub fn to_waypoints(&self, grid: &Grid, y: f32) -> Vec<Vec3> {
        self.cells
            .iter()
            .map(|cell| grid.cell_center_world(cell.row, cell.col, y))
            .collect()
    }
}

/// Reasons a search produced no path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Start or goal outside the grid
    OutOfBounds(Cell),
    /// Frontier or iteration budget exhausted before reaching the goal
    NoPathFound {
        start: Cell,
        goal: Cell,
        /// Cells expanded before giving up
        iterations: usize,
    },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds(cell) => write!(f, "Cell {cell} is outside the grid"),
            Self::NoPathFound {
                start,
                goal,
                iterations,
            } => write!(f, "No path from {start} to {goal} after {iterations} iterations"),
        }
    }
}

impl std::error::Error for PathError {}

/// Grid A* search
#[derive(Debug, Clone)]
pub struct Pathfinder {
    /// Iteration budget is `rows * cols * iteration_factor`
    pub iteration_factor: usize,
}

impl Default for Pathfinder {
    fn default() -> Self {
        Self {
            iteration_factor: DEFAULT_ITERATION_FACTOR,
        }
    }
}

impl Pathfinder {
    #[must_use]
    pub fn new(iteration_factor: usize) -> Self {
        Self { iteration_factor }
    }

    /// Find a path, falling back to [`Path::direct`] when none exists.
    #[must_use]
    pub fn find_path(&self, grid: &Grid, start: Cell, goal: Cell) -> Path {
        match self.try_find_path(grid, start, goal) {
            Ok(path) => path,
            Err(err) => {
                log::warn!("{err}; falling back to direct path");
                Path::direct(goal)
            }
        }
    }

    /// Find a shortest path in hops from `start` to `goal`.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::OutOfBounds`] if either endpoint is off the grid
    /// and [`PathError::NoPathFound`] if the goal is unreachable within the
    /// iteration budget.
    pub fn try_find_path(&self, grid: &Grid, start: Cell, goal: Cell) -> Result<Path, PathError> {
        for cell in [start, goal] {
            if !grid.contains(cell.row, cell.col) {
                return Err(PathError::OutOfBounds(cell));
            }
        }

        if start == goal {
            return Ok(Path::new(vec![start]));
        }

        let heuristic = |cell: Cell| cell.manhattan(goal) as u32;

        let mut open_set = OpenSet::with_capacity(grid.cell_count().min(256));
        let mut came_from: FxHashMap<Cell, Cell> = FxHashMap::default();
        let mut g_score: FxHashMap<Cell, u32> = FxHashMap::default();

        g_score.insert(start, 0);
        open_set.push_or_decrease(start, heuristic(start));

        let budget = grid.cell_count().saturating_mul(self.iteration_factor);
        let mut iterations = 0;

        while iterations < budget {
            let Some((current, _)) = open_set.pop() else {
                break;
            };
            iterations += 1;

            if current == goal {
                let path = reconstruct(&came_from, goal);
                log::trace!(
                    "Path {start} -> {goal}: {} hops, {iterations} iterations",
                    path.hop_count()
                );
                return Ok(path);
            }

            let current_g = g_score.get(&current).copied().unwrap_or(u32::MAX);
            for next in grid.open_neighbors(current) {
                let tentative_g = current_g.saturating_add(1);

                if tentative_g < g_score.get(&next).copied().unwrap_or(u32::MAX) {
                    came_from.insert(next, current);
                    g_score.insert(next, tentative_g);
                    open_set.push_or_decrease(next, tentative_g + heuristic(next));
                }
            }
        }

        Err(PathError::NoPathFound {
            start,
            goal,
            iterations,
        })
    }
}

/// Find a path with the default iteration budget
#[must_use]
pub fn find_path(grid: &Grid, start: Cell, goal: Cell) -> Path {
    Pathfinder::default().find_path(grid, start, goal)
}

fn reconstruct(came_from: &FxHashMap<Cell, Cell>, goal: Cell) -> Path {
    let mut cells = vec![goal];
    let mut current = goal;

    while let Some(&prev) = came_from.get(&current) {
        cells.push(prev);
        current = prev;
    }

    cells.reverse();
    Path::new(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::{Direction, MazeGenerator};

    /// Grid with every interior wall removed
    fn open_grid(rows: usize, cols: usize) -> Grid {
        let mut grid = Grid::new(rows, cols, 1.0).unwrap();
        for row in 0..rows {
            for col in 0..cols {
                grid.remove_wall(Cell::new(row, col), Direction::East).unwrap();
                grid.remove_wall(Cell::new(row, col), Direction::South).unwrap();
            }
        }
        grid
    }

    #[test]
    fn test_direct_path() {
        let grid = open_grid(10, 10);

        let path = find_path(&grid, Cell::new(0, 0), Cell::new(0, 3));

        assert!(!path.is_fallback());
        assert_eq!(path.len(), 4); // 4 cells in a line
        assert!(path.is_walkable(&grid));
    }

    #[test]
    fn test_path_goes_around_wall() {
        // Wall between columns 1 and 2 everywhere except the last row
        let mut blocked = Grid::new(5, 5, 1.0).unwrap();
        for row in 0..5 {
            for col in 0..5 {
                if col != 1 || row == 4 {
                    blocked.remove_wall(Cell::new(row, col), Direction::East).unwrap();
                }
                blocked.remove_wall(Cell::new(row, col), Direction::South).unwrap();
            }
        }

        let path = find_path(&blocked, Cell::new(0, 0), Cell::new(0, 4));

        assert!(!path.is_fallback());
        assert!(path.is_walkable(&blocked));
        assert_eq!(path.hop_count(), 4 + 2 * 4);
    }

    #[test]
    fn test_start_equals_goal() {
        let grid = Grid::new(3, 3, 1.0).unwrap();

        let path = find_path(&grid, Cell::new(1, 1), Cell::new(1, 1));

        assert_eq!(path.cells(), &[Cell::new(1, 1)]);
        assert_eq!(path.hop_count(), 0);
        assert!(!path.is_fallback());
    }

    #[test]
    fn test_no_path_falls_back() {
        // Fully walled grid: nothing is reachable
        let grid = Grid::new(4, 4, 1.0).unwrap();
        let pathfinder = Pathfinder::default();

        let err = pathfinder
            .try_find_path(&grid, Cell::new(0, 0), Cell::new(3, 3))
            .unwrap_err();
        assert!(matches!(err, PathError::NoPathFound { iterations: 1, .. }));

        let path = pathfinder.find_path(&grid, Cell::new(0, 0), Cell::new(3, 3));
        assert!(path.is_fallback());
        assert_eq!(path.cells(), &[Cell::new(3, 3)]);
    }

    #[test]
    fn test_out_of_bounds_endpoint() {
        let grid = open_grid(3, 3);

        let err = Pathfinder::default()
            .try_find_path(&grid, Cell::new(0, 0), Cell::new(7, 0))
            .unwrap_err();
        assert_eq!(err, PathError::OutOfBounds(Cell::new(7, 0)));
        assert!(find_path(&grid, Cell::new(9, 9), Cell::new(0, 0)).is_fallback());
    }

    #[test]
    fn test_iteration_budget_truncates_search() {
        let grid = open_grid(20, 20);

        let starved = Pathfinder::new(0);
        assert!(matches!(
            starved.try_find_path(&grid, Cell::new(0, 0), Cell::new(19, 19)),
            Err(PathError::NoPathFound { iterations: 0, .. })
        ));
    }

    #[test]
    fn test_maze_path_is_walkable() {
        let grid = MazeGenerator::build(12, 12, 2.0, Some(99)).unwrap();

        let path = find_path(&grid, grid.entrance(), grid.exit());

        assert!(!path.is_fallback());
        assert_eq!(path.start(), Some(grid.entrance()));
        assert_eq!(path.goal(), Some(grid.exit()));
        assert!(path.is_walkable(&grid));
        assert!(path.hop_count() >= 22);
    }

    #[test]
    fn test_waypoints_follow_cell_centers() {
        let grid = open_grid(2, 3);
        let path = Path::new(vec![Cell::new(0, 0), Cell::new(0, 1), Cell::new(1, 1)]);

        let waypoints = path.to_waypoints(&grid, 1.0);

        assert_eq!(waypoints.len(), 3);
        assert!(waypoints.iter().all(|w| w.y == 1.0));
        assert_eq!(waypoints[0], grid.cell_center_world(0, 0, 1.0));
        assert!((waypoints[0].distance(waypoints[2]) - 2.0f32.sqrt()).abs() < 1e-5);
    }
}
