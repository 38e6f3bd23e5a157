//! Maze cell grid and per-cell wall bitset
//!
//! The grid is pure data: `rows × cols` cells, four wall flags per cell and the
//! affine placement that maps cells into world space. Walls are kept symmetric,
//! so an interior edge is either closed from both sides or open from both.

use std::fmt;

use glam::{Affine3A, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ============================================================================
// Cells and directions
// ============================================================================

/// Coordinate of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    /// Row index, grows along local +Z
    pub row: usize,
    /// Column index, grows along local +X
    pub col: usize,
}

impl Cell {
    /// Create a cell coordinate
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan distance to another cell
    #[must_use]
    pub fn manhattan(self, other: Cell) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl From<(usize, usize)> for Cell {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One of the four sides of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Towards row - 1
    North,
    /// Towards col + 1
    East,
    /// Towards row + 1
    South,
    /// Towards col - 1
    West,
}

impl Direction {
    /// All directions in neighbor enumeration order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// The side facing back across the same edge
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Bit used for this side in a cell's wall mask
    #[must_use]
    pub const fn bit(self) -> u8 {
        match self {
            Self::North => 0b0001,
            Self::East => 0b0010,
            Self::South => 0b0100,
            Self::West => 0b1000,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors raised by grid construction and queries
#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    /// Rows or columns below one
    InvalidDimension {
        /// Requested rows
        rows: usize,
        /// Requested columns
        cols: usize,
    },
    /// Cell size that is not a positive finite number
    InvalidCellSize(f32),
    /// Query outside `[0, rows) × [0, cols)`
    OutOfBounds {
        /// Queried row
        row: usize,
        /// Queried column
        col: usize,
        /// Grid rows
        rows: usize,
        /// Grid columns
        cols: usize,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimension { rows, cols } => {
                write!(f, "Invalid grid dimension: {rows}x{cols}")
            }
            Self::InvalidCellSize(size) => write!(f, "Invalid cell size: {size}"),
            Self::OutOfBounds {
                row,
                col,
                rows,
                cols,
            } => write!(f, "Cell ({row}, {col}) outside {rows}x{cols} grid"),
        }
    }
}

impl std::error::Error for GridError {}

// ============================================================================
// Grid
// ============================================================================

const ALL_WALLS: u8 = 0b1111;

/// Rectangular maze grid with symmetric walls and a world placement.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cell_size: f32,
    /// Wall mask per cell, row-major
    walls: Vec<u8>,
    /// Local X/Z of cell (0, 0)'s center, keeping the maze centered
    origin_offset: Vec2,
    /// Extra local translation applied before the owning transform
    level_offset: Vec3,
    /// Owning transform (maze-local to world)
    transform: Affine3A,
    inverse: Affine3A,
}

impl Grid {
    /// Allocate a fully walled grid.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimension`] if `rows` or `cols` is zero and
    /// [`GridError::InvalidCellSize`] if `cell_size` is not positive and finite.
    pub fn new(rows: usize, cols: usize, cell_size: f32) -> Result<Self, GridError> {
        if rows < 1 || cols < 1 {
            return Err(GridError::InvalidDimension { rows, cols });
        }
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(GridError::InvalidCellSize(cell_size));
        }

        let half = cell_size * 0.5;
        let origin_offset = Vec2::new(
            -(cols as f32) * cell_size * 0.5 + half,
            -(rows as f32) * cell_size * 0.5 + half,
        );

        Ok(Self {
            rows,
            cols,
            cell_size,
            walls: vec![ALL_WALLS; rows * cols],
            origin_offset,
            level_offset: Vec3::ZERO,
            transform: Affine3A::IDENTITY,
            inverse: Affine3A::IDENTITY,
        })
    }

    /// Place the grid under an owning transform with an extra local offset
    #[must_use]
    pub fn with_placement(mut self, transform: Affine3A, level_offset: Vec3) -> Self {
        self.set_placement(transform, level_offset);
        self
    }

    /// Move the grid under a new owning transform.
    pub fn set_placement(&mut self, transform: Affine3A, level_offset: Vec3) {
        self.transform = transform;
        self.inverse = transform.inverse();
        self.level_offset = level_offset;
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Total number of cells
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Owning transform
    #[must_use]
    pub fn transform(&self) -> Affine3A {
        self.transform
    }

    #[must_use]
    pub fn level_offset(&self) -> Vec3 {
        self.level_offset
    }

    /// Local X/Z of the center of cell (0, 0)
    #[must_use]
    pub fn origin_offset(&self) -> Vec2 {
        self.origin_offset
    }

    /// The cell behind the West opening
    #[must_use]
    pub fn entrance(&self) -> Cell {
        Cell::new(0, 0)
    }

    /// The cell behind the East opening, farthest from the entrance
    #[must_use]
    pub fn exit(&self) -> Cell {
        Cell::new(self.rows - 1, self.cols - 1)
    }

    /// Check if a coordinate lies inside the grid
    #[must_use]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    /// Row-major index of a cell
    #[must_use]
    pub fn index(&self, cell: Cell) -> usize {
        cell.row * self.cols + cell.col
    }

    /// Cell for a row-major index
    #[must_use]
    pub fn cell_at(&self, index: usize) -> Cell {
        Cell::new(index / self.cols, index % self.cols)
    }

    /// Iterate every cell in row-major order
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.cell_count()).map(|i| self.cell_at(i))
    }

    fn check_bounds(&self, row: usize, col: usize) -> Result<(), GridError> {
        if self.contains(row, col) {
            Ok(())
        } else {
            Err(GridError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    /// Check whether a side of a cell is walled.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] for coordinates outside the grid.
    pub fn is_wall(&self, row: usize, col: usize, direction: Direction) -> Result<bool, GridError> {
        self.check_bounds(row, col)?;
        Ok(self.walls[row * self.cols + col] & direction.bit() != 0)
    }

    /// Raw wall mask of a cell.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] for coordinates outside the grid.
    pub fn wall_mask(&self, row: usize, col: usize) -> Result<u8, GridError> {
        self.check_bounds(row, col)?;
        Ok(self.walls[row * self.cols + col])
    }

    /// In-bounds neighbor of a cell, ignoring walls
    #[must_use]
    pub fn neighbor(&self, cell: Cell, direction: Direction) -> Option<Cell> {
        let Cell { row, col } = cell;
        let next = match direction {
            Direction::North => Cell::new(row.checked_sub(1)?, col),
            Direction::East => Cell::new(row, col + 1),
            Direction::South => Cell::new(row + 1, col),
            Direction::West => Cell::new(row, col.checked_sub(1)?),
        };
        self.contains(next.row, next.col).then_some(next)
    }

    /// Neighbors reachable through an open side, in North/East/South/West order.
    ///
    /// Boundary openings (entrance and exit) lead nowhere and are skipped.
    #[must_use]
    pub fn open_neighbors(&self, cell: Cell) -> SmallVec<[Cell; 4]> {
        let mut result = SmallVec::new();
        if !self.contains(cell.row, cell.col) {
            return result;
        }

        let mask = self.walls[self.index(cell)];
        for direction in Direction::ALL {
            if mask & direction.bit() != 0 {
                continue;
            }
            if let Some(next) = self.neighbor(cell, direction) {
                result.push(next);
            }
        }
        result
    }

    /// Close every side of every cell
    pub(crate) fn close_all_walls(&mut self) {
        self.walls.fill(ALL_WALLS);
    }

    /// Open one side of a cell, and the matching side of its neighbor if any.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if `cell` is outside the grid.
    pub(crate) fn remove_wall(&mut self, cell: Cell, direction: Direction) -> Result<(), GridError> {
        self.check_bounds(cell.row, cell.col)?;

        let index = self.index(cell);
        self.walls[index] &= !direction.bit();

        if let Some(next) = self.neighbor(cell, direction) {
            let next_index = self.index(next);
            self.walls[next_index] &= !direction.opposite().bit();
        }
        Ok(())
    }

    /// Number of open interior edges
    #[must_use]
    pub fn internal_openings(&self) -> usize {
        self.cells()
            .map(|cell| {
                let mask = self.walls[self.index(cell)];
                let east = cell.col + 1 < self.cols && mask & Direction::East.bit() == 0;
                let south = cell.row + 1 < self.rows && mask & Direction::South.bit() == 0;
                usize::from(east) + usize::from(south)
            })
            .sum()
    }

    /// Check that every interior edge reports the same state from both sides
    #[must_use]
    pub fn walls_symmetric(&self) -> bool {
        self.cells().all(|cell| {
            [Direction::East, Direction::South].into_iter().all(|direction| {
                match self.neighbor(cell, direction) {
                    Some(next) => {
                        let here = self.walls[self.index(cell)] & direction.bit() != 0;
                        let there =
                            self.walls[self.index(next)] & direction.opposite().bit() != 0;
                        here == there
                    }
                    None => true,
                }
            })
        })
    }

    // ------------------------------------------------------------------------
    // World transforms
    // ------------------------------------------------------------------------

    /// Center of a cell in maze-local space (before the owning transform)
    #[must_use]
    pub fn cell_center_local(&self, row: usize, col: usize, y: f32) -> Vec3 {
        Vec3::new(
            self.origin_offset.x + col as f32 * self.cell_size,
            y,
            self.origin_offset.y + row as f32 * self.cell_size,
        ) + self.level_offset
    }

    /// Center of a cell in world space at height `y`
    #[must_use]
    pub fn cell_center_world(&self, row: usize, col: usize, y: f32) -> Vec3 {
        self.transform
            .transform_point3(self.cell_center_local(row, col, y))
    }

    /// Convert a world point into maze-local space
    #[must_use]
    pub fn world_to_local(&self, point: Vec3) -> Vec3 {
        self.inverse.transform_point3(point)
    }

    /// Convert a maze-local point into world space
    #[must_use]
    pub fn local_to_world(&self, point: Vec3) -> Vec3 {
        self.transform.transform_point3(point)
    }

    /// Nearest cell to a world point, or `None` when it falls off the grid
    #[must_use]
    pub fn world_to_cell(&self, point: Vec3) -> Option<Cell> {
        let local = self.world_to_local(point) - self.level_offset;

        let fx = ((local.x - self.origin_offset.x) / self.cell_size).round();
        let fz = ((local.z - self.origin_offset.y) / self.cell_size).round();

        if !fx.is_finite() || !fz.is_finite() || fx < 0.0 || fz < 0.0 {
            return None;
        }

        let (row, col) = (fz as usize, fx as usize);
        self.contains(row, col).then_some(Cell::new(row, col))
    }
}

/// ASCII dump, row 0 on top, North up
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let mask = self.walls[row * self.cols + col];
                let north = if mask & Direction::North.bit() != 0 { "---" } else { "   " };
                write!(f, "+{north}")?;
            }
            writeln!(f, "+")?;

            for col in 0..self.cols {
                let mask = self.walls[row * self.cols + col];
                let west = if mask & Direction::West.bit() != 0 { '|' } else { ' ' };
                write!(f, "{west}   ")?;
            }
            let last = self.walls[row * self.cols + self.cols - 1];
            writeln!(f, "{}", if last & Direction::East.bit() != 0 { '|' } else { ' ' })?;
        }

        for col in 0..self.cols {
            let mask = self.walls[(self.rows - 1) * self.cols + col];
            let south = if mask & Direction::South.bit() != 0 { "---" } else { "   " };
            write!(f, "+{south}")?;
        }
        writeln!(f, "+")
    }
}
