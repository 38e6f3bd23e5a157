//! Exclusive cell reservation
//!
//! Spawners claim cells here so that collectibles and agents never share a
//! cell. A reservation is permanent for the lifetime of the grid it was sized
//! for. Each claim is a single compare-and-set, so the table can be shared
//! between spawners on different threads without extra locking.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::grid::{Cell, Grid, GridError};

/// Per-cell reservation table
#[derive(Debug)]
pub struct OccupancyTracker {
    rows: usize,
    cols: usize,
    reserved: Vec<AtomicBool>,
    count: AtomicUsize,
}

impl OccupancyTracker {
    /// Create an empty table of the given extents
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            reserved: (0..rows * cols).map(|_| AtomicBool::new(false)).collect(),
            count: AtomicUsize::new(0),
        }
    }

    /// Create an empty table matching a grid
    #[must_use]
    pub fn for_grid(grid: &Grid) -> Self {
        Self::new(grid.rows(), grid.cols())
    }

    /// Claim a cell.
    ///
    /// Returns `false` if the cell is outside the table or already claimed.
    pub fn try_reserve(&self, row: usize, col: usize) -> bool {
        if row >= self.rows || col >= self.cols {
            return false;
        }

        let claimed = self.reserved[row * self.cols + col]
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if claimed {
            self.count.fetch_add(1, Ordering::Relaxed);
        }
        claimed
    }

    /// Claim a cell by coordinate
    pub fn try_reserve_cell(&self, cell: Cell) -> bool {
        self.try_reserve(cell.row, cell.col)
    }

    /// Check whether a cell has been claimed.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] for coordinates outside the table.
    pub fn is_reserved(&self, row: usize, col: usize) -> Result<bool, GridError> {
        if row >= self.rows || col >= self.cols {
            return Err(GridError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(self.reserved[row * self.cols + col].load(Ordering::Acquire))
    }

    /// Number of successful reservations so far
    #[must_use]
    pub fn reserved_count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    /// Number of cells in the table
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.rows * self.cols
    }

    /// Check if no cell is left to claim
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.reserved_count() >= self.capacity()
    }
}
