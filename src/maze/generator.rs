//! Perfect-maze carving with an iterative recursive backtracker
//!
//! Starting from (0, 0) the carver walks depth-first, knocking down the wall
//! to a random unvisited neighbor and backtracking when it hits a dead end.
//! Every cell gets visited exactly once, so the open edges form a spanning
//! tree: one simple path between any two cells and no cycles.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use smallvec::SmallVec;

use super::grid::{Cell, Direction, Grid, GridError};

/// Seeded maze carver
#[derive(Debug, Clone)]
pub struct MazeGenerator {
    seed: u64,
    rng: ChaCha8Rng,
}

impl MazeGenerator {
    /// Create a generator; `None` derives the seed from the system clock.
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(clock_seed);
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seed this generator was created with
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Allocate a grid and carve a perfect maze into it.
    ///
    /// This is the entry point collaborators use to obtain a maze.
    ///
    /// # Errors
    ///
    /// Propagates [`GridError`] from grid allocation.
    pub fn build(
        rows: usize,
        cols: usize,
        cell_size: f32,
        seed: Option<u64>,
    ) -> Result<Grid, GridError> {
        let mut grid = Grid::new(rows, cols, cell_size)?;
        Self::new(seed).generate(&mut grid)?;
        Ok(grid)
    }

    /// Close every wall of `grid`, carve passages, then open the entrance
    /// (West of (0, 0)) and the exit (East of the last cell).
    ///
    /// # Errors
    ///
    /// Only fails if the grid breaks its own bounds contract.
    pub fn generate(&mut self, grid: &mut Grid) -> Result<(), GridError> {
        grid.close_all_walls();
        self.carve(grid)?;

        grid.remove_wall(grid.entrance(), Direction::West)?;
        grid.remove_wall(grid.exit(), Direction::East)?;

        log::debug!(
            "Carved {}x{} maze (seed {}, {} openings)",
            grid.rows(),
            grid.cols(),
            self.seed,
            grid.internal_openings()
        );
        Ok(())
    }

    fn carve(&mut self, grid: &mut Grid) -> Result<(), GridError> {
        let mut visited = vec![false; grid.cell_count()];
        let mut stack = Vec::with_capacity(grid.cell_count());

        let start = Cell::new(0, 0);
        visited[grid.index(start)] = true;
        stack.push(start);

        while let Some(&current) = stack.last() {
            let candidates: SmallVec<[(Direction, Cell); 4]> = Direction::ALL
                .into_iter()
                .filter_map(|direction| {
                    grid.neighbor(current, direction)
                        .filter(|next| !visited[grid.index(*next)])
                        .map(|next| (direction, next))
                })
                .collect();

            if candidates.is_empty() {
                stack.pop();
                continue;
            }

            let (direction, next) = candidates[self.rng.gen_range(0..candidates.len())];
            grid.remove_wall(current, direction)?;
            visited[grid.index(next)] = true;
            stack.push(next);
        }

        Ok(())
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}
