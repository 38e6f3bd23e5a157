//! Collectible placement on top of the occupancy table
//!
//! Items are scattered over random cells with a bounded number of attempts,
//! keeping the entrance and exit cells clear. Each batch lives in a named
//! container; spawning into an existing name replaces that batch.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::grid::{Cell, Grid};
use super::occupancy::OccupancyTracker;

/// Minimum attempts granted to any spawn batch
const MIN_ATTEMPTS: usize = 100;
/// Attempts granted per requested item
const ATTEMPTS_PER_ITEM: usize = 20;

/// Kind of collectible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectibleKind {
    Coin,
    Treasure,
}

impl CollectibleKind {
    /// Points awarded on pickup
    #[must_use]
    pub const fn value(self) -> u32 {
        match self {
            Self::Coin => 10,
            Self::Treasure => 50,
        }
    }
}

/// A batch of collectibles to place
#[derive(Debug, Clone)]
pub struct SpawnRequest {
    /// Container name
    pub name: String,
    /// What to place
    pub kind: CollectibleKind,
    /// How many to place
    pub count: usize,
    /// World height of the placed items
    pub y: f32,
    /// Whether the batch survives a maze rebuild
    pub persistent: bool,
}

impl SpawnRequest {
    /// Create a persistent request
    pub fn new(name: impl Into<String>, kind: CollectibleKind, count: usize, y: f32) -> Self {
        Self {
            name: name.into(),
            kind,
            count,
            y,
            persistent: true,
        }
    }

    /// Set whether the batch survives a rebuild
    #[must_use]
    pub fn with_persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }
}

/// A single placed collectible
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub kind: CollectibleKind,
    pub cell: Cell,
    /// World position
    pub position: Vec3,
}

/// Named batch of placements
#[derive(Debug, Clone)]
pub struct SpawnContainer {
    pub name: String,
    pub persistent: bool,
    /// Height used for every placement in this batch
    pub y: f32,
    pub placements: Vec<Placement>,
}

/// Owns spawn containers and fills them with exclusive placements
#[derive(Debug, Default)]
pub struct CollectibleSpawner {
    containers: Vec<SpawnContainer>,
}

impl CollectibleSpawner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a batch, replacing any container with the same name.
    ///
    /// Returns the number of items placed, which is lower than requested when
    /// the grid runs out of free cells before the attempt budget does.
    pub fn spawn<R: Rng>(
        &mut self,
        grid: &Grid,
        occupancy: &OccupancyTracker,
        rng: &mut R,
        request: &SpawnRequest,
    ) -> usize {
        self.containers.retain(|c| c.name != request.name);
        if request.count == 0 {
            return 0;
        }

        // No grid holds more items than it has cells
        let placeable = request.count.min(grid.cell_count());
        let mut placements = Vec::with_capacity(placeable);
        let mut attempts = MIN_ATTEMPTS.max(placeable.saturating_mul(ATTEMPTS_PER_ITEM));

        while placements.len() < placeable && attempts > 0 {
            attempts -= 1;

            let cell = Cell::new(
                rng.gen_range(0..grid.rows()),
                rng.gen_range(0..grid.cols()),
            );
            if cell == grid.entrance() || cell == grid.exit() {
                continue;
            }
            if !occupancy.try_reserve_cell(cell) {
                continue;
            }

            placements.push(Placement {
                kind: request.kind,
                cell,
                position: grid.cell_center_world(cell.row, cell.col, request.y),
            });
        }

        let placed = placements.len();
        if placed < request.count {
            log::warn!(
                "Placed {placed}/{} items in '{}' before running out of attempts",
                request.count,
                request.name
            );
        } else {
            log::debug!("Placed {placed} items in '{}'", request.name);
        }

        self.containers.push(SpawnContainer {
            name: request.name.clone(),
            persistent: request.persistent,
            y: request.y,
            placements,
        });
        placed
    }

    /// Carry containers across a maze rebuild.
    ///
    /// Non-persistent containers are dropped. Persistent placements are
    /// re-reserved in the fresh table and moved onto the new grid; placements
    /// whose cell no longer exists or is already taken are dropped.
    pub fn retain_for_rebuild(&mut self, grid: &Grid, occupancy: &OccupancyTracker) {
        self.containers.retain(|c| c.persistent);

        for container in &mut self.containers {
            let y = container.y;
            container.placements.retain_mut(|placement| {
                let cell = placement.cell;
                if !occupancy.try_reserve_cell(cell) {
                    return false;
                }
                placement.position = grid.cell_center_world(cell.row, cell.col, y);
                true
            });
        }
    }

    /// Remove a placement after pickup
    pub fn take(&mut self, container: &str, cell: Cell) -> Option<Placement> {
        let container = self.containers.iter_mut().find(|c| c.name == container)?;
        let index = container.placements.iter().position(|p| p.cell == cell)?;
        Some(container.placements.swap_remove(index))
    }

    #[must_use]
    pub fn containers(&self) -> &[SpawnContainer] {
        &self.containers
    }

    /// Look up a container by name
    #[must_use]
    pub fn container(&self, name: &str) -> Option<&SpawnContainer> {
        self.containers.iter().find(|c| c.name == name)
    }

    /// Iterate every placement across containers
    pub fn placements(&self) -> impl Iterator<Item = &Placement> {
        self.containers.iter().flat_map(|c| c.placements.iter())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rustc_hash::FxHashSet;

    use super::*;

    #[test]
    fn test_spawn_places_distinct_cells() {
        let grid = Grid::new(6, 6, 2.0).unwrap();
        let occupancy = OccupancyTracker::for_grid(&grid);
        let mut spawner = CollectibleSpawner::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let coins = spawner.spawn(
            &grid,
            &occupancy,
            &mut rng,
            &SpawnRequest::new("Coins", CollectibleKind::Coin, 10, 1.0),
        );
        let treasures = spawner.spawn(
            &grid,
            &occupancy,
            &mut rng,
            &SpawnRequest::new("Treasures", CollectibleKind::Treasure, 5, 1.0),
        );

        assert_eq!(coins, 10);
        assert_eq!(treasures, 5);

        let cells: FxHashSet<Cell> = spawner.placements().map(|p| p.cell).collect();
        assert_eq!(cells.len(), 15);
        assert!(!cells.contains(&grid.entrance()));
        assert!(!cells.contains(&grid.exit()));
        assert_eq!(occupancy.reserved_count(), 15);
    }

    #[test]
    fn test_spawn_gives_up_when_grid_full() {
        let grid = Grid::new(2, 2, 1.0).unwrap();
        let occupancy = OccupancyTracker::for_grid(&grid);
        let mut spawner = CollectibleSpawner::new();
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let placed = spawner.spawn(
            &grid,
            &occupancy,
            &mut rng,
            &SpawnRequest::new("Coins", CollectibleKind::Coin, 10, 1.0),
        );

        // Only the two cells that are neither entrance nor exit are usable
        assert_eq!(placed, 2);
    }

    #[test]
    fn test_oversized_request_is_bounded() {
        let grid = Grid::new(3, 3, 1.0).unwrap();
        let occupancy = OccupancyTracker::for_grid(&grid);
        let mut spawner = CollectibleSpawner::new();
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        let placed = spawner.spawn(
            &grid,
            &occupancy,
            &mut rng,
            &SpawnRequest::new("Coins", CollectibleKind::Coin, usize::MAX, 1.0),
        );

        assert!(placed <= 7);
        assert_eq!(occupancy.reserved_count(), placed);
    }

    #[test]
    fn test_spawn_replaces_same_name() {
        let grid = Grid::new(5, 5, 1.0).unwrap();
        let occupancy = OccupancyTracker::for_grid(&grid);
        let mut spawner = CollectibleSpawner::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let request = SpawnRequest::new("Coins", CollectibleKind::Coin, 3, 1.0);

        spawner.spawn(&grid, &occupancy, &mut rng, &request);
        spawner.spawn(&grid, &occupancy, &mut rng, &request);

        assert_eq!(spawner.containers().len(), 1);
        assert_eq!(spawner.container("Coins").unwrap().placements.len(), 3);
    }

    #[test]
    fn test_rebuild_keeps_only_persistent() {
        let grid = Grid::new(5, 5, 1.0).unwrap();
        let occupancy = OccupancyTracker::for_grid(&grid);
        let mut spawner = CollectibleSpawner::new();
        let mut rng = ChaCha8Rng::seed_from_u64(8);

        spawner.spawn(
            &grid,
            &occupancy,
            &mut rng,
            &SpawnRequest::new("Coins", CollectibleKind::Coin, 4, 1.0),
        );
        spawner.spawn(
            &grid,
            &occupancy,
            &mut rng,
            &SpawnRequest::new("Treasures", CollectibleKind::Treasure, 2, 1.0)
                .with_persistent(false),
        );

        let fresh = OccupancyTracker::for_grid(&grid);
        spawner.retain_for_rebuild(&grid, &fresh);

        assert!(spawner.container("Treasures").is_none());
        assert_eq!(spawner.container("Coins").unwrap().placements.len(), 4);
        assert_eq!(fresh.reserved_count(), 4);
    }

    #[test]
    fn test_rebuild_drops_cells_outside_smaller_grid() {
        let grid = Grid::new(8, 8, 1.0).unwrap();
        let occupancy = OccupancyTracker::for_grid(&grid);
        let mut spawner = CollectibleSpawner::new();
        let mut rng = ChaCha8Rng::seed_from_u64(21);

        spawner.spawn(
            &grid,
            &occupancy,
            &mut rng,
            &SpawnRequest::new("Coins", CollectibleKind::Coin, 20, 1.0),
        );

        let smaller = Grid::new(3, 3, 1.0).unwrap();
        let fresh = OccupancyTracker::for_grid(&smaller);
        spawner.retain_for_rebuild(&smaller, &fresh);

        assert!(spawner
            .placements()
            .all(|p| smaller.contains(p.cell.row, p.cell.col)));
        assert_eq!(spawner.placements().count(), fresh.reserved_count());
    }

    #[test]
    fn test_take_removes_placement() {
        let grid = Grid::new(4, 4, 1.0).unwrap();
        let occupancy = OccupancyTracker::for_grid(&grid);
        let mut spawner = CollectibleSpawner::new();
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        spawner.spawn(
            &grid,
            &occupancy,
            &mut rng,
            &SpawnRequest::new("Treasures", CollectibleKind::Treasure, 2, 1.0),
        );
        let cell = spawner.container("Treasures").unwrap().placements[0].cell;

        let taken = spawner.take("Treasures", cell).unwrap();
        assert_eq!(taken.kind.value(), 50);
        assert_eq!(spawner.placements().count(), 1);
        assert!(spawner.take("Treasures", cell).is_none());
    }
}
