//! Maze grid, generation and placement
//!
//! Provides the cell grid with symmetric walls, the perfect-maze generator,
//! the occupancy table used by spawners, and the entrance/exit triggers.

mod generator;
mod grid;
mod occupancy;
mod spawner;
mod trigger;

pub use generator::MazeGenerator;
pub use grid::{Cell, Direction, Grid, GridError};
pub use occupancy::OccupancyTracker;
pub use spawner::{CollectibleKind, CollectibleSpawner, Placement, SpawnContainer, SpawnRequest};
pub use trigger::TriggerZone;
