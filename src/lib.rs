//! Maze generation and pursuit AI
//!
//! This crate provides:
//! - Grid mazes with symmetric walls, carved by a seeded recursive backtracker
//! - Exclusive cell reservation for collectible placement
//! - A* over maze cells with an indexed open set
//! - A Patrol/Chase pursuer released after the player enters the maze

pub mod ai;
pub mod core;
pub mod level;
pub mod maze;

// Re-exports for convenience
pub use glam;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{Path, PathError, Pathfinder, PursuitAgent, PursuitMode, ReleaseGate};
    pub use crate::core::{ConfigError, GameConfig, MazeEvent};
    pub use crate::level::{Level, LevelError};
    pub use crate::maze::{
        Cell, CollectibleKind, Direction, Grid, GridError, MazeGenerator, OccupancyTracker,
    };
    pub use glam::{Vec2, Vec3};
}
