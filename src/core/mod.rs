//! Core module
//!
//! Configuration and the event queue shared by the level and its agent.

pub mod config;
mod events;

pub use config::{ConfigError, GameConfig, MazeConfig, PursuitConfig, SpawnConfig};
pub use events::{EventQueue, MazeEvent};
