//! Level configuration
//!
//! Maze, pursuit and spawn settings, saved and loaded as RON or JSON.

use std::fs;
use std::path::Path;

use glam::{Affine3A, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Maze shape and placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    pub rows: usize,
    pub cols: usize,
    /// Edge length of one cell in world units
    pub cell_size: f32,
    /// Fixed seed; `None` derives one from the clock
    pub seed: Option<u64>,
    /// Translation of the owning transform
    pub origin: Vec3,
    /// Rotation of the owning transform about +Y, in degrees
    pub yaw_degrees: f32,
    /// Local offset applied before the owning transform
    pub level_offset: Vec3,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            rows: 8,
            cols: 12,
            cell_size: 4.0,
            seed: None,
            origin: Vec3::ZERO,
            yaw_degrees: 0.0,
            level_offset: Vec3::ZERO,
        }
    }
}

impl MazeConfig {
    /// Owning transform built from origin and yaw
    #[must_use]
    pub fn transform(&self) -> Affine3A {
        Affine3A::from_rotation_translation(
            Quat::from_rotation_y(self.yaw_degrees.to_radians()),
            self.origin,
        )
    }
}

/// Pursuit agent tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PursuitConfig {
    /// Planar speed in world units per second
    pub move_speed: f32,
    /// Distance at or below which the agent chases
    pub chase_distance: f32,
    /// Ticks between replans while chasing
    pub replan_interval: u64,
    /// Distance at which a waypoint counts as reached
    pub arrival_radius: f32,
    /// Seconds between maze entry and release
    pub release_delay: f32,
    /// Height of the agent and of its cell waypoints
    pub spawn_height: f32,
    /// End every planned path at the literal target position
    pub snap_to_target: bool,
    /// Planar distance at which the player counts as caught
    pub catch_radius: f32,
}

impl Default for PursuitConfig {
    fn default() -> Self {
        Self {
            move_speed: 4.0,
            chase_distance: 10.0,
            replan_interval: 20,
            arrival_radius: 0.3,
            release_delay: 30.0,
            spawn_height: 1.0,
            snap_to_target: true,
            catch_radius: 0.75,
        }
    }
}

/// Collectible counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub coin_count: usize,
    pub treasure_count: usize,
    /// Height of placed collectibles
    pub spawn_y: f32,
    /// Keep collectible containers across maze rebuilds
    pub persistent: bool,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            coin_count: 30,
            treasure_count: 5,
            spawn_y: 1.0,
            persistent: true,
        }
    }
}

/// Complete level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub maze: MazeConfig,
    pub pursuit: PursuitConfig,
    pub spawn: SpawnConfig,
}

impl GameConfig {
    /// Set maze dimensions
    #[must_use]
    pub fn with_size(mut self, rows: usize, cols: usize) -> Self {
        self.maze.rows = rows;
        self.maze.cols = cols;
        self
    }

    /// Set the cell edge length
    #[must_use]
    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.maze.cell_size = cell_size;
        self
    }

    /// Fix the generator seed
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.maze.seed = Some(seed);
        self
    }

    /// Set collectible counts
    #[must_use]
    pub fn with_collectibles(mut self, coins: usize, treasures: usize) -> Self {
        self.spawn.coin_count = coins;
        self.spawn.treasure_count = treasures;
        self
    }

    /// Set the delay between maze entry and agent release
    #[must_use]
    pub fn with_release_delay(mut self, seconds: f32) -> Self {
        self.pursuit.release_delay = seconds;
        self
    }

    /// Check values that would make the level unusable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |value: f32| value.is_finite() && value > 0.0;

        if self.maze.rows < 1 || self.maze.cols < 1 {
            return Err(ConfigError::Invalid("maze.rows and maze.cols must be at least 1"));
        }
        if !positive(self.maze.cell_size) {
            return Err(ConfigError::Invalid("maze.cell_size must be positive"));
        }
        if !positive(self.pursuit.move_speed) {
            return Err(ConfigError::Invalid("pursuit.move_speed must be positive"));
        }
        if !positive(self.pursuit.arrival_radius) {
            return Err(ConfigError::Invalid("pursuit.arrival_radius must be positive"));
        }
        if self.pursuit.replan_interval == 0 {
            return Err(ConfigError::Invalid("pursuit.replan_interval must be at least 1"));
        }
        if !self.pursuit.release_delay.is_finite() || self.pursuit.release_delay < 0.0 {
            return Err(ConfigError::Invalid("pursuit.release_delay must not be negative"));
        }

        let cells = self.maze.rows.saturating_mul(self.maze.cols);
        let items = self.spawn.coin_count.saturating_add(self.spawn.treasure_count);
        if items > cells {
            return Err(ConfigError::Invalid(
                "spawn.coin_count plus spawn.treasure_count must fit in the maze",
            ));
        }
        Ok(())
    }

    /// Save the configuration to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.to_ron()?).map_err(|e| ConfigError::IoError(e.to_string()))
    }

    /// Load a configuration from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_ron(&content)
    }

    /// Save the configuration to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json_string = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, json_string).map_err(|e| ConfigError::IoError(e.to_string()))
    }

    /// Load a configuration from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config: GameConfig = serde_json::from_str(&content)
            .map_err(|e| ConfigError::DeserializeError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a pretty RON string
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    /// Parse and validate a RON string
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails
    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        let config: GameConfig =
            ron::from_str(content).map_err(|e| ConfigError::DeserializeError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Errors that can occur while loading or saving configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// IO error
    IoError(String),
    /// Serialization error
    SerializeError(String),
    /// Deserialization error
    DeserializeError(String),
    /// A value outside its allowed range
    Invalid(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::SerializeError(e) => write!(f, "Serialization error: {e}"),
            Self::DeserializeError(e) => write!(f, "Deserialization error: {e}"),
            Self::Invalid(e) => write!(f, "Invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
