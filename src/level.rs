//! Level: one maze instance and everything that lives in it
//!
//! The level owns the grid, its occupancy table, the collectible containers,
//! the entrance/exit triggers, the event queue and the pursuit agent. Each
//! call to [`Level::update`] is one simulation tick:
//!
//! 1. Swap the event queue and hand last tick's events to their subscribers
//!    (the maze-entry notification goes to the agent).
//! 2. Track the player through the entrance and exit triggers.
//! 3. Tick the agent and check for a catch.

use std::fmt;

use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::ai::PursuitAgent;
use crate::core::{ConfigError, EventQueue, GameConfig, MazeConfig, MazeEvent, SpawnConfig};
use crate::maze::{
    CollectibleKind, CollectibleSpawner, Grid, GridError, MazeGenerator, OccupancyTracker,
    Placement, SpawnContainer, SpawnRequest, TriggerZone,
};

/// Container holding the coins
pub const COIN_CONTAINER: &str = "Coins";
/// Container holding the treasures
pub const TREASURE_CONTAINER: &str = "Treasures";

/// Stream used by the collectible RNG, distinct from the carver's
const SPAWN_STREAM: u64 = 1;

/// Reasons a level could not be built
#[derive(Debug, Clone, PartialEq)]
pub enum LevelError {
    /// The configuration failed validation
    Config(ConfigError),
    /// The grid could not be allocated
    Grid(GridError),
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Level configuration rejected: {e}"),
            Self::Grid(e) => write!(f, "Level grid rejected: {e}"),
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Grid(e) => Some(e),
        }
    }
}

impl From<ConfigError> for LevelError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<GridError> for LevelError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

/// A generated maze with its collectibles, triggers and pursuer
#[derive(Debug)]
pub struct Level {
    config: GameConfig,
    grid: Grid,
    occupancy: OccupancyTracker,
    spawner: CollectibleSpawner,
    rng: ChaCha8Rng,
    seed: u64,
    events: EventQueue,
    entrance: TriggerZone,
    exit: TriggerZone,
    agent: PursuitAgent,
    /// Set once the catch event has been raised for this maze
    caught: bool,
}

impl Level {
    /// Validate `config` and generate a level from it.
    ///
    /// # Errors
    ///
    /// Returns [`LevelError::Config`] if validation fails and
    /// [`LevelError::Grid`] if the grid cannot be allocated.
    pub fn new(config: GameConfig) -> Result<Self, LevelError> {
        config.validate()?;

        let mut generator = MazeGenerator::new(config.maze.seed);
        let grid = build_grid(&config.maze, &mut generator)?;
        let seed = generator.seed();

        let mut level = Self {
            occupancy: OccupancyTracker::for_grid(&grid),
            spawner: CollectibleSpawner::new(),
            rng: spawn_rng(seed),
            seed,
            events: EventQueue::new(),
            entrance: TriggerZone::entrance(&grid),
            exit: TriggerZone::exit(&grid),
            agent: PursuitAgent::new(config.pursuit.clone()),
            caught: false,
            grid,
            config,
        };
        level.spawn_collectibles();
        level.announce_build();
        Ok(level)
    }

    /// Carve a fresh maze in place.
    ///
    /// The grid and occupancy table are reallocated, non-persistent
    /// collectible containers are regenerated, persistent ones are carried
    /// over, and the agent goes back to waiting for the maze-entry
    /// notification. `None` derives a new seed from the clock.
    ///
    /// # Errors
    ///
    /// Returns [`GridError`] if the grid cannot be allocated. The current
    /// maze is left untouched in that case.
    pub fn rebuild(&mut self, seed: Option<u64>) -> Result<(), GridError> {
        let mut generator = MazeGenerator::new(seed);
        let grid = build_grid(&self.config.maze, &mut generator)?;
        let occupancy = OccupancyTracker::for_grid(&grid);
        self.spawner.retain_for_rebuild(&grid, &occupancy);

        self.seed = generator.seed();
        self.rng = spawn_rng(self.seed);
        self.entrance = TriggerZone::entrance(&grid);
        self.exit = TriggerZone::exit(&grid);
        self.grid = grid;
        self.occupancy = occupancy;
        self.agent = PursuitAgent::new(self.config.pursuit.clone());
        self.caught = false;
        self.events.clear();

        self.spawn_collectibles();
        self.announce_build();
        Ok(())
    }

    /// Run one tick with the player at `player` (world space).
    ///
    /// Returns the events raised during the previous tick, which are the ones
    /// handled by this call.
    pub fn update(&mut self, dt: f32, player: Vec3) -> Vec<MazeEvent> {
        self.events.swap();
        let processed: Vec<MazeEvent> = self.events.drain().collect();

        for event in &processed {
            if matches!(event, MazeEvent::PlayerEnteredMaze) {
                self.agent.notify_entered();
            }
        }

        if self.entrance.update(&self.grid, player) {
            log::info!("Player entered the maze");
            self.events.push(MazeEvent::PlayerEnteredMaze);
        }
        if self.exit.update(&self.grid, player) {
            log::info!("Player reached the exit");
            self.events.push(MazeEvent::PlayerExitedMaze);
        }

        let outcome = self.agent.tick(&self.grid, player, dt);
        if outcome.released {
            self.events.push(MazeEvent::AgentReleased {
                position: self.agent.position(),
            });
        }

        if !self.caught && self.agent.has_caught(player) {
            self.caught = true;
            log::info!("Player caught at {:?}", self.agent.position());
            self.events.push(MazeEvent::PlayerCaught {
                position: self.agent.position(),
            });
        }

        processed
    }

    /// Pick up whatever collectible sits in the cell under `position`.
    pub fn collect_at(&mut self, position: Vec3) -> Option<Placement> {
        let cell = self.grid.world_to_cell(position)?;
        let name = self
            .spawner
            .containers()
            .iter()
            .find(|c| c.placements.iter().any(|p| p.cell == cell))?
            .name
            .clone();

        let placement = self.spawner.take(&name, cell)?;
        log::debug!(
            "Collected {:?} at {cell} ({} points)",
            placement.kind,
            placement.kind.value()
        );
        Some(placement)
    }

    fn spawn_collectibles(&mut self) {
        for request in collectible_requests(&self.config.spawn) {
            if self.spawner.container(&request.name).is_some() {
                continue;
            }
            self.spawner
                .spawn(&self.grid, &self.occupancy, &mut self.rng, &request);
        }
    }

    fn announce_build(&mut self) {
        log::info!(
            "Built {}x{} maze with seed {} ({} collectibles)",
            self.grid.rows(),
            self.grid.cols(),
            self.seed,
            self.spawner.placements().count()
        );
        self.events.push(MazeEvent::MazeBuilt {
            rows: self.grid.rows(),
            cols: self.grid.cols(),
            seed: self.seed,
        });
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn occupancy(&self) -> &OccupancyTracker {
        &self.occupancy
    }

    #[must_use]
    pub fn containers(&self) -> &[SpawnContainer] {
        self.spawner.containers()
    }

    #[must_use]
    pub fn agent(&self) -> &PursuitAgent {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut PursuitAgent {
        &mut self.agent
    }

    /// Seed the current maze was carved with
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn entrance_trigger(&self) -> &TriggerZone {
        &self.entrance
    }

    #[must_use]
    pub fn exit_trigger(&self) -> &TriggerZone {
        &self.exit
    }

    /// Whether the catch event has been raised for this maze
    #[must_use]
    pub fn is_player_caught(&self) -> bool {
        self.caught
    }
}

fn build_grid(config: &MazeConfig, generator: &mut MazeGenerator) -> Result<Grid, GridError> {
    let mut grid = Grid::new(config.rows, config.cols, config.cell_size)?
        .with_placement(config.transform(), config.level_offset);
    generator.generate(&mut grid)?;
    Ok(grid)
}

fn spawn_rng(seed: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(SPAWN_STREAM);
    rng
}

fn collectible_requests(spawn: &SpawnConfig) -> [SpawnRequest; 2] {
    [
        SpawnRequest::new(
            COIN_CONTAINER,
            CollectibleKind::Coin,
            spawn.coin_count,
            spawn.spawn_y,
        )
        .with_persistent(spawn.persistent),
        SpawnRequest::new(
            TREASURE_CONTAINER,
            CollectibleKind::Treasure,
            spawn.treasure_count,
            spawn.spawn_y,
        )
        .with_persistent(spawn.persistent),
    ]
}
