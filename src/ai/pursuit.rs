//! Pursuit agent: release gating, Patrol/Chase modes and path following
//!
//! The agent stays inert until the maze-entry notification arrives, waits a
//! fixed delay, then appears at the far cell from the entrance. From then on
//! every tick it:
//!
//! 1. Picks its mode from the planar distance to the target (Chase at or
//!    below `chase_distance`, Patrol above). There is no hysteresis.
//! 2. While chasing, replans when its waypoint list is empty or
//!    `replan_interval` ticks have passed since the last plan.
//! 3. Walks towards the waypoint under the cursor, advancing the cursor
//!    within `arrival_radius` and wrapping to the start past the end.

use glam::Vec3;

use super::fsm::{State, StateMachine, Transition};
use super::pathfinding::{Path, Pathfinder};
use super::steering::{PlanarSeek, planar_distance};
use crate::core::config::PursuitConfig;
use crate::maze::{Cell, Grid};

/// Behavior label of the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PursuitMode {
    #[default]
    Patrol,
    Chase,
}

// ============================================================================
// Release gating
// ============================================================================

/// Scheduling of the agent's first appearance
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ReleaseGate {
    /// Waiting for the maze-entry notification
    #[default]
    Dormant,
    /// Counting down to release
    Pending {
        /// Seconds left
        remaining: f32,
    },
    /// Active in the maze
    Released,
}

impl ReleaseGate {
    /// Start the countdown; later calls have no effect.
    pub fn trigger(&mut self, delay: f32) -> bool {
        if *self != ReleaseGate::Dormant {
            return false;
        }
        *self = ReleaseGate::Pending {
            remaining: delay.max(0.0),
        };
        true
    }

    /// Advance the countdown; returns `true` on the tick it expires.
    pub fn advance(&mut self, dt: f32) -> bool {
        let ReleaseGate::Pending { remaining } = self else {
            return false;
        };

        *remaining -= dt;
        if *remaining <= 0.0 {
            *self = ReleaseGate::Released;
            return true;
        }
        false
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        matches!(self, ReleaseGate::Released)
    }
}

// ============================================================================
// Mode states
// ============================================================================

/// Per-tick sensor data and requests shared with the mode states
#[derive(Debug, Default)]
pub struct PursuitContext {
    /// Mode written by the active state
    pub mode: PursuitMode,
    /// Planar distance to the target this tick
    pub target_distance: f32,
    pub chase_distance: f32,
    /// Agent tick counter
    pub tick: u64,
    pub last_replan_tick: u64,
    pub replan_interval: u64,
    /// Whether the waypoint list is empty
    pub path_empty: bool,
    /// Set by the Chase state when a new plan is needed
    pub replan_requested: bool,
}

impl PursuitContext {
    fn in_chase_range(&self) -> bool {
        self.target_distance <= self.chase_distance
    }

    fn request_replan_if_due(&mut self) {
        let elapsed = self.tick.saturating_sub(self.last_replan_tick);
        if self.path_empty || elapsed >= self.replan_interval {
            self.replan_requested = true;
        }
    }
}

/// Target out of range; the agent keeps walking its last plan
#[derive(Debug, Default)]
pub struct PatrolState;

impl State<PursuitContext> for PatrolState {
    fn name(&self) -> &'static str {
        "Patrol"
    }

    fn enter(&mut self, ctx: &mut PursuitContext) {
        ctx.mode = PursuitMode::Patrol;
    }

    fn update(&mut self, ctx: &mut PursuitContext) -> Transition<PursuitContext> {
        if ctx.in_chase_range() {
            return Transition::to(ChaseState);
        }
        Transition::None
    }
}

/// Target in range; the plan is refreshed on a fixed cadence
#[derive(Debug, Default)]
pub struct ChaseState;

impl State<PursuitContext> for ChaseState {
    fn name(&self) -> &'static str {
        "Chase"
    }

    fn enter(&mut self, ctx: &mut PursuitContext) {
        ctx.mode = PursuitMode::Chase;
        ctx.request_replan_if_due();
    }

    fn update(&mut self, ctx: &mut PursuitContext) -> Transition<PursuitContext> {
        if !ctx.in_chase_range() {
            return Transition::to(PatrolState);
        }
        ctx.request_replan_if_due();
        Transition::None
    }
}

// ============================================================================
// Agent
// ============================================================================

/// What happened during one [`PursuitAgent::tick`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgentTick {
    /// The agent appeared in the maze this tick
    pub released: bool,
    /// A new plan was computed this tick
    pub replanned: bool,
    /// The mode changed this tick
    pub mode_changed: bool,
}

/// Grid-aware pursuer
#[derive(Debug)]
pub struct PursuitAgent {
    config: PursuitConfig,
    pathfinder: Pathfinder,
    fsm: StateMachine<PursuitContext>,
    ctx: PursuitContext,
    gate: ReleaseGate,
    position: Vec3,
    /// Facing about +Y in radians
    yaw: f32,
    /// Cells of the last plan
    path: Path,
    /// World points being followed
    waypoints: Vec<Vec3>,
    cursor: usize,
    tick: u64,
    last_replan_tick: u64,
}

impl PursuitAgent {
    #[must_use]
    pub fn new(config: PursuitConfig) -> Self {
        let ctx = PursuitContext {
            chase_distance: config.chase_distance,
            replan_interval: config.replan_interval,
            ..Default::default()
        };

        Self {
            config,
            pathfinder: Pathfinder::default(),
            fsm: StateMachine::new(PatrolState),
            ctx,
            gate: ReleaseGate::Dormant,
            position: Vec3::ZERO,
            yaw: 0.0,
            path: Path::default(),
            waypoints: Vec::new(),
            cursor: 0,
            tick: 0,
            last_replan_tick: 0,
        }
    }

    /// Use a custom pathfinder
    #[must_use]
    pub fn with_pathfinder(mut self, pathfinder: Pathfinder) -> Self {
        self.pathfinder = pathfinder;
        self
    }

    /// Maze-entry notification; starts the release countdown once.
    pub fn notify_entered(&mut self) {
        if self.gate.trigger(self.config.release_delay) {
            log::info!(
                "Player entered maze, releasing agent in {:.1}s",
                self.config.release_delay
            );
        }
    }

    /// Run one simulation step towards `target`.
    pub fn tick(&mut self, grid: &Grid, target: Vec3, dt: f32) -> AgentTick {
        let mut outcome = AgentTick::default();

        if self.gate.advance(dt) {
            self.release(grid, target);
            outcome.released = true;
            outcome.replanned = true;
        }
        if !self.gate.is_released() {
            return outcome;
        }

        self.tick += 1;
        self.ctx.tick = self.tick;
        self.ctx.last_replan_tick = self.last_replan_tick;
        self.ctx.target_distance = planar_distance(self.position, target);
        self.ctx.path_empty = self.waypoints.is_empty();
        self.ctx.replan_requested = false;

        outcome.mode_changed = self.fsm.update(&mut self.ctx);
        if outcome.mode_changed {
            log::info!(
                "Agent switched to {} at distance {:.2}",
                self.fsm.current_state_name(),
                self.ctx.target_distance
            );
        }

        if self.ctx.replan_requested {
            self.replan(grid, target);
            outcome.replanned = true;
        }

        self.move_along_path(dt);
        outcome
    }

    fn release(&mut self, grid: &Grid, target: Vec3) {
        let spawn = grid.exit();
        self.position = grid.cell_center_world(spawn.row, spawn.col, self.config.spawn_height);
        log::info!("Agent released at cell {spawn} ({:?})", self.position);
        self.replan(grid, target);
    }

    /// Recompute the waypoint list towards `target`.
    pub fn replan(&mut self, grid: &Grid, target: Vec3) {
        self.waypoints.clear();
        self.cursor = 0;
        self.last_replan_tick = self.tick;

        let located = (grid.world_to_cell(self.position), grid.world_to_cell(target));
        let (Some(start), Some(goal)) = located else {
            log::debug!("Agent or target off grid, heading straight for target");
            self.path = Path::default();
            self.waypoints.push(target);
            return;
        };

        if start == goal {
            self.path = Path::new(vec![start]);
            self.waypoints.push(self.terminal_waypoint(grid, goal, target));
            return;
        }

        self.path = self.pathfinder.find_path(grid, start, goal);
        if self.path.is_fallback() {
            self.waypoints.push(target);
            return;
        }

        let y = self.config.spawn_height;
        self.waypoints.extend(
            self.path
                .cells()
                .iter()
                .skip_while(|cell| **cell == start)
                .map(|cell| grid.cell_center_world(cell.row, cell.col, y)),
        );
        if self.config.snap_to_target {
            self.waypoints.push(target);
        }

        log::debug!(
            "Replanned {start} -> {goal}: {} waypoints (tick {})",
            self.waypoints.len(),
            self.tick
        );
    }

    fn terminal_waypoint(&self, grid: &Grid, goal: Cell, target: Vec3) -> Vec3 {
        if self.config.snap_to_target {
            target
        } else {
            grid.cell_center_world(goal.row, goal.col, self.config.spawn_height)
        }
    }

    fn move_along_path(&mut self, dt: f32) {
        if self.waypoints.is_empty() {
            return;
        }
        if self.cursor >= self.waypoints.len() {
            self.cursor = 0;
        }

        let waypoint = self.waypoints[self.cursor];
        if planar_distance(self.position, waypoint) <= self.config.arrival_radius {
            self.cursor += 1;
            if self.cursor >= self.waypoints.len() {
                self.cursor = 0;
            }
            return;
        }

        let seek = PlanarSeek::new(waypoint, self.config.move_speed);
        if let Some(yaw) = seek.calculate(self.position).yaw {
            self.yaw = yaw;
        }
        self.position = seek.step(self.position, dt);
    }

    /// Check if the target is within catching range
    #[must_use]
    pub fn has_caught(&self, target: Vec3) -> bool {
        self.gate.is_released()
            && planar_distance(self.position, target) <= self.config.catch_radius
    }

    /// Place the agent, e.g. after an external collision pass
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[must_use]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[must_use]
    pub fn mode(&self) -> PursuitMode {
        self.ctx.mode
    }

    #[must_use]
    pub fn gate(&self) -> ReleaseGate {
        self.gate
    }

    /// Released agents move, collide and are drawn
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.gate.is_released()
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.is_active()
    }

    #[must_use]
    pub fn collision_enabled(&self) -> bool {
        self.is_active()
    }

    /// Cells of the last plan
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn waypoints(&self) -> &[Vec3] {
        &self.waypoints
    }

    /// Index of the waypoint being walked to
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Ticks since release
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    #[must_use]
    pub fn last_replan_tick(&self) -> u64 {
        self.last_replan_tick
    }

    #[must_use]
    pub fn config(&self) -> &PursuitConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::MazeGenerator;

    const DT: f32 = 1.0 / 60.0;

    fn config() -> PursuitConfig {
        PursuitConfig {
            release_delay: 0.0,
            ..Default::default()
        }
    }

    fn released_agent(grid: &Grid, target: Vec3) -> PursuitAgent {
        let mut agent = PursuitAgent::new(config());
        agent.notify_entered();
        let outcome = agent.tick(grid, target, DT);
        assert!(outcome.released);
        agent
    }

    #[test]
    fn test_release_gate_lifecycle() {
        let mut gate = ReleaseGate::default();

        assert!(!gate.advance(100.0));
        assert!(gate.trigger(1.0));
        assert!(!gate.trigger(5.0));
        assert!(!gate.advance(0.5));
        assert!(gate.advance(0.5));
        assert!(gate.is_released());
        assert!(!gate.advance(1.0));
    }

    #[test]
    fn test_agent_inert_until_released() {
        let grid = MazeGenerator::build(4, 4, 4.0, Some(3)).unwrap();
        let mut agent = PursuitAgent::new(PursuitConfig {
            release_delay: 1.0,
            ..Default::default()
        });
        let target = grid.cell_center_world(0, 0, 1.0);

        for _ in 0..10 {
            assert_eq!(agent.tick(&grid, target, 0.5), AgentTick::default());
        }
        assert!(!agent.is_visible());
        assert!(!agent.collision_enabled());
        assert!(agent.waypoints().is_empty());

        agent.notify_entered();
        assert!(!agent.tick(&grid, target, 0.5).released);
        assert!(agent.tick(&grid, target, 0.5).released);

        assert!(agent.is_active());
        assert_eq!(agent.path().start(), Some(Cell::new(3, 3)));
    }

    #[test]
    fn test_patrol_to_chase_on_distance() {
        let grid = MazeGenerator::build(6, 6, 4.0, Some(12)).unwrap();
        let start = grid.cell_center_world(5, 5, 1.0);
        let mut agent = released_agent(&grid, start + Vec3::new(-12.0, 0.0, 0.0));

        // Hold the agent still and move the target around it
        agent.set_position(start);
        agent.tick(&grid, start + Vec3::new(-12.0, 0.0, 0.0), 0.0);
        assert_eq!(agent.mode(), PursuitMode::Patrol);

        agent.set_position(start);
        let outcome = agent.tick(&grid, start + Vec3::new(-8.0, 0.0, 0.0), 0.0);
        assert!(outcome.mode_changed);
        assert_eq!(agent.mode(), PursuitMode::Chase);

        // Exactly at the threshold still chases
        agent.set_position(start);
        agent.tick(&grid, start + Vec3::new(0.0, 0.0, -10.0), 0.0);
        assert_eq!(agent.mode(), PursuitMode::Chase);

        agent.set_position(start);
        agent.tick(&grid, start + Vec3::new(0.0, 5.0, -10.5), 0.0);
        assert_eq!(agent.mode(), PursuitMode::Patrol);
    }

    #[test]
    fn test_chase_replans_on_cadence() {
        let grid = MazeGenerator::build(6, 6, 4.0, Some(4)).unwrap();
        let target = grid.cell_center_world(5, 3, 1.0);
        let mut agent = released_agent(&grid, target);
        assert_eq!(agent.mode(), PursuitMode::Chase);
        let first = agent.last_replan_tick();

        // Hold position so the target stays in range
        let mut replans = Vec::new();
        for _ in 0..45 {
            if agent.tick(&grid, target, 0.0).replanned {
                replans.push(agent.last_replan_tick());
            }
        }

        assert_eq!(replans, vec![first + 20, first + 40]);
    }

    #[test]
    fn test_patrol_keeps_stale_plan() {
        let grid = MazeGenerator::build(8, 8, 4.0, Some(6)).unwrap();
        let far = grid.cell_center_world(0, 0, 1.0);
        let mut agent = released_agent(&grid, far);
        assert_eq!(agent.mode(), PursuitMode::Patrol);
        let plan = agent.waypoints().to_vec();

        for _ in 0..100 {
            assert!(!agent.tick(&grid, far, DT).replanned);
        }
        assert_eq!(agent.waypoints(), plan.as_slice());
    }

    #[test]
    fn test_plan_ends_at_target() {
        let grid = MazeGenerator::build(5, 5, 4.0, Some(8)).unwrap();
        let target = grid.cell_center_world(0, 0, 1.0) + Vec3::new(0.5, 0.0, 0.2);
        let agent = released_agent(&grid, target);

        let waypoints = agent.waypoints();
        assert_eq!(*waypoints.last().unwrap(), target);
        // One waypoint per path cell after the agent's own, plus the target
        assert_eq!(waypoints.len(), agent.path().len());
        assert!(agent.path().is_walkable(&grid));
    }

    #[test]
    fn test_plan_without_snapping_ends_at_cell_center() {
        let grid = MazeGenerator::build(5, 5, 4.0, Some(8)).unwrap();
        let target = grid.cell_center_world(0, 0, 1.0) + Vec3::new(0.5, 0.0, 0.2);
        let mut agent = PursuitAgent::new(PursuitConfig {
            release_delay: 0.0,
            snap_to_target: false,
            ..Default::default()
        });
        agent.notify_entered();
        agent.tick(&grid, target, DT);

        assert_eq!(
            *agent.waypoints().last().unwrap(),
            grid.cell_center_world(0, 0, 1.0)
        );
        assert_eq!(agent.waypoints().len(), agent.path().len() - 1);
    }

    #[test]
    fn test_off_grid_target_is_direct() {
        let grid = MazeGenerator::build(3, 3, 4.0, Some(1)).unwrap();
        let target = Vec3::new(-100.0, 1.0, 0.0);
        let agent = released_agent(&grid, target);

        assert_eq!(agent.waypoints(), &[target]);
        assert!(agent.path().is_empty());
    }

    #[test]
    fn test_same_cell_is_direct() {
        let grid = MazeGenerator::build(3, 3, 4.0, Some(1)).unwrap();
        let target = grid.cell_center_world(2, 2, 1.0) + Vec3::new(1.0, 0.0, 1.0);
        let agent = released_agent(&grid, target);

        assert_eq!(agent.waypoints(), &[target]);
        assert_eq!(agent.path().cells(), &[Cell::new(2, 2)]);
    }

    #[test]
    fn test_cursor_wraps_around() {
        let grid = MazeGenerator::build(3, 3, 4.0, Some(1)).unwrap();
        let target = grid.cell_center_world(2, 2, 1.0) + Vec3::new(1.0, 0.0, 1.0);
        let mut agent = released_agent(&grid, target);

        // Walk onto the single waypoint and past it
        for _ in 0..120 {
            agent.tick(&grid, target, DT);
        }
        assert_eq!(agent.cursor(), 0);
        assert!(planar_distance(agent.position(), target) < 0.3);
    }

    fn patrolling_agent(grid: &Grid, target: Vec3, arrival_radius: f32) -> PursuitAgent {
        let mut agent = PursuitAgent::new(PursuitConfig {
            release_delay: 0.0,
            chase_distance: 0.0,
            snap_to_target: false,
            arrival_radius,
            ..Default::default()
        });
        agent.notify_entered();
        assert!(agent.tick(grid, target, DT).released);
        agent
    }

    #[test]
    fn test_patrol_walks_whole_plan_then_wraps() {
        let grid = MazeGenerator::build(8, 8, 4.0, Some(6)).unwrap();
        // Off-center so the agent never stands exactly on the target
        let target = grid.cell_center_world(0, 0, 1.0) + Vec3::new(0.5, 0.0, 0.5);
        let mut agent = patrolling_agent(&grid, target, 0.3);
        let plan = agent.waypoints().to_vec();
        assert!(plan.len() > 2);

        let mut highest = 0;
        let mut wrapped = false;
        for _ in 0..180 * 60 {
            let before = agent.cursor();
            agent.tick(&grid, target, DT);
            assert_eq!(agent.mode(), PursuitMode::Patrol);

            highest = highest.max(agent.cursor());
            if before == plan.len() - 1 && agent.cursor() == 0 {
                wrapped = true;
                break;
            }
        }

        assert!(wrapped);
        assert_eq!(highest, plan.len() - 1);
        assert_eq!(agent.waypoints(), plan.as_slice());
    }

    #[test]
    fn test_zero_arrival_radius_still_advances() {
        let grid = MazeGenerator::build(8, 8, 4.0, Some(6)).unwrap();
        let target = grid.cell_center_world(0, 0, 1.0) + Vec3::new(0.5, 0.0, 0.5);
        let mut agent = patrolling_agent(&grid, target, 0.0);

        for _ in 0..10 * 60 {
            agent.tick(&grid, target, DT);
        }
        assert!(agent.cursor() >= 2, "cursor stuck at {}", agent.cursor());
    }

    #[test]
    fn test_agent_catches_stationary_target() {
        let grid = MazeGenerator::build(4, 4, 4.0, Some(10)).unwrap();
        let target = grid.cell_center_world(2, 1, 1.0);
        let mut agent = released_agent(&grid, target);

        let caught = (0..60 * 60).any(|_| {
            agent.tick(&grid, target, DT);
            agent.has_caught(target)
        });
        assert!(caught);
    }
}
