//! Entrance and exit trigger volumes
//!
//! Boxes sit just inside the two boundary openings in maze-local space.
//! They are edge-triggered: a tracked point fires once when it moves from
//! outside to inside, and must leave again before it can fire a second time.

use glam::Vec3;

use super::grid::Grid;

/// Trigger box size in maze-local units
const TRIGGER_SIZE: Vec3 = Vec3::new(1.5, 2.0, 2.0);
/// Local height of trigger centers
const TRIGGER_HEIGHT: f32 = 1.0;
/// Distance from the boundary wall to the trigger center
const TRIGGER_INSET: f32 = 0.75;

/// Axis-aligned box in maze-local space that reports entry
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerZone {
    /// Center in maze-local space
    pub center: Vec3,
    /// Half of the box size along each axis
    pub half_extents: Vec3,
    inside: bool,
}

impl TriggerZone {
    /// Create a zone from a local center and full size
    #[must_use]
    pub fn new(center: Vec3, size: Vec3) -> Self {
        Self {
            center,
            half_extents: size * 0.5,
            inside: false,
        }
    }

    /// Zone just inside the West opening of (0, 0)
    #[must_use]
    pub fn entrance(grid: &Grid) -> Self {
        let half = grid.cell_size() * 0.5;
        let cell = grid.cell_center_local(0, 0, TRIGGER_HEIGHT);
        Self::new(cell - Vec3::new(half - TRIGGER_INSET, 0.0, 0.0), TRIGGER_SIZE)
    }

    /// Zone just inside the East opening of the last cell
    #[must_use]
    pub fn exit(grid: &Grid) -> Self {
        let half = grid.cell_size() * 0.5;
        let exit = grid.exit();
        let cell = grid.cell_center_local(exit.row, exit.col, TRIGGER_HEIGHT);
        Self::new(cell + Vec3::new(half - TRIGGER_INSET, 0.0, 0.0), TRIGGER_SIZE)
    }

    /// Check if a maze-local point is inside the box
    #[must_use]
    pub fn contains_local(&self, local: Vec3) -> bool {
        let delta = (local - self.center).abs();
        delta.cmple(self.half_extents).all()
    }

    /// Track a world point; returns `true` only on the step it enters.
    pub fn update(&mut self, grid: &Grid, world: Vec3) -> bool {
        let inside = self.contains_local(grid.world_to_local(world));
        let entered = inside && !self.inside;
        self.inside = inside;
        entered
    }

    /// Whether the tracked point was inside at the last update
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.inside
    }
}
