//! Planar steering for waypoint following
//!
//! Agents move on the ground plane; the vertical axis is ignored both for
//! direction and for distance checks.

use glam::{Vec3, Vec3Swizzles};

/// Planar distance between two points, ignoring height
#[must_use]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    a.xz().distance(b.xz())
}

/// Output from a steering step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SteeringOutput {
    /// Desired velocity on the ground plane
    pub linear: Vec3,
    /// Facing about +Y in radians, if moving
    pub yaw: Option<f32>,
}

impl SteeringOutput {
    /// No movement
    pub const ZERO: Self = Self {
        linear: Vec3::ZERO,
        yaw: None,
    };
}

/// Seek behavior - move towards a target at constant speed on the ground plane
#[derive(Debug, Clone)]
pub struct PlanarSeek {
    /// Target position
    pub target: Vec3,
    /// Speed in world units per second
    pub speed: f32,
}

impl PlanarSeek {
    #[must_use]
    pub fn new(target: Vec3, speed: f32) -> Self {
        Self { target, speed }
    }

    /// Velocity and facing towards the target
    #[must_use]
    pub fn calculate(&self, position: Vec3) -> SteeringOutput {
        let mut to_target = self.target - position;
        to_target.y = 0.0;

        let direction = to_target.normalize_or_zero();
        if direction == Vec3::ZERO {
            return SteeringOutput::ZERO;
        }

        SteeringOutput {
            linear: direction * self.speed,
            // Forward is +Z at yaw 0
            yaw: Some(direction.x.atan2(direction.z)),
        }
    }

    /// Advance `position` by one step of `dt` seconds without overshooting
    #[must_use]
    pub fn step(&self, position: Vec3, dt: f32) -> Vec3 {
        let remaining = planar_distance(position, self.target);
        let travel = self.speed * dt.max(0.0);

        if travel >= remaining {
            return Vec3::new(self.target.x, position.y, self.target.z);
        }
        position + self.calculate(position).linear * dt
    }
}
