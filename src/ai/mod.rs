//! AI and navigation module
//!
//! Provides grid A* with an indexed open set, a small state machine, planar
//! steering and the pursuit agent built from them.

mod fsm;
mod open_set;
mod pathfinding;
mod pursuit;
mod steering;

pub use fsm::{State, StateMachine, Transition};
pub use open_set::OpenSet;
pub use pathfinding::{DEFAULT_ITERATION_FACTOR, Path, PathError, Pathfinder, find_path};
pub use pursuit::{
    AgentTick, ChaseState, PatrolState, PursuitAgent, PursuitContext, PursuitMode, ReleaseGate,
};
pub use steering::{PlanarSeek, SteeringOutput, planar_distance};
