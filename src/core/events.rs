//! Event queue for maze notifications
//!
//! Double-buffered: events pushed during tick N become readable in tick N+1
//! after `swap()`. The level owns the queue and forwards the maze-entry
//! notification to its single subscriber, the pursuit agent.
//!
//! # Example
//!
//! ```ignore
//! let mut queue = EventQueue::new();
//!
//! // Tick N: a trigger fires
//! queue.push(MazeEvent::PlayerEnteredMaze);
//!
//! // Tick N+1
//! queue.swap();
//! for event in queue.drain() {
//!     if matches!(event, MazeEvent::PlayerEnteredMaze) {
//!         agent.notify_entered();
//!     }
//! }
//! ```

use std::collections::VecDeque;

use glam::Vec3;

// ============================================================================
// Event Types
// ============================================================================

/// Things that happened in and around the maze.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum MazeEvent {
    /// A maze finished generating.
    MazeBuilt {
        /// Grid rows
        rows: usize,
        /// Grid columns
        cols: usize,
        /// Seed used by the generator
        seed: u64,
    },

    /// The player crossed the entrance trigger.
    PlayerEnteredMaze,

    /// The player crossed the exit trigger.
    PlayerExitedMaze,

    /// The pursuit agent became active.
    AgentReleased {
        /// World-space spawn point
        position: Vec3,
    },

    /// The pursuit agent reached the player.
    PlayerCaught {
        /// Agent position at the time of the catch
        position: Vec3,
    },
}

// ============================================================================
// Event Queue
// ============================================================================

/// Double-buffered event queue for tick-consistent processing.
#[derive(Debug)]
pub struct EventQueue {
    /// Events being written this tick
    pending: VecDeque<MazeEvent>,
    /// Events from the previous tick, ready for processing
    processing: VecDeque<MazeEvent>,
}

impl EventQueue {
    const DEFAULT_CAPACITY: usize = 16;

    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: VecDeque::with_capacity(Self::DEFAULT_CAPACITY),
            processing: VecDeque::with_capacity(Self::DEFAULT_CAPACITY),
        }
    }

    /// Push an event to be processed next tick.
    #[inline]
    pub fn push(&mut self, event: MazeEvent) {
        log::trace!("Queued {event:?}");
        self.pending.push_back(event);
    }

    /// Make this tick's events readable and start a fresh pending buffer.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.pending, &mut self.processing);
        self.pending.clear();
    }

    /// Take ownership of events from the previous tick.
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = MazeEvent> + '_ {
        self.processing.drain(..)
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processing.is_empty()
    }

    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.processing.len()
    }

    /// Drop everything, e.g. when the maze is rebuilt.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.processing.clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
