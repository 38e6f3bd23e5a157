//! Finite state machine for agent behavior
//!
//! States own their transition logic and get enter/update/exit hooks. The
//! machine evaluates the current state once per simulation tick and switches
//! immediately when a state asks for it, so a transition decided on tick N is
//! in effect for the rest of tick N.
//!
//! # Example
//!
//! ```ignore
//! #[derive(Debug)]
//! struct Waiting;
//!
//! impl State<Sensors> for Waiting {
//!     fn name(&self) -> &'static str { "Waiting" }
//!
//!     fn update(&mut self, ctx: &mut Sensors) -> Transition<Sensors> {
//!         if ctx.target_visible {
//!             Transition::to(Hunting)
//!         } else {
//!             Transition::None
//!         }
//!     }
//! }
//!
//! let mut fsm = StateMachine::new(Waiting);
//! fsm.update(&mut sensors);
//! ```

use std::fmt;

/// A state in the machine.
///
/// Lifecycle: `enter()` once on activation, `update()` every tick while
/// active, `exit()` once when replaced.
pub trait State<Ctx>: fmt::Debug {
    /// State name for logging.
    fn name(&self) -> &'static str;

    /// Called when this state becomes active.
    fn enter(&mut self, _ctx: &mut Ctx) {}

    /// Called each tick while active.
    fn update(&mut self, ctx: &mut Ctx) -> Transition<Ctx>;

    /// Called when this state is replaced.
    fn exit(&mut self, _ctx: &mut Ctx) {}
}

/// Decision returned from [`State::update`].
pub enum Transition<Ctx> {
    /// Stay in the current state.
    None,
    /// Replace the current state.
    To(Box<dyn State<Ctx>>),
}

impl<Ctx> Transition<Ctx> {
    /// Create a transition to a new state.
    pub fn to<S: State<Ctx> + 'static>(state: S) -> Self {
        Transition::To(Box::new(state))
    }
}

impl<Ctx> fmt::Debug for Transition<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::None => write!(f, "Transition::None"),
            Transition::To(state) => write!(f, "Transition::To({})", state.name()),
        }
    }
}

/// Owns the active state and drives its lifecycle.
pub struct StateMachine<Ctx> {
    current: Box<dyn State<Ctx>>,
    /// Whether enter() has run for `current`
    entered: bool,
    /// Updates spent in `current`
    ticks_in_state: u64,
}

impl<Ctx> StateMachine<Ctx> {
    /// Create a machine; the initial state's `enter()` runs on the first update.
    pub fn new<S: State<Ctx> + 'static>(initial: S) -> Self {
        Self {
            current: Box::new(initial),
            entered: false,
            ticks_in_state: 0,
        }
    }

    /// Run one tick.
    ///
    /// Returns `true` if the state changed.
    pub fn update(&mut self, ctx: &mut Ctx) -> bool {
        if !self.entered {
            self.current.enter(ctx);
            self.entered = true;
        }

        self.ticks_in_state += 1;
        match self.current.update(ctx) {
            Transition::None => false,
            Transition::To(next) => {
                self.replace(ctx, next);
                true
            }
        }
    }

    fn replace(&mut self, ctx: &mut Ctx, mut next: Box<dyn State<Ctx>>) {
        if self.entered {
            self.current.exit(ctx);
        }
        log::debug!(
            "State {} -> {} after {} ticks",
            self.current.name(),
            next.name(),
            self.ticks_in_state
        );

        next.enter(ctx);
        self.current = next;
        self.entered = true;
        self.ticks_in_state = 0;
    }

    /// Get the name of the current state.
    #[must_use]
    pub fn current_state_name(&self) -> &'static str {
        self.current.name()
    }
}

impl<Ctx> fmt::Debug for StateMachine<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current.name())
            .field("entered", &self.entered)
            .field("ticks_in_state", &self.ticks_in_state)
            .finish()
    }
}
