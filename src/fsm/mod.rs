//! Table-driven finite state machine executor.
//!
//! The engine knows nothing about what the states mean.  A caller supplies
//! a transition matrix and one action per state:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  transitions (row-major, state × event → state)         │
//! │  ┌─────────┬──────────┬──────────┬──────────┐           │
//! │  │         │ event 0  │ event 1  │ event 2  │           │
//! │  ├─────────┼──────────┼──────────┼──────────┤           │
//! │  │ state 0 │    1     │    0     │    0     │           │
//! │  │ state 1 │    1     │    0     │    2     │           │
//! │  │ state 2 │    2     │    0     │    1     │           │
//! │  └─────────┴──────────┴──────────┴──────────┘           │
//! │  actions: state → fn(&mut C, &MessageBus)                │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! [`StateMachine::execute`] looks up the destination for the current
//! `(state, event)` pair, commits it, then runs the destination's action.
//! Actions produce their effects by publishing on the bus.  Every index
//! violation is an [`FsmError`]: an undefined transition in an actuation
//! state machine is a configuration bug.

pub mod context;
pub mod states;

use crate::bus::MessageBus;
use crate::error::{FsmError, Result};

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature of a state action.  `C` is the caller's context (condition
/// flags and settings); the bus is the only output channel.
pub type StateAction<C> = fn(&mut C, &MessageBus<'_>) -> Result<()>;

// ---------------------------------------------------------------------------
// Configuration record
// ---------------------------------------------------------------------------

/// Static description of one state machine.
pub struct FsmConfig<'t, C> {
    pub state_count: u16,
    pub event_count: u16,
    /// `state_count * event_count` destinations, row-major by state.
    pub transitions: &'t [u16],
    /// One entry per state.  `None` is allowed in the table but fatal
    /// when that state's action is run.
    pub actions: &'t [Option<StateAction<C>>],
    pub initial_state: u16,
    pub initial_event: u16,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct StateMachine<'t, C> {
    config: FsmConfig<'t, C>,
    current_state: u16,
    current_event: u16,
}

impl<'t, C> StateMachine<'t, C> {
    /// Validate the table shape, every destination and the initial indices.
    pub fn new(config: FsmConfig<'t, C>) -> core::result::Result<Self, FsmError> {
        if config.state_count == 0 || config.event_count == 0 {
            return Err(FsmError::EmptyTable);
        }
        let cells = usize::from(config.state_count) * usize::from(config.event_count);
        if config.transitions.len() != cells
            || config.actions.len() != usize::from(config.state_count)
        {
            return Err(FsmError::TableShape);
        }
        if let Some(&state) = config
            .transitions
            .iter()
            .find(|&&s| s >= config.state_count)
        {
            return Err(FsmError::StateOutOfRange {
                state,
                state_count: config.state_count,
            });
        }
        if config.initial_state >= config.state_count {
            return Err(FsmError::StateOutOfRange {
                state: config.initial_state,
                state_count: config.state_count,
            });
        }
        if config.initial_event >= config.event_count {
            return Err(FsmError::EventOutOfRange {
                event: config.initial_event,
                event_count: config.event_count,
            });
        }
        Ok(Self {
            current_state: config.initial_state,
            current_event: config.initial_event,
            config,
        })
    }

    pub fn current_state(&self) -> u16 {
        self.current_state
    }

    pub fn current_event(&self) -> u16 {
        self.current_event
    }

    /// Store `event` as the event for the next [`compute_next_state`](Self::compute_next_state).
    pub fn set_trigger_event(&mut self, event: u16) -> core::result::Result<(), FsmError> {
        if event >= self.config.event_count {
            return Err(FsmError::EventOutOfRange {
                event,
                event_count: self.config.event_count,
            });
        }
        self.current_event = event;
        Ok(())
    }

    /// Commit `transitions[current_state][current_event]` as the new state.
    pub fn compute_next_state(&mut self) -> core::result::Result<u16, FsmError> {
        let idx = usize::from(self.current_state) * usize::from(self.config.event_count)
            + usize::from(self.current_event);
        let next = self.config.transitions[idx];
        if next >= self.config.state_count {
            return Err(FsmError::StateOutOfRange {
                state: next,
                state_count: self.config.state_count,
            });
        }
        self.current_state = next;
        Ok(next)
    }

    /// Invoke the current state's action once.
    pub fn run_state_action(&self, ctx: &mut C, bus: &MessageBus<'_>) -> Result<()> {
        let action = self.config.actions[usize::from(self.current_state)].ok_or(
            FsmError::MissingAction {
                state: self.current_state,
            },
        )?;
        action(ctx, bus)
    }

    /// [`compute_next_state`](Self::compute_next_state) then
    /// [`run_state_action`](Self::run_state_action).
    pub fn execute(&mut self, ctx: &mut C, bus: &MessageBus<'_>) -> Result<u16> {
        let next = self.compute_next_state()?;
        self.run_state_action(ctx, bus)?;
        Ok(next)
    }
}
