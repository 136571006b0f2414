//! Unified error types for the DeskPilot firmware.
//!
//! Every structural violation (bus wiring, state table, payload schema,
//! configuration) funnels into [`Error`].  These are not runtime faults to
//! tolerate: the task that observes one hands it to the
//! [`FaultSupervisor`](crate::supervisor::FaultSupervisor), which halts all
//! actuation.  Transient wire faults (bad 7-segment digit, framer overflow,
//! trigger while disarmed) never surface here.
//!
//! All variants are `Copy` so the supervisor can latch the first one
//! without allocation.

use core::fmt;

use crate::bus::Topic;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Message bus wiring or payload violation.
    Bus(BusError),
    /// State table lookup or configuration violation.
    Fsm(FsmError),
    /// Configuration is invalid or could not be parsed.
    Config(&'static str),
    /// Peripheral or task initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "bus: {e}"),
            Self::Fsm(e) => write!(f, "fsm: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Bus errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// `init()` was called on a bus that is already initialised.
    AlreadyInitialized,
    /// The bus was used before `init()`.
    NotInitialized,
    /// A raw topic id outside `FIRST_TOPIC < id < LAST_TOPIC`.
    TopicOutOfRange(u16),
    /// The subscriber already occupies a slot on this topic.
    DuplicateSubscription(Topic),
    /// Every slot on this topic is taken.
    SubscriberTableFull(Topic),
    /// `unsubscribe` for a subscriber that was never registered.
    NotSubscribed(Topic),
    /// Published with nobody listening.
    NoSubscriber(Topic),
    /// Payload length does not fit the wire length field.
    PayloadTooLarge(Topic),
    /// Payload size does not match the topic's convention.
    PayloadSize {
        topic: Topic,
        expected: u16,
        actual: u16,
    },
    /// Payload has the right size but an invalid value.
    PayloadValue(Topic),
    /// A subscriber received a topic it never subscribed to.
    UnexpectedTopic(Topic),
    /// Delivery looped back into a subscriber that is still handling an
    /// earlier message.
    ReentrantDelivery(Topic),
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyInitialized => write!(f, "already initialised"),
            Self::NotInitialized => write!(f, "not initialised"),
            Self::TopicOutOfRange(id) => write!(f, "topic id {id} out of range"),
            Self::DuplicateSubscription(t) => write!(f, "duplicate subscription to {t:?}"),
            Self::SubscriberTableFull(t) => write!(f, "subscriber table full for {t:?}"),
            Self::NotSubscribed(t) => write!(f, "not subscribed to {t:?}"),
            Self::NoSubscriber(t) => write!(f, "no subscriber for {t:?}"),
            Self::PayloadTooLarge(t) => write!(f, "payload too large for {t:?}"),
            Self::PayloadSize {
                topic,
                expected,
                actual,
            } => write!(
                f,
                "payload for {topic:?} is {actual} bytes, expected {expected}"
            ),
            Self::PayloadValue(t) => write!(f, "invalid payload value for {t:?}"),
            Self::UnexpectedTopic(t) => write!(f, "unexpected topic {t:?}"),
            Self::ReentrantDelivery(t) => write!(f, "re-entrant delivery of {t:?}"),
        }
    }
}

impl From<BusError> for Error {
    fn from(e: BusError) -> Self {
        Self::Bus(e)
    }
}

// ---------------------------------------------------------------------------
// FSM errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsmError {
    /// Zero states or zero events declared.
    EmptyTable,
    /// Transition table length is not `states * events`, or the action
    /// table length is not `states`.
    TableShape,
    /// A state index at or beyond `state_count`.
    StateOutOfRange { state: u16, state_count: u16 },
    /// An event index at or beyond `event_count`.
    EventOutOfRange { event: u16, event_count: u16 },
    /// The state has no action.
    MissingAction { state: u16 },
}

impl fmt::Display for FsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTable => write!(f, "empty state table"),
            Self::TableShape => write!(f, "table shape mismatch"),
            Self::StateOutOfRange { state, state_count } => {
                write!(f, "state {state} out of range (count {state_count})")
            }
            Self::EventOutOfRange { event, event_count } => {
                write!(f, "event {event} out of range (count {event_count})")
            }
            Self::MissingAction { state } => write!(f, "no action for state {state}"),
        }
    }
}

impl From<FsmError> for Error {
    fn from(e: FsmError) -> Self {
        Self::Fsm(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
