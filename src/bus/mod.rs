//! Fixed-capacity publish/subscribe message bus.
//!
//! The bus is the only channel between modules.  It is not a queue:
//! [`MessageBus::publish`] calls every subscriber of the topic directly,
//! in registration order, on the publishing thread.  A subscriber that
//! publishes from inside its callback recurses on the same stack.
//!
//! ```text
//!  ┌────────────┐  publish(msg)  ┌──────────────────────────────────┐
//!  │ producer   │───────────────▶│ Topic table                      │
//!  └────────────┘                │  DeskCommand  [desk]             │
//!                                │  Presence*    [app]              │
//!                                │  Countdown*   [timer] [app] ...  │
//!                                └──────┬──────────┬────────────────┘
//!                                       ▼          ▼
//!                                 on_message   on_message   (slot order)
//! ```
//!
//! The topology must be fully wired before traffic flows: publishing to a
//! topic nobody listens to is a structural error, as is subscribing twice
//! or past [`MAX_SUBSCRIBERS_PER_TOPIC`].  Subscription takes `&mut self`
//! and publishing `&self`, so wiring happens once at boot and the wired
//! bus is then shared between tasks.

pub mod payload;
pub mod topics;

pub use topics::{FIRST_TOPIC, LAST_TOPIC, Topic};

use heapless::Vec;
use log::debug;

use crate::error::{BusError, Result};

/// Subscriber slots per topic.
pub const MAX_SUBSCRIBERS_PER_TOPIC: usize = 10;

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A topic plus an untyped payload, passed to subscribers by reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message<'p> {
    pub topic: Topic,
    pub payload: &'p [u8],
}

impl<'p> Message<'p> {
    pub const fn new(topic: Topic, payload: &'p [u8]) -> Self {
        Self { topic, payload }
    }

    /// A message with no payload.
    pub const fn signal(topic: Topic) -> Message<'static> {
        Message { topic, payload: &[] }
    }

    /// Payload length as carried on the wire, saturating at `u16::MAX`.
    pub fn len(&self) -> u16 {
        u16::try_from(self.payload.len()).unwrap_or(u16::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Subscriber
// ---------------------------------------------------------------------------

/// A bus endpoint.
///
/// Identity is the address of the registered object: the same object may
/// hold at most one slot per topic.  `bus` is the bus delivering the
/// message, so a subscriber can publish follow-up messages.
pub trait Subscriber: Sync {
    fn on_message(&self, bus: &MessageBus<'_>, message: &Message<'_>) -> Result<()>;
}

/// Address and concrete type together: zero-sized subscribers share an
/// address, as does a struct with the subscriber field it starts with.
fn same_subscriber(a: &dyn Subscriber, b: &dyn Subscriber) -> bool {
    core::ptr::eq(a as *const dyn Subscriber, b as *const dyn Subscriber)
}

// ---------------------------------------------------------------------------
// MessageBus
// ---------------------------------------------------------------------------

/// Topic registry and synchronous fan-out dispatcher.
pub struct MessageBus<'a> {
    topics: [Vec<&'a dyn Subscriber, MAX_SUBSCRIBERS_PER_TOPIC>; Topic::COUNT],
    initialized: bool,
}

impl Default for MessageBus<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> MessageBus<'a> {
    /// An uninitialised bus.  Call [`init`](Self::init) before use.
    pub fn new() -> Self {
        Self {
            topics: core::array::from_fn(|_| Vec::new()),
            initialized: false,
        }
    }

    /// Reset every topic's subscriber table.  Valid exactly once.
    pub fn init(&mut self) -> core::result::Result<(), BusError> {
        if self.initialized {
            return Err(BusError::AlreadyInitialized);
        }
        for table in &mut self.topics {
            table.clear();
        }
        self.initialized = true;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Register `subscriber` on `topic`, after every existing subscriber.
    pub fn subscribe(
        &mut self,
        topic: Topic,
        subscriber: &'a dyn Subscriber,
    ) -> core::result::Result<(), BusError> {
        if !self.initialized {
            return Err(BusError::NotInitialized);
        }
        let table = &mut self.topics[topic.index()];
        if table.iter().any(|s| same_subscriber(*s, subscriber)) {
            return Err(BusError::DuplicateSubscription(topic));
        }
        table
            .push(subscriber)
            .map_err(|_| BusError::SubscriberTableFull(topic))?;
        debug!("bus: {:?} now has {} subscriber(s)", topic, table.len());
        Ok(())
    }

    /// Remove `subscriber` from `topic`; later subscribers shift left.
    pub fn unsubscribe(
        &mut self,
        topic: Topic,
        subscriber: &'a dyn Subscriber,
    ) -> core::result::Result<(), BusError> {
        if !self.initialized {
            return Err(BusError::NotInitialized);
        }
        let table = &mut self.topics[topic.index()];
        let pos = table
            .iter()
            .position(|s| same_subscriber(*s, subscriber))
            .ok_or(BusError::NotSubscribed(topic))?;
        table.remove(pos);
        Ok(())
    }

    /// Number of subscribers currently registered on `topic`.
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.topics[topic.index()].len()
    }

    /// Deliver `message` to every subscriber of its topic, in slot order.
    ///
    /// Stops at the first subscriber error and returns it.
    pub fn publish(&self, message: &Message<'_>) -> Result<()> {
        if !self.initialized {
            return Err(BusError::NotInitialized.into());
        }
        let topic = message.topic;
        if message.payload.len() > usize::from(u16::MAX) {
            return Err(BusError::PayloadTooLarge(topic).into());
        }
        let table = &self.topics[topic.index()];
        if table.is_empty() {
            return Err(BusError::NoSubscriber(topic).into());
        }
        for subscriber in table {
            subscriber.on_message(self, message)?;
        }
        Ok(())
    }
}
