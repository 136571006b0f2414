//! Countdown timer.
//!
//! A single one-shot countdown driven entirely by bus messages:
//!
//! ```text
//!  CountdownStart(ms) ──▶ ┌───────────┐  poll(): now >= deadline
//!  CountdownStop ───────▶ │ Countdown │ ─────────────────────────▶ CountdownFinished
//!                         └───────────┘        (once per start)
//! ```
//!
//! Starting a running countdown restarts it from now.  The countdown task
//! calls [`TimerManager::poll`] on a fixed period, so expiry is observed
//! up to one period late.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::{debug, info};

use crate::app::ports::Clock;
use crate::bus::payload::{decode_u32, expect_signal};
use crate::bus::{Message, MessageBus, Subscriber, Topic};
use crate::error::{BusError, Result};

// ═══════════════════════════════════════════════════════════════
//  Countdown state
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Countdown {
    deadline_ms: Option<u64>,
}

impl Countdown {
    pub fn start(&mut self, now_ms: u64, duration_ms: u32) {
        self.deadline_ms = Some(now_ms.saturating_add(u64::from(duration_ms)));
    }

    pub fn stop(&mut self) {
        self.deadline_ms = None;
    }

    pub fn is_running(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// Milliseconds until expiry, `None` when idle.
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.deadline_ms.map(|d| d.saturating_sub(now_ms))
    }

    /// `true` exactly once, on the first call at or after the deadline.
    pub fn expire(&mut self, now_ms: u64) -> bool {
        match self.deadline_ms {
            Some(d) if now_ms >= d => {
                self.deadline_ms = None;
                true
            }
            _ => false,
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Bus-facing manager
// ═══════════════════════════════════════════════════════════════

pub const TOPICS: [Topic; 2] = [Topic::CountdownStart, Topic::CountdownStop];

pub struct TimerManager<C: Clock> {
    clock: C,
    countdown: Mutex<CriticalSectionRawMutex, RefCell<Countdown>>,
}

impl<C: Clock> TimerManager<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            countdown: Mutex::new(RefCell::new(Countdown::default())),
        }
    }

    pub fn subscribe<'a>(
        &'a self,
        bus: &mut MessageBus<'a>,
    ) -> core::result::Result<(), BusError> {
        for topic in TOPICS {
            bus.subscribe(topic, self)?;
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.countdown
            .lock(|c| c.try_borrow().is_ok_and(|c| c.is_running()))
    }

    pub fn remaining_ms(&self) -> Option<u64> {
        let now = self.clock.now_ms();
        self.countdown
            .lock(|c| c.try_borrow().ok().and_then(|c| c.remaining_ms(now)))
    }

    /// Publish `CountdownFinished` if the deadline has passed.
    ///
    /// The state is updated and the lock released before publishing, so
    /// subscribers may restart the countdown from their callback.
    pub fn poll(&self, bus: &MessageBus<'_>) -> Result<bool> {
        let now = self.clock.now_ms();
        let expired = self.countdown.lock(|c| {
            c.try_borrow_mut()
                .map(|mut c| c.expire(now))
                .map_err(|_| BusError::ReentrantDelivery(Topic::CountdownFinished))
        })?;
        if expired {
            info!("timer: countdown finished");
            bus.publish(&Message::signal(Topic::CountdownFinished))?;
        }
        Ok(expired)
    }

    fn update(&self, topic: Topic, f: impl FnOnce(&mut Countdown)) -> Result<()> {
        self.countdown.lock(|c| {
            let mut c = c
                .try_borrow_mut()
                .map_err(|_| BusError::ReentrantDelivery(topic))?;
            f(&mut *c);
            Ok(())
        })
    }
}

impl<C: Clock> Subscriber for TimerManager<C> {
    fn on_message(&self, _bus: &MessageBus<'_>, message: &Message<'_>) -> Result<()> {
        let topic = message.topic;
        match topic {
            Topic::CountdownStart => {
                let ms = decode_u32(message)?;
                if ms == 0 {
                    return Err(BusError::PayloadValue(topic).into());
                }
                let now = self.clock.now_ms();
                self.update(topic, |c| c.start(now, ms))?;
                debug!("timer: countdown {ms} ms");
            }
            Topic::CountdownStop => {
                expect_signal(message)?;
                self.update(topic, Countdown::stop)?;
                debug!("timer: countdown stopped");
            }
            other => return Err(BusError::UnexpectedTopic(other).into()),
        }
        Ok(())
    }
}
