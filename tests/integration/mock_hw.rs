//! Mock hardware for integration tests.
//!
//! Records every wake-line edge, every transmitted frame and every bus
//! message so tests can assert on the full history without a desk.

use std::collections::VecDeque;
use std::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use deskpilot::app::ports::Clock;
use deskpilot::bus::{Message, MessageBus, Subscriber, Topic};
use deskpilot::desk::SerialLink;
use deskpilot::desk::frame::TRIGGER;
use embedded_hal::digital::{ErrorType, OutputPin};

// ── Wake line ─────────────────────────────────────────────────

/// Output pin whose level history is shared with the test.
#[derive(Clone, Default)]
pub struct MockPin {
    levels: Arc<Mutex<Vec<bool>>>,
}

#[allow(dead_code)]
impl MockPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_high(&self) -> bool {
        self.levels.lock().unwrap().last().copied().unwrap_or(false)
    }

    pub fn history(&self) -> Vec<bool> {
        self.levels.lock().unwrap().clone()
    }
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.levels.lock().unwrap().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.levels.lock().unwrap().push(true);
        Ok(())
    }
}

// ── Serial link ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkDown;

/// Scripted serial link: `rx` is what the desk "sends", `tx` collects
/// every frame written.
#[derive(Default)]
pub struct MockSerial {
    pub rx: VecDeque<u8>,
    pub tx: Vec<Vec<u8>>,
    pub fail_writes: bool,
    pub flushes: usize,
}

#[allow(dead_code)]
impl MockSerial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    pub fn feed_trigger(&mut self) {
        self.feed(&TRIGGER);
    }

    pub fn take_tx(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.tx)
    }
}

impl SerialLink for MockSerial {
    type Error = LinkDown;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinkDown> {
        let n = buf.len().min(self.rx.len());
        for (slot, byte) in buf.iter_mut().zip(self.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<(), LinkDown> {
        if self.fail_writes {
            return Err(LinkDown);
        }
        self.tx.push(data.to_vec());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), LinkDown> {
        self.flushes += 1;
        Ok(())
    }
}

// ── Clock ─────────────────────────────────────────────────────

/// Manually advanced clock; clones share the same time.
#[derive(Clone, Default)]
pub struct MockClock {
    now: Arc<AtomicU64>,
}

#[allow(dead_code)]
impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_ms(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn advance_min(&self, minutes: u64) {
        self.advance_ms(minutes * 60_000);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

// ── Bus recorder ──────────────────────────────────────────────

/// Subscriber that keeps a copy of every message it receives.
#[derive(Default)]
pub struct Recorder {
    seen: Mutex<Vec<(Topic, Vec<u8>)>>,
}

#[allow(dead_code)]
impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<(Topic, Vec<u8>)> {
        std::mem::take(&mut *self.seen.lock().unwrap())
    }

    pub fn count(&self, topic: Topic) -> usize {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| *t == topic)
            .count()
    }

    pub fn last(&self, topic: Topic) -> Option<Vec<u8>> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(t, _)| *t == topic)
            .map(|(_, p)| p.clone())
    }
}

impl Subscriber for Recorder {
    fn on_message(&self, _bus: &MessageBus<'_>, m: &Message<'_>) -> deskpilot::error::Result<()> {
        self.seen.lock().unwrap().push((m.topic, m.payload.to_vec()));
        Ok(())
    }
}
