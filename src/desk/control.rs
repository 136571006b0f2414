//! Bus-facing desk driver.
//!
//! Bus callbacks (any task) and the serial poll loop (desk-io task) share
//! one [`DeskProtocol`].  Every access goes through a blocking mutex, and
//! neither serial I/O nor `publish` happens while it is held.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embedded_hal::digital::OutputPin;
use heapless::Vec;
use log::{debug, info, warn};

use super::frame::{CommandFrame, TRIGGER_FRAME_LEN};
use super::{DeskCommand, DeskProtocol, SerialLink};
use crate::bus::payload::{decode_bool, decode_u8, encode_height, expect_signal};
use crate::bus::{Message, MessageBus, Subscriber, Topic};
use crate::error::{BusError, Result};

/// Bytes drained from the link per poll.
pub const READ_CHUNK: usize = 32;

/// Upper bound on triggers completed within one chunk.
const MAX_RELEASES: usize = READ_CHUNK / TRIGGER_FRAME_LEN + 1;

pub const TOPICS: [Topic; 4] = [
    Topic::DeskCommand,
    Topic::DeskToggle,
    Topic::DeskHeightQuery,
    Topic::LogDeskControl,
];

pub struct DeskControl<P: OutputPin> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<DeskProtocol<P>>>,
}

impl<P: OutputPin + Send> DeskControl<P> {
    pub fn new(protocol: DeskProtocol<P>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(protocol)),
        }
    }

    /// Register on every desk topic.
    pub fn subscribe<'a>(
        &'a self,
        bus: &mut MessageBus<'a>,
    ) -> core::result::Result<(), BusError> {
        for topic in TOPICS {
            bus.subscribe(topic, self)?;
        }
        Ok(())
    }

    /// Run `f` on the protocol state.  Fails if the state is already
    /// borrowed further up the stack.
    fn with<R>(&self, topic: Topic, f: impl FnOnce(&mut DeskProtocol<P>) -> R) -> Result<R> {
        self.inner.lock(|cell| {
            let mut proto = cell
                .try_borrow_mut()
                .map_err(|_| BusError::ReentrantDelivery(topic))?;
            Ok(f(&mut *proto))
        })
    }

    /// Drain pending bytes from `serial` and answer any completed triggers.
    ///
    /// Returns the number of bytes consumed.  Link errors are transient:
    /// they are logged and the poll gives up until next time.
    pub fn poll<S: SerialLink>(&self, serial: &mut S) -> usize {
        let mut buf = [0u8; READ_CHUNK];
        let n = match serial.read(&mut buf) {
            Ok(n) => n,
            Err(e) => {
                warn!("desk: serial read failed: {e:?}");
                return 0;
            }
        };
        if n == 0 {
            return 0;
        }

        let released: Vec<CommandFrame, MAX_RELEASES> = self.inner.lock(|cell| {
            let mut out = Vec::new();
            // The poll loop is the only caller; a failed borrow means a
            // callback is mid-update on this thread, so skip this chunk.
            let Ok(mut proto) = cell.try_borrow_mut() else {
                return out;
            };
            for byte in &buf[..n] {
                if let Some(release) = proto.on_byte(*byte) {
                    if out.push(release.frame).is_err() {
                        warn!("desk: release buffer full, frame dropped");
                    }
                }
            }
            out
        });

        for frame in &released {
            debug!("desk: tx {frame:02X?}");
            if let Err(e) = serial.write(frame).and_then(|()| serial.flush()) {
                warn!("desk: serial write failed: {e:?}");
            }
        }
        n
    }

    /// Disarm, drop the wake line and refuse further commands.
    pub fn halt(&self) {
        self.inner.lock(|cell| {
            if let Ok(mut proto) = cell.try_borrow_mut() {
                proto.halt();
            }
        });
    }

    pub fn is_armed(&self) -> bool {
        self.inner
            .lock(|cell| cell.try_borrow().is_ok_and(|p| p.is_armed()))
    }

    pub fn last_height(&self) -> Option<f32> {
        self.inner
            .lock(|cell| cell.try_borrow().ok().and_then(|p| p.last_height()))
    }
}

impl<P: OutputPin + Send> Subscriber for DeskControl<P> {
    fn on_message(&self, bus: &MessageBus<'_>, message: &Message<'_>) -> Result<()> {
        let topic = message.topic;
        match topic {
            Topic::DeskCommand => {
                let id = decode_u8(message)?;
                let command = DeskCommand::from_id(id).ok_or(BusError::PayloadValue(topic))?;
                if let Some(armed) = self.with(topic, |p| p.command(command))? {
                    info!("desk: {command:?} -> {armed:?}");
                }
            }
            Topic::DeskToggle => {
                expect_signal(message)?;
                if let Some(armed) = self.with(topic, |p| p.command(DeskCommand::Toggle))? {
                    info!("desk: toggle -> {armed:?}");
                }
            }
            Topic::DeskHeightQuery => {
                expect_signal(message)?;
                let height = self.with(topic, |p| p.last_height())?;
                let report = encode_height(height);
                bus.publish(&Message::new(Topic::DeskHeightReport, &report))?;
            }
            Topic::LogDeskControl => {
                let verbose = decode_bool(message)?;
                self.with(topic, |p| p.set_verbose(verbose))?;
            }
            other => return Err(BusError::UnexpectedTopic(other).into()),
        }
        Ok(())
    }
}
