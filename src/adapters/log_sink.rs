//! Log-based report sink adapter.
//!
//! Answers to the query topics have to land somewhere: the bus refuses to
//! publish a report nobody listens to.  `LogReportSink` subscribes to every
//! report topic and writes it to the ESP-IDF logger (UART / USB-CDC in
//! production).  A console adapter would subscribe alongside it.

use core::sync::atomic::{AtomicU32, Ordering};

use log::info;

use crate::bus::payload::{decode_height, decode_u32};
use crate::bus::{Message, MessageBus, Subscriber, Topic};
use crate::error::{BusError, Result};

pub const TOPICS: [Topic; 2] = [Topic::DeskHeightReport, Topic::TimerIntervalReport];

/// Subscriber that logs every report message.
#[derive(Default)]
pub struct LogReportSink {
    logged: AtomicU32,
}

impl LogReportSink {
    pub const fn new() -> Self {
        Self {
            logged: AtomicU32::new(0),
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

    /// Reports logged so far.
    pub fn logged(&self) -> u32 {
        self.logged.load(Ordering::Relaxed)
    }
}

impl Subscriber for LogReportSink {
    fn on_message(&self, _bus: &MessageBus<'_>, message: &Message<'_>) -> Result<()> {
        match message.topic {
            Topic::DeskHeightReport => match decode_height(message)? {
                Some(h) => info!("REPORT | height={h:.1}"),
                None => info!("REPORT | height=unknown"),
            },
            Topic::TimerIntervalReport => {
                let minutes = decode_u32(message)?;
                info!("REPORT | interval={minutes}min");
            }
            other => return Err(BusError::UnexpectedTopic(other).into()),
        }
        self.logged.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
