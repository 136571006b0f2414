//! Occupancy-driven desk automation.
//!
//! [`ApplicationControl`] turns presence and countdown messages into
//! events for the automation state machine.  The machine's actions publish
//! desk and countdown commands.
//!
//! ```text
//!  PresenceDetected ─┐
//!  PresenceLost ─────┼──▶ ┌────────────────────┐ ──▶ DeskCommand
//!  CountdownFinished ┘    │ ApplicationControl │ ──▶ CountdownStart / Stop
//!  TimerInterval* ──────▶ │  FSM · context     │ ──▶ TimerIntervalReport
//!                         └────────────────────┘
//! ```
//!
//! Event handling holds the controller's lock while the actions publish.
//! Those publishes only reach the desk and the timer, never this
//! controller, so the lock is not re-entered.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::{info, warn};

use crate::bus::payload::{decode_bool, decode_u32, encode_u32, expect_signal};
use crate::bus::{Message, MessageBus, Subscriber, Topic};
use crate::config::DeskConfig;
use crate::error::{BusError, FsmError, Result};
use crate::fsm::StateMachine;
use crate::fsm::context::AutomationContext;
use crate::fsm::states::{AutomationEvent, AutomationState, automation_config};

pub const TOPICS: [Topic; 6] = [
    Topic::PresenceDetected,
    Topic::PresenceLost,
    Topic::CountdownFinished,
    Topic::TimerIntervalSet,
    Topic::TimerIntervalQuery,
    Topic::LogApplicationControl,
];

struct Automation {
    fsm: StateMachine<'static, AutomationContext>,
    ctx: AutomationContext,
}

pub struct ApplicationControl {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Automation>>,
}

impl ApplicationControl {
    pub fn new(config: &DeskConfig) -> core::result::Result<Self, FsmError> {
        let fsm = StateMachine::new(automation_config())?;
        Ok(Self {
            inner: Mutex::new(RefCell::new(Automation {
                fsm,
                ctx: AutomationContext::new(config),
            })),
        })
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

    pub fn state(&self) -> Option<AutomationState> {
        self.inner.lock(|cell| {
            cell.try_borrow()
                .ok()
                .and_then(|a| AutomationState::from_index(a.fsm.current_state()))
        })
    }

    pub fn interval_minutes(&self) -> Option<u32> {
        self.inner
            .lock(|cell| cell.try_borrow().ok().map(|a| a.ctx.interval_minutes))
    }

    pub fn countdown_running(&self) -> bool {
        self.inner
            .lock(|cell| cell.try_borrow().is_ok_and(|a| a.ctx.countdown_running))
    }

    fn with<R>(&self, topic: Topic, f: impl FnOnce(&mut Automation) -> Result<R>) -> Result<R> {
        self.inner.lock(|cell| {
            let mut automation = cell
                .try_borrow_mut()
                .map_err(|_| BusError::ReentrantDelivery(topic))?;
            f(&mut *automation)
        })
    }

    fn dispatch(&self, bus: &MessageBus<'_>, topic: Topic, event: AutomationEvent) -> Result<()> {
        self.with(topic, |a| {
            let from = a.fsm.current_state();
            if event == AutomationEvent::CountdownFinished {
                a.ctx.countdown_running = false;
            }
            a.fsm.set_trigger_event(event as u16)?;
            let to = a.fsm.execute(&mut a.ctx, bus)?;
            if from != to {
                info!(
                    "automation: {:?} --{event:?}--> {:?}",
                    AutomationState::from_index(from),
                    AutomationState::from_index(to)
                );
            } else if a.ctx.verbose {
                info!("automation: {event:?} in {:?}", AutomationState::from_index(to));
            }
            Ok(())
        })
    }
}

impl Subscriber for ApplicationControl {
    fn on_message(&self, bus: &MessageBus<'_>, message: &Message<'_>) -> Result<()> {
        let topic = message.topic;
        match topic {
            Topic::PresenceDetected => {
                expect_signal(message)?;
                self.dispatch(bus, topic, AutomationEvent::PresenceDetected)
            }
            Topic::PresenceLost => {
                expect_signal(message)?;
                self.dispatch(bus, topic, AutomationEvent::PresenceLost)
            }
            Topic::CountdownFinished => {
                expect_signal(message)?;
                self.dispatch(bus, topic, AutomationEvent::CountdownFinished)
            }
            Topic::TimerIntervalSet => {
                let minutes = decode_u32(message)?;
                if minutes == 0 {
                    warn!("automation: interval 0 rejected");
                    return Ok(());
                }
                self.with(topic, |a| {
                    a.ctx.interval_minutes = minutes;
                    Ok(())
                })?;
                info!("automation: interval {minutes} min");
                Ok(())
            }
            Topic::TimerIntervalQuery => {
                expect_signal(message)?;
                let minutes = self.with(topic, |a| Ok(a.ctx.interval_minutes))?;
                let report = encode_u32(minutes);
                bus.publish(&Message::new(Topic::TimerIntervalReport, &report))
            }
            Topic::LogApplicationControl => {
                let verbose = decode_bool(message)?;
                self.with(topic, |a| {
                    a.ctx.verbose = verbose;
                    Ok(())
                })
            }
            other => Err(BusError::UnexpectedTopic(other).into()),
        }
    }
}
