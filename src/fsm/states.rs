//! Desk-automation state machine: tables and actions.
//!
//! ```text
//!            [presence detected]
//!  AWAY ──────────────────────────▶ SEATED ◀──┐
//!    ▲                                 │       │
//!    │ [presence lost]    [countdown finished] │ [countdown finished]
//!    │ (from any state)                ▼       │
//!    └──────────────────────────── STANDING ───┘
//! ```
//!
//! Every action runs after every transition, self-loops included, so each
//! one is idempotent: it only publishes what the context says has not
//! already been asked for.

use log::info;

use super::context::{AutomationContext, Posture};
use super::{FsmConfig, StateAction};
use crate::bus::payload::encode_u32;
use crate::bus::{Message, MessageBus, Topic};
use crate::desk::DeskCommand;
use crate::error::Result;

// ═══════════════════════════════════════════════════════════════════════════
//  Identity
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum AutomationState {
    Away = 0,
    Seated = 1,
    Standing = 2,
}

impl AutomationState {
    pub const COUNT: u16 = 3;

    pub fn from_index(idx: u16) -> Option<Self> {
        match idx {
            0 => Some(Self::Away),
            1 => Some(Self::Seated),
            2 => Some(Self::Standing),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum AutomationEvent {
    PresenceDetected = 0,
    PresenceLost = 1,
    CountdownFinished = 2,
}

impl AutomationEvent {
    pub const COUNT: u16 = 3;
}

// ═══════════════════════════════════════════════════════════════════════════
//  Tables
// ═══════════════════════════════════════════════════════════════════════════

const AWAY: u16 = AutomationState::Away as u16;
const SEATED: u16 = AutomationState::Seated as u16;
const STANDING: u16 = AutomationState::Standing as u16;

/// Row-major `[state][event]`, events in `AutomationEvent` order.
static TRANSITIONS: [u16; (AutomationState::COUNT * AutomationEvent::COUNT) as usize] = [
    // Away
    SEATED, AWAY, AWAY,
    // Seated
    SEATED, AWAY, STANDING,
    // Standing
    STANDING, AWAY, SEATED,
];

static ACTIONS: [Option<StateAction<AutomationContext>>; AutomationState::COUNT as usize] =
    [Some(away), Some(seated), Some(standing)];

/// Configuration for the automation machine, starting `Away`.
pub fn automation_config() -> FsmConfig<'static, AutomationContext> {
    FsmConfig {
        state_count: AutomationState::COUNT,
        event_count: AutomationEvent::COUNT,
        transitions: &TRANSITIONS,
        actions: &ACTIONS,
        initial_state: AWAY,
        initial_event: AutomationEvent::PresenceLost as u16,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Actions
// ═══════════════════════════════════════════════════════════════════════════

fn away(ctx: &mut AutomationContext, bus: &MessageBus<'_>) -> Result<()> {
    if ctx.countdown_running {
        bus.publish(&Message::signal(Topic::CountdownStop))?;
        ctx.countdown_running = false;
        if ctx.verbose {
            info!("AWAY: countdown stopped");
        }
    }
    Ok(())
}

fn seated(ctx: &mut AutomationContext, bus: &MessageBus<'_>) -> Result<()> {
    let command = ctx.sit_command;
    settle(ctx, bus, Posture::Sitting, command)
}

fn standing(ctx: &mut AutomationContext, bus: &MessageBus<'_>) -> Result<()> {
    let command = ctx.stand_command;
    settle(ctx, bus, Posture::Standing, command)
}

/// Shared body of the two present states.
fn settle(
    ctx: &mut AutomationContext,
    bus: &MessageBus<'_>,
    posture: Posture,
    command: DeskCommand,
) -> Result<()> {
    if ctx.posture != Some(posture) {
        bus.publish(&Message::new(Topic::DeskCommand, &[command.id()]))?;
        ctx.posture = Some(posture);
        info!("{posture:?}: desk -> {command:?}");
    }
    if !ctx.countdown_running {
        let ms = encode_u32(ctx.interval_ms());
        bus.publish(&Message::new(Topic::CountdownStart, &ms))?;
        ctx.countdown_running = true;
        if ctx.verbose {
            info!("{posture:?}: countdown {} min", ctx.interval_minutes);
        }
    }
    Ok(())
}
