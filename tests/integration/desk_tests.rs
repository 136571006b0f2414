//! Integration tests for the bus → DeskControl → serial pipeline.
//!
//! A scripted serial link plays the control unit: it emits trigger frames
//! and height telemetry, and records every command frame the controller
//! writes back.

use deskpilot::bus::payload::decode_height;
use deskpilot::bus::{Message, MessageBus, Topic};
use deskpilot::desk::frame::{PRESET1, PRESET2, TRIGGER};
use deskpilot::desk::control::READ_CHUNK;
use deskpilot::desk::{DeskCommand, DeskControl, DeskProtocol};
use deskpilot::error::{BusError, Error};

use super::mock_hw::{MockPin, MockSerial, Recorder};

/// Height frame for 73.2: digits 7, 3 (with decimal point), 2.
const HEIGHT_73_2: [u8; 9] = [0x9B, 0x07, 0x12, 0x07, 0xCF, 0x5B, 0x00, 0x00, 0x9D];

fn desk(pin: &MockPin) -> DeskControl<MockPin> {
    DeskControl::new(DeskProtocol::new(pin.clone(), 5))
}

fn wire<'a>(desk: &'a DeskControl<MockPin>, reports: &'a Recorder) -> MessageBus<'a> {
    let mut bus = MessageBus::new();
    bus.init().unwrap();
    desk.subscribe(&mut bus).unwrap();
    bus.subscribe(Topic::DeskHeightReport, reports).unwrap();
    bus
}

fn command(bus: &MessageBus<'_>, cmd: DeskCommand) {
    bus.publish(&Message::new(Topic::DeskCommand, &[cmd.id()]))
        .unwrap();
}

/// Feed one trigger and poll once; returns the frames written.
fn trigger(desk: &DeskControl<MockPin>, serial: &mut MockSerial) -> Vec<Vec<u8>> {
    serial.feed_trigger();
    desk.poll(serial);
    serial.take_tx()
}

// ── Command delivery ──────────────────────────────────────────

#[test]
fn command_is_sent_once_per_trigger_then_disarms() {
    let pin = MockPin::new();
    let desk = desk(&pin);
    let reports = Recorder::new();
    let bus = wire(&desk, &reports);
    let mut serial = MockSerial::new();

    command(&bus, DeskCommand::Preset1);
    assert!(pin.is_high(), "wake line must rise when a command is armed");
    assert!(desk.is_armed());

    for n in 1..=5 {
        assert_eq!(trigger(&desk, &mut serial), vec![PRESET1.to_vec()]);
        assert_eq!(desk.is_armed(), n < 5, "armed after trigger {n}");
    }
    assert!(!pin.is_high(), "wake line must drop after the last repeat");

    assert!(trigger(&desk, &mut serial).is_empty(), "sixth trigger sends nothing");
    assert_eq!(serial.flushes, 5);
}

#[test]
fn triggers_in_one_chunk_release_one_frame_each() {
    let pin = MockPin::new();
    let desk = desk(&pin);
    let reports = Recorder::new();
    let bus = wire(&desk, &reports);
    let mut serial = MockSerial::new();

    command(&bus, DeskCommand::Preset2);
    for _ in 0..5 {
        serial.feed_trigger();
    }
    assert_eq!(desk.poll(&mut serial), 30);
    assert_eq!(serial.take_tx(), vec![PRESET2.to_vec(); 5]);
    assert!(!desk.is_armed());
}

#[test]
fn trigger_split_across_polls_still_matches() {
    let pin = MockPin::new();
    let desk = desk(&pin);
    let reports = Recorder::new();
    let bus = wire(&desk, &reports);
    let mut serial = MockSerial::new();

    command(&bus, DeskCommand::Up);
    serial.feed(&TRIGGER[..3]);
    desk.poll(&mut serial);
    assert!(serial.tx.is_empty());
    serial.feed(&TRIGGER[3..]);
    desk.poll(&mut serial);
    assert_eq!(serial.tx.len(), 1);
}

#[test]
fn disarmed_controller_never_transmits() {
    let pin = MockPin::new();
    let desk = desk(&pin);
    let mut serial = MockSerial::new();

    for _ in 0..3 {
        assert!(trigger(&desk, &mut serial).is_empty());
    }
    assert!(pin.history().is_empty(), "wake line untouched while idle");
}

#[test]
fn new_command_restarts_the_repeat_count() {
    let pin = MockPin::new();
    let desk = desk(&pin);
    let reports = Recorder::new();
    let bus = wire(&desk, &reports);
    let mut serial = MockSerial::new();

    command(&bus, DeskCommand::Preset1);
    trigger(&desk, &mut serial);
    trigger(&desk, &mut serial);

    command(&bus, DeskCommand::Preset2);
    for _ in 0..5 {
        assert_eq!(trigger(&desk, &mut serial), vec![PRESET2.to_vec()]);
    }
    assert!(!desk.is_armed());
    assert!(trigger(&desk, &mut serial).is_empty());
}

#[test]
fn failed_write_still_consumes_a_repeat() {
    let pin = MockPin::new();
    let desk = desk(&pin);
    let reports = Recorder::new();
    let bus = wire(&desk, &reports);
    let mut serial = MockSerial::new();

    command(&bus, DeskCommand::Down);
    serial.fail_writes = true;
    assert!(trigger(&desk, &mut serial).is_empty());
    serial.fail_writes = false;

    for _ in 0..4 {
        assert_eq!(trigger(&desk, &mut serial).len(), 1);
    }
    assert!(!desk.is_armed());
}

#[test]
fn halt_disarms_and_drops_wake() {
    let pin = MockPin::new();
    let desk = desk(&pin);
    let reports = Recorder::new();
    let bus = wire(&desk, &reports);
    let mut serial = MockSerial::new();

    command(&bus, DeskCommand::Memory);
    desk.halt();
    assert!(!pin.is_high());
    assert!(trigger(&desk, &mut serial).is_empty());
}

#[test]
fn halted_desk_ignores_later_commands() {
    let pin = MockPin::new();
    let desk = desk(&pin);
    let reports = Recorder::new();
    let bus = wire(&desk, &reports);
    let mut serial = MockSerial::new();

    desk.halt();
    command(&bus, DeskCommand::Up);
    bus.publish(&Message::signal(Topic::DeskToggle)).unwrap();

    assert!(!desk.is_armed());
    assert!(!pin.is_high());
    assert!(pin.history().iter().all(|high| !high), "wake line never raised");
    assert!(trigger(&desk, &mut serial).is_empty());
}

#[test]
fn busiest_chunk_releases_every_completed_trigger() {
    let pin = MockPin::new();
    let desk = DeskControl::new(DeskProtocol::new(pin.clone(), 10));
    let reports = Recorder::new();
    let bus = wire(&desk, &reports);
    let mut serial = MockSerial::new();

    command(&bus, DeskCommand::Preset1);
    serial.feed(&TRIGGER[..4]);
    desk.poll(&mut serial);

    // Finish the pending trigger, then five more: six in one full chunk.
    serial.feed(&TRIGGER[4..]);
    for _ in 0..5 {
        serial.feed_trigger();
    }
    assert_eq!(desk.poll(&mut serial), READ_CHUNK);
    assert_eq!(serial.take_tx(), vec![PRESET1.to_vec(); 6]);
}

#[test]
fn unknown_command_id_is_rejected() {
    let pin = MockPin::new();
    let desk = desk(&pin);
    let reports = Recorder::new();
    let bus = wire(&desk, &reports);

    assert_eq!(
        bus.publish(&Message::new(Topic::DeskCommand, &[42])),
        Err(Error::Bus(BusError::PayloadValue(Topic::DeskCommand)))
    );
    assert!(!desk.is_armed());
    assert!(pin.history().is_empty());
}

// ── Toggle ────────────────────────────────────────────────────

#[test]
fn toggle_alternates_between_presets() {
    let pin = MockPin::new();
    let desk = desk(&pin);
    let reports = Recorder::new();
    let bus = wire(&desk, &reports);
    let mut serial = MockSerial::new();

    let mut sent = Vec::new();
    for _ in 0..3 {
        bus.publish(&Message::signal(Topic::DeskToggle)).unwrap();
        sent.extend(trigger(&desk, &mut serial));
        // Finish the sequence so the next toggle starts clean.
        for _ in 0..4 {
            trigger(&desk, &mut serial);
        }
    }
    assert_eq!(sent, vec![PRESET2.to_vec(), PRESET1.to_vec(), PRESET2.to_vec()]);
}

#[test]
fn explicit_preset_moves_the_toggle_position() {
    let pin = MockPin::new();
    let desk = desk(&pin);
    let reports = Recorder::new();
    let bus = wire(&desk, &reports);
    let mut serial = MockSerial::new();

    command(&bus, DeskCommand::Preset2);
    bus.publish(&Message::signal(Topic::DeskToggle)).unwrap();
    assert_eq!(trigger(&desk, &mut serial), vec![PRESET1.to_vec()]);
}

#[test]
fn toggle_with_payload_is_rejected() {
    let pin = MockPin::new();
    let desk = desk(&pin);
    let reports = Recorder::new();
    let bus = wire(&desk, &reports);

    assert!(
        bus.publish(&Message::new(Topic::DeskToggle, &[1]))
            .is_err()
    );
    assert!(!desk.is_armed());
}

// ── Height telemetry ──────────────────────────────────────────

fn reported_height(reports: &Recorder) -> Option<f32> {
    let payload = reports.last(Topic::DeskHeightReport).unwrap();
    decode_height(&Message::new(Topic::DeskHeightReport, &payload)).unwrap()
}

#[test]
fn height_query_before_telemetry_reports_unknown() {
    let pin = MockPin::new();
    let desk = desk(&pin);
    let reports = Recorder::new();
    let bus = wire(&desk, &reports);

    bus.publish(&Message::signal(Topic::DeskHeightQuery)).unwrap();
    assert_eq!(reports.count(Topic::DeskHeightReport), 1);
    assert_eq!(reported_height(&reports), None);
}

#[test]
fn height_query_reports_last_decoded_height() {
    let pin = MockPin::new();
    let desk = desk(&pin);
    let reports = Recorder::new();
    let bus = wire(&desk, &reports);
    let mut serial = MockSerial::new();

    serial.feed(&HEIGHT_73_2);
    desk.poll(&mut serial);
    bus.publish(&Message::signal(Topic::DeskHeightQuery)).unwrap();

    let height = reported_height(&reports).unwrap();
    assert!((height - 73.2).abs() < 1e-4, "got {height}");
    assert_eq!(desk.last_height(), Some(height));
}

#[test]
fn telemetry_and_triggers_share_the_stream() {
    let pin = MockPin::new();
    let desk = desk(&pin);
    let reports = Recorder::new();
    let bus = wire(&desk, &reports);
    let mut serial = MockSerial::new();

    command(&bus, DeskCommand::Preset1);
    serial.feed(&HEIGHT_73_2);
    serial.feed_trigger();
    desk.poll(&mut serial);

    assert_eq!(serial.take_tx(), vec![PRESET1.to_vec()]);
    assert!(desk.last_height().is_some());
}

#[test]
fn verbose_flag_needs_a_bool_payload() {
    let pin = MockPin::new();
    let desk = desk(&pin);
    let reports = Recorder::new();
    let bus = wire(&desk, &reports);

    bus.publish(&Message::new(Topic::LogDeskControl, &[1])).unwrap();
    assert!(
        bus.publish(&Message::new(Topic::LogDeskControl, &[]))
            .is_err()
    );
}
