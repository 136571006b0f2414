//! Integration tests for bus wiring, cross-task delivery and fault
//! latching.

use deskpilot::adapters::log_sink::LogReportSink;
use deskpilot::app::ApplicationControl;
use deskpilot::bus::{MAX_SUBSCRIBERS_PER_TOPIC, Message, MessageBus, Subscriber, Topic};
use deskpilot::config::DeskConfig;
use deskpilot::desk::{DeskCommand, DeskControl, DeskProtocol};
use deskpilot::error::{BusError, Error};
use deskpilot::supervisor::{Fault, FaultSupervisor};

use super::mock_hw::{MockPin, Recorder};

#[test]
fn fan_out_follows_registration_order() {
    let desk = DeskControl::new(DeskProtocol::new(MockPin::new(), 5));
    let before = Recorder::new();
    let after = Recorder::new();
    let mut bus = MessageBus::new();
    bus.init().unwrap();
    bus.subscribe(Topic::DeskCommand, &before).unwrap();
    desk.subscribe(&mut bus).unwrap();
    bus.subscribe(Topic::DeskCommand, &after).unwrap();

    // An invalid id: the first recorder sees it, the desk rejects it and
    // delivery stops there.
    assert!(
        bus.publish(&Message::new(Topic::DeskCommand, &[0xFF]))
            .is_err()
    );
    assert_eq!(before.count(Topic::DeskCommand), 1);
    assert_eq!(after.count(Topic::DeskCommand), 0);

    bus.publish(&Message::new(Topic::DeskCommand, &[DeskCommand::Up.id()]))
        .unwrap();
    assert_eq!(before.count(Topic::DeskCommand), 2);
    assert_eq!(after.count(Topic::DeskCommand), 1);
}

#[test]
fn module_cannot_subscribe_twice() {
    let desk = DeskControl::new(DeskProtocol::new(MockPin::new(), 5));
    let mut bus = MessageBus::new();
    bus.init().unwrap();
    desk.subscribe(&mut bus).unwrap();
    assert_eq!(
        desk.subscribe(&mut bus),
        Err(BusError::DuplicateSubscription(Topic::DeskCommand))
    );
}

#[test]
fn table_capacity_is_enforced_per_topic() {
    let spies: Vec<Recorder> = (0..=MAX_SUBSCRIBERS_PER_TOPIC)
        .map(|_| Recorder::new())
        .collect();
    let mut bus = MessageBus::new();
    bus.init().unwrap();
    for spy in &spies[..MAX_SUBSCRIBERS_PER_TOPIC] {
        bus.subscribe(Topic::PresenceDetected, spy).unwrap();
    }
    assert_eq!(
        bus.subscribe(Topic::PresenceDetected, &spies[MAX_SUBSCRIBERS_PER_TOPIC]),
        Err(BusError::SubscriberTableFull(Topic::PresenceDetected))
    );
    // Other topics are unaffected.
    bus.subscribe(Topic::PresenceLost, &spies[MAX_SUBSCRIBERS_PER_TOPIC])
        .unwrap();

    bus.publish(&Message::signal(Topic::PresenceDetected)).unwrap();
    let delivered: usize = spies.iter().map(|s| s.count(Topic::PresenceDetected)).sum();
    assert_eq!(delivered, MAX_SUBSCRIBERS_PER_TOPIC);
}

#[test]
fn publishing_from_many_threads_reaches_every_subscriber() {
    let app = ApplicationControl::new(&DeskConfig::default()).unwrap();
    let sink = LogReportSink::new();
    let mut bus = MessageBus::new();
    bus.init().unwrap();
    app.subscribe(&mut bus).unwrap();
    sink.subscribe(&mut bus).unwrap();
    let bus = &bus;

    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(move || {
                for _ in 0..250 {
                    bus.publish(&Message::signal(Topic::TimerIntervalQuery))
                        .unwrap();
                }
            });
        }
    });
    assert_eq!(sink.logged(), 1_000);
}

#[test]
fn unwired_topic_error_halts_the_supervisor() {
    let supervisor = FaultSupervisor::new();
    let mut bus = MessageBus::new();
    bus.init().unwrap();

    let result = bus.publish(&Message::signal(Topic::PresenceDetected));
    assert_eq!(supervisor.check("presence", result), None);
    assert!(supervisor.is_halted());

    // A later fault does not replace the first.
    supervisor.report("later", Error::Init("second"));
    assert_eq!(
        supervisor.first_fault(),
        Some(Fault::Error {
            origin: "presence",
            error: Error::Bus(BusError::NoSubscriber(Topic::PresenceDetected)),
        })
    );
}

#[test]
fn bus_refuses_traffic_before_init() {
    let spy = Recorder::new();
    let mut bus = MessageBus::new();
    assert_eq!(
        bus.subscribe(Topic::DeskToggle, &spy),
        Err(BusError::NotInitialized)
    );
    assert_eq!(
        bus.publish(&Message::signal(Topic::DeskToggle)),
        Err(Error::Bus(BusError::NotInitialized))
    );
}

/// Answers every desk command with a fresh presence signal, looping
/// delivery back into the automation controller.
struct PresenceEcho;

impl Subscriber for PresenceEcho {
    fn on_message(&self, bus: &MessageBus<'_>, _m: &Message<'_>) -> deskpilot::error::Result<()> {
        bus.publish(&Message::signal(Topic::PresenceDetected))
    }
}

#[test]
fn delivery_looping_back_into_a_busy_controller_is_an_error() {
    let app = ApplicationControl::new(&DeskConfig::default()).unwrap();
    let echo = PresenceEcho;
    let countdown = Recorder::new();
    let mut bus = MessageBus::new();
    bus.init().unwrap();
    app.subscribe(&mut bus).unwrap();
    bus.subscribe(Topic::DeskCommand, &echo).unwrap();
    for topic in [Topic::CountdownStart, Topic::CountdownStop] {
        bus.subscribe(topic, &countdown).unwrap();
    }

    assert_eq!(
        bus.publish(&Message::signal(Topic::PresenceDetected)),
        Err(Error::Bus(BusError::ReentrantDelivery(Topic::PresenceDetected)))
    );
    // The failed call released the controller again.
    assert_eq!(app.interval_minutes(), Some(45));
    assert_eq!(countdown.count(Topic::CountdownStart), 0);
    bus.publish(&Message::signal(Topic::PresenceLost)).unwrap();
}
