//! DeskPilot Firmware: main entry point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │  UartLink (SerialLink)  MonotonicClock (Clock)  LogReportSink  │
//! │                                                                │
//! │  ───────────────────── MessageBus ─────────────────────────    │
//! │                                                                │
//! │  DeskControl · TimerManager · ApplicationControl (automation)  │
//! │                                                                │
//! │  desk-io thread: serial loop + countdown loop                  │
//! │  main thread:    supervisor watch + fatal blink                │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use core::time::Duration;

use anyhow::{Context, Result};
use esp_idf_hal::gpio::{AnyIOPin, AnyOutputPin, PinDriver};
use esp_idf_hal::peripherals::Peripherals;
use log::{info, warn};

use deskpilot::adapters::log_sink::LogReportSink;
use deskpilot::adapters::time::MonotonicClock;
use deskpilot::adapters::uart::UartLink;
use deskpilot::app::ApplicationControl;
use deskpilot::bus::MessageBus;
use deskpilot::config::DeskConfig;
use deskpilot::desk::{DeskControl, DeskProtocol};
use deskpilot::drivers::status_led::StatusLed;
use deskpilot::error::Error;
use deskpilot::pins;
use deskpilot::supervisor::FaultSupervisor;
use deskpilot::tasks::{self, DeskIo};
use deskpilot::timer::TimerManager;

/// Supervisor check period while running normally.
const WATCH_INTERVAL: Duration = Duration::from_millis(100);

fn load_config() -> DeskConfig {
    match option_env!("DESKPILOT_CONFIG") {
        Some(json) => match DeskConfig::from_json(json) {
            Ok(cfg) => {
                info!("Config loaded from DESKPILOT_CONFIG");
                cfg
            }
            Err(e) => {
                warn!("DESKPILOT_CONFIG rejected ({e}), using defaults");
                DeskConfig::default()
            }
        },
        None => DeskConfig::default(),
    }
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  DeskPilot v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let supervisor: &'static FaultSupervisor = Box::leak(Box::new(FaultSupervisor::new()));
    supervisor.install_panic_hook();

    // ── 2. Configuration ──────────────────────────────────────
    let config = load_config();
    config.validate()?;

    // ── 3. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take().context("peripherals already taken")?;
    // SAFETY: each GPIO number in `pins` is used exactly once.
    let (wake_pin, led_pin, tx_pin, rx_pin) = unsafe {
        (
            AnyOutputPin::new(pins::DESK_WAKE_GPIO),
            AnyOutputPin::new(pins::STATUS_LED_GPIO),
            AnyIOPin::new(pins::DESK_UART_TX_GPIO),
            AnyIOPin::new(pins::DESK_UART_RX_GPIO),
        )
    };
    let wake = PinDriver::output(wake_pin)?;
    let mut led = StatusLed::new(PinDriver::output(led_pin)?);
    let serial = UartLink::new(peripherals.uart1, tx_pin, rx_pin, config.serial_baud)?;

    // ── 4. Modules ────────────────────────────────────────────
    let desk: &'static _ = Box::leak(Box::new(DeskControl::new(DeskProtocol::new(
        wake,
        config.command_repeats,
    ))));
    let timer: &'static _ = Box::leak(Box::new(TimerManager::new(MonotonicClock::new())));
    let app: &'static _ = Box::leak(Box::new(
        ApplicationControl::new(&config).map_err(Error::from)?,
    ));
    let reports: &'static _ = Box::leak(Box::new(LogReportSink::new()));

    // ── 5. Bus wiring ─────────────────────────────────────────
    let bus: &'static mut MessageBus<'static> = Box::leak(Box::new(MessageBus::new()));
    bus.init().map_err(Error::from)?;
    desk.subscribe(bus).map_err(Error::from)?;
    timer.subscribe(bus).map_err(Error::from)?;
    app.subscribe(bus).map_err(Error::from)?;
    reports.subscribe(bus).map_err(Error::from)?;
    let bus: &'static MessageBus<'static> = bus;
    info!("Bus wired");

    // ── 6. Settle, then start polling ─────────────────────────
    std::thread::sleep(Duration::from_millis(u64::from(config.startup_settle_ms)));
    let _desk_io = tasks::spawn(DeskIo {
        bus,
        desk,
        timer,
        supervisor,
        serial,
        serial_poll: Duration::from_millis(u64::from(config.serial_poll_interval_ms)),
        timer_poll: Duration::from_millis(u64::from(config.timer_poll_interval_ms)),
    })?;

    info!(
        "DeskPilot running: {} repeats/command, {} min interval",
        config.command_repeats, config.default_interval_minutes
    );

    // ── 7. Supervisor watch ───────────────────────────────────
    let blink = Duration::from_millis(u64::from(config.fatal_blink_interval_ms));
    loop {
        if supervisor.is_halted() {
            desk.halt();
            led.toggle();
            std::thread::sleep(blink);
        } else {
            std::thread::sleep(WATCH_INTERVAL);
        }
    }
}
