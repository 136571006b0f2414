//! Desk I/O task: serial polling and countdown ticking.
//!
//! Runs in a dedicated thread using `edge-executor` for cooperative
//! scheduling and `async-io-mini` timers for pacing:
//!
//! ```text
//!  ┌──────────────────────────────────────────────────────────┐
//!  │  desk-io thread                                          │
//!  │  ┌────────────────────────────────────────────────────┐  │
//!  │  │  edge_executor::LocalExecutor                      │  │
//!  │  │  ┌──────────────────┐    ┌──────────────────────┐  │  │
//!  │  │  │ serial loop      │    │ countdown loop       │  │  │
//!  │  │  │ drain rx, answer │    │ TimerManager::poll   │  │  │
//!  │  │  │ triggers  10ms ⏱ │    │ 100ms ⏱              │  │  │
//!  │  │  └──────────────────┘    └──────────────────────┘  │  │
//!  │  └────────────────────────────────────────────────────┘  │
//!  └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Both loops exit once the supervisor halts; the serial loop disarms the
//! desk on its way out.

use core::time::Duration;

use embedded_hal::digital::OutputPin;
use log::info;

use crate::app::ports::Clock;
use crate::bus::MessageBus;
use crate::desk::control::READ_CHUNK;
use crate::desk::{DeskControl, SerialLink};
use crate::drivers::task_pin::{self, Core};
use crate::supervisor::FaultSupervisor;
use crate::timer::TimerManager;

/// Everything the desk-io thread needs.  Shared parts are `'static`
/// because they outlive the thread.
pub struct DeskIo<P: OutputPin + 'static, S, C: Clock + 'static> {
    pub bus: &'static MessageBus<'static>,
    pub desk: &'static DeskControl<P>,
    pub timer: &'static TimerManager<C>,
    pub supervisor: &'static FaultSupervisor,
    pub serial: S,
    pub serial_poll: Duration,
    pub timer_poll: Duration,
}

async fn serial_loop<P, S>(
    desk: &'static DeskControl<P>,
    mut serial: S,
    supervisor: &'static FaultSupervisor,
    period: Duration,
) where
    P: OutputPin + Send,
    S: SerialLink,
{
    while !supervisor.is_halted() {
        // A full chunk means more may be pending.
        while desk.poll(&mut serial) == READ_CHUNK {}
        async_io_mini::Timer::after(period).await;
    }
    desk.halt();
    info!("desk-io: serial loop stopped, desk disarmed");
}

async fn countdown_loop<C: Clock>(
    bus: &'static MessageBus<'static>,
    timer: &'static TimerManager<C>,
    supervisor: &'static FaultSupervisor,
    period: Duration,
) {
    while !supervisor.is_halted() {
        supervisor.check("countdown", timer.poll(bus));
        async_io_mini::Timer::after(period).await;
    }
    info!("desk-io: countdown loop stopped");
}

/// Drive both loops on the current thread until the supervisor halts.
pub fn run<P, S, C>(io: DeskIo<P, S, C>)
where
    P: OutputPin + Send,
    S: SerialLink,
    C: Clock,
{
    let executor: edge_executor::LocalExecutor<'_, 4> = edge_executor::LocalExecutor::new();

    let serial = executor.spawn(serial_loop(io.desk, io.serial, io.supervisor, io.serial_poll));
    let countdown = executor.spawn(countdown_loop(
        io.bus,
        io.timer,
        io.supervisor,
        io.timer_poll,
    ));

    info!(
        "desk-io started (serial {:?}, countdown {:?})",
        io.serial_poll, io.timer_poll
    );

    futures_lite::future::block_on(executor.run(futures_lite::future::zip(serial, countdown)));
}

/// Spawn the desk-io thread pinned to the application core.
pub fn spawn<P, S, C>(io: DeskIo<P, S, C>) -> std::io::Result<std::thread::JoinHandle<()>>
where
    P: OutputPin + Send,
    S: SerialLink + Send + 'static,
    C: Clock,
{
    task_pin::spawn_on_core(Core::App, 10, 8, "desk-io\0", move || run(io))
}
