//! CPR pacer firmware for the Raspberry Pi Pico W
//!
//! Core 0 runs the rhythm cue on a high priority interrupt executor and
//! the buttons plus telemetry on its thread executor. Core 1 runs nothing
//! but the medication alert, whose beep busy-waits for half a second.

#![no_std]
#![no_main]

use embassy_executor::{Executor, InterruptExecutor};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::multicore::{spawn_core1, Stack};
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use cpr_pacer_firmware::*;

// Shared state, reachable from every context
static STATE: SystemState = SystemState::new();
static MEDICATION: Signal = Signal::new();
static HANDLER: StaticCell<Buttons> = StaticCell::new();

// Executors
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR0: StaticCell<Executor> = StaticCell::new();
static EXECUTOR1: StaticCell<Executor> = StaticCell::new();
static mut CORE1_STACK: Stack<4096> = Stack::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

#[cortex_m_rt::entry]
fn main() -> ! {
    defmt::info!("CPR pacer v{} starting", VERSION);

    let config = PacerConfig::DEFAULT;
    if let Err(err) = config.validate() {
        fatal(StartupError::InvalidConfig(err));
    }
    defmt::info!(
        "{} cpm, reminder every {} ms ({} compressions)",
        config.compressions_per_minute,
        config.medication_interval_ms,
        config.medication_threshold()
    );

    let p = embassy_rp::init(Default::default());
    let board = PicoBoard::init(PacerPins {
        rhythm: p.PIN_10,
        alert: p.PIN_21,
        indicator: p.PIN_13,
        silence: p.PIN_6,
        power: p.PIN_5,
    });

    let rhythm = RhythmTickSource::new(&config, &STATE, &MEDICATION, board.rhythm, PulseEmitter::new(Delay));
    let alert = AlertLoop::new(
        &config,
        &STATE,
        &MEDICATION,
        board.alert,
        board.indicator,
        PulseEmitter::new(Delay),
    );
    let handler: &'static Buttons = HANDLER.init(ButtonHandler::new(
        &config,
        &STATE,
        ForcedOutputs {
            rhythm: board.rhythm,
            alert: board.alert,
            indicator: board.indicator,
        },
    ));

    // Alert loop owns core 1
    spawn_core1(
        p.CORE1,
        unsafe { &mut *core::ptr::addr_of_mut!(CORE1_STACK) },
        move || {
            let executor1 = EXECUTOR1.init(Executor::new());
            executor1.run(|spawner| {
                if let Err(err) = spawned("alert", spawner.spawn(alert_task(alert))) {
                    fatal(err);
                }
            })
        },
    );

    // Rhythm preempts everything else on core 0
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let high = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    if let Err(err) = spawned("rhythm", high.spawn(rhythm_task(rhythm, config))) {
        fatal(err);
    }

    let executor0 = EXECUTOR0.init(Executor::new());
    executor0.run(|spawner| {
        let started = spawned(
            "power button",
            spawner.spawn(power_button_task(board.power, handler, config.pins.power)),
        )
        .and_then(|_| {
            spawned(
                "silence button",
                spawner.spawn(silence_button_task(board.silence, handler, &STATE, config)),
            )
        })
        .and_then(|_| spawned("telemetry", spawner.spawn(telemetry_task(&STATE, config))));

        if let Err(err) = started {
            fatal(err);
        }
        defmt::info!("system ready, press power to start");
    })
}
