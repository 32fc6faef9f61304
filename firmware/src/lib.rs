#![no_std]

//! Firmware library: board wiring, embassy tasks and the telemetry stub

pub use embassy_executor::Spawner;
pub use embassy_time::Duration;
pub use static_cell::StaticCell;

pub use pacer_core::*;

pub use crate::pico_hardware::*;
pub use crate::startup::*;
pub use crate::tasks::*;
pub use crate::uplink::*;

// Pico W hardware module
pub mod pico_hardware;

// Startup failure handling
pub mod startup {
    use embassy_executor::SpawnError;
    use pacer_core::ConfigError;

    /// Failures that stop the device before it starts pacing
    #[derive(Debug, Clone, Copy, defmt::Format)]
    pub enum StartupError {
        /// Build-time configuration failed validation
        InvalidConfig(ConfigError),
        /// Task could not be spawned (arena exhausted or already running)
        Spawn(&'static str),
    }

    /// Abort startup. A device without its rhythm or alert must not run.
    pub fn fatal(err: StartupError) -> ! {
        defmt::error!("startup failed: {}", err);
        defmt::panic!("cannot operate safely: {}", err)
    }

    /// Spawn result for `task`, turning failure into a [`StartupError`]
    pub fn spawned(task: &'static str, result: Result<(), SpawnError>) -> Result<(), StartupError> {
        result.map_err(|_| StartupError::Spawn(task))?;
        defmt::debug!("{} task spawned", task);
        Ok(())
    }
}

// Telemetry uplink stub
pub mod uplink {
    use pacer_core::{TelemetryUplink, UpdateRequest};

    /// ThingSpeak host the request head is rendered for
    pub const TELEMETRY_HOST: &str = "api.thingspeak.com";

    /// Write key, injected at build time
    pub const TELEMETRY_API_KEY: &str = match option_env!("PACER_TELEMETRY_KEY") {
        Some(key) => key,
        None => "",
    };

    /// Renders the update request and logs it instead of sending it.
    ///
    /// Network association and the TCP exchange live outside the core.
    pub struct LogUplink {
        request: UpdateRequest<'static>,
    }

    impl LogUplink {
        pub const fn new() -> Self {
            Self {
                request: UpdateRequest {
                    host: TELEMETRY_HOST,
                    api_key: TELEMETRY_API_KEY,
                },
            }
        }
    }

    impl Default for LogUplink {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TelemetryUplink for LogUplink {
        fn report(&mut self, value: u32, enabled: bool) {
            if !enabled {
                defmt::debug!("telemetry disabled, {} presses not sent", value);
                return;
            }
            match self.request.render(value) {
                Ok(head) => defmt::info!("telemetry -> {}: {=str}", TELEMETRY_HOST, head.as_str()),
                Err(_) => defmt::warn!("telemetry request does not fit buffer"),
            }
        }
    }
}

// Embassy tasks module
pub mod tasks {
    use embassy_rp::gpio::Input;
    use embassy_time::{Delay, Instant, Timer};
    use pacer_core::{PacerConfig, SilenceButton, SystemState, TelemetryReporter};

    use crate::pico_hardware::{Alert, Buttons, Rhythm};
    use crate::uplink::LogUplink;

    /// Compression cue, on the high priority interrupt executor
    #[embassy_executor::task]
    pub async fn rhythm_task(source: Rhythm, config: PacerConfig) {
        defmt::info!("rhythm task started, {} ms per compression", config.tick_period_ms());
        pacer_core::rhythm::rhythm_task(source, config).await
    }

    /// Medication alert, alone on core 1
    #[embassy_executor::task]
    pub async fn alert_task(mut alert: Alert) {
        defmt::info!("alert task started");
        let mut gap = Delay;
        alert.run(&mut gap).await
    }

    /// Power button edges
    #[embassy_executor::task]
    pub async fn power_button_task(mut button: Input<'static>, handler: &'static Buttons, pin: u8) {
        loop {
            button.wait_for_falling_edge().await;
            let _action = handler.on_falling_edge(pin);
        }
    }

    /// Silence button: edge action, then polled press counting until re-armed
    #[embassy_executor::task]
    pub async fn silence_button_task(
        mut button: Input<'static>,
        handler: &'static Buttons,
        state: &'static SystemState,
        config: PacerConfig,
    ) {
        let mut silence = SilenceButton::new(handler, state, &config);

        loop {
            button.wait_for_falling_edge().await;
            let _action = silence.on_falling_edge(Instant::now());

            while !silence.is_armed() {
                Timer::after_millis(1).await;
                silence.poll(button.is_low(), Instant::now());
            }
        }
    }

    /// Periodic telemetry report
    #[embassy_executor::task]
    pub async fn telemetry_task(state: &'static SystemState, config: PacerConfig) {
        let reporter = TelemetryReporter::new(state, LogUplink::new());
        pacer_core::telemetry::telemetry_task(reporter, config.telemetry_period_ms).await
    }
}
