//! Medication alert loop, run on its own execution context

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal::delay::DelayNs;
use embedded_hal_async::delay::DelayNs as AsyncDelayNs;

use crate::hal::{self, OutputLine};
use crate::pulse::PulseEmitter;
use crate::signal::MedicationSignal;
use crate::state::SystemState;
use crate::types::{PacerConfig, Tone};

/// Beeps and blinks while `medication_due` holds.
///
/// Suspends only on the signal wait and on the inter-beep gap. The beep
/// itself busy-waits, which is why this loop gets a context of its own.
pub struct AlertLoop<'a, A, I, D, M: RawMutex> {
    state: &'a SystemState,
    signal: &'a MedicationSignal<M>,
    alert_line: &'a A,
    indicator: &'a I,
    emitter: PulseEmitter<D>,
    tone: Tone,
    pulse_ms: u32,
    gap_ms: u32,
}

impl<'a, A, I, D, M> AlertLoop<'a, A, I, D, M>
where
    A: OutputLine,
    I: OutputLine,
    D: DelayNs,
    M: RawMutex,
{
    pub fn new(
        config: &PacerConfig,
        state: &'a SystemState,
        signal: &'a MedicationSignal<M>,
        alert_line: &'a A,
        indicator: &'a I,
        emitter: PulseEmitter<D>,
    ) -> Self {
        Self {
            state,
            signal,
            alert_line,
            indicator,
            emitter,
            tone: config.alert_tone,
            pulse_ms: config.alert_pulse_ms,
            gap_ms: config.alert_gap_ms,
        }
    }

    /// Run one alert episode; returns the number of beeps.
    ///
    /// Each iteration completes indicator-on, beep, indicator-off and gap
    /// before the flag is read again. The indicator is off on return.
    pub async fn run_episode<G: AsyncDelayNs>(&mut self, gap: &mut G) -> u32 {
        let mut beeps = 0;

        while self.state.medication_due() {
            self.indicator.set_high().ok();
            self.emitter.emit_pulse(self.alert_line, self.tone, self.pulse_ms);
            self.indicator.set_low().ok();
            beeps += 1;
            gap.delay_ms(self.gap_ms).await;
        }
        hal::force_low(self.indicator);

        beeps
    }

    /// Wait for reminders and alert on each, forever
    pub async fn run<G: AsyncDelayNs>(&mut self, gap: &mut G) -> ! {
        loop {
            self.signal.wait().await;

            #[cfg(feature = "defmt")]
            defmt::info!("medication alert started");

            let _beeps = self.run_episode(gap).await;

            #[cfg(feature = "defmt")]
            defmt::info!("medication alert ended after {} beeps", _beeps);
        }
    }

    pub fn emitter(&self) -> &PulseEmitter<D> {
        &self.emitter
    }
}
