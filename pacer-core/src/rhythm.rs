//! Periodic compression cue and medication interval counting

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal::delay::DelayNs;

use crate::hal::{self, OutputLine};
use crate::pulse::PulseEmitter;
use crate::signal::MedicationSignal;
use crate::state::SystemState;
use crate::types::{PacerConfig, Tone};

/// Result of one tick evaluation
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// Powered off; rhythm line forced low
    Idle,
    /// Cue emitted, counter advanced
    Paced { tick_count: u32 },
    /// Cue emitted and the interval elapsed; counter back at zero
    MedicationDue {
        /// `false` when a wake-up was already pending
        signalled: bool,
    },
}

/// Evaluated once per timer fire. Never blocks beyond the cue pulse.
pub struct RhythmTickSource<'a, L, D, M: RawMutex> {
    state: &'a SystemState,
    signal: &'a MedicationSignal<M>,
    line: &'a L,
    emitter: PulseEmitter<D>,
    tone: Tone,
    pulse_ms: u32,
    threshold: u32,
}

impl<'a, L, D, M> RhythmTickSource<'a, L, D, M>
where
    L: OutputLine,
    D: DelayNs,
    M: RawMutex,
{
    pub fn new(
        config: &PacerConfig,
        state: &'a SystemState,
        signal: &'a MedicationSignal<M>,
        line: &'a L,
        emitter: PulseEmitter<D>,
    ) -> Self {
        Self {
            state,
            signal,
            line,
            emitter,
            tone: config.rhythm_tone,
            pulse_ms: config.rhythm_pulse_ms,
            threshold: config.medication_threshold(),
        }
    }

    /// Ticks per medication reminder
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Handle one timer fire
    pub fn on_tick(&mut self) -> TickOutcome {
        if !self.state.power_on() {
            hal::force_low(self.line);
            return TickOutcome::Idle;
        }

        self.emitter.emit_pulse(self.line, self.tone, self.pulse_ms);

        // Power can go off while the cue sounds
        if !self.state.power_on() {
            hal::force_low(self.line);
            return TickOutcome::Idle;
        }

        let tick_count = self.state.advance_tick();
        if tick_count < self.threshold {
            #[cfg(feature = "defmt")]
            defmt::trace!("compression {}/{}", tick_count, self.threshold);
            return TickOutcome::Paced { tick_count };
        }

        self.state.raise_medication_due();
        self.state.reset_ticks();
        if !self.state.power_on() {
            // Power-off landed between the check and the raise
            self.state.clear_medication_due();
            return TickOutcome::Idle;
        }
        let signalled = self.signal.notify();

        #[cfg(feature = "defmt")]
        defmt::warn!("medication due (wake-up sent: {})", signalled);

        TickOutcome::MedicationDue { signalled }
    }

    pub fn emitter(&self) -> &PulseEmitter<D> {
        &self.emitter
    }
}

/// Drive the tick source from an embassy ticker, forever
#[cfg(feature = "embassy-time")]
pub async fn rhythm_task<L, D, M>(mut source: RhythmTickSource<'_, L, D, M>, config: PacerConfig) -> !
where
    L: OutputLine,
    D: DelayNs,
    M: RawMutex,
{
    use embassy_time::{Duration, Ticker};

    let mut ticker = Ticker::every(Duration::from_millis(u64::from(config.tick_period_ms())));

    loop {
        ticker.next().await;
        let _outcome = source.on_tick();
    }
}
