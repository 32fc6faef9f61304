//! Busy-wait square wave generator shared by the rhythm and alert outputs

use embedded_hal::delay::DelayNs;

use crate::hal::{self, OutputLine};
use crate::types::Tone;

/// Drives a buzzer line with a 50% duty square wave.
///
/// Blocking: the calling context is occupied for the whole pulse. Never
/// call it while holding a lock or from the button handler.
pub struct PulseEmitter<D> {
    delay: D,
}

impl<D: DelayNs> PulseEmitter<D> {
    pub fn new(delay: D) -> Self {
        Self { delay }
    }

    /// Emit `tone` on `line` for `duration_ms`, returning the cycle count.
    ///
    /// The line is always left low.
    pub fn emit_pulse<L: OutputLine + ?Sized>(&mut self, line: &L, tone: Tone, duration_ms: u32) -> u32 {
        let half_period_us = tone.half_period_us();
        let cycles = Self::cycles_for(tone, duration_ms);

        for _ in 0..cycles {
            line.set_high().ok();
            self.delay.delay_us(half_period_us);
            line.set_low().ok();
            self.delay.delay_us(half_period_us);
        }
        hal::force_low(line);

        cycles
    }

    /// Number of full periods that fit in `duration_ms`
    pub fn cycles_for(tone: Tone, duration_ms: u32) -> u32 {
        let period_us = u64::from(tone.period_us().max(1));
        let cycles = u64::from(duration_ms) * 1_000 / period_us;
        u32::try_from(cycles).unwrap_or(u32::MAX)
    }

    /// Access the delay (tests inspect mock delays this way)
    pub fn delay(&self) -> &D {
        &self.delay
    }

    pub fn into_delay(self) -> D {
        self.delay
    }
}
